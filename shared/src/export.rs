//! 分发条目导出为 CSV 文本

use crate::{Distribution, DistributionItem};
use thiserror::Error;

pub const CSV_HEADER: &str = "FirstName,Phone,Notes";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,
}

/// 每个字段都用双引号包裹，字段内的双引号按 RFC 4180 写成两个
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn row(item: &DistributionItem) -> String {
    [
        quote(&item.first_name),
        quote(&item.phone),
        quote(item.notes.as_deref().unwrap_or_default()),
    ]
    .join(",")
}

/// 表头不加引号，行之间用 `\n` 分隔，末尾没有换行
pub fn items_to_csv(items: &[DistributionItem]) -> Result<String, ExportError> {
    if items.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(items.iter().map(row));
    Ok(lines.join("\n"))
}

/// 下载文件名：`{agentName}_{fileName}_distribution.csv`
pub fn export_file_name(distribution: &Distribution) -> String {
    format!(
        "{}_{}_distribution.csv",
        distribution.agent_name, distribution.file_name
    )
}
