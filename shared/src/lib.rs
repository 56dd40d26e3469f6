use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod display;
pub mod export;
pub mod form;
pub mod protocol;
pub mod summary;
pub mod validation;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 凭据在 LocalStorage 中的键名，同时也是镜像 Cookie 的名称
pub const CREDENTIAL_KEY: &str = "auth_token";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// 上传文件大小上限 (5 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const ALLOWED_UPLOAD_EXTENSIONS: [&str; 3] = ["csv", "xls", "xlsx"];

/// 后端默认分页大小
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 分发记录中的最小单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionItem {
    pub first_name: String,
    pub phone: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub agent_email: String,
    /// 列表接口不一定返回条目，详情接口才保证完整
    #[serde(default)]
    pub items: Vec<DistributionItem>,
    pub upload_date: DateTime<Utc>,
    pub file_name: String,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub item_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 单个代理在一次上传中分到的记录数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub agent_id: String,
    pub agent_name: String,
    pub agent_email: String,
    pub items_assigned: u64,
    pub distribution_id: String,
}

/// 后端报告的行级校验问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub row: Option<u64>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub file_name: String,
    #[serde(default)]
    pub total_records: u64,
    pub valid_records: u64,
    pub invalid_records: u64,
    #[serde(default)]
    pub agents_count: u64,
    #[serde(default)]
    pub distributions: Vec<DistributionSummary>,
    #[serde(default)]
    pub validation_errors: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default, alias = "totalAgents", alias = "totalDistributions")]
    pub total_items: Option<u64>,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// 当前页显示的记录区间 (从 1 开始，闭区间)
    pub fn showing_range(&self, page_size: u32) -> (u64, u64) {
        let page = u64::from(self.current_page.max(1));
        let size = u64::from(page_size);
        let total = self.total_items.unwrap_or(0);
        let start = (page - 1) * size + 1;
        let end = (page * size).min(total);
        (start, end)
    }

    /// 分页脚注，例如 `Showing 11 to 20 of 25 agents`
    pub fn showing_label(&self, page_size: u32, noun: &str) -> String {
        let (from, to) = self.showing_range(page_size);
        let total = self.total_items.unwrap_or(0);
        format!("Showing {from} to {to} of {total} {noun}")
    }
}

// =========================================================
// 请求体 (Request Payloads)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// =========================================================
// 查询参数 (Query Parameters)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl AgentStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatusFilter::All => "all",
            AgentStatusFilter::Active => "active",
            AgentStatusFilter::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<AgentStatusFilter>,
}

impl AgentQuery {
    /// 转换为查询字符串键值对，空值不发送
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                pairs.push(("search", search.to_string()));
            }
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistributionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub agent_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DistributionQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        let optional = [
            ("agentId", &self.agent_id),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        pairs
    }
}

/// 带唯一标识的资源，列表控制器按它定位条目
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Agent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Distribution {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_decodes_from_camel_case() {
        let agent: Agent = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "name": "Jo",
            "email": "jo@example.com",
            "mobile": "+100",
            "isActive": true,
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-02T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(agent.id(), "a1");
        assert!(agent.is_active);
    }

    #[test]
    fn pagination_accepts_resource_specific_totals() {
        let agents: Pagination = serde_json::from_value(serde_json::json!({
            "currentPage": 2, "totalPages": 3, "totalAgents": 25,
            "hasNextPage": true, "hasPrevPage": true
        }))
        .unwrap();
        assert_eq!(agents.total_items, Some(25));

        let dists: Pagination = serde_json::from_value(serde_json::json!({
            "currentPage": 1, "totalPages": 1, "totalDistributions": 4,
            "hasNextPage": false, "hasPrevPage": false
        }))
        .unwrap();
        assert_eq!(dists.total_items, Some(4));
    }

    #[test]
    fn showing_range_clamps_to_total() {
        let p = Pagination {
            current_page: 3,
            total_pages: 3,
            total_items: Some(25),
            has_next_page: false,
            has_prev_page: true,
        };
        assert_eq!(p.showing_range(10), (21, 25));
    }

    #[test]
    fn showing_label_names_the_resource() {
        let p = Pagination {
            current_page: 2,
            total_pages: 3,
            total_items: Some(25),
            has_next_page: true,
            has_prev_page: true,
        };
        assert_eq!(p.showing_label(10, "distributions"), "Showing 11 to 20 of 25 distributions");
    }

    #[test]
    fn agent_query_skips_blank_search() {
        let query = AgentQuery {
            page: Some(1),
            limit: None,
            search: Some("  ".to_string()),
            status: Some(AgentStatusFilter::Active),
        };
        assert_eq!(
            query.to_pairs(),
            vec![("page", "1".to_string()), ("status", "active".to_string())]
        );
    }

    #[test]
    fn update_request_omits_untouched_fields() {
        let req = UpdateAgentRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "isActive": false })
        );
    }
}
