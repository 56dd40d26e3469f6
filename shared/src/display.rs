//! 展示用的格式化函数

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// `M/D/YYYY`，与浏览器 en-US 的日期显示一致
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

/// 人类可读的文件大小，最多两位小数且去掉末尾的 0
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let value = format!("{scaled:.2}");
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{value} {}", SIZE_UNITS[unit])
}

/// `part / whole` 的百分比，保留一位小数；`whole` 为 0 时为 `0.0`
pub fn share_percent(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 / whole as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
    }

    #[test]
    fn dates_use_month_day_year() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 15, 0, 0).unwrap();
        assert_eq!(format_date(&at), "3/7/2024");
    }

    #[test]
    fn share_of_valid_records() {
        assert_eq!(share_percent(1, 3), "33.3");
        assert_eq!(share_percent(5, 0), "0.0");
    }
}
