//! 构建期配置
//!
//! CSR 包在浏览器里没有运行时环境变量，配置在编译时通过 `option_env!` 注入，
//! 未设置时使用默认值。

use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// REST API 根地址，已去掉末尾的 `/`
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub log_level: log::Level,
}

impl AppConfig {
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("DISPATCHBOARD_API_URL"),
            option_env!("DISPATCHBOARD_REQUEST_TIMEOUT_SECS"),
            option_env!("DISPATCHBOARD_LOG_LEVEL"),
        )
    }

    fn from_values(api_url: Option<&str>, timeout: Option<&str>, level: Option<&str>) -> Self {
        let api_base_url = api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = timeout
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let log_level = level
            .and_then(|raw| raw.trim().parse::<log::Level>().ok())
            .unwrap_or(log::Level::Info);

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_values(None, None, None)
    }
}
