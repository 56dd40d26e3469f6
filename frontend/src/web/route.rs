//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑，不依赖 DOM 或 web_sys。
//! 守卫规则只看"是否持有凭据"：除 `/` 和 `/login` 外都需要凭据。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 入口页：等待会话检查后转发
    #[default]
    Home,
    Login,
    Dashboard,
    Agents,
    Upload,
    Distributions,
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举，忽略末尾的 `/`
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            "/dashboard/agents" => Self::Agents,
            "/dashboard/upload" => Self::Upload,
            "/dashboard/distributions" => Self::Distributions,
            _ => Self::NotFound,
        }
    }

    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Agents => "/dashboard/agents",
            Self::Upload => "/dashboard/upload",
            Self::Distributions => "/dashboard/distributions",
            Self::NotFound => "/404",
        }
    }

    /// 允许名单之外的路由都需要凭据
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Home | Self::Login)
    }

    /// 持有凭据时不应停留在登录页
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

/// **核心守卫逻辑**：返回需要重定向到的路由，放行时为 None
pub fn guard(target: AppRoute, has_credential: bool) -> Option<AppRoute> {
    if target.requires_auth() && !has_credential {
        return Some(AppRoute::auth_failure_redirect());
    }
    if target.should_redirect_when_authenticated() && has_credential {
        return Some(AppRoute::auth_success_redirect());
    }
    None
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip_for_every_screen() {
        for route in [
            AppRoute::Home,
            AppRoute::Login,
            AppRoute::Dashboard,
            AppRoute::Agents,
            AppRoute::Upload,
            AppRoute::Distributions,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/dashboard/agents/"), AppRoute::Agents);
        assert_eq!(AppRoute::from_path("/settings"), AppRoute::NotFound);
    }

    #[test]
    fn only_home_and_login_are_public() {
        assert!(!AppRoute::Home.requires_auth());
        assert!(!AppRoute::Login.requires_auth());
        assert!(AppRoute::Agents.requires_auth());
        assert!(AppRoute::NotFound.requires_auth());
    }

    #[test]
    fn guard_redirects_anonymous_visitors_to_login() {
        assert_eq!(guard(AppRoute::Distributions, false), Some(AppRoute::Login));
        assert_eq!(guard(AppRoute::Login, false), None);
        assert_eq!(guard(AppRoute::Home, false), None);
    }

    #[test]
    fn guard_moves_credential_holders_off_login() {
        assert_eq!(guard(AppRoute::Login, true), Some(AppRoute::Dashboard));
        assert_eq!(guard(AppRoute::Upload, true), None);
        assert_eq!(guard(AppRoute::Home, true), None);
    }
}
