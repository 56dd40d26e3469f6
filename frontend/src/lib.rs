//! 代理分发管理前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web`: 浏览器 API 封装（HTTP、凭据存储、路由）
//! - `api`: REST 网关客户端与信封解析
//! - `session` / `controllers`: 与界面无关的状态机，可在原生测试中运行
//! - `components`: UI 组件层

mod api;
mod config;
mod context;
mod error;
mod session;
mod state;

mod controllers {
    mod agents;
    mod distributions;
    mod list;
    mod upload;

    pub use agents::AgentsController;
    pub use distributions::{DistributionsController, prepare_export};
    pub use list::ListState;
    pub use upload::{UploadController, UploadState};
}

mod components {
    pub mod agent_dialog;
    pub mod agents;
    pub mod dashboard;
    pub mod distributions;
    pub mod home;
    mod icons;
    pub mod login;
    pub mod shell;
    pub mod upload;
}

pub(crate) mod web {
    pub mod download;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use http::{BrowserTransport, HttpRequest, HttpResponse, HttpTransport, UploadFile};
    pub use storage::{BrowserCredentials, CredentialStore};

    #[cfg(test)]
    pub use http::{MockTransport, RequestBody};
    #[cfg(test)]
    pub use storage::MemoryCredentials;
}

pub use config::AppConfig;

use crate::components::agents::AgentsPage;
use crate::components::dashboard::DashboardPage;
use crate::components::distributions::DistributionsPage;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::shell::Shell;
use crate::components::upload::UploadPage;
use crate::context::AppContext;

use leptos::prelude::*;
use leptos::task::spawn_local;

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件，仪表盘各页共用外壳。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <Shell><DashboardPage /></Shell> }.into_any(),
        AppRoute::Agents => view! { <Shell><AgentsPage /></Shell> }.into_any(),
        AppRoute::Upload => view! { <Shell><UploadPage /></Shell> }.into_any(),
        AppRoute::Distributions => view! { <Shell><DistributionsPage /></Shell> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link to=AppRoute::Home class="btn btn-primary mt-6">"Go Home"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    // 1. 创建应用上下文（API 客户端 + 会话信号）
    let ctx = AppContext::new(&config);
    provide_context(ctx);

    // 2. 向后端校验已存储的凭据
    let store = ctx.session_store();
    spawn_local(async move {
        store.init().await;
    });

    // 3. 凭据信号注入路由服务，路由不依赖会话模块
    let has_credential = ctx.has_credential_signal();

    view! {
        <Router has_credential=has_credential>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
