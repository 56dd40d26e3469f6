//! 应用级上下文
//!
//! API 客户端持有 `Rc`，不能直接放进 Context，这里用本地 `StoredValue` 包一层。

use crate::api::BrowserApi;
use crate::config::AppConfig;
use crate::controllers::{AgentsController, DistributionsController, ListState, UploadController, UploadState};
use crate::session::{SessionState, SessionStore};
use crate::web::{BrowserCredentials, BrowserTransport};
use dispatchboard_shared::{Agent, Distribution};
use leptos::prelude::*;
use std::rc::Rc;

pub type BrowserSession = SessionStore<BrowserTransport, BrowserCredentials, RwSignal<SessionState>>;
pub type BrowserAgents = AgentsController<BrowserTransport, BrowserCredentials, RwSignal<ListState<Agent>>>;
pub type BrowserDistributions =
    DistributionsController<BrowserTransport, BrowserCredentials, RwSignal<ListState<Distribution>>>;
pub type BrowserUpload = UploadController<BrowserTransport, BrowserCredentials, RwSignal<UploadState>>;

#[derive(Clone, Copy)]
pub struct AppContext {
    api: StoredValue<BrowserApi, LocalStorage>,
    pub session: RwSignal<SessionState>,
}

impl AppContext {
    pub fn new(config: &AppConfig) -> Self {
        let session = RwSignal::new(SessionState::default());
        let api = BrowserApi::new(
            &config.api_base_url,
            Rc::new(BrowserTransport::new(config.request_timeout)),
            BrowserCredentials,
            // 任意接口返回 401 时会话失效，路由服务随之跳转登录页
            move || session.update(SessionState::expire),
        );
        // 守卫在首次渲染前就需要知道凭据是否存在
        let has_credential = api.has_credential();
        session.update(|s| s.has_credential = has_credential);

        Self {
            api: StoredValue::new_local(api),
            session,
        }
    }

    pub fn api(&self) -> BrowserApi {
        self.api.get_value()
    }

    pub fn session_store(&self) -> BrowserSession {
        SessionStore::new(self.api(), self.session)
    }

    pub fn agents(&self, state: RwSignal<ListState<Agent>>) -> BrowserAgents {
        AgentsController::new(self.api(), state)
    }

    pub fn distributions(&self, state: RwSignal<ListState<Distribution>>) -> BrowserDistributions {
        DistributionsController::new(self.api(), state)
    }

    pub fn upload(&self, state: RwSignal<UploadState>) -> BrowserUpload {
        UploadController::new(self.api(), state)
    }

    /// 注入路由服务的凭据信号
    pub fn has_credential_signal(&self) -> Signal<bool> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.has_credential))
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}
