//! 认证会话模块
//!
//! 管理当前用户与认证状态，与路由系统解耦：
//! 路由服务只读取注入的 `has_credential` 信号。

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::state::StateCell;
use crate::web::{CredentialStore, HttpTransport};
use dispatchboard_shared::User;
use dispatchboard_shared::validation::{LoginForm, RegisterForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    Unauthenticated,
    /// 启动时尚未完成凭据校验
    #[default]
    Loading,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub status: SessionStatus,
    pub user: Option<User>,
    /// 凭据槽中是否有令牌，路由守卫只看这一项
    pub has_credential: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.user.is_some() && self.has_credential
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    /// 凭据已失效（登出、401、校验失败）
    pub fn expire(&mut self) {
        self.status = SessionStatus::Unauthenticated;
        self.user = None;
        self.has_credential = false;
    }

    fn authenticate(&mut self, user: User) {
        self.status = SessionStatus::Authenticated;
        self.user = Some(user);
        self.has_credential = true;
    }
}

pub struct SessionStore<T, C, S> {
    api: ApiClient<T, C>,
    state: S,
}

impl<T, C, S> SessionStore<T, C, S>
where
    T: HttpTransport,
    C: CredentialStore + Clone,
    S: StateCell<SessionState>,
{
    pub fn new(api: ApiClient<T, C>, state: S) -> Self {
        Self { api, state }
    }

    /// 启动时调用：有令牌则向后端校验，失败时清除令牌
    pub async fn init(&self) {
        if !self.api.has_credential() {
            self.state.modify(SessionState::expire);
            log::info!("session: no stored credential");
            return;
        }

        self.state.modify(|s| {
            s.status = SessionStatus::Loading;
            s.has_credential = true;
        });

        match self.api.verify().await {
            Ok(payload) if payload.valid => {
                log::info!("session: restored for {}", payload.user.email);
                self.state.modify(|s| s.authenticate(payload.user));
            }
            Ok(_) => {
                log::info!("session: stored credential rejected");
                self.drop_credential();
            }
            Err(e) => {
                log::info!("session: verification failed: {e}");
                self.drop_credential();
            }
        }
    }

    pub async fn login(&self, form: &LoginForm) -> ClientResult<User> {
        let request = form.to_request()?;
        let payload = self.api.login(&request).await?;
        log::info!("session: signed in as {}", payload.user.email);
        let user = payload.user.clone();
        self.state.modify(|s| s.authenticate(payload.user));
        Ok(user)
    }

    pub async fn register(&self, form: &RegisterForm) -> ClientResult<User> {
        let request = form.to_request()?;
        let payload = self.api.register(&request).await?;
        log::info!("session: registered {}", payload.user.email);
        let user = payload.user.clone();
        self.state.modify(|s| s.authenticate(payload.user));
        Ok(user)
    }

    /// 只清除本地状态；后续导航由路由服务监听凭据信号完成
    pub fn logout(&self) {
        log::info!("session: signed out");
        self.drop_credential();
    }

    /// 重新读取当前用户；失败则降级为未认证
    pub async fn refresh_user(&self) {
        match self.api.profile().await {
            Ok(user) => self.state.modify(|s| s.user = Some(user)),
            Err(e) => {
                log::error!("session: failed to refresh user: {e}");
                self.drop_credential();
            }
        }
    }

    fn drop_credential(&self) {
        self.api.logout();
        self.state.modify(SessionState::expire);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::route::{AppRoute, guard};
    use crate::web::{MemoryCredentials, MockTransport};
    use dispatchboard_shared::protocol::HttpMethod;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::rc::Rc;

    const BASE: &str = "http://api.test/api";

    struct Harness {
        transport: Rc<MockTransport>,
        credentials: MemoryCredentials,
        state: Rc<RefCell<SessionState>>,
        store: SessionStore<MockTransport, MemoryCredentials, Rc<RefCell<SessionState>>>,
    }

    /// 与应用中的接线方式一致：401 回调让会话失效
    fn harness(credentials: MemoryCredentials) -> Harness {
        let transport = Rc::new(MockTransport::new());
        let state = Rc::new(RefCell::new(SessionState::default()));
        let on_expired = Rc::clone(&state);
        let api = ApiClient::new(BASE, Rc::clone(&transport), credentials.clone(), move || {
            on_expired.borrow_mut().expire()
        });
        Harness {
            transport,
            credentials,
            state: Rc::clone(&state),
            store: SessionStore::new(api, state),
        }
    }

    fn user_json() -> Value {
        json!({
            "id": "u1",
            "email": "admin@example.com",
            "role": "admin",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        })
    }

    fn login_form() -> LoginForm {
        LoginForm {
            email: "admin@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn login_then_protected_navigation_passes_the_guard() {
        let h = harness(MemoryCredentials::default());
        h.transport.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/auth/login"),
            200,
            json!({ "success": true, "data": { "token": "tok-1", "user": user_json() } }),
        );
        assert_eq!(guard(AppRoute::Agents, h.state.borrow().has_credential), Some(AppRoute::Login));

        h.store.login(&login_form()).await.unwrap();

        assert_eq!(h.credentials.get().as_deref(), Some("tok-1"));
        let state = h.state.borrow();
        assert!(state.is_authenticated());
        assert_eq!(guard(AppRoute::Agents, state.has_credential), None);
        assert_eq!(guard(AppRoute::Login, state.has_credential), Some(AppRoute::Dashboard));
    }

    #[tokio::test]
    async fn failed_login_stays_unauthenticated() {
        let h = harness(MemoryCredentials::default());
        h.transport.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/auth/login"),
            401,
            json!({ "success": false, "message": "Invalid credentials" }),
        );

        let err = h.store.login(&login_form()).await.unwrap_err();

        assert_eq!(err.message(), "Invalid credentials");
        assert!(!h.state.borrow().is_authenticated());
        assert_eq!(h.credentials.get(), None);
    }

    #[tokio::test]
    async fn register_requires_matching_confirmation() {
        let h = harness(MemoryCredentials::default());
        let form = RegisterForm {
            email: "admin@example.com".to_string(),
            password: "one".to_string(),
            confirm_password: "two".to_string(),
        };

        let err = h.store.register(&form).await.unwrap_err();

        assert_eq!(err.message(), "Passwords do not match");
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn init_without_credential_skips_verification() {
        let h = harness(MemoryCredentials::default());

        h.store.init().await;

        assert_eq!(h.state.borrow().status, SessionStatus::Unauthenticated);
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn init_restores_a_valid_credential() {
        let h = harness(MemoryCredentials::with_token("tok"));
        h.transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/auth/verify"),
            200,
            json!({ "success": true, "data": { "valid": true, "user": user_json() } }),
        );

        h.store.init().await;

        let state = h.state.borrow();
        assert!(state.is_authenticated());
        assert_eq!(state.user.as_ref().map(|u| u.email.as_str()), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn init_clears_a_rejected_credential() {
        let h = harness(MemoryCredentials::with_token("expired"));
        h.transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/auth/verify"),
            401,
            json!({ "success": false, "message": "Token expired" }),
        );

        h.store.init().await;

        assert_eq!(h.credentials.get(), None);
        let state = h.state.borrow();
        assert_eq!(state.status, SessionStatus::Unauthenticated);
        assert_eq!(guard(AppRoute::Dashboard, state.has_credential), Some(AppRoute::Login));
    }

    #[tokio::test]
    async fn unauthorized_elsewhere_expires_the_session() {
        let h = harness(MemoryCredentials::default());
        h.transport.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/auth/login"),
            200,
            json!({ "success": true, "data": { "token": "tok-1", "user": user_json() } }),
        );
        h.transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/auth/profile"),
            401,
            json!({ "success": false, "message": "Token expired" }),
        );
        h.store.login(&login_form()).await.unwrap();

        h.store.refresh_user().await;

        assert_eq!(h.credentials.get(), None);
        let state = h.state.borrow();
        assert!(!state.is_authenticated());
        assert_eq!(guard(AppRoute::Upload, state.has_credential), Some(AppRoute::Login));
    }

    #[tokio::test]
    async fn logout_clears_locally() {
        let h = harness(MemoryCredentials::with_token("tok"));
        h.state.borrow_mut().has_credential = true;

        h.store.logout();

        assert_eq!(h.credentials.get(), None);
        assert!(!h.state.borrow().has_credential);
        assert_eq!(h.transport.request_count(), 0);
    }
}
