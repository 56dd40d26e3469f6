//! REST API 网关客户端
//!
//! 所有业务请求都经过 `ApiClient::send`：拼接 URL、附加 Bearer 凭据、
//! 解析 `{success, message, data}` 信封。任何接口返回 401 都会清空凭据
//! 并调用构造时注入的 `on_unauthorized` 回调。

use crate::error::{ClientError, ClientResult, TransportError};
use crate::web::{
    BrowserCredentials, BrowserTransport, CredentialStore, HttpRequest, HttpResponse,
    HttpTransport, UploadFile,
};
use dispatchboard_shared::protocol::{
    ActiveAgents, ActiveAgentsRequest, ApiRequest, AuthPayload, DeleteAgentRequest,
    DeleteDistributionRequest, Envelope, GetAgentRequest, GetDistributionRequest, HttpMethod,
    ListAgentsRequest, ListDistributionsRequest, Page, ProfileRequest, UPLOAD_DISTRIBUTE_PATH,
    UPLOAD_FIELD_NAME, UpdateAgentCmd, VerifyPayload, VerifyRequest,
};
use dispatchboard_shared::validation::validate_upload;
use dispatchboard_shared::{
    Agent, AgentQuery, CreateAgentRequest, Distribution, DistributionQuery, HEADER_AUTHORIZATION,
    LoginRequest, RegisterRequest, UpdateAgentRequest, UploadResult, User,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::rc::Rc;

#[cfg(test)]
pub(crate) mod tests;

const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
const REQUEST_FAILED: &str = "API request failed";

/// 浏览器中实际使用的客户端
pub type BrowserApi = ApiClient<BrowserTransport, BrowserCredentials>;

pub struct ApiClient<T, C> {
    base_url: String,
    transport: Rc<T>,
    credentials: C,
    on_unauthorized: Rc<dyn Fn()>,
}

impl<T, C: Clone> Clone for ApiClient<T, C> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Rc::clone(&self.transport),
            credentials: self.credentials.clone(),
            on_unauthorized: Rc::clone(&self.on_unauthorized),
        }
    }
}

impl<T: HttpTransport, C: CredentialStore> ApiClient<T, C> {
    pub fn new(
        base_url: &str,
        transport: Rc<T>,
        credentials: C,
        on_unauthorized: impl Fn() + 'static,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            credentials,
            on_unauthorized: Rc::new(on_unauthorized),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credentials.is_present()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match self.credentials.get().filter(|token| !token.is_empty()) {
            Some(token) => request.with_header(HEADER_AUTHORIZATION, &format!("Bearer {token}")),
            None => request,
        }
    }

    /// 发送一个类型化请求并返回信封中的 `data`
    pub async fn send<R: ApiRequest>(&self, request: &R) -> ClientResult<R::Response> {
        let mut http = HttpRequest::new(&self.url(&request.path()), R::METHOD)
            .with_query(request.query());
        if let Some(body) = request.body() {
            let json = serde_json::to_string(body)
                .map_err(|e| TransportError::Build(e.to_string()))?;
            http = http.with_json(json);
        }
        self.exchange(http).await
    }

    async fn exchange<D: DeserializeOwned>(&self, request: HttpRequest) -> ClientResult<D> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.transport.send(self.authorize(request)).await;
        let response = response.inspect_err(|e| {
            log::error!("{} {url} failed: {e}", method.as_str());
        })?;
        self.interpret(response)
    }

    /// 信封解析顺序：401 → 非信封响应 → `success=false` → `data`
    fn interpret<D: DeserializeOwned>(&self, response: HttpResponse) -> ClientResult<D> {
        let HttpResponse { status, body } = response;
        let envelope = serde_json::from_str::<Envelope<Value>>(&body);

        if status == 401 {
            let message = envelope
                .ok()
                .map(|env| env.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| SESSION_EXPIRED.to_string());
            self.invalidate_session();
            return Err(ClientError::Unauthorized(message));
        }

        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(e) if (200..300).contains(&status) => return Err(ClientError::Decode(e.to_string())),
            Err(_) => return Err(ClientError::Status(status)),
        };

        if !envelope.success {
            let message = if envelope.message.is_empty() {
                REQUEST_FAILED.to_string()
            } else {
                envelope.message
            };
            return Err(ClientError::Rejected {
                status,
                message,
                errors: envelope.errors,
            });
        }

        serde_json::from_value(envelope.data.unwrap_or(Value::Null))
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn invalidate_session(&self) {
        log::warn!("received 401, clearing stored credential");
        self.credentials.clear();
        (self.on_unauthorized)();
    }

    // =========================================================
    // 认证
    // =========================================================

    /// 成功后保存返回的令牌
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<AuthPayload> {
        let payload = self.send(request).await?;
        self.credentials.set(&payload.token);
        Ok(payload)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthPayload> {
        let payload = self.send(request).await?;
        self.credentials.set(&payload.token);
        Ok(payload)
    }

    /// 只在本地清除凭据，不访问后端
    pub fn logout(&self) {
        self.credentials.clear();
    }

    pub async fn profile(&self) -> ClientResult<User> {
        Ok(self.send(&ProfileRequest).await?.user)
    }

    pub async fn verify(&self) -> ClientResult<VerifyPayload> {
        self.send(&VerifyRequest).await
    }

    // =========================================================
    // 代理
    // =========================================================

    pub async fn create_agent(&self, request: &CreateAgentRequest) -> ClientResult<Agent> {
        Ok(self.send(request).await?.agent)
    }

    pub async fn list_agents(&self, query: AgentQuery) -> ClientResult<Page<Agent>> {
        Ok(self.send(&ListAgentsRequest(query)).await?.into())
    }

    pub async fn active_agents(&self) -> ClientResult<ActiveAgents> {
        self.send(&ActiveAgentsRequest).await
    }

    pub async fn get_agent(&self, id: &str) -> ClientResult<Agent> {
        let request = GetAgentRequest { id: id.to_string() };
        Ok(self.send(&request).await?.agent)
    }

    pub async fn update_agent(&self, id: &str, changes: UpdateAgentRequest) -> ClientResult<Agent> {
        let request = UpdateAgentCmd {
            id: id.to_string(),
            changes,
        };
        Ok(self.send(&request).await?.agent)
    }

    pub async fn delete_agent(&self, id: &str) -> ClientResult<()> {
        self.send(&DeleteAgentRequest { id: id.to_string() }).await
    }

    // =========================================================
    // 上传与分发
    // =========================================================

    /// 文件在本地先做类型和大小检查，不合格的文件不会发出请求
    pub async fn upload_and_distribute(&self, file: UploadFile) -> ClientResult<UploadResult> {
        validate_upload(&file.meta())?;
        let request = HttpRequest::new(&self.url(UPLOAD_DISTRIBUTE_PATH), HttpMethod::Post)
            .with_file(UPLOAD_FIELD_NAME, file);
        self.exchange(request).await
    }

    pub async fn list_distributions(
        &self,
        query: DistributionQuery,
    ) -> ClientResult<Page<Distribution>> {
        Ok(self.send(&ListDistributionsRequest(query)).await?.into())
    }

    pub async fn get_distribution(&self, id: &str) -> ClientResult<Distribution> {
        let request = GetDistributionRequest { id: id.to_string() };
        Ok(self.send(&request).await?.distribution)
    }

    pub async fn delete_distribution(&self, id: &str) -> ClientResult<()> {
        self.send(&DeleteDistributionRequest { id: id.to_string() })
            .await
    }
}
