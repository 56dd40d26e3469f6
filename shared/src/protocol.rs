use crate::{
    Agent, AgentQuery, CreateAgentRequest, Distribution, DistributionQuery, LoginRequest,
    Pagination, RegisterRequest, UpdateAgentRequest, User,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Paths are relative to the API base URL (which already ends in `/api`).
pub trait ApiRequest {
    /// The payload found in the envelope's `data` field.
    type Response: DeserializeOwned;
    /// The JSON body type. Use `()` for body-less requests.
    type Body: Serialize;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// The URL path, ids already substituted.
    fn path(&self) -> String;

    /// Query string pairs.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// The JSON body, if any.
    fn body(&self) -> Option<&Self::Body> {
        None
    }
}

// =========================================================
// Envelope
// =========================================================

/// The uniform `{success, message, data, errors}` wrapper every endpoint responds with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

// =========================================================
// Response Payloads
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyPayload {
    pub valid: bool,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPayload {
    pub agent: Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentsPage {
    pub agents: Vec<Agent>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAgents {
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionPayload {
    pub distribution: Distribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionsPage {
    pub distributions: Vec<Distribution>,
    pub pagination: Pagination,
}

/// One page of a resource list, independent of the resource-specific wrapper key.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl From<AgentsPage> for Page<Agent> {
    fn from(page: AgentsPage) -> Self {
        Self {
            items: page.agents,
            pagination: Some(page.pagination),
        }
    }
}

impl From<DistributionsPage> for Page<Distribution> {
    fn from(page: DistributionsPage) -> Self {
        Self {
            items: page.distributions,
            pagination: Some(page.pagination),
        }
    }
}

// =========================================================
// Auth Endpoints
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = AuthPayload;
    type Body = Self;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/login".to_string()
    }

    fn body(&self) -> Option<&Self::Body> {
        Some(self)
    }
}

impl ApiRequest for RegisterRequest {
    type Response = AuthPayload;
    type Body = Self;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/register".to_string()
    }

    fn body(&self) -> Option<&Self::Body> {
        Some(self)
    }
}

/// Fetch the current user's profile
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileRequest;

impl ApiRequest for ProfileRequest {
    type Response = UserPayload;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/auth/profile".to_string()
    }
}

/// Check that the stored token is still valid
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyRequest;

impl ApiRequest for VerifyRequest {
    type Response = VerifyPayload;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/auth/verify".to_string()
    }
}

// =========================================================
// Agent Endpoints
// =========================================================

impl ApiRequest for CreateAgentRequest {
    type Response = AgentPayload;
    type Body = Self;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/agents".to_string()
    }

    fn body(&self) -> Option<&Self::Body> {
        Some(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListAgentsRequest(pub AgentQuery);

impl ApiRequest for ListAgentsRequest {
    type Response = AgentsPage;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/agents".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.0.to_pairs()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveAgentsRequest;

impl ApiRequest for ActiveAgentsRequest {
    type Response = ActiveAgents;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/agents/active".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct GetAgentRequest {
    pub id: String,
}

impl ApiRequest for GetAgentRequest {
    type Response = AgentPayload;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/agents/{}", self.id)
    }
}

/// Partial update; the id travels in the path, the changes in the body.
#[derive(Debug, Clone)]
pub struct UpdateAgentCmd {
    pub id: String,
    pub changes: UpdateAgentRequest,
}

impl ApiRequest for UpdateAgentCmd {
    type Response = AgentPayload;
    type Body = UpdateAgentRequest;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/agents/{}", self.id)
    }

    fn body(&self) -> Option<&Self::Body> {
        Some(&self.changes)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteAgentRequest {
    pub id: String,
}

impl ApiRequest for DeleteAgentRequest {
    type Response = ();
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/agents/{}", self.id)
    }
}

// =========================================================
// Upload & Distribution Endpoints
// =========================================================

/// Multipart endpoint; not an `ApiRequest` because its body is a file, not JSON.
pub const UPLOAD_DISTRIBUTE_PATH: &str = "/uploads/distribute";
pub const UPLOAD_FIELD_NAME: &str = "file";

#[derive(Debug, Clone, Default)]
pub struct ListDistributionsRequest(pub DistributionQuery);

impl ApiRequest for ListDistributionsRequest {
    type Response = DistributionsPage;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/uploads/distributions".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.0.to_pairs()
    }
}

#[derive(Debug, Clone)]
pub struct GetDistributionRequest {
    pub id: String,
}

impl ApiRequest for GetDistributionRequest {
    type Response = DistributionPayload;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/uploads/distributions/{}", self.id)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteDistributionRequest {
    pub id: String,
}

impl ApiRequest for DeleteDistributionRequest {
    type Response = ();
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/uploads/distributions/{}", self.id)
    }
}
