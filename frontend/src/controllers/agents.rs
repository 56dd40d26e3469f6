//! 代理列表控制器与代理对话框提交流程

use super::list::{ListController, ListState};
use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::state::StateCell;
use crate::web::{CredentialStore, HttpTransport};
use dispatchboard_shared::form::{FormEvent, FormPhase};
use dispatchboard_shared::validation::AgentForm;
use dispatchboard_shared::{Agent, AgentQuery};

pub struct AgentsController<T, C, S> {
    api: ApiClient<T, C>,
    list: ListController<Agent, S>,
}

impl<T, C, S> AgentsController<T, C, S>
where
    T: HttpTransport,
    C: CredentialStore + Clone,
    S: StateCell<ListState<Agent>>,
{
    pub fn new(api: ApiClient<T, C>, state: S) -> Self {
        Self {
            api,
            list: ListController::new(state, "agents"),
        }
    }

    pub async fn fetch(&self, query: AgentQuery) -> ClientResult<()> {
        self.list.fetch_with(self.api.list_agents(query)).await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.list.delete_with(id, self.api.delete_agent(id)).await
    }

    pub fn dismiss_error(&self) {
        self.list.dismiss_error();
    }

    /// 提交新建/编辑对话框
    ///
    /// `editing` 为被编辑代理的 id。本地校验失败时不发请求，
    /// 对话框进入 `Error` 阶段并显示校验消息。
    pub async fn submit(
        &self,
        form: &AgentForm,
        editing: Option<&str>,
        phase: &impl StateCell<FormPhase>,
    ) -> ClientResult<Agent> {
        let outcome = match editing {
            None => match form.to_create_request() {
                Ok(request) => {
                    phase.modify(|p| p.apply(FormEvent::Submit));
                    self.list.create_with(self.api.create_agent(&request)).await
                }
                Err(e) => Err(ClientError::from(e)),
            },
            Some(id) => match form.to_update_request() {
                Ok(changes) => {
                    phase.modify(|p| p.apply(FormEvent::Submit));
                    self.list
                        .update_with(id, self.api.update_agent(id, changes))
                        .await
                }
                Err(e) => Err(ClientError::from(e)),
            },
        };

        match &outcome {
            Ok(agent) => {
                log::info!("agent {} saved", agent.id);
                phase.modify(|p| p.apply(FormEvent::Succeeded));
            }
            Err(e) => {
                let message = e.message();
                phase.modify(|p| p.apply(FormEvent::Failed(message)));
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::agent_json;
    use crate::web::{MemoryCredentials, MockTransport};
    use dispatchboard_shared::protocol::HttpMethod;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BASE: &str = "http://api.test/api";

    type Controller = AgentsController<MockTransport, MemoryCredentials, Rc<RefCell<ListState<Agent>>>>;

    fn setup() -> (Rc<MockTransport>, Controller) {
        let transport = Rc::new(MockTransport::new());
        let api = ApiClient::new(
            BASE,
            Rc::clone(&transport),
            MemoryCredentials::with_token("tok"),
            || {},
        );
        let controller = AgentsController::new(api, Rc::new(RefCell::new(ListState::default())));
        (transport, controller)
    }

    fn editing() -> Rc<RefCell<FormPhase>> {
        Rc::new(RefCell::new(FormPhase::Idle.next(FormEvent::Open)))
    }

    fn filled_form() -> AgentForm {
        AgentForm {
            name: "Jo".to_string(),
            email: "jo@example.com".to_string(),
            mobile: "+1 555 0100".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn mismatched_confirmation_never_calls_the_api() {
        let (transport, controller) = setup();
        let phase = editing();
        let form = AgentForm {
            confirm_password: "secret2".to_string(),
            ..filled_form()
        };

        let err = controller.submit(&form, None, &phase).await.unwrap_err();

        assert_eq!(err, ClientError::Validation("Passwords do not match".to_string()));
        assert_eq!(transport.request_count(), 0);
        assert_eq!(
            *phase.borrow(),
            FormPhase::Error("Passwords do not match".to_string())
        );
    }

    #[tokio::test]
    async fn blank_required_field_is_rejected_locally() {
        let (transport, controller) = setup();
        let phase = editing();
        let form = AgentForm {
            mobile: "   ".to_string(),
            ..filled_form()
        };

        let err = controller.submit(&form, None, &phase).await.unwrap_err();

        assert_eq!(err.message(), "Please fill in all required fields");
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn created_agent_lands_at_the_head_and_closes_dialog() {
        let (transport, controller) = setup();
        transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/agents"),
            200,
            json!({ "success": true, "data": {
                "agents": [agent_json("a1", "Amy", true)],
                "pagination": { "currentPage": 1, "totalPages": 1, "totalAgents": 1, "hasNextPage": false, "hasPrevPage": false }
            }}),
        );
        transport.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/agents"),
            201,
            json!({ "success": true, "message": "Agent created", "data": { "agent": agent_json("a2", "Jo", true) } }),
        );
        controller.fetch(AgentQuery::default()).await.unwrap();

        let phase = editing();
        let agent = controller.submit(&filled_form(), None, &phase).await.unwrap();

        assert_eq!(agent.id, "a2");
        let ids: Vec<String> = controller
            .list
            .state()
            .borrow()
            .items
            .iter()
            .map(|a| a.id.clone())
            .collect();
        assert_eq!(ids, vec!["a2", "a1"]);
        assert_eq!(*phase.borrow(), FormPhase::Idle);
    }

    #[tokio::test]
    async fn edit_sends_partial_update_without_password() {
        let (transport, controller) = setup();
        transport.mock_response(
            HttpMethod::Put,
            &format!("{BASE}/agents/a1"),
            200,
            json!({ "success": true, "data": { "agent": agent_json("a1", "Jo", false) } }),
        );
        let phase = editing();
        let form = AgentForm {
            password: String::new(),
            confirm_password: String::new(),
            is_active: false,
            ..filled_form()
        };

        let agent = controller.submit(&form, Some("a1"), &phase).await.unwrap();

        assert!(!agent.is_active);
        let sent = transport.last_request().unwrap();
        match sent.body {
            Some(crate::web::RequestBody::Json(body)) => {
                let body: serde_json::Value = serde_json::from_str(&body).unwrap();
                assert_eq!(body["isActive"], false);
                assert!(body.get("password").is_none());
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_rejection_keeps_dialog_open_with_message() {
        let (transport, controller) = setup();
        transport.mock_response(
            HttpMethod::Post,
            &format!("{BASE}/agents"),
            400,
            json!({ "success": false, "message": "Agent with this email already exists" }),
        );
        let phase = editing();

        let result = controller.submit(&filled_form(), None, &phase).await;

        assert!(result.is_err());
        assert_eq!(
            phase.borrow().error(),
            Some("Agent with this email already exists")
        );
        assert!(controller.list.state().borrow().items.is_empty());
    }
}
