//! 分发记录控制器：列表、详情、删除、CSV 导出

use super::list::{ListController, ListState};
use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::state::StateCell;
use crate::web::{CredentialStore, HttpTransport};
use dispatchboard_shared::export::{export_file_name, items_to_csv};
use dispatchboard_shared::{Distribution, DistributionQuery};

/// 一份待下载的 CSV
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

/// 把已加载的条目转成 CSV；没有条目时拒绝导出
pub fn prepare_export(distribution: &Distribution) -> ClientResult<CsvExport> {
    let content = items_to_csv(&distribution.items)?;
    Ok(CsvExport {
        file_name: export_file_name(distribution),
        content,
    })
}

pub struct DistributionsController<T, C, S> {
    api: ApiClient<T, C>,
    list: ListController<Distribution, S>,
}

impl<T, C, S> DistributionsController<T, C, S>
where
    T: HttpTransport,
    C: CredentialStore + Clone,
    S: StateCell<ListState<Distribution>>,
{
    pub fn new(api: ApiClient<T, C>, state: S) -> Self {
        Self {
            api,
            list: ListController::new(state, "distributions"),
        }
    }

    pub async fn fetch(&self, query: DistributionQuery) -> ClientResult<()> {
        self.list.fetch_with(self.api.list_distributions(query)).await
    }

    /// 按 id 读取完整记录（含条目），不修改列表
    pub async fn details(&self, id: &str) -> ClientResult<Distribution> {
        self.list.track(self.api.get_distribution(id)).await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.list
            .delete_with(id, self.api.delete_distribution(id))
            .await
    }

    pub fn dismiss_error(&self) {
        self.list.dismiss_error();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::{MemoryCredentials, MockTransport};
    use dispatchboard_shared::DEFAULT_PAGE_SIZE;
    use dispatchboard_shared::protocol::HttpMethod;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::rc::Rc;

    const BASE: &str = "http://api.test/api";

    type Controller =
        DistributionsController<MockTransport, MemoryCredentials, Rc<RefCell<ListState<Distribution>>>>;

    fn setup() -> (Rc<MockTransport>, Controller) {
        let transport = Rc::new(MockTransport::new());
        let api = ApiClient::new(
            BASE,
            Rc::clone(&transport),
            MemoryCredentials::with_token("tok"),
            || {},
        );
        let controller =
            DistributionsController::new(api, Rc::new(RefCell::new(ListState::default())));
        (transport, controller)
    }

    fn distribution_json(id: &str, items: Value) -> Value {
        json!({
            "id": id,
            "agentId": "a1",
            "agentName": "Jo",
            "agentEmail": "jo@example.com",
            "items": items,
            "uploadDate": "2024-03-02T09:00:00Z",
            "fileName": "leads.csv",
            "totalItems": 2,
            "createdAt": "2024-03-02T09:00:00Z",
            "updatedAt": "2024-03-02T09:00:00Z"
        })
    }

    fn list_body(ids: &[&str]) -> Value {
        let distributions: Vec<Value> = ids.iter().map(|id| distribution_json(id, json!([]))).collect();
        json!({ "success": true, "data": {
            "distributions": distributions,
            "pagination": { "currentPage": 1, "totalPages": 1, "totalDistributions": ids.len(), "hasNextPage": false, "hasPrevPage": false }
        }})
    }

    fn held_ids(controller: &Controller) -> Vec<String> {
        controller
            .list
            .state()
            .borrow()
            .items
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }

    #[tokio::test]
    async fn fetch_holds_exactly_the_server_list() {
        let (transport, controller) = setup();
        transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/uploads/distributions"),
            200,
            list_body(&["d1", "d2", "d3"]),
        );

        controller.fetch(DistributionQuery::default()).await.unwrap();

        assert_eq!(held_ids(&controller), vec!["d1", "d2", "d3"]);
    }

    #[tokio::test]
    async fn only_the_latest_fetch_is_kept() {
        let (transport, controller) = setup();
        let url = format!("{BASE}/uploads/distributions");
        transport.mock_response(HttpMethod::Get, &url, 200, list_body(&["old"]));
        transport.mock_response(HttpMethod::Get, &url, 200, list_body(&["new"]));
        let release = transport.gate(HttpMethod::Get, &url);

        let first = controller.fetch(DistributionQuery::default());
        let second = async {
            let result = controller
                .fetch(DistributionQuery {
                    page: Some(2),
                    ..Default::default()
                })
                .await;
            let _ = release.send(());
            result
        };
        let (a, b) = futures::join!(first, second);
        a.unwrap();
        b.unwrap();

        assert_eq!(held_ids(&controller), vec!["new"]);
        assert!(!controller.list.state().borrow().loading);
    }

    #[tokio::test]
    async fn fetch_requests_the_selected_page_and_keeps_pagination() {
        let (transport, controller) = setup();
        let distributions: Vec<Value> = (11..=20)
            .map(|n| distribution_json(&format!("d{n}"), json!([])))
            .collect();
        transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/uploads/distributions"),
            200,
            json!({ "success": true, "data": {
                "distributions": distributions,
                "pagination": { "currentPage": 2, "totalPages": 3, "totalDistributions": 25, "hasNextPage": true, "hasPrevPage": true }
            }}),
        );

        controller
            .fetch(DistributionQuery {
                page: Some(2),
                limit: Some(DEFAULT_PAGE_SIZE),
                ..Default::default()
            })
            .await
            .unwrap();

        let query = transport.last_request().unwrap().query;
        assert!(query.contains(&("page".to_string(), "2".to_string())));
        assert!(query.contains(&("limit".to_string(), "10".to_string())));

        let pagination = controller.list.state().borrow().pagination.clone().unwrap();
        assert!(pagination.has_prev_page && pagination.has_next_page);
        assert_eq!(
            pagination.showing_label(DEFAULT_PAGE_SIZE, "distributions"),
            "Showing 11 to 20 of 25 distributions"
        );
        assert_eq!(held_ids(&controller).len(), 10);
    }

    #[tokio::test]
    async fn details_do_not_replace_the_list() {
        let (transport, controller) = setup();
        transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/uploads/distributions"),
            200,
            list_body(&["d1", "d2"]),
        );
        transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/uploads/distributions/d2"),
            200,
            json!({ "success": true, "data": { "distribution": distribution_json("d2", json!([
                { "firstName": "Jo", "phone": "123", "notes": "" },
                { "firstName": "Amy", "phone": "456", "notes": "vip" }
            ])) }}),
        );
        controller.fetch(DistributionQuery::default()).await.unwrap();

        let detail = controller.details("d2").await.unwrap();

        assert_eq!(detail.items.len(), 2);
        assert_eq!(held_ids(&controller), vec!["d1", "d2"]);

        let export = prepare_export(&detail).unwrap();
        assert_eq!(export.file_name, "Jo_leads.csv_distribution.csv");
        assert_eq!(
            export.content,
            "FirstName,Phone,Notes\n\"Jo\",\"123\",\"\"\n\"Amy\",\"456\",\"vip\""
        );
    }

    #[tokio::test]
    async fn delete_removes_and_failure_keeps() {
        let (transport, controller) = setup();
        transport.mock_response(
            HttpMethod::Get,
            &format!("{BASE}/uploads/distributions"),
            200,
            list_body(&["d1", "d2"]),
        );
        transport.mock_response(
            HttpMethod::Delete,
            &format!("{BASE}/uploads/distributions/d1"),
            200,
            json!({ "success": true, "message": "Distribution deleted" }),
        );
        transport.mock_response(
            HttpMethod::Delete,
            &format!("{BASE}/uploads/distributions/d2"),
            404,
            json!({ "success": false, "message": "Distribution not found" }),
        );
        controller.fetch(DistributionQuery::default()).await.unwrap();

        controller.delete("d1").await.unwrap();
        assert_eq!(held_ids(&controller), vec!["d2"]);

        let err = controller.delete("d2").await.unwrap_err();
        assert_eq!(err.message(), "Distribution not found");
        assert_eq!(held_ids(&controller), vec!["d2"]);
        assert_eq!(
            controller.list.state().borrow().error.as_deref(),
            Some("Distribution not found")
        );
    }

    #[test]
    fn empty_distribution_cannot_be_exported() {
        let distribution: Distribution =
            serde_json::from_value(distribution_json("d9", json!([]))).unwrap();
        let err = prepare_export(&distribution).unwrap_err();
        assert_eq!(err.message(), "No data to export");
    }
}
