//! 上传控制器
//!
//! 一次性的状态容器：提交一个文件，保存后端返回的分发摘要。

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::state::StateCell;
use crate::web::{CredentialStore, HttpTransport, UploadFile};
use dispatchboard_shared::UploadResult;
use dispatchboard_shared::validation::{FileMeta, validate_upload};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadState {
    pub busy: bool,
    pub error: Option<String>,
    pub result: Option<UploadResult>,
    /// 可接收分发的代理数，未加载时为 None
    pub active_agents: Option<u64>,
}

impl UploadState {
    pub fn can_upload(&self) -> bool {
        !self.busy && self.active_agents.is_some_and(|n| n > 0)
    }
}

pub struct UploadController<T, C, S> {
    api: ApiClient<T, C>,
    state: S,
}

impl<T, C, S> UploadController<T, C, S>
where
    T: HttpTransport,
    C: CredentialStore + Clone,
    S: StateCell<UploadState>,
{
    pub fn new(api: ApiClient<T, C>, state: S) -> Self {
        Self { api, state }
    }

    /// 选择文件时立即校验，不合格的文件留下错误提示
    pub fn select(&self, file: &FileMeta) -> bool {
        match validate_upload(file) {
            Ok(()) => {
                self.state.modify(|s| s.error = None);
                true
            }
            Err(rejection) => {
                log::info!("rejected file {}: {rejection}", file.name);
                self.state.modify(|s| s.error = Some(rejection.to_string()));
                false
            }
        }
    }

    pub async fn upload(&self, file: UploadFile) -> ClientResult<UploadResult> {
        self.state.modify(|s| {
            s.busy = true;
            s.error = None;
            s.result = None;
        });

        let outcome = self.api.upload_and_distribute(file).await;

        match &outcome {
            Ok(result) => {
                log::info!(
                    "{}: {} valid records distributed to {} agents",
                    result.file_name,
                    result.valid_records,
                    result.distributions.len()
                );
                let result = result.clone();
                self.state.modify(|s| {
                    s.result = Some(result);
                    s.busy = false;
                });
            }
            Err(e) => {
                log::error!("upload failed: {e}");
                let message = e.message();
                self.state.modify(|s| {
                    s.error = Some(message);
                    s.busy = false;
                });
            }
        }
        outcome
    }

    /// 清除错误与结果，不影响进行中的上传
    pub fn reset(&self) {
        self.state.modify(|s| {
            s.error = None;
            s.result = None;
        });
    }

    pub async fn load_active_agents(&self) -> ClientResult<u64> {
        match self.api.active_agents().await {
            Ok(active) => {
                let count = active.count.max(active.agents.len() as u64);
                self.state.modify(|s| s.active_agents = Some(count));
                Ok(count)
            }
            Err(e) => {
                log::error!("failed to load active agents: {e}");
                Err(e)
            }
        }
    }
}
