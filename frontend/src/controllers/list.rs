//! 通用资源列表控制器
//!
//! 每个操作：置忙、清除旧错误、执行一次调用、按结果更新列表、解除忙碌。
//! 失败时把可读消息写入 `error`，同时把错误返回给调用方。
//!
//! 获取操作带序号：只有最近一次发出的 fetch 的响应会被采用。

use crate::error::{ClientError, ClientResult};
use crate::state::StateCell;
use dispatchboard_shared::protocol::Page;
use dispatchboard_shared::{Identified, Pagination};
use std::future::Future;
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
    pub loading: bool,
    pub error: Option<String>,
    /// 最近一次发出的 fetch 序号
    seq: u64,
    /// 尚未完成的调用数
    pending: u32,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: None,
            loading: false,
            error: None,
            seq: 0,
            pending: 0,
        }
    }
}

impl<T> ListState<T> {
    fn begin(&mut self) {
        self.pending += 1;
        self.loading = true;
        self.error = None;
    }

    fn finish(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.loading = self.pending > 0;
    }

    fn fail(&mut self, err: &ClientError) {
        self.error = Some(err.message());
        self.finish();
    }
}

pub struct ListController<T, S> {
    state: S,
    label: &'static str,
    _item: PhantomData<T>,
}

impl<T, S: Clone> Clone for ListController<T, S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            label: self.label,
            _item: PhantomData,
        }
    }
}

impl<T: Identified, S: StateCell<ListState<T>>> ListController<T, S> {
    /// `label` 只用于日志
    pub fn new(state: S, label: &'static str) -> Self {
        Self {
            state,
            label,
            _item: PhantomData,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// 用一页结果替换列表，并记录分页信息
    pub async fn fetch_with(
        &self,
        request: impl Future<Output = ClientResult<Page<T>>>,
    ) -> ClientResult<()> {
        let mut ticket = 0;
        self.state.modify(|s| {
            s.seq += 1;
            ticket = s.seq;
            s.begin();
        });

        let outcome = request.await;

        match self.state.inspect(|s| s.seq == ticket) {
            Some(true) => {}
            Some(false) => {
                log::debug!("{}: discarding response of superseded fetch #{ticket}", self.label);
                self.state.modify(ListState::finish);
                return outcome.map(|_| ());
            }
            // 页面已卸载，没有可更新的状态
            None => {
                log::debug!("{}: discarding response of fetch #{ticket} for a closed view", self.label);
                return outcome.map(|_| ());
            }
        }

        match outcome {
            Ok(page) => {
                self.state.modify(|s| {
                    s.items = page.items;
                    s.pagination = page.pagination;
                    s.finish();
                });
                Ok(())
            }
            Err(e) => Err(self.record(e, "fetch")),
        }
    }

    /// 新建的条目放在列表头部
    pub async fn create_with(&self, request: impl Future<Output = ClientResult<T>>) -> ClientResult<T>
    where
        T: Clone,
    {
        self.state.modify(ListState::begin);
        match request.await {
            Ok(item) => {
                let created = item.clone();
                self.state.modify(|s| {
                    s.items.insert(0, item);
                    s.finish();
                });
                Ok(created)
            }
            Err(e) => Err(self.record(e, "create")),
        }
    }

    /// 只替换 id 相同的条目
    pub async fn update_with(
        &self,
        id: &str,
        request: impl Future<Output = ClientResult<T>>,
    ) -> ClientResult<T>
    where
        T: Clone,
    {
        self.state.modify(ListState::begin);
        match request.await {
            Ok(item) => {
                let updated = item.clone();
                self.state.modify(|s| {
                    if let Some(slot) = s.items.iter_mut().find(|it| it.id() == id) {
                        *slot = item;
                    }
                    s.finish();
                });
                Ok(updated)
            }
            Err(e) => Err(self.record(e, "update")),
        }
    }

    pub async fn delete_with(
        &self,
        id: &str,
        request: impl Future<Output = ClientResult<()>>,
    ) -> ClientResult<()> {
        self.state.modify(ListState::begin);
        match request.await {
            Ok(()) => {
                self.state.modify(|s| {
                    s.items.retain(|it| it.id() != id);
                    s.finish();
                });
                Ok(())
            }
            Err(e) => Err(self.record(e, "delete")),
        }
    }

    /// 不改变列表的调用（如按 id 读取详情），同样参与忙碌和错误状态
    pub async fn track<R>(&self, request: impl Future<Output = ClientResult<R>>) -> ClientResult<R> {
        self.state.modify(ListState::begin);
        match request.await {
            Ok(value) => {
                self.state.modify(ListState::finish);
                Ok(value)
            }
            Err(e) => Err(self.record(e, "load")),
        }
    }

    /// 清除错误提示
    pub fn dismiss_error(&self) {
        self.state.modify(|s| s.error = None);
    }

    fn record(&self, err: ClientError, action: &str) -> ClientError {
        // 401 已由 API 客户端记录并触发跳转
        if !err.is_unauthorized() {
            log::error!("{}: {action} failed: {err}", self.label);
        }
        self.state.modify(|s| s.fail(&err));
        err
    }
}
