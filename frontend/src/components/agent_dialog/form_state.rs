//! 代理表单状态
//!
//! 将零散的 signal 整合为 `AgentFormState`，负责：
//! - 字段数据的持有与重置
//! - 对话框阶段（`FormPhase`）的事件驱动
//! - 转换为可校验的 `AgentForm`

use dispatchboard_shared::Agent;
use dispatchboard_shared::form::{FormEvent, FormPhase};
use dispatchboard_shared::validation::AgentForm;
use leptos::prelude::*;

/// 使用 `RwSignal` 因为它实现了 `Copy`，适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct AgentFormState {
    pub name: RwSignal<String>,
    pub email: RwSignal<String>,
    pub mobile: RwSignal<String>,
    pub password: RwSignal<String>,
    pub confirm_password: RwSignal<String>,
    pub is_active: RwSignal<bool>,
    pub show_password: RwSignal<bool>,

    pub phase: RwSignal<FormPhase>,
    /// 正在编辑的代理 id；新建时为 None
    pub editing: RwSignal<Option<String>>,
}

impl AgentFormState {
    pub fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            mobile: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
            confirm_password: RwSignal::new(String::new()),
            is_active: RwSignal::new(true),
            show_password: RwSignal::new(false),
            phase: RwSignal::new(FormPhase::Idle),
            editing: RwSignal::new(None),
        }
    }

    fn fill(&self, form: AgentForm) {
        self.name.set(form.name);
        self.email.set(form.email);
        self.mobile.set(form.mobile);
        self.password.set(form.password);
        self.confirm_password.set(form.confirm_password);
        self.is_active.set(form.is_active);
        self.show_password.set(false);
    }

    pub fn open_create(&self) {
        self.fill(AgentForm::blank());
        self.editing.set(None);
        self.phase.update(|p| p.apply(FormEvent::Open));
    }

    pub fn open_edit(&self, agent: &Agent) {
        self.fill(AgentForm::from_agent(agent));
        self.editing.set(Some(agent.id.clone()));
        self.phase.update(|p| p.apply(FormEvent::Open));
    }

    pub fn cancel(&self) {
        self.phase.update(|p| p.apply(FormEvent::Cancel));
    }

    pub fn is_editing(&self) -> bool {
        self.editing.with(Option::is_some)
    }

    pub fn to_form(&self) -> AgentForm {
        AgentForm {
            name: self.name.get_untracked(),
            email: self.email.get_untracked(),
            mobile: self.mobile.get_untracked(),
            password: self.password.get_untracked(),
            confirm_password: self.confirm_password.get_untracked(),
            is_active: self.is_active.get_untracked(),
        }
    }
}

impl Default for AgentFormState {
    fn default() -> Self {
        Self::new()
    }
}
