//! 对话框 / 表单状态机
//!
//! 每个对话框只处于 `Idle`、`Editing`、`Submitting`、`Error` 之一，
//! 状态只随显式事件迁移；不合法的事件保持原状态不变。

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormPhase {
    /// 对话框关闭
    #[default]
    Idle,
    /// 打开，等待用户输入
    Editing,
    /// 请求进行中
    Submitting,
    /// 打开，并显示最近一次失败的原因
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Open,
    Submit,
    Succeeded,
    Failed(String),
    Cancel,
}

impl FormPhase {
    pub fn next(self, event: FormEvent) -> Self {
        use FormEvent as E;
        use FormPhase as P;

        match (self, event) {
            (P::Idle, E::Open) => P::Editing,
            (P::Editing | P::Error(_), E::Submit) => P::Submitting,
            // 本地校验失败也走这里，此时还没有进入 Submitting
            (P::Editing | P::Error(_) | P::Submitting, E::Failed(msg)) => P::Error(msg),
            (P::Submitting, E::Succeeded) => P::Idle,
            (P::Editing | P::Error(_), E::Cancel) => P::Idle,
            (phase, _) => phase,
        }
    }

    pub fn apply(&mut self, event: FormEvent) {
        *self = std::mem::take(self).next(event);
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, FormPhase::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, FormPhase::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FormPhase::Error(msg) => Some(msg),
            _ => None,
        }
    }
}
