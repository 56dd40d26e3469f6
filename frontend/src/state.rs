//! 控制器的状态容器抽象
//!
//! 控制器只通过 `StateCell` 读写状态：界面中是 `RwSignal`，
//! 测试中是 `Rc<RefCell<_>>`，控制器代码不关心是哪一种。
//!
//! 页面卸载后它的 signal 随之销毁，而异步请求可能仍在途中：
//! 此时写入被忽略，读取返回 None。

use leptos::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub trait StateCell<T>: Clone {
    fn modify(&self, f: impl FnOnce(&mut T));
    /// 状态已被销毁时返回 None
    fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R>;
}

impl<T: Send + Sync + 'static> StateCell<T> for RwSignal<T> {
    fn modify(&self, f: impl FnOnce(&mut T)) {
        let _ = self.try_update(f);
    }

    fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.try_with_untracked(f)
    }
}

impl<T> StateCell<T> for Rc<RefCell<T>> {
    fn modify(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.borrow_mut());
    }

    fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        Some(f(&self.borrow()))
    }
}
