//! 凭据存储模块
//!
//! 令牌只有一个持久槽位。浏览器实现写入 LocalStorage，并同步一份到 cookie，
//! 供路由守卫之外的页面加载逻辑检查。

use dispatchboard_shared::CREDENTIAL_KEY;
use gloo_storage::{LocalStorage, Storage};
use wasm_bindgen::JsCast;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

/// 单槽凭据存储
pub trait CredentialStore {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);

    fn is_present(&self) -> bool {
        self.get().is_some_and(|token| !token.is_empty())
    }
}

/// LocalStorage + cookie 镜像
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserCredentials;

impl BrowserCredentials {
    fn write_cookie(value: &str) {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok());
        if let Some(document) = document {
            if document.set_cookie(value).is_err() {
                log::warn!("failed to update credential cookie");
            }
        }
    }
}

impl CredentialStore for BrowserCredentials {
    fn get(&self) -> Option<String> {
        LocalStorage::get::<String>(CREDENTIAL_KEY).ok()
    }

    fn set(&self, token: &str) {
        if let Err(e) = LocalStorage::set(CREDENTIAL_KEY, token) {
            log::warn!("failed to persist credential: {e}");
        }
        Self::write_cookie(&format!("{CREDENTIAL_KEY}={token}; path=/"));
    }

    fn clear(&self) {
        LocalStorage::delete(CREDENTIAL_KEY);
        Self::write_cookie(&format!("{CREDENTIAL_KEY}=; path=/; max-age=0"));
    }
}

/// 内存中的凭据槽，克隆后共享同一份数据
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials(Rc<RefCell<Option<String>>>);

#[cfg(test)]
impl MemoryCredentials {
    pub fn with_token(token: &str) -> Self {
        Self(Rc::new(RefCell::new(Some(token.to_string()))))
    }
}

#[cfg(test)]
impl CredentialStore for MemoryCredentials {
    fn get(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    fn set(&self, token: &str) {
        *self.0.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.0.borrow_mut() = None;
    }
}
