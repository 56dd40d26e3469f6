//! 路由服务模块 - 核心引擎
//!
//! 封装 web_sys 的 History API，所有对 window.history 的操作都集中在此。
//! 导航流程："请求 -> 守卫 -> 写入 History -> 更新信号"。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, guard};

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 写入 History：`push` 为 false 时替换当前条目（用于重定向）
fn write_history(path: &str, push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = if push {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    };
    if result.is_err() {
        log::warn!("[Router] failed to write history for {path}");
    }
}

/// 路由器服务
///
/// 通过注入的凭据信号做守卫，不直接依赖会话模块。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    has_credential: Signal<bool>,
}

impl RouterService {
    fn new(has_credential: Signal<bool>) -> Self {
        // 首次加载同样经过守卫
        let requested = AppRoute::from_path(&current_path());
        let initial = match guard(requested, has_credential.get_untracked()) {
            Some(redirect) => {
                log::info!("[Router] {requested} is not reachable, redirecting to {redirect}");
                write_history(redirect.to_path(), false);
                redirect
            }
            None => requested,
        };
        let (current_route, set_route) = signal(initial);

        Self {
            current_route,
            set_route,
            has_credential,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    pub fn go(&self, target: AppRoute) {
        self.resolve(target, true);
    }

    /// 守卫 + 加载。被拒绝的目标不会留在历史记录里
    fn resolve(&self, target: AppRoute, push: bool) {
        let destination = match guard(target, self.has_credential.get_untracked()) {
            Some(redirect) => {
                log::info!("[Router] access to {target} denied, redirecting to {redirect}");
                redirect
            }
            None => target,
        };
        write_history(destination.to_path(), push);
        self.set_route.set(destination);
    }

    /// 浏览器后退/前进
    fn init_popstate_listener(&self) {
        let service = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            service.resolve(target, false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 监听器与页面同生命周期
        closure.forget();
    }

    /// 凭据出现或消失时重新校验当前路由
    fn setup_auth_redirect(&self) {
        let service = *self;
        Effect::new(move |_| {
            let has_credential = service.has_credential.get();
            let route = service.current_route.get_untracked();
            if let Some(redirect) = guard(route, has_credential) {
                log::info!(
                    "[Router] credential {} on {route}, redirecting to {redirect}",
                    if has_credential { "acquired" } else { "lost" }
                );
                write_history(redirect.to_path(), true);
                service.set_route.set(redirect);
            }
        });
    }
}

fn provide_router(has_credential: Signal<bool>) -> RouterService {
    let router = RouterService::new(has_credential);
    router.init_popstate_listener();
    router.setup_auth_redirect();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
///
/// 只会在 `Router` 子树中调用；缺失时退回一个只读当前地址的服务。
pub fn use_router() -> RouterService {
    use_context::<RouterService>().unwrap_or_else(|| {
        log::error!("[Router] RouterService missing from context");
        RouterService::new(Signal::stored(false))
    })
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件，提供路由上下文
#[component]
pub fn Router(
    /// 是否持有凭据
    has_credential: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(has_credential);
    children()
}

/// 路由出口：根据当前路由渲染对应视图
#[component]
pub fn RouterOutlet(matcher: fn(AppRoute) -> AnyView) -> impl IntoView {
    let router = use_router();
    move || matcher(router.current_route().get())
}

/// 站内链接，拦截点击改走路由服务
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional, into)] class: MaybeProp<String>,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.go(to);
    };

    view! {
        <a href=to.to_path() class=move || class.get().unwrap_or_default() on:click=on_click>
            {children()}
        </a>
    }
}
