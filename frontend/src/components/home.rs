use crate::context::use_app;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;

/// 入口页：等会话检查结束后转发到仪表盘或登录页
#[component]
pub fn HomePage() -> impl IntoView {
    let ctx = use_app();
    let router = use_router();

    Effect::new(move |_| {
        let session = ctx.session.get();
        if session.is_loading() {
            return;
        }
        if session.is_authenticated() {
            router.go(AppRoute::auth_success_redirect());
        } else {
            router.go(AppRoute::auth_failure_redirect());
        }
    });

    view! {
        <div class="flex flex-col items-center justify-center min-h-screen gap-4">
            <span class="loading loading-spinner loading-lg text-primary"></span>
            <p class="text-base-content/70">"Loading..."</p>
        </div>
    }
}
