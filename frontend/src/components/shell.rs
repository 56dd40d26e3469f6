//! 仪表盘外壳：侧边栏导航 + 当前用户 + 登出

use crate::components::icons::*;
use crate::context::use_app;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;

const NAV_ITEMS: [(AppRoute, &str); 4] = [
    (AppRoute::Dashboard, "Dashboard"),
    (AppRoute::Agents, "Agents"),
    (AppRoute::Upload, "Upload & Distribute"),
    (AppRoute::Distributions, "Distributions"),
];

fn nav_icon(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Agents => view! { <Users attr:class="h-5 w-5" /> }.into_any(),
        AppRoute::Upload => view! { <Upload attr:class="h-5 w-5" /> }.into_any(),
        AppRoute::Distributions => view! { <FileText attr:class="h-5 w-5" /> }.into_any(),
        _ => view! { <LayoutDashboard attr:class="h-5 w-5" /> }.into_any(),
    }
}

#[component]
pub fn Shell(children: Children) -> impl IntoView {
    let ctx = use_app();
    let router = use_router();

    // 凭据校验通过前用户信息可能为空，挂载时补取一次
    Effect::new(move |_| {
        let needs_user = ctx.session.with_untracked(|s| s.has_credential && s.user.is_none() && !s.is_loading());
        if needs_user {
            let store = ctx.session_store();
            spawn_local(async move {
                store.refresh_user().await;
            });
        }
    });

    let email = move || ctx.session.with(|s| s.user.as_ref().map(|u| u.email.clone()).unwrap_or_default());
    let role = move || ctx.session.with(|s| s.user.as_ref().map(|u| u.role.as_str()).unwrap_or_default());
    let on_logout = move |_: leptos::ev::MouseEvent| ctx.session_store().logout();

    view! {
        <div class="drawer lg:drawer-open">
            <input id="shell-drawer" type="checkbox" class="drawer-toggle" />
            <div class="drawer-content bg-base-200 min-h-screen">
                <div class="navbar bg-base-100 lg:hidden shadow">
                    <label for="shell-drawer" class="btn btn-ghost btn-square">
                        <LayoutDashboard attr:class="h-5 w-5" />
                    </label>
                    <span class="font-bold">"Agent System"</span>
                </div>
                <main class="p-4 md:p-8 max-w-7xl mx-auto">{children()}</main>
            </div>
            <div class="drawer-side z-40">
                <label for="shell-drawer" class="drawer-overlay"></label>
                <aside class="bg-base-100 w-64 min-h-full flex flex-col">
                    <div class="flex items-center gap-2 p-4 border-b border-base-300">
                        <ShieldCheck attr:class="h-7 w-7 text-primary" />
                        <span class="text-lg font-bold">"Agent System"</span>
                    </div>
                    <ul class="menu p-4 gap-1 flex-1">
                        {NAV_ITEMS
                            .into_iter()
                            .map(|(route, label)| {
                                let class = Signal::derive(move || {
                                    let active = router.current_route().get() == route;
                                    Some(if active { "flex items-center gap-3 menu-active" } else { "flex items-center gap-3" }.to_string())
                                });
                                view! {
                                    <li>
                                        <Link to=route class=class>
                                            {nav_icon(route)}
                                            {label}
                                        </Link>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                    <div class="p-4 border-t border-base-300">
                        <p class="text-sm font-medium truncate">{email}</p>
                        <p class="text-xs opacity-60 capitalize">{role}</p>
                        <button class="btn btn-ghost btn-sm w-full justify-start gap-2 mt-2" on:click=on_logout>
                            <LogOut attr:class="h-4 w-4" /> "Sign Out"
                        </button>
                    </div>
                </aside>
            </div>
        </div>
    }
}
