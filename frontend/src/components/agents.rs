use crate::components::agent_dialog::{AgentDialog, AgentFormState};
use crate::components::icons::*;
use crate::context::use_app;
use crate::controllers::ListState;
use crate::web::download::confirm;
use dispatchboard_shared::display::format_date;
use dispatchboard_shared::summary::AgentStats;
use dispatchboard_shared::{Agent, AgentQuery, AgentStatusFilter, DEFAULT_PAGE_SIZE};
use leptos::prelude::*;
use leptos::task::spawn_local;

const STATUS_FILTERS: [(AgentStatusFilter, &str); 3] = [
    (AgentStatusFilter::All, "All"),
    (AgentStatusFilter::Active, "Active"),
    (AgentStatusFilter::Inactive, "Inactive"),
];

#[component]
pub fn AgentsPage() -> impl IntoView {
    let ctx = use_app();
    let list = RwSignal::new(ListState::<Agent>::default());
    let dialog = AgentFormState::new();

    let search = RwSignal::new(String::new());
    let status = RwSignal::new(AgentStatusFilter::All);
    let page = RwSignal::new(1u32);

    // 查询参数任一变化都重新获取；较早的响应由控制器丢弃
    Effect::new(move |_| {
        let query = AgentQuery {
            page: Some(page.get()),
            limit: Some(DEFAULT_PAGE_SIZE),
            search: Some(search.get()),
            status: Some(status.get()),
        };
        let agents = ctx.agents(list);
        spawn_local(async move {
            let _ = agents.fetch(query).await;
        });
    });

    let on_search = move |ev: leptos::ev::Event| {
        search.set(event_target_value(&ev));
        page.set(1);
    };
    let on_status = move |filter: AgentStatusFilter| {
        status.set(filter);
        page.set(1);
    };

    let on_submit = Callback::new(move |_: ()| {
        let form = dialog.to_form();
        let editing = dialog.editing.get_untracked();
        let agents = ctx.agents(list);
        spawn_local(async move {
            let _ = agents.submit(&form, editing.as_deref(), &dialog.phase).await;
        });
    });

    let on_delete = move |agent: Agent| {
        let prompt = format!(
            "Are you sure you want to delete {}? This will also delete all their distributions.",
            agent.name
        );
        if !confirm(&prompt) {
            return;
        }
        let agents = ctx.agents(list);
        spawn_local(async move {
            let _ = agents.delete(&agent.id).await;
        });
    };

    let stats = Memo::new(move |_| list.with(|s| AgentStats::from_agents(&s.items)));
    let loading = move || list.with(|s| s.loading);
    let error = move || list.with(|s| s.error.clone());
    let is_empty = move || list.with(|s| s.items.is_empty());

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-2xl font-bold">"Agents"</h1>
                    <p class="text-base-content/70">"Manage your agents and their access"</p>
                </div>
                <button class="btn btn-primary gap-2" on:click=move |_| dialog.open_create()>
                    <Plus attr:class="h-4 w-4" /> "Add Agent"
                </button>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-figure text-primary"><Users attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Total Agents"</div>
                    <div class="stat-value text-primary">{move || stats.get().total}</div>
                </div>
                <div class="stat">
                    <div class="stat-figure text-success"><CheckCircle attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Active Agents"</div>
                    <div class="stat-value text-success">{move || stats.get().active}</div>
                </div>
                <div class="stat">
                    <div class="stat-figure text-error"><AlertCircle attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Inactive Agents"</div>
                    <div class="stat-value text-error">{move || stats.get().inactive}</div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Agent List"</h3>
                    <div class="flex flex-col md:flex-row gap-4">
                        <label class="input input-bordered flex items-center gap-2 flex-1">
                            <Search attr:class="h-4 w-4 opacity-50" />
                            <input
                                type="text"
                                class="grow"
                                placeholder="Search agents..."
                                prop:value=search
                                on:input=on_search
                            />
                        </label>
                        <div class="join">
                            {STATUS_FILTERS
                                .into_iter()
                                .map(|(filter, label)| {
                                    view! {
                                        <button
                                            class=move || {
                                                if status.get() == filter {
                                                    "btn btn-sm join-item btn-primary"
                                                } else {
                                                    "btn btn-sm join-item btn-outline"
                                                }
                                            }
                                            on:click=move |_| on_status(filter)
                                        >
                                            {label}
                                        </button>
                                    }
                                })
                                .collect_view()}
                        </div>
                    </div>

                    <Show when=move || error().is_some()>
                        <div role="alert" class="alert alert-error text-sm">
                            <AlertCircle attr:class="h-5 w-5" />
                            <span>{move || error().unwrap_or_default()}</span>
                            <button
                                class="btn btn-ghost btn-xs btn-square"
                                on:click=move |_| ctx.agents(list).dismiss_error()
                            >
                                <X attr:class="h-4 w-4" />
                            </button>
                        </div>
                    </Show>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Agent"</th>
                                    <th>"Contact"</th>
                                    <th>"Status"</th>
                                    <th class="hidden md:table-cell">"Created"</th>
                                    <th>"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || loading() && is_empty()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8">
                                            <span class="loading loading-spinner loading-md"></span>
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || !loading() && is_empty()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            <p>"No agents found"</p>
                                            <p class="text-sm">"Create your first agent to get started"</p>
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || list.with(|s| s.items.clone())
                                    key=|agent| (agent.id.clone(), agent.updated_at)
                                    children=move |agent| {
                                        let for_edit = agent.clone();
                                        let for_delete = agent.clone();
                                        view! {
                                            <tr>
                                                <td class="font-medium">{agent.name.clone()}</td>
                                                <td>
                                                    <div class="text-sm">{agent.email.clone()}</div>
                                                    <div class="text-xs opacity-60">{agent.mobile.clone()}</div>
                                                </td>
                                                <td>
                                                    {if agent.is_active {
                                                        view! { <span class="badge badge-success">"Active"</span> }.into_any()
                                                    } else {
                                                        view! { <span class="badge badge-ghost">"Inactive"</span> }.into_any()
                                                    }}
                                                </td>
                                                <td class="hidden md:table-cell text-sm opacity-70">
                                                    {format_date(&agent.created_at)}
                                                </td>
                                                <td>
                                                    <div class="flex gap-1">
                                                        <button
                                                            class="btn btn-ghost btn-sm btn-square"
                                                            on:click=move |_| dialog.open_edit(&for_edit)
                                                        >
                                                            <Pencil attr:class="h-4 w-4" />
                                                        </button>
                                                        <button
                                                            class="btn btn-ghost btn-sm btn-square text-error"
                                                            on:click=move |_| on_delete(for_delete.clone())
                                                        >
                                                            <Trash2 attr:class="h-4 w-4" />
                                                        </button>
                                                    </div>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>

                    {move || {
                        list.with(|s| s.pagination.clone())
                            .filter(|p| p.total_pages > 1)
                            .map(|p| {
                                let label = p.showing_label(DEFAULT_PAGE_SIZE, "agents");
                                view! {
                                    <div class="flex items-center justify-between pt-4">
                                        <p class="text-sm text-base-content/70">
                                            {label}
                                        </p>
                                        <div class="join">
                                            <button
                                                class="btn btn-sm join-item"
                                                disabled=!p.has_prev_page
                                                on:click=move |_| page.update(|n| *n = n.saturating_sub(1).max(1))
                                            >
                                                <ChevronLeft attr:class="h-4 w-4" /> "Previous"
                                            </button>
                                            <button
                                                class="btn btn-sm join-item"
                                                disabled=!p.has_next_page
                                                on:click=move |_| page.update(|n| *n += 1)
                                            >
                                                "Next" <ChevronRight attr:class="h-4 w-4" />
                                            </button>
                                        </div>
                                    </div>
                                }
                            })
                    }}
                </div>
            </div>

            <AgentDialog state=dialog on_submit=on_submit />
        </div>
    }
}
