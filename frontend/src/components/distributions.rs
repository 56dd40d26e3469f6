use crate::components::icons::*;
use crate::context::use_app;
use crate::controllers::{ListState, prepare_export};
use crate::web::download::{confirm, save_text};
use dispatchboard_shared::display::format_date;
use dispatchboard_shared::summary::{DistributionStats, filter_distributions};
use dispatchboard_shared::{DEFAULT_PAGE_SIZE, Distribution, DistributionQuery};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 浮动通知：(消息内容, 是否出错)
type Notice = Option<(String, bool)>;

#[component]
pub fn DistributionsPage() -> impl IntoView {
    let ctx = use_app();
    let list = RwSignal::new(ListState::<Distribution>::default());
    let search = RwSignal::new(String::new());
    let selected = RwSignal::new(Option::<Distribution>::None);
    let notification = RwSignal::new(Notice::None);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let page = RwSignal::new(1u32);

    Effect::new(move |_| {
        let query = DistributionQuery {
            page: Some(page.get()),
            limit: Some(DEFAULT_PAGE_SIZE),
            ..Default::default()
        };
        let distributions = ctx.distributions(list);
        spawn_local(async move {
            let _ = distributions.fetch(query).await;
        });
    });

    // 3 秒后清除通知
    Effect::new(move |_| {
        if notification.with(Option::is_some) {
            set_timeout(
                move || notification.set(None),
                std::time::Duration::from_secs(3),
            );
        }
    });

    Effect::new(move |_| {
        let open = selected.with(Option::is_some);
        if let Some(dialog) = dialog_ref.get() {
            if open && !dialog.open() {
                let _ = dialog.show_modal();
            } else if !open && dialog.open() {
                dialog.close();
            }
        }
    });

    let view_details = move |id: String| {
        let distributions = ctx.distributions(list);
        spawn_local(async move {
            match distributions.details(&id).await {
                Ok(distribution) => selected.set(Some(distribution)),
                Err(_) => notification.set(Some((
                    "Failed to load distribution details".to_string(),
                    true,
                ))),
            }
        });
    };

    let on_delete = move |distribution: Distribution| {
        let prompt = format!(
            "Are you sure you want to delete the distribution \"{}\" for {}?",
            distribution.file_name, distribution.agent_name
        );
        if !confirm(&prompt) {
            return;
        }
        let distributions = ctx.distributions(list);
        spawn_local(async move {
            match distributions.delete(&distribution.id).await {
                Ok(()) => notification.set(Some(("Distribution deleted".to_string(), false))),
                Err(e) => notification.set(Some((
                    format!("Failed to delete distribution: {}", e.message()),
                    true,
                ))),
            }
        });
    };

    let on_export = move |_: leptos::ev::MouseEvent| {
        let Some(distribution) = selected.get_untracked() else {
            return;
        };
        let outcome = prepare_export(&distribution)
            .map_err(|e| e.message())
            .and_then(|csv| save_text(&csv.file_name, &csv.content, "text/csv;charset=utf-8;"));
        if let Err(message) = outcome {
            log::warn!("export of {} failed: {message}", distribution.id);
            notification.set(Some((message, true)));
        }
    };

    let stats = Memo::new(move |_| list.with(|s| DistributionStats::from_distributions(&s.items)));
    let visible = move || {
        let term = search.get();
        list.with(|s| {
            filter_distributions(&s.items, &term)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };
    let loading = move || list.with(|s| s.loading);
    let error = move || list.with(|s| s.error.clone());
    let has_search = move || search.with(|t| !t.trim().is_empty());

    view! {
        <div class="space-y-6">
            <Show when=move || notification.with(Option::is_some)>
                <div class="toast toast-top toast-end z-50">
                    <div class=move || {
                        if notification.with(|n| n.as_ref().is_some_and(|(_, err)| *err)) {
                            "alert alert-error shadow-lg"
                        } else {
                            "alert alert-success shadow-lg"
                        }
                    }>
                        <span>{move || notification.with(|n| n.as_ref().map(|(m, _)| m.clone()).unwrap_or_default())}</span>
                    </div>
                </div>
            </Show>

            <div>
                <h1 class="text-2xl font-bold">"Distributions"</h1>
                <p class="text-base-content/70">"View and manage distributed records"</p>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-figure text-primary"><FileText attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Total Distributions"</div>
                    <div class="stat-value text-primary">{move || stats.get().total}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Total Records"</div>
                    <div class="stat-value">{move || stats.get().records}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Files Processed"</div>
                    <div class="stat-value">{move || stats.get().unique_files}</div>
                </div>
                <div class="stat">
                    <div class="stat-figure text-secondary"><Users attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Agents Involved"</div>
                    <div class="stat-value text-secondary">{move || stats.get().unique_agents}</div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Distribution History"</h3>
                    <label class="input input-bordered flex items-center gap-2">
                        <Search attr:class="h-4 w-4 opacity-50" />
                        <input
                            type="text"
                            class="grow"
                            placeholder="Search by file name or agent..."
                            prop:value=search
                            on:input=move |ev| search.set(event_target_value(&ev))
                        />
                    </label>

                    <Show when=move || error().is_some()>
                        <div role="alert" class="alert alert-error text-sm">
                            <AlertCircle attr:class="h-5 w-5" />
                            <span>{move || error().unwrap_or_default()}</span>
                            <button
                                class="btn btn-ghost btn-xs btn-square"
                                on:click=move |_| ctx.distributions(list).dismiss_error()
                            >
                                <X attr:class="h-4 w-4" />
                            </button>
                        </div>
                    </Show>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"File & Agent"</th>
                                    <th>"Records"</th>
                                    <th class="hidden md:table-cell">"Upload Date"</th>
                                    <th class="hidden md:table-cell">"Status"</th>
                                    <th>"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || loading() && visible().is_empty()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8">
                                            <span class="loading loading-spinner loading-md"></span>
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || !loading() && visible().is_empty()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            <p>
                                                {move || if has_search() {
                                                    "No distributions match your search"
                                                } else {
                                                    "No distributions found"
                                                }}
                                            </p>
                                            <p class="text-sm">
                                                {move || if has_search() {
                                                    "Try a different search term"
                                                } else {
                                                    "Upload a file to create distributions"
                                                }}
                                            </p>
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=visible
                                    key=|d| d.id.clone()
                                    children=move |distribution| {
                                        let id = distribution.id.clone();
                                        let for_delete = distribution.clone();
                                        view! {
                                            <tr>
                                                <td>
                                                    <div class="font-medium">{distribution.file_name.clone()}</div>
                                                    <div class="text-xs opacity-60">
                                                        {distribution.agent_name.clone()} " · " {distribution.agent_email.clone()}
                                                    </div>
                                                </td>
                                                <td>
                                                    <span class="badge badge-outline">{distribution.total_items}</span>
                                                </td>
                                                <td class="hidden md:table-cell text-sm opacity-70">
                                                    {format_date(&distribution.upload_date)}
                                                </td>
                                                <td class="hidden md:table-cell">
                                                    <span class="badge badge-primary">"Distributed"</span>
                                                </td>
                                                <td>
                                                    <div class="flex gap-1">
                                                        <button
                                                            class="btn btn-ghost btn-sm btn-square"
                                                            on:click=move |_| view_details(id.clone())
                                                        >
                                                            <Eye attr:class="h-4 w-4" />
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
                                let label = p.showing_label(DEFAULT_PAGE_SIZE, "distributions");
                                view! {
                                    <div class="flex items-center justify-between pt-4">
                                        <p class="text-sm text-base-content/70">{label}</p>
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

            <dialog class="modal" node_ref=dialog_ref on:close=move |_| selected.set(None)>
                <div class="modal-box max-w-3xl">
                    <h3 class="font-bold text-lg">"Distribution Details"</h3>
                    {move || selected.get().map(|d| view! {
                        <div class="grid grid-cols-3 gap-4 py-4">
                            <div>
                                <p class="text-sm opacity-70">"File Name"</p>
                                <p class="font-medium">{d.file_name.clone()}</p>
                            </div>
                            <div>
                                <p class="text-sm opacity-70">"Agent"</p>
                                <p class="font-medium">{d.agent_name.clone()}</p>
                                <p class="text-xs opacity-60">{d.agent_email.clone()}</p>
                            </div>
                            <div>
                                <p class="text-sm opacity-70">"Records"</p>
                                <p class="font-medium">{d.items.len()}</p>
                            </div>
                        </div>
                        <div class="flex items-center justify-between">
                            <h4 class="font-semibold">"Distributed Data"</h4>
                            <button class="btn btn-sm btn-outline gap-2" on:click=on_export>
                                <Download attr:class="h-4 w-4" /> "Export CSV"
                            </button>
                        </div>
                        <div class="overflow-x-auto max-h-96 mt-2">
                            <table class="table table-sm">
                                <thead>
                                    <tr>
                                        <th>"First Name"</th>
                                        <th>"Phone"</th>
                                        <th>"Notes"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {d.items.into_iter().map(|item| view! {
                                        <tr>
                                            <td>{item.first_name}</td>
                                            <td class="font-mono">{item.phone}</td>
                                            <td>{item.notes.unwrap_or_else(|| "-".to_string())}</td>
                                        </tr>
                                    }).collect_view()}
                                </tbody>
                            </table>
                        </div>
                    })}
                    <div class="modal-action">
                        <button class="btn" on:click=move |_| selected.set(None)>"Close"</button>
                    </div>
                </div>
                <form method="dialog" class="modal-backdrop">
                    <button>"close"</button>
                </form>
            </dialog>
        </div>
    }
}
