//! 上传与分发页
//!
//! 选择文件时先做本地校验，只有活跃代理数大于 0 才允许提交。

use crate::components::icons::*;
use crate::context::use_app;
use crate::controllers::UploadState;
use crate::web::UploadFile;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use dispatchboard_shared::display::{format_file_size, share_percent};
use dispatchboard_shared::UploadResult;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

/// 结果中最多列出的校验问题条数
const MAX_LISTED_ISSUES: usize = 10;
const ACCEPTED_FILES: &str = ".csv,.xls,.xlsx";

#[component]
pub fn UploadPage() -> impl IntoView {
    let ctx = use_app();
    let state = RwSignal::new(UploadState::default());
    // web_sys::File 不是 Send，只能放在本地存储的 signal 里
    let selected = RwSignal::new_local(Option::<UploadFile>::None);
    let dragging = RwSignal::new(false);
    let input_ref = NodeRef::<leptos::html::Input>::new();

    Effect::new(move |_| {
        let upload = ctx.upload(state);
        spawn_local(async move {
            let _ = upload.load_active_agents().await;
        });
    });

    let choose = move |file: web_sys::File| {
        let file = UploadFile::from_browser(file);
        if ctx.upload(state).select(&file.meta()) {
            selected.set(Some(file));
        } else {
            selected.set(None);
        }
    };

    let on_pick = move |ev: leptos::ev::Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            choose(file);
        }
    };

    let on_drop = move |ev: leptos::ev::DragEvent| {
        ev.prevent_default();
        dragging.set(false);
        let file = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            choose(file);
        }
    };

    let clear_selection = move || {
        selected.set(None);
        // 上传完成时页面可能已卸载
        if let Some(input) = input_ref.try_get_untracked().flatten() {
            input.set_value("");
        }
    };

    let on_upload = move |_: leptos::ev::MouseEvent| {
        let Some(file) = selected.get_untracked() else {
            return;
        };
        let upload = ctx.upload(state);
        spawn_local(async move {
            if upload.upload(file).await.is_ok() {
                clear_selection();
                // 代理数可能在别处变化，顺便刷新
                let _ = upload.load_active_agents().await;
            }
        });
    };

    let on_reset = Callback::new(move |_: ()| {
        ctx.upload(state).reset();
        clear_selection();
    });

    let busy = move || state.with(|s| s.busy);
    let error = move || state.with(|s| s.error.clone());
    let active_agents = move || state.with(|s| s.active_agents);
    let no_agents = move || active_agents() == Some(0);
    let can_submit = move || state.with(UploadState::can_upload) && selected.with(Option::is_some);

    view! {
        <div class="space-y-6">
            <div>
                <h1 class="text-2xl font-bold">"Upload & Distribute"</h1>
                <p class="text-base-content/70">
                    "Upload a CSV or Excel file and distribute its records among active agents"
                </p>
            </div>

            <div class="stats shadow bg-base-100">
                <div class="stat">
                    <div class="stat-figure text-primary"><Users attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Active Agents"</div>
                    <div class="stat-value text-primary">
                        {move || match active_agents() {
                            Some(n) => n.to_string().into_any(),
                            None => view! { <span class="loading loading-dots loading-sm"></span> }.into_any(),
                        }}
                    </div>
                    <div class="stat-desc">"Available for distribution"</div>
                    <div class="stat-desc">
                        {move || if no_agents() { "No agents available" } else { "Ready to receive data" }}
                    </div>
                </div>
            </div>

            <Show when=no_agents>
                <div role="alert" class="alert alert-warning">
                    <AlertCircle attr:class="h-5 w-5" />
                    <span>
                        "No active agents available. Please create and activate agents before uploading."
                    </span>
                </div>
            </Show>

            <Show
                when=move || state.with(|s| s.result.is_none())
                fallback=move || {
                    state
                        .with(|s| s.result.clone())
                        .map(|result| view! { <UploadSummary result=result on_reset=on_reset /> })
                }
            >
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"File Upload"</h3>
                        <p class="text-sm text-base-content/70">
                            "Accepted formats: CSV, XLS, XLSX (max 5MB)"
                        </p>

                        <Show when=move || error().is_some()>
                            <div role="alert" class="alert alert-error text-sm">
                                <AlertCircle attr:class="h-5 w-5" />
                                <span>{move || error().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div
                            class=move || {
                                if dragging.get() {
                                    "border-2 border-dashed border-primary bg-primary/5 rounded-box p-10 text-center"
                                } else {
                                    "border-2 border-dashed border-base-300 rounded-box p-10 text-center"
                                }
                            }
                            on:dragover=move |ev: leptos::ev::DragEvent| {
                                ev.prevent_default();
                                dragging.set(true);
                            }
                            on:dragleave=move |_| dragging.set(false)
                            on:drop=on_drop
                        >
                            <Upload attr:class="h-10 w-10 mx-auto opacity-50" />
                            <p class="mt-2">"Drag and drop your file here, or"</p>
                            <label class="btn btn-outline btn-sm mt-2">
                                "Browse Files"
                                <input
                                    type="file"
                                    class="hidden"
                                    accept=ACCEPTED_FILES
                                    node_ref=input_ref
                                    on:change=on_pick
                                />
                            </label>
                        </div>

                        {move || {
                            selected
                                .with(|f| f.as_ref().map(|f| (f.name.clone(), f.mime.clone(), f.size)))
                                .map(|(name, mime, size)| {
                                    let mime = if mime.is_empty() { "Unknown type".to_string() } else { mime };
                                    view! {
                                        <div class="flex items-center justify-between bg-base-200 rounded-box p-3">
                                            <div class="flex items-center gap-3">
                                                <FileText attr:class="h-6 w-6 text-primary" />
                                                <div>
                                                    <p class="font-medium">{name}</p>
                                                    <p class="text-xs opacity-60">
                                                        {format_file_size(size)} " · " {mime}
                                                    </p>
                                                </div>
                                            </div>
                                            <button
                                                class="btn btn-ghost btn-sm btn-square"
                                                disabled=busy
                                                on:click=move |_| clear_selection()
                                            >
                                                <X attr:class="h-4 w-4" />
                                            </button>
                                        </div>
                                    }
                                })
                        }}

                        <div class="card-actions justify-end">
                            <button class="btn btn-primary gap-2" disabled=move || !can_submit() on:click=on_upload>
                                {move || if busy() {
                                    view! { <span class="loading loading-spinner"></span> "Processing file..." }.into_any()
                                } else {
                                    view! { <Upload attr:class="h-4 w-4" /> "Upload & Distribute" }.into_any()
                                }}
                            </button>
                        </div>
                    </div>
                </div>
            </Show>

            <FormatRequirements />
        </div>
    }
}

#[component]
fn UploadSummary(result: UploadResult, #[prop(into)] on_reset: Callback<()>) -> impl IntoView {
    let total_valid = result.valid_records;
    let hidden_issues = result.validation_errors.len().saturating_sub(MAX_LISTED_ISSUES);

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div role="alert" class="alert alert-success">
                    <CheckCircle attr:class="h-5 w-5" />
                    <span>"File processed and distributed successfully"</span>
                </div>

                <div class="stats stats-vertical md:stats-horizontal shadow">
                    <div class="stat">
                        <div class="stat-title">"File"</div>
                        <div class="stat-value text-lg">{result.file_name.clone()}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Valid Records"</div>
                        <div class="stat-value text-success">{result.valid_records}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Invalid Records"</div>
                        <div class="stat-value text-error">{result.invalid_records}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Agents"</div>
                        <div class="stat-value">{result.distributions.len()}</div>
                    </div>
                </div>

                <h4 class="font-semibold mt-4">"Distribution Summary"</h4>
                <div class="space-y-2">
                    {result
                        .distributions
                        .into_iter()
                        .map(|d| {
                            let share = share_percent(d.items_assigned, total_valid);
                            view! {
                                <div class="flex items-center justify-between bg-base-200 rounded-box p-3">
                                    <div>
                                        <p class="font-medium">{d.agent_name}</p>
                                        <p class="text-xs opacity-60">{d.agent_email}</p>
                                    </div>
                                    <div class="text-right">
                                        <p class="font-semibold">{format!("{} records", d.items_assigned)}</p>
                                        <p class="text-xs opacity-60">{format!("{share}% of total")}</p>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>

                {(!result.validation_errors.is_empty()).then(|| view! {
                    <div role="alert" class="alert alert-warning mt-4 flex-col items-start">
                        <p class="font-semibold">"Validation Issues"</p>
                        <ul class="text-sm list-disc pl-5">
                            {result
                                .validation_errors
                                .iter()
                                .take(MAX_LISTED_ISSUES)
                                .map(|issue| {
                                    let row = issue.row.map(|r| format!("Row {r}: ")).unwrap_or_default();
                                    view! { <li>{row}{issue.errors.join(", ")}</li> }
                                })
                                .collect_view()}
                        </ul>
                        {(hidden_issues > 0).then(|| view! {
                            <p class="text-sm">{format!("... and {hidden_issues} more issues")}</p>
                        })}
                    </div>
                })}

                <div class="card-actions justify-end mt-4">
                    <button class="btn btn-outline" on:click=move |_| on_reset.run(())>"Upload Another File"</button>
                    <Link to=AppRoute::Distributions class="btn btn-primary gap-2">
                        <FileText attr:class="h-4 w-4" /> "View Distributions"
                    </Link>
                </div>
            </div>
        </div>
    }
}

#[component]
fn FormatRequirements() -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h3 class="card-title text-base">"File Format Requirements"</h3>
                <ul class="text-sm list-disc pl-5 space-y-1 text-base-content/80">
                    <li>"Columns: FirstName, Phone, Notes"</li>
                    <li>"FirstName and Phone are required for every row"</li>
                    <li>"Supported formats: CSV, XLS, XLSX"</li>
                    <li>"Maximum file size: 5MB"</li>
                    <li>"Records are distributed equally among active agents"</li>
                </ul>
            </div>
        </div>
    }
}
