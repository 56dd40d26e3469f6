//! 新建 / 编辑代理对话框

mod form_state;

pub use form_state::AgentFormState;

use crate::components::icons::{AlertCircle, Eye, EyeOff};
use leptos::prelude::*;

/// 单行输入框
#[component]
fn Field(
    id: &'static str,
    label: &'static str,
    placeholder: &'static str,
    value: RwSignal<String>,
    #[prop(into, default = Signal::stored("text"))] kind: Signal<&'static str>,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label for=id class="label">
                <span class="label-text">{label}</span>
            </label>
            <input
                id=id
                type=move || kind.get()
                placeholder=placeholder
                on:input=move |ev| value.set(event_target_value(&ev))
                prop:value=value
                class="input input-bordered w-full"
            />
        </div>
    }
}

#[component]
pub fn AgentDialog(state: AgentFormState, #[prop(into)] on_submit: Callback<()>) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let is_open = move || state.phase.with(|p| p.is_open());
    let is_submitting = move || state.phase.with(|p| p.is_submitting());
    let error = move || state.phase.with(|p| p.error().map(str::to_string));
    let editing = move || state.is_editing();

    // 阶段与原生 <dialog> 的打开状态保持一致
    Effect::new(move |_| {
        let open = is_open();
        if let Some(dialog) = dialog_ref.get() {
            if open && !dialog.open() {
                let _ = dialog.show_modal();
            } else if !open && dialog.open() {
                dialog.close();
            }
        }
    });

    let password_kind = Signal::derive(move || {
        if state.show_password.get() { "text" } else { "password" }
    });

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        on_submit.run(());
    };

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| state.cancel()>
            <div class="modal-box">
                <h3 class="font-bold text-lg">
                    {move || if editing() { "Edit Agent" } else { "Create New Agent" }}
                </h3>
                <p class="py-2 text-base-content/70">
                    {move || if editing() {
                        "Update agent information and status."
                    } else {
                        "Add a new agent who can receive distributed records."
                    }}
                </p>

                <form on:submit=submit class="space-y-3">
                    <Show when=move || error().is_some()>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            <AlertCircle attr:class="h-5 w-5" />
                            <span>{move || error().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    <Field id="agent-name" label="Full Name" placeholder="John Smith" value=state.name />
                    <Field
                        id="agent-email"
                        label="Email Address"
                        placeholder="john@example.com"
                        value=state.email
                        kind="email"
                    />
                    <Field id="agent-mobile" label="Mobile Number" placeholder="+1234567890" value=state.mobile />

                    // 密码只在新建时填写
                    <Show when=move || !editing()>
                        <div class="form-control">
                            <label for="agent-password" class="label">
                                <span class="label-text">"Password"</span>
                            </label>
                            <div class="join w-full">
                                <input
                                    id="agent-password"
                                    type=move || password_kind.get()
                                    placeholder="Enter password"
                                    on:input=move |ev| state.password.set(event_target_value(&ev))
                                    prop:value=state.password
                                    class="input input-bordered join-item w-full"
                                />
                                <button
                                    type="button"
                                    class="btn join-item"
                                    on:click=move |_| state.show_password.update(|v| *v = !*v)
                                >
                                    {move || if state.show_password.get() {
                                        view! { <EyeOff attr:class="h-4 w-4" /> }.into_any()
                                    } else {
                                        view! { <Eye attr:class="h-4 w-4" /> }.into_any()
                                    }}
                                </button>
                            </div>
                        </div>
                        <Field
                            id="agent-confirm"
                            label="Confirm Password"
                            placeholder="Confirm password"
                            value=state.confirm_password
                            kind=password_kind
                        />
                    </Show>

                    <Show when=editing>
                        <div class="form-control">
                            <label class="label cursor-pointer justify-start gap-3">
                                <input
                                    type="checkbox"
                                    class="checkbox checkbox-primary"
                                    prop:checked=state.is_active
                                    on:change=move |ev| state.is_active.set(event_target_checked(&ev))
                                />
                                <span class="label-text">"Active"</span>
                            </label>
                        </div>
                    </Show>

                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| state.cancel()>
                            "Cancel"
                        </button>
                        <button type="submit" disabled=is_submitting class="btn btn-primary">
                            {move || match (is_submitting(), editing()) {
                                (true, true) => view! { <span class="loading loading-spinner"></span> "Updating..." }.into_any(),
                                (true, false) => view! { <span class="loading loading-spinner"></span> "Creating..." }.into_any(),
                                (false, true) => "Update Agent".into_any(),
                                (false, false) => "Create Agent".into_any(),
                            }}
                        </button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}
