use crate::components::icons::{AlertCircle, ShieldCheck};
use crate::context::use_app;
use dispatchboard_shared::validation::{LoginForm, RegisterForm};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    Register,
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_app();

    let mode = RwSignal::new(Mode::SignIn);
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let registering = move || mode.get() == Mode::Register;
    let toggle_mode = move |_: leptos::ev::MouseEvent| {
        mode.update(|m| {
            *m = match m {
                Mode::SignIn => Mode::Register,
                Mode::Register => Mode::SignIn,
            }
        });
        set_confirm.set(String::new());
        set_error_msg.set(None);
    };

    // 成功后凭据信号变化，路由服务负责跳转到仪表盘
    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        set_error_msg.set(None);

        let store = ctx.session_store();
        let current = mode.get_untracked();
        let email = email.get_untracked();
        let password = password.get_untracked();
        let confirm_password = confirm.get_untracked();
        spawn_local(async move {
            let outcome = match current {
                Mode::SignIn => store.login(&LoginForm { email, password }).await,
                Mode::Register => {
                    store
                        .register(&RegisterForm {
                            email,
                            password,
                            confirm_password,
                        })
                        .await
                }
            };
            if let Err(e) = outcome {
                set_error_msg.set(Some(e.message()));
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <ShieldCheck attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"Agent Distribution System"</h1>
                        <p class="text-base-content/70">
                            {move || if registering() {
                                "Create an admin account"
                            } else {
                                "Sign in to your admin account"
                            }}
                        </p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.with(Option::is_some)>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <AlertCircle attr:class="h-5 w-5" />
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="admin@example.com"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="Enter your password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <Show when=registering>
                            <div class="form-control">
                                <label class="label" for="confirm-password">
                                    <span class="label-text">"Confirm Password"</span>
                                </label>
                                <input
                                    id="confirm-password"
                                    type="password"
                                    placeholder="Confirm your password"
                                    on:input=move |ev| set_confirm.set(event_target_value(&ev))
                                    prop:value=confirm
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                        </Show>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || match (is_submitting.get(), registering()) {
                                    (true, true) => view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any(),
                                    (true, false) => view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any(),
                                    (false, true) => "Create Account".into_any(),
                                    (false, false) => "Sign In".into_any(),
                                }}
                            </button>
                        </div>
                        <button type="button" class="btn btn-link btn-sm" on:click=toggle_mode>
                            {move || if registering() {
                                "Already have an account? Sign in"
                            } else {
                                "Need an account? Register"
                            }}
                        </button>
                    </form>
                </div>
            </div>
        </div>
    }
}
