use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{sign_in, use_session};
use crate::web::router::Link;

/// 登录页
///
/// 登录成功后不在这里跳转：身份提供方推送用户后，路由服务会把登录页重定向到仪表盘。
#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();

    let on_sign_in = move |_| {
        spawn_local(async move { sign_in(&session).await });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Sign in"</h1>
                    <p class="text-base-content/70">
                        "Sign in to analyze pages and keep your reports."
                    </p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <div class="card-body">
                        <Show when=move || session.last_error().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || session.last_error().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <button
                            class="btn btn-primary"
                            disabled=move || session.is_pending()
                            on:click=on_sign_in
                        >
                            {move || if session.is_pending() {
                                view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                            } else {
                                "Sign in with Google".into_any()
                            }}
                        </button>

                        <Link to="/" class="link link-hover text-sm text-center mt-2">
                            "Back to home"
                        </Link>
                    </div>
                </div>
            </div>
        </div>
    }
}
