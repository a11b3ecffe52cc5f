use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{sign_out, use_session};

#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = use_session();

    let on_sign_out = move |_| {
        spawn_local(async move { sign_out(&session).await });
    };

    move || {
        // 守卫保证此处已登录；登出后路由会立即切走
        session.principal().map(|p| {
            let avatar = p.avatar_url();
            let name = p
                .display_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "No Name Provided".to_string());
            let email = p.email.clone().unwrap_or_else(|| "No email".to_string());

            view! {
                <div class="card bg-base-100 shadow-xl max-w-xl">
                    <div class="card-body items-center text-center space-y-2">
                        <div class="avatar">
                            <div class="w-24 rounded-full">
                                <img src=avatar alt="Profile picture" />
                            </div>
                        </div>
                        <h2 class="card-title">{name}</h2>
                        <p class="text-base-content/70">{email}</p>
                        <p class="text-xs font-mono text-base-content/50">"User ID: " {p.uid}</p>
                        <Show when=move || session.last_error().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || session.last_error().unwrap_or_default()}</span>
                            </div>
                        </Show>
                        <button
                            class="btn btn-outline btn-error"
                            disabled=move || session.is_pending()
                            on:click=on_sign_out
                        >
                            "Sign Out"
                        </button>
                    </div>
                </div>
            }
        })
    }
}
