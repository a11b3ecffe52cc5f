//! 已登录页面的外壳：顶部导航栏 + 内容区

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{sign_out, use_session};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 导航项：(目标路由, 文本)
fn nav_items() -> [(AppRoute, &'static str); 5] {
    [
        (AppRoute::Dashboard, "Dashboard"),
        (AppRoute::Analyze, "Analyze"),
        (AppRoute::Reports, "My Saved Reports"),
        (AppRoute::Settings, "Settings"),
        (AppRoute::Profile, "Profile"),
    ]
}

#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let session = use_session();
    let current = use_router().current_route();

    let on_sign_out = move |_| {
        spawn_local(async move { sign_out(&session).await });
    };

    let links = nav_items()
        .into_iter()
        .map(|(route, label)| {
            let path = route.to_path();
            let section = path.clone();
            let class = move || {
                if current.with(|r| r.section() == section) {
                    "btn btn-ghost btn-sm btn-active"
                } else {
                    "btn btn-ghost btn-sm"
                }
            };
            view! {
                <li>
                    <Link to=path class=Signal::derive(move || Some(class().to_string()))>
                        {label}
                    </Link>
                </li>
            }
        })
        .collect_view();

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <div class="navbar bg-base-100 shadow">
                <div class="flex-1">
                    <Link to="/dashboard" class="btn btn-ghost text-xl">
                        "Accessibility Analyzer"
                    </Link>
                </div>
                <div class="flex-none gap-2">
                    <ul class="menu menu-horizontal flex-wrap px-1 gap-1">{links}</ul>
                    <button
                        class="btn btn-outline btn-error btn-sm"
                        disabled=move || session.is_pending()
                        on:click=on_sign_out
                    >
                        "Sign Out"
                    </button>
                </div>
            </div>
            <main class="max-w-7xl mx-auto p-4 md:p-8 space-y-8">{children()}</main>
        </div>
    }
}
