use a11y_analyzer_shared::Report;
use a11y_analyzer_shared::date::format_datetime;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{ScreenError, authorized, handle_error, use_api};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, Spinner};
use crate::components::results::AnalysisResults;
use crate::fetch_guard::LatestRequest;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 报告不存在时卡片内提供的出口
const NOT_FOUND_LINKS: [(AppRoute, &str); 2] = [
    (AppRoute::Dashboard, "Go to Dashboard"),
    (AppRoute::Reports, "My Saved Reports"),
];

/// 单份报告
#[component]
pub fn ReportDetailPage(id: String) -> impl IntoView {
    let session = use_session();
    let client = use_api().client();

    let (report, set_report) = signal(Option::<Report>::None);
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<ScreenError>::None);

    let guard = LatestRequest::new();
    on_cleanup({
        let guard = guard.clone();
        move || guard.close()
    });

    let load = move || {
        let ticket = guard.begin();
        set_loading.set(true);
        set_error.set(None);

        let client = client.clone();
        let id = id.clone();
        spawn_local(async move {
            let result = authorized(&session, |token| async move {
                client.fetch_report(&id, &token).await
            })
            .await;

            if !ticket.is_current() {
                return;
            }
            match result {
                Ok(r) => set_report.set(Some(r)),
                Err(e) => set_error.set(Some(handle_error(&session, "ReportDetail", e))),
            }
            set_loading.set(false);
        });
    };
    let load = StoredValue::new(load);

    Effect::new(move |_| load.with_value(|f| f()));

    // 优先回到上一页；直接打开详情页时没有历史可退，改为回到列表
    let router = use_router();
    let go_back = move |_| {
        let went_back = web_sys::window()
            .and_then(|w| w.history().ok())
            .is_some_and(|h| h.length().is_ok_and(|len| len > 1) && h.back().is_ok());
        if !went_back {
            router.navigate("/reports");
        }
    };

    view! {
        <div class="flex flex-wrap gap-2">
            <button class="btn btn-ghost btn-sm" on:click=go_back>"← Back"</button>
            <Link to="/dashboard" class="btn btn-ghost btn-sm">"Go to Dashboard"</Link>
        </div>

        {move || {
            if loading.get() {
                return view! { <Spinner label="Loading report..." /> }.into_any();
            }
            if let Some(e) = error.get() {
                if e.is_not_found() {
                    return view! {
                        <div class="card bg-base-100 shadow">
                            <div class="card-body items-center text-center">
                                <h2 class="card-title">"Report not found"</h2>
                                <p class="text-base-content/70">{e.message}</p>
                                <div class="card-actions">
                                    {NOT_FOUND_LINKS
                                        .into_iter()
                                        .enumerate()
                                        .map(|(i, (route, label))| {
                                            let class = if i == 0 { "btn btn-primary" } else { "btn btn-ghost" };
                                            view! { <Link to=route.to_path() class=class>{label}</Link> }
                                        })
                                        .collect_view()}
                                </div>
                            </div>
                        </div>
                    }
                    .into_any();
                }
                return view! {
                    <ErrorAlert error=e on_retry=Callback::new(move |_| load.with_value(|f| f())) />
                }
                .into_any();
            }
            match report.get() {
                Some(r) => {
                    let title = r.title();
                    let analyzed_on = format_datetime(&r.timestamp);
                    let page_url = r.url.clone();
                    view! {
                        <div class="space-y-1">
                            <h1 class="text-3xl font-bold">{title}</h1>
                            <p class="text-sm text-base-content/60 break-all">{page_url}</p>
                            <p class="text-sm text-base-content/60">"Analyzed on " {analyzed_on}</p>
                        </div>
                        <AnalysisResults report=r />
                    }
                    .into_any()
                }
                None => ().into_any(),
            }
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_offers_dashboard_first() {
        assert_eq!(NOT_FOUND_LINKS[0].0.to_path(), "/dashboard");
        for (route, _) in NOT_FOUND_LINKS {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
            assert!(route.requires_auth());
        }
    }
}
