use a11y_analyzer_shared::Report;
use a11y_analyzer_shared::date::format_datetime;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{ScreenError, authorized, handle_error, use_api};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, Spinner};
use crate::fetch_guard::LatestRequest;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 已保存的报告列表
#[component]
pub fn SavedReportsPage() -> impl IntoView {
    let session = use_session();
    let client = use_api().client();

    let (reports, set_reports) = signal(Vec::<Report>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<ScreenError>::None);

    let guard = LatestRequest::new();
    on_cleanup({
        let guard = guard.clone();
        move || guard.close()
    });

    let load_reports = move || {
        let Some(principal) = session.principal_untracked() else {
            return;
        };
        let ticket = guard.begin();
        set_loading.set(true);
        set_error.set(None);

        let client = client.clone();
        spawn_local(async move {
            let result = authorized(&session, |token| async move {
                client
                    .fetch_reports_for_principal(&principal.uid, &token)
                    .await
            })
            .await;

            if !ticket.is_current() {
                return;
            }
            match result {
                Ok(list) => set_reports.set(list),
                Err(e) => set_error.set(Some(handle_error(&session, "SavedReports", e))),
            }
            set_loading.set(false);
        });
    };
    let load_reports = StoredValue::new(load_reports);

    // 初始加载
    Effect::new(move |_| load_reports.with_value(|f| f()));

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex items-center justify-between p-6 pb-2">
                    <div>
                        <h3 class="card-title">"My Saved Reports"</h3>
                        <p class="text-base-content/70 text-sm">"Every page you have analyzed."</p>
                    </div>
                    <button
                        on:click=move |_| load_reports.with_value(|f| f())
                        disabled=move || loading.get()
                        class="btn btn-ghost btn-sm"
                    >
                        "Refresh"
                    </button>
                </div>

                <div class="px-6">
                    {move || error.get().map(|e| view! {
                        <ErrorAlert error=e on_retry=Callback::new(move |_| load_reports.with_value(|f| f())) />
                    })}
                </div>

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"URL"</th>
                                <th class="hidden md:table-cell">"Date"</th>
                                <th>"Total Issues"</th>
                                <th>"Critical"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || loading.get() && reports.with(Vec::is_empty)>
                                <tr>
                                    <td colspan="5"><Spinner label="Loading reports..." /></td>
                                </tr>
                            </Show>
                            <Show when=move || {
                                !loading.get() && error.with(Option::is_none) && reports.with(Vec::is_empty)
                            }>
                                <tr>
                                    <td colspan="5" class="text-center py-8 text-base-content/50">
                                        "You have no saved reports yet. "
                                        <Link to="/analyze" class="link link-primary">"Analyze a page"</Link>
                                        " to create one."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || reports.get()
                                key=|r| r.id.clone()
                                children=move |report| {
                                    let path = AppRoute::ReportDetail(report.id.clone()).to_path();
                                    let critical_badge = if report.summary.critical > 0 {
                                        "badge badge-error"
                                    } else {
                                        "badge badge-ghost"
                                    };
                                    view! {
                                        <tr>
                                            <td class="font-mono text-sm break-all">{report.url.clone()}</td>
                                            <td class="hidden md:table-cell">{format_datetime(&report.timestamp)}</td>
                                            <td>{report.summary.total_issues}</td>
                                            <td>
                                                <span class=critical_badge>
                                                    {report.summary.critical}
                                                </span>
                                            </td>
                                            <td><Link to=path class="btn btn-ghost btn-xs">"View"</Link></td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </div>
    }
}
