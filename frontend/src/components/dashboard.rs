use a11y_analyzer_shared::date::{format_date, format_datetime};
use a11y_analyzer_shared::{Report, build_comparison_series, compute_overall_metrics, most_recent_reports};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{ScreenError, authorized, handle_error, use_api};
use crate::auth::use_session;
use crate::components::chart::ComparisonChart;
use crate::components::feedback::{ErrorAlert, Spinner};
use crate::components::results::StatCard;
use crate::fetch_guard::LatestRequest;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 最近报告表格中显示的数量
const RECENT_LIMIT: usize = 5;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session();
    let client = use_api().client();

    let (reports, set_reports) = signal(Vec::<Report>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<ScreenError>::None);
    let selected = RwSignal::new(Vec::<String>::new());

    let guard = LatestRequest::new();
    on_cleanup({
        let guard = guard.clone();
        move || guard.close()
    });

    let load = move |uid: String| {
        let ticket = guard.begin();
        set_loading.set(true);
        set_error.set(None);

        let client = client.clone();
        spawn_local(async move {
            let result = authorized(&session, |token| async move {
                client.fetch_reports_for_principal(&uid, &token).await
            })
            .await;

            if !ticket.is_current() {
                return;
            }
            match result {
                Ok(list) => {
                    // 选择只保留仍然存在的报告
                    selected.update(|ids| ids.retain(|id| list.iter().any(|r| &r.id == id)));
                    set_reports.set(list);
                }
                Err(e) => set_error.set(Some(handle_error(&session, "Dashboard", e))),
            }
            set_loading.set(false);
        });
    };
    let load = StoredValue::new(load);

    // 初始加载；仅在用户切换时重新加载
    let uid = session.principal_uid();
    Effect::new(move |_| {
        if let Some(uid) = uid.get() {
            load.with_value(|f| f(uid));
        }
    });

    let reload = move || {
        if let Some(p) = session.principal_untracked() {
            load.with_value(|f| f(p.uid));
        }
    };

    let greeting = move || {
        session
            .principal()
            .map(|p| p.greeting_name().to_string())
            .unwrap_or_else(|| "User".to_string())
    };

    let metrics = Memo::new(move |_| reports.with(|list| compute_overall_metrics(list)));
    let series = Memo::new(move |_| {
        let ids = selected.get();
        reports.with(|list| build_comparison_series(list, ids.as_slice()))
    });

    let toggle = move |id: String| {
        selected.update(|ids| {
            if let Some(pos) = ids.iter().position(|x| *x == id) {
                ids.remove(pos);
            } else {
                ids.push(id);
            }
        });
    };

    view! {
        <div>
            <h1 class="text-3xl font-bold">{move || format!("Welcome back, {}!", greeting())}</h1>
            <p class="text-base-content/70">"Here is an overview of your accessibility reports."</p>
        </div>

        {move || error.get().map(|e| view! {
            <ErrorAlert error=e on_retry=Callback::new(move |_| reload()) />
        })}

        {move || {
            if loading.get() && reports.with(Vec::is_empty) {
                return view! { <Spinner label="Loading your reports..." /> }.into_any();
            }
            if reports.with(Vec::is_empty) {
                if error.with(Option::is_some) {
                    return ().into_any();
                }
                return view! {
                    <div class="card bg-base-100 shadow">
                        <div class="card-body items-center text-center">
                            <h2 class="card-title">"No reports yet"</h2>
                            <p class="text-base-content/70">"Analyze your first page to see metrics here."</p>
                            <Link to="/analyze" class="btn btn-primary">"Analyze a page"</Link>
                        </div>
                    </div>
                }
                .into_any();
            }

            let m = metrics.get();
            let (last_url, last_date) = match &m.most_recent {
                Some(r) => (r.url.clone(), format_date(&r.timestamp)),
                None => ("N/A".to_string(), "N/A".to_string()),
            };

            view! {
                <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                    <StatCard title="Reports Analyzed" value=m.reports_analyzed.to_string() value_class="stat-value text-primary" />
                    <StatCard title="Critical Issues (Overall)" value=m.critical_issues.to_string() value_class="stat-value text-error" />
                    <StatCard title="Total Issues" value=m.total_issues.to_string() />
                    <StatCard title="Last Analyzed" value=last_date value_class="stat-value text-2xl" desc=last_url />
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Compare Reports"</h3>
                        <div class="grid md:grid-cols-3 gap-6">
                            <fieldset class="space-y-1 max-h-64 overflow-y-auto">
                                <legend class="text-sm font-semibold mb-2">"Select reports"</legend>
                                <For
                                    each=move || reports.get()
                                    key=|r| r.id.clone()
                                    children=move |r| {
                                        let id = r.id.clone();
                                        let checked_id = r.id.clone();
                                        view! {
                                            <label class="label cursor-pointer justify-start gap-2">
                                                <input
                                                    type="checkbox"
                                                    class="checkbox checkbox-sm"
                                                    prop:checked=move || selected.with(|ids| ids.contains(&checked_id))
                                                    on:change=move |_| toggle(id.clone())
                                                />
                                                <span class="label-text truncate" title=r.url.clone()>
                                                    {r.url.clone()} " (" {format_date(&r.timestamp)} ")"
                                                </span>
                                            </label>
                                        }
                                    }
                                />
                            </fieldset>
                            <div class="md:col-span-2">
                                {move || {
                                    let s = series.get();
                                    if s.is_empty() {
                                        view! {
                                            <div class="flex items-center justify-center h-56 text-base-content/50 border border-dashed rounded-box">
                                                "Select one or more reports to compare."
                                            </div>
                                        }
                                        .into_any()
                                    } else {
                                        view! { <ComparisonChart series=s /> }.into_any()
                                    }
                                }}
                            </div>
                        </div>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body p-0">
                        <div class="flex items-center justify-between p-6 pb-2">
                            <h3 class="card-title">"Recent Reports"</h3>
                            <Link to="/reports" class="btn btn-ghost btn-sm">"View all"</Link>
                        </div>
                        <div class="overflow-x-auto w-full">
                            <table class="table table-zebra w-full">
                                <thead>
                                    <tr>
                                        <th>"URL"</th>
                                        <th class="hidden md:table-cell">"Analyzed"</th>
                                        <th>"Issues"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {reports.with(|list| {
                                        most_recent_reports(list, RECENT_LIMIT)
                                            .into_iter()
                                            .map(|r| {
                                                let path = AppRoute::ReportDetail(r.id.clone()).to_path();
                                                view! {
                                                    <tr>
                                                        <td class="font-mono text-sm break-all">{r.url.clone()}</td>
                                                        <td class="hidden md:table-cell">{format_datetime(&r.timestamp)}</td>
                                                        <td>{r.summary.total_issues}</td>
                                                        <td><Link to=path class="btn btn-ghost btn-xs">"Details"</Link></td>
                                                    </tr>
                                                }
                                            })
                                            .collect_view()
                                    })}
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>
            }
            .into_any()
        }}
    }
}
