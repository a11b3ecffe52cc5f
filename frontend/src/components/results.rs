//! 分析结果视图：摘要卡片、严重程度分布、筛选与问题列表
//!
//! 分析页与报告详情页共用。

use a11y_analyzer_shared::{
    DisplayBucket, Issue, Report, SEVERITY_ALL, Severity, filter_issues_by_severity,
    severity_distribution,
};
use leptos::prelude::*;

use super::chart::SeverityChart;

fn bucket_badge(bucket: DisplayBucket) -> &'static str {
    match bucket {
        DisplayBucket::Critical => "badge badge-error",
        DisplayBucket::Moderate => "badge badge-warning",
        DisplayBucket::Minor => "badge badge-info",
        DisplayBucket::Neutral => "badge badge-ghost",
    }
}

fn score_class(score: u8) -> &'static str {
    match score {
        90..=100 => "stat-value text-success",
        50..=89 => "stat-value text-warning",
        _ => "stat-value text-error",
    }
}

#[component]
pub fn StatCard(
    #[prop(into)] title: String,
    #[prop(into)] value: String,
    #[prop(into, default = "stat-value".to_string())] value_class: String,
    #[prop(into, optional)] desc: Option<String>,
) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{title}</div>
            <div class=value_class>{value}</div>
            {desc.map(|d| view! { <div class="stat-desc truncate">{d}</div> })}
        </div>
    }
}

#[component]
pub fn AnalysisResults(report: Report) -> impl IntoView {
    let summary = report.summary;
    let distribution = severity_distribution(&report.issues);
    let ai_suggestion = report.ai_suggestion.clone().filter(|s| !s.trim().is_empty());
    let issues = StoredValue::new(report.issues);

    let (filter, set_filter) = signal(SEVERITY_ALL.to_string());

    let visible = move || {
        let wanted = filter.get();
        issues.with_value(|all| {
            filter_issues_by_severity(all, &wanted)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let score_card = summary.score_percent().map(|score| {
        view! { <StatCard title="Score" value=format!("{}%", score) value_class=score_class(score) /> }
    });

    view! {
        <div class="space-y-6">
            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <StatCard title="Total Issues" value=summary.total_issues.to_string() />
                <StatCard title="Critical" value=summary.critical.to_string() value_class="stat-value text-error" />
                <StatCard title="Moderate" value=summary.moderate.to_string() value_class="stat-value text-warning" />
                <StatCard title="Minor" value=summary.minor.to_string() value_class="stat-value text-info" />
                {score_card}
            </div>

            {ai_suggestion.map(|text| view! {
                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h3 class="card-title">"AI Suggestion"</h3>
                        <p class="whitespace-pre-line">{text}</p>
                    </div>
                </div>
            })}

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h3 class="card-title">"Issues by Severity"</h3>
                    <SeverityChart distribution=distribution />
                </div>
            </div>

            <div class="card bg-base-100 shadow">
                <div class="card-body space-y-4">
                    <div class="flex flex-wrap items-center justify-between gap-4">
                        <h3 class="card-title">"Issues"</h3>
                        <label class="flex items-center gap-2">
                            <span class="label-text">"Filter by severity"</span>
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| set_filter.set(event_target_value(&ev))
                            >
                                <option value=SEVERITY_ALL selected=move || filter.get() == SEVERITY_ALL>
                                    {SEVERITY_ALL}
                                </option>
                                {Severity::FILTERABLE
                                    .into_iter()
                                    .map(|s| view! {
                                        <option value=s.label() selected=move || filter.get() == s.label()>
                                            {s.label()}
                                        </option>
                                    })
                                    .collect_view()}
                            </select>
                        </label>
                    </div>

                    {move || {
                        let list = visible();
                        if issues.with_value(Vec::is_empty) {
                            view! {
                                <p class="text-success">"No accessibility issues found. Great job!"</p>
                            }
                            .into_any()
                        } else if list.is_empty() {
                            view! {
                                <p class="text-base-content/60">"No issues match this severity."</p>
                            }
                            .into_any()
                        } else {
                            list.into_iter()
                                .map(|issue| view! { <IssueCard issue=issue /> })
                                .collect_view()
                                .into_any()
                        }
                    }}
                </div>
            </div>
        </div>
    }
}

/// 可展开的问题卡片
#[component]
pub fn IssueCard(issue: Issue) -> impl IntoView {
    let (show_all_nodes, set_show_all_nodes) = signal(false);

    let badge = bucket_badge(issue.bucket());
    let severity = issue.severity.clone();
    let node_count = issue.nodes.len();
    let nodes = StoredValue::new(issue.nodes);
    let suggestions = issue.ai_suggestions.filter(|s| {
        s.short_fix.is_some() || s.detailed_fix.is_some()
    });

    let snippets = move || {
        let limit = if show_all_nodes.get() { node_count } else { 1 };
        nodes.with_value(|list| {
            list.iter()
                .take(limit)
                .map(|n| view! { <pre class="bg-base-200 rounded p-2 text-xs overflow-x-auto"><code>{n.html.clone()}</code></pre> })
                .collect_view()
        })
    };

    let help = (!issue.help.is_empty()).then(|| {
        view! { <p class="text-sm">{issue.help}</p> }
    });

    let toggle = (node_count > 1).then(|| {
        view! {
            <button
                class="btn btn-link btn-xs px-0"
                on:click=move |_| set_show_all_nodes.update(|v| *v = !*v)
            >
                {move || if show_all_nodes.get() {
                    "Show fewer".to_string()
                } else {
                    format!("Show all {} elements", node_count)
                }}
            </button>
        }
    });

    let offending_html = (node_count > 0).then(|| {
        view! {
            <div class="space-y-2">
                <p class="text-sm font-semibold">"Offending HTML"</p>
                {snippets}
                {toggle}
            </div>
        }
    });

    view! {
        <div class="collapse collapse-arrow bg-base-200/50 border border-base-300">
            <input type="checkbox" aria-label="Toggle issue details" />
            <div class="collapse-title flex items-center gap-3">
                <span class=badge>{severity}</span>
                <span class="font-medium">{issue.description}</span>
            </div>
            <div class="collapse-content space-y-3">
                {help}
                {offending_html}
                {suggestions.map(|s| view! {
                    <div class="space-y-1">
                        <p class="text-sm font-semibold">"Suggested fix"</p>
                        {s.short_fix.map(|f| view! { <p class="text-sm">{f}</p> })}
                        {s.detailed_fix.map(|f| view! {
                            <details class="text-sm">
                                <summary class="cursor-pointer">"Detailed fix"</summary>
                                <p class="whitespace-pre-line mt-1">{f}</p>
                            </details>
                        })}
                    </div>
                })}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_class_thresholds() {
        assert_eq!(score_class(95), "stat-value text-success");
        assert_eq!(score_class(70), "stat-value text-warning");
        assert_eq!(score_class(10), "stat-value text-error");
    }

    #[test]
    fn test_serious_uses_critical_badge() {
        assert_eq!(bucket_badge(Severity::Serious.bucket()), "badge badge-error");
        assert_eq!(bucket_badge(Severity::Unknown.bucket()), "badge badge-ghost");
    }
}
