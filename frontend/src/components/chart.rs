//! 柱状图组件（纯 HTML/CSS，不依赖图表库）

use a11y_analyzer_shared::{ChartSeries, SeverityDistribution};
use leptos::prelude::*;

/// 柱高百分比；最大值为 0 时全部为 0，非零值至少 2% 以便可见
pub fn bar_percent(value: u64, max: u64) -> u32 {
    if max == 0 || value == 0 {
        return 0;
    }
    let pct = (value as f64 / max as f64 * 100.0).round() as u32;
    pct.clamp(2, 100)
}

/// 单根柱子
#[component]
fn Bar(value: u64, max: u64, #[prop(into)] color: String, #[prop(into)] title: String) -> impl IntoView {
    let height = format!("height: {}%", bar_percent(value, max));
    view! {
        <div class="flex flex-col items-center justify-end h-full w-6">
            <span class="text-xs text-base-content/70">{value}</span>
            <div class=format!("w-full rounded-t {}", color) style=height title=title></div>
        </div>
    }
}

/// 各严重程度分组的问题数
#[component]
pub fn SeverityChart(distribution: SeverityDistribution) -> impl IntoView {
    let rows = [
        ("Critical", distribution.critical, "bg-error"),
        ("Moderate", distribution.moderate, "bg-warning"),
        ("Minor", distribution.minor, "bg-info"),
        ("Other", distribution.neutral, "bg-neutral"),
    ];
    let max = rows.iter().map(|r| r.1).max().unwrap_or(0);

    view! {
        <div class="flex items-end gap-8 h-48 px-4" role="img" aria-label="Issues by severity">
            {rows
                .into_iter()
                .map(|(label, value, color)| view! {
                    <div class="flex flex-col items-center h-full gap-1">
                        <Bar value=value max=max color=color title=format!("{}: {}", label, value) />
                        <span class="text-xs">{label}</span>
                    </div>
                })
                .collect_view()}
        </div>
    }
}

/// 多份报告的严重问题 / 问题总数对比
#[component]
pub fn ComparisonChart(series: ChartSeries) -> impl IntoView {
    let max = series.max_value();
    let ChartSeries {
        labels,
        critical,
        total,
    } = series;

    let groups = labels
        .into_iter()
        .zip(critical)
        .zip(total)
        .map(|((label, critical), total)| {
            view! {
                <div class="flex flex-col items-center h-full gap-1 min-w-16">
                    <div class="flex items-end gap-1 h-full">
                        <Bar value=critical max=max color="bg-error" title=format!("{} critical", critical) />
                        <Bar value=total max=max color="bg-primary" title=format!("{} total", total) />
                    </div>
                    <span class="text-xs truncate max-w-24" title=label.clone()>{label.clone()}</span>
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="space-y-2">
            <div class="flex items-end gap-6 h-56 overflow-x-auto px-2" role="img" aria-label="Report comparison">
                {groups}
            </div>
            <div class="flex gap-4 text-xs">
                <span class="flex items-center gap-1"><span class="w-3 h-3 bg-error inline-block rounded"></span>"Critical issues"</span>
                <span class="flex items-center gap-1"><span class="w-3 h-3 bg-primary inline-block rounded"></span>"Total issues"</span>
            </div>
        </div>
    }
}
