//! 仪表盘与结果页的派生数据
//!
//! 全部是纯函数：由界面在状态变化后显式调用，不依赖任何响应式机制。

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::date::parse_timestamp;
use crate::{DisplayBucket, Issue, Report, SEVERITY_ALL};

/// 最近一次分析的报告
#[derive(Debug, Clone, PartialEq)]
pub struct RecentReport {
    pub id: String,
    pub url: String,
    pub timestamp: String,
    /// 时间戳无法解析时为 None
    pub parsed: Option<DateTime<Utc>>,
}

/// 仪表盘汇总指标（派生数据，不持久化）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardMetrics {
    pub reports_analyzed: usize,
    pub critical_issues: u64,
    pub total_issues: u64,
    pub most_recent: Option<RecentReport>,
}

/// 一次左到右的归约
///
/// "最近" 按解析后的时间戳取最大值，相等时保留先遇到的。
/// 可解析的时间戳总是优先于无法解析的。
pub fn compute_overall_metrics(reports: &[Report]) -> DashboardMetrics {
    reports
        .iter()
        .fold(DashboardMetrics::default(), |mut acc, report| {
            acc.reports_analyzed += 1;
            acc.critical_issues += report.summary.critical;
            acc.total_issues += report.summary.total_issues;

            let parsed = parse_timestamp(&report.timestamp);
            let replace = match (&acc.most_recent, parsed) {
                (None, _) => true,
                (Some(current), Some(candidate)) => match current.parsed {
                    Some(best) => candidate > best,
                    None => true,
                },
                (Some(_), None) => false,
            };

            if replace {
                acc.most_recent = Some(RecentReport {
                    id: report.id.clone(),
                    url: report.url.clone(),
                    timestamp: report.timestamp.clone(),
                    parsed,
                });
            }
            acc
        })
}

/// 对比柱状图数据：三个数组按下标一一对应
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub critical: Vec<u64>,
    pub total: Vec<u64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 两个序列中的最大值，用于确定坐标轴高度
    pub fn max_value(&self) -> u64 {
        self.critical
            .iter()
            .chain(self.total.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

/// 按选中的报告 id 构建对比数据
///
/// 输出顺序跟随 `reports`，与 `selected_ids` 的顺序无关。
pub fn build_comparison_series<S: AsRef<str>>(reports: &[Report], selected_ids: &[S]) -> ChartSeries {
    let selected: HashSet<&str> = selected_ids.iter().map(AsRef::as_ref).collect();
    if selected.is_empty() {
        return ChartSeries::default();
    }

    reports
        .iter()
        .filter(|r| selected.contains(r.id.as_str()))
        .fold(ChartSeries::default(), |mut series, r| {
            series.labels.push(r.host_label());
            series.critical.push(r.summary.critical);
            series.total.push(r.summary.total_issues);
            series
        })
}

/// 按严重程度筛选问题（大小写不敏感），"All" 返回全部
pub fn filter_issues_by_severity<'a>(issues: &'a [Issue], severity: &str) -> Vec<&'a Issue> {
    let wanted = severity.trim();
    if wanted.eq_ignore_ascii_case(SEVERITY_ALL) {
        return issues.iter().collect();
    }
    issues
        .iter()
        .filter(|i| i.severity.trim().eq_ignore_ascii_case(wanted))
        .collect()
}

/// 各展示分组中的问题数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityDistribution {
    pub critical: u64,
    pub moderate: u64,
    pub minor: u64,
    pub neutral: u64,
}

impl SeverityDistribution {
    pub fn total(&self) -> u64 {
        self.critical + self.moderate + self.minor + self.neutral
    }
}

pub fn severity_distribution(issues: &[Issue]) -> SeverityDistribution {
    issues
        .iter()
        .fold(SeverityDistribution::default(), |mut d, issue| {
            match issue.bucket() {
                DisplayBucket::Critical => d.critical += 1,
                DisplayBucket::Moderate => d.moderate += 1,
                DisplayBucket::Minor => d.minor += 1,
                DisplayBucket::Neutral => d.neutral += 1,
            }
            d
        })
}

/// 最近的 `limit` 份报告，按时间倒序（无法解析的时间排在最后）
pub fn most_recent_reports(reports: &[Report], limit: usize) -> Vec<&Report> {
    let mut sorted: Vec<(&Report, Option<DateTime<Utc>>)> = reports
        .iter()
        .map(|r| (r, parse_timestamp(&r.timestamp)))
        .collect();
    // 稳定排序，时间相同的保持原顺序
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted.into_iter().take(limit).map(|(r, _)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Summary;

    fn report(id: &str, url: &str, ts: &str, critical: u64, total: u64) -> Report {
        Report {
            id: id.into(),
            url: url.into(),
            timestamp: ts.into(),
            page_title: None,
            summary: Summary {
                total_issues: total,
                critical,
                ..Default::default()
            },
            issues: vec![],
            ai_suggestion: None,
        }
    }

    fn issue(severity: &str) -> Issue {
        Issue {
            description: format!("{} issue", severity),
            severity: severity.into(),
            help: String::new(),
            nodes: vec![],
            ai_suggestions: None,
        }
    }

    fn sample() -> Vec<Report> {
        vec![
            report("a", "https://alpha.org/x", "2024-03-01T00:00:00Z", 2, 10),
            report("b", "https://beta.org", "2024-05-01T00:00:00Z", 1, 4),
            report("c", "not-a-url", "2024-01-01T00:00:00Z", 0, 3),
        ]
    }

    #[test]
    fn test_empty_metrics() {
        let m = compute_overall_metrics(&[]);
        assert_eq!(m, DashboardMetrics::default());
        assert!(m.most_recent.is_none());
    }

    #[test]
    fn test_metrics_are_order_independent() {
        let forward = sample();
        let mut backward = sample();
        backward.reverse();
        let mut rotated = sample();
        rotated.rotate_left(1);

        for reports in [&forward, &backward, &rotated] {
            let m = compute_overall_metrics(reports);
            assert_eq!(m.reports_analyzed, 3);
            assert_eq!(m.critical_issues, 3);
            assert_eq!(m.total_issues, 17);
            assert_eq!(m.most_recent.as_ref().unwrap().id, "b");
        }
    }

    #[test]
    fn test_most_recent_tie_keeps_first() {
        let reports = vec![
            report("first", "https://a.org", "2024-05-01T00:00:00Z", 0, 0),
            report("second", "https://b.org", "2024-05-01T00:00:00Z", 0, 0),
        ];
        let m = compute_overall_metrics(&reports);
        assert_eq!(m.most_recent.unwrap().id, "first");
    }

    #[test]
    fn test_parseable_timestamp_beats_unparseable() {
        let reports = vec![
            report("bad", "https://a.org", "garbage", 0, 0),
            report("good", "https://b.org", "2020-01-01T00:00:00Z", 0, 0),
        ];
        assert_eq!(compute_overall_metrics(&reports).most_recent.unwrap().id, "good");

        let only_bad = vec![report("bad", "https://a.org", "garbage", 0, 0)];
        let recent = compute_overall_metrics(&only_bad).most_recent.unwrap();
        assert_eq!(recent.url, "https://a.org");
        assert!(recent.parsed.is_none());
    }

    #[test]
    fn test_empty_selection_gives_empty_series() {
        let empty: [&str; 0] = [];
        let series = build_comparison_series(&sample(), &empty);
        assert!(series.is_empty());
        assert!(series.critical.is_empty() && series.total.is_empty());
    }

    #[test]
    fn test_series_follow_report_order() {
        let series = build_comparison_series(&sample(), &["c", "a", "missing"]);
        assert_eq!(series.labels, vec!["alpha.org", "not-a-url"]);
        assert_eq!(series.critical, vec![2, 0]);
        assert_eq!(series.total, vec![10, 3]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.max_value(), 10);
    }

    #[test]
    fn test_series_lengths_always_match() {
        let reports = sample();
        let selections: [&[&str]; 4] = [&["a"], &["a", "b"], &["a", "b", "c"], &["zzz"]];
        for sel in selections {
            let s = build_comparison_series(&reports, sel);
            assert_eq!(s.labels.len(), s.critical.len());
            assert_eq!(s.labels.len(), s.total.len());
            let expected = reports.iter().filter(|r| sel.contains(&r.id.as_str())).count();
            assert_eq!(s.len(), expected);
        }
    }

    #[test]
    fn test_filter_all_returns_input() {
        let issues = vec![issue("minor"), issue("Critical"), issue("weird")];
        let all = filter_issues_by_severity(&issues, "All");
        assert_eq!(all.len(), 3);
        assert!(all.iter().zip(issues.iter()).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let issues = vec![
            issue("Critical"),
            issue("CRITICAL"),
            issue("serious"),
            issue("critical"),
            issue("minor"),
        ];
        let critical = filter_issues_by_severity(&issues, "critical");
        assert_eq!(critical.len(), 3);
        assert!(critical.iter().all(|i| i.severity.eq_ignore_ascii_case("critical")));
    }

    #[test]
    fn test_severity_distribution() {
        let issues = vec![issue("serious"), issue("Critical"), issue("moderate"), issue("??")];
        let d = severity_distribution(&issues);
        assert_eq!(d.critical, 2);
        assert_eq!(d.moderate, 1);
        assert_eq!(d.minor, 0);
        assert_eq!(d.neutral, 1);
        assert_eq!(d.total(), 4);
    }

    #[test]
    fn test_most_recent_reports_limit_and_order() {
        let reports = sample();
        let recent = most_recent_reports(&reports, 2);
        let ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
