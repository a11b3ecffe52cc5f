//! 无障碍分析器的共享领域层
//!
//! 不依赖 DOM / wasm-bindgen，可在原生环境下直接 `cargo test`：
//! - 领域模型（报告、问题、设置、用户）
//! - `client`: 报告服务客户端（通过 `transport::HttpClient` 解耦传输层）
//! - `aggregate`: 仪表盘指标与图表数据的纯函数
//! - `session`: 认证状态机

use serde::{Deserialize, Deserializer, Serialize};

pub mod aggregate;
pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use aggregate::{
    ChartSeries, DashboardMetrics, RecentReport, SeverityDistribution, build_comparison_series,
    compute_overall_metrics, filter_issues_by_severity, most_recent_reports, severity_distribution,
};
pub use client::{ReportClient, normalize_url};
pub use config::ApiConfig;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use session::{AuthStatus, SessionEvent, SessionState};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 严重程度筛选的哨兵值：不做任何过滤
pub const SEVERITY_ALL: &str = "All";

// =========================================================
// 用户 (Principal)
// =========================================================

/// 已认证用户的不可变快照
///
/// 由身份提供方在每次认证状态变化时推送，令牌不在此保存，
/// 每次请求前都要重新向会话获取。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
}

impl Principal {
    /// 用于问候语的名称：显示名 > 邮箱 > "User"
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("User")
    }

    /// 头像地址，没有头像时使用按名字生成的占位头像
    pub fn avatar_url(&self) -> String {
        match self.photo_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                let name = self
                    .display_name
                    .as_deref()
                    .or(self.email.as_deref())
                    .unwrap_or("User");
                let encoded: String =
                    url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
                format!(
                    "https://ui-avatars.com/api/?name={}&background=random&color=fff&size=128",
                    encoded
                )
            }
        }
    }
}

// =========================================================
// 严重程度 (Severity)
// =========================================================

/// 问题的严重程度（输入大小写不敏感）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    Serious,
    Moderate,
    Minor,
    Unknown,
}

/// 展示用的颜色/优先级分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayBucket {
    Critical,
    Moderate,
    Minor,
    Neutral,
}

impl Severity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "serious" => Self::Serious,
            "moderate" => Self::Moderate,
            "minor" => Self::Minor,
            _ => Self::Unknown,
        }
    }

    /// 严重程度到展示分组的映射表
    ///
    /// serious 与 critical 同组；未识别的值落入中性分组。
    pub fn bucket(self) -> DisplayBucket {
        match self {
            Self::Critical | Self::Serious => DisplayBucket::Critical,
            Self::Moderate => DisplayBucket::Moderate,
            Self::Minor => DisplayBucket::Minor,
            Self::Unknown => DisplayBucket::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Serious => "Serious",
            Self::Moderate => "Moderate",
            Self::Minor => "Minor",
            Self::Unknown => "Unknown",
        }
    }

    /// 筛选下拉框中可选的严重程度（不含 "All" 哨兵）
    pub const FILTERABLE: [Severity; 4] = [
        Severity::Critical,
        Severity::Serious,
        Severity::Moderate,
        Severity::Minor,
    ];
}

// =========================================================
// 报告 (Report)
// =========================================================

/// 问题涉及的 HTML 节点片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueNode {
    pub html: String,
}

/// 单个问题的 AI 修复建议
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSuggestions {
    #[serde(default)]
    pub short_fix: Option<String>,
    #[serde(default)]
    pub detailed_fix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// 后端原样返回的严重程度字符串，展示与筛选时再解析
    ///
    /// 缺失或为 `null` 时为空串，解析为 [`Severity::Unknown`]。
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub help: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<IssueNode>,
    #[serde(default)]
    pub ai_suggestions: Option<AiSuggestions>,
}

impl Issue {
    pub fn severity_level(&self) -> Severity {
        Severity::parse(&self.severity)
    }

    pub fn bucket(&self) -> DisplayBucket {
        self.severity_level().bucket()
    }
}

/// 报告摘要（规范字段：`total_issues` / `critical` / `moderate` / `minor` / `score`）
///
/// 旧版后端把严重问题数写在 `criticalIssues` 中，
/// 反序列化时通过 [`SummaryWire`] 显式迁移到 `critical`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SummaryWire")]
pub struct Summary {
    pub total_issues: u64,
    pub critical: u64,
    pub moderate: u64,
    pub minor: u64,
    /// 0–100 的可访问性得分（旧报告可能没有）
    pub score: Option<f64>,
}

impl Summary {
    /// 裁剪到 0–100 并取整后的得分
    pub fn score_percent(&self) -> Option<u8> {
        self.score
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 100.0).round() as u8)
    }
}

/// 摘要的线上格式，包含旧字段
#[derive(Debug, Default, Deserialize)]
struct SummaryWire {
    #[serde(default)]
    total_issues: Option<u64>,
    #[serde(default)]
    critical: Option<u64>,
    #[serde(default, rename = "criticalIssues")]
    legacy_critical_issues: Option<u64>,
    #[serde(default)]
    moderate: Option<u64>,
    #[serde(default)]
    minor: Option<u64>,
    #[serde(default)]
    score: Option<f64>,
}

impl From<SummaryWire> for Summary {
    fn from(wire: SummaryWire) -> Self {
        Self {
            total_issues: wire.total_issues.unwrap_or(0),
            // 规范字段优先，缺失时才迁移旧字段
            critical: wire.critical.or(wire.legacy_critical_issues).unwrap_or(0),
            moderate: wire.moderate.unwrap_or(0),
            minor: wire.minor.unwrap_or(0),
            score: wire.score,
        }
    }
}

/// 分析报告
///
/// 反序列化经由 [`ReportWire`]：`_id` 与 `id` 可同时出现，`_id` 优先。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReportWire")]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: String,
    pub url: String,
    /// ISO 8601 时间字符串，解析见 [`date::parse_timestamp`]；缺失时为空串
    pub timestamp: String,
    pub page_title: Option<String>,
    pub summary: Summary,
    pub issues: Vec<Issue>,
    /// 针对整份报告的 AI 建议
    pub ai_suggestion: Option<String>,
}

/// 报告的线上格式
#[derive(Debug, Default, Deserialize)]
struct ReportWire {
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    url: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    page_title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    summary: Summary,
    #[serde(default, deserialize_with = "null_as_default")]
    issues: Vec<Issue>,
    #[serde(default)]
    ai_suggestion: Option<String>,
}

impl From<ReportWire> for Report {
    fn from(wire: ReportWire) -> Self {
        Self {
            id: wire.mongo_id.or(wire.id).unwrap_or_default(),
            url: wire.url,
            timestamp: wire.timestamp.unwrap_or_default(),
            page_title: wire.page_title,
            summary: wire.summary,
            issues: wire.issues,
            ai_suggestion: wire.ai_suggestion,
        }
    }
}

/// 把 `null` 当作缺省值处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Report {
    /// URL 的主机名，无法解析时返回原始 URL
    pub fn host_label(&self) -> String {
        host_or_raw(&self.url)
    }

    /// 报告标题：页面标题 > 主机名
    pub fn title(&self) -> String {
        match self.page_title.as_deref() {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => self.host_label(),
        }
    }
}

pub(crate) fn host_or_raw(raw: &str) -> String {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| raw.to_string())
}

// =========================================================
// 设置 (Settings)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    #[serde(rename = "System Default")]
    SystemDefault,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::SystemDefault];

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::SystemDefault => "System Default",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "emailNotifications", default)]
    pub email_notifications: bool,
    #[serde(default)]
    pub theme: Theme,
}
