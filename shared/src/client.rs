//! 报告服务客户端
//!
//! 每个方法都要求调用方传入刚从会话拿到的令牌：令牌可能过期刷新，
//! 客户端自身从不缓存。所有调用都是一次性的，没有重试和退避，
//! 失败立即交给调用方（界面层决定是否提供重试按钮）。

use crate::error::{ApiError, ApiResult};
use crate::protocol::{
    AnalyzeRequest, ApiRequest, GetReportRequest, GetSettingsRequest, ListUserReportsRequest,
};
use crate::transport::{HttpClient, HttpRequest};
use crate::{
    CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, Report, Settings,
};

/// 没有写协议时补上的默认协议
pub const DEFAULT_SCHEME: &str = "http://";

/// 规范化用户输入的 URL
///
/// 去掉首尾空白；没有 `scheme://` 前缀时补上 `http://`。
/// 空输入返回 `ValidationError`。
pub fn normalize_url(input: &str) -> ApiResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Please enter a website URL to analyze."));
    }
    if has_scheme(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}{}", DEFAULT_SCHEME, trimmed))
    }
}

fn has_scheme(s: &str) -> bool {
    match s.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// 报告服务客户端
///
/// 通过泛型 `C: HttpClient` 与具体传输层解耦：
/// 浏览器里用 gloo-net，测试里用内存 mock。
#[derive(Clone, Debug)]
pub struct ReportClient<C: HttpClient> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> ReportClient<C> {
    pub fn new(base_url: impl Into<String>, http: C) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 通用调用流程：构建请求 -> 发送 -> 分类错误 -> 解析响应
    async fn call<R: ApiRequest>(&self, req: &R, token: &str) -> ApiResult<R::Response> {
        let mut http_req = HttpRequest::new(&self.url(&req.path()), R::METHOD)
            .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
            .with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));

        if R::METHOD.has_body() {
            http_req = http_req.with_body(serde_json::to_string(req).map_err(|e| {
                ApiError::validation(format!("Could not encode request: {}", e))
            })?);
        }

        let resp = self.http.send(http_req).await?;
        if !resp.ok() {
            return Err(ApiError::from_response(&resp));
        }

        Ok(R::decode(&resp.body)?)
    }

    /// 提交 URL 进行分析
    pub async fn submit_analysis(&self, url: &str, token: &str) -> ApiResult<Report> {
        let url = normalize_url(url).map_err(|e| e.in_op("submit_analysis"))?;
        let req = AnalyzeRequest { url };
        self.call(&req, token)
            .await
            .map_err(|e| e.in_op_with("submit_analysis", req.url.clone()))
    }

    /// 获取单份报告，404 返回 `NotFound`
    pub async fn fetch_report(&self, id: &str, token: &str) -> ApiResult<Report> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::validation("Report ID is missing.").in_op("fetch_report"));
        }
        let req = GetReportRequest { id: id.to_string() };
        self.call(&req, token)
            .await
            .map_err(|e| e.in_op_with("fetch_report", id))
    }

    /// 获取某个用户的全部报告；没有报告时返回空列表而不是错误
    pub async fn fetch_reports_for_principal(
        &self,
        principal_id: &str,
        token: &str,
    ) -> ApiResult<Vec<Report>> {
        let principal_id = principal_id.trim();
        if principal_id.is_empty() {
            return Err(ApiError::validation("No signed-in user to load reports for.")
                .in_op("fetch_reports_for_principal"));
        }
        let req = ListUserReportsRequest {
            principal_id: principal_id.to_string(),
        };
        self.call(&req, token)
            .await
            .map_err(|e| e.in_op_with("fetch_reports_for_principal", principal_id))
    }

    pub async fn fetch_settings(&self, token: &str) -> ApiResult<Settings> {
        self.call(&GetSettingsRequest, token)
            .await
            .map_err(|e| e.in_op("fetch_settings"))
    }

    pub async fn save_settings(&self, settings: &Settings, token: &str) -> ApiResult<()> {
        self.call(settings, token)
            .await
            .map_err(|e| e.in_op("save_settings"))
    }
}

// =========================================================
// 单元测试
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::transport::{HttpMethod, HttpResponse, TransportError};
    use crate::Theme;
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// 按顺序返回预设结果，并记录收到的请求
    #[derive(Default)]
    struct MockHttp {
        sent: RefCell<Vec<HttpRequest>>,
        replies: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    }

    impl MockHttp {
        fn replying(status: u16, status_text: &str, body: &str) -> Self {
            let mock = Self::default();
            mock.replies.borrow_mut().push_back(Ok(HttpResponse {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }));
            mock
        }

        fn unreachable() -> Self {
            let mock = Self::default();
            mock.replies
                .borrow_mut()
                .push_back(Err(TransportError("TypeError: Failed to fetch".into())));
            mock
        }
    }

    #[async_trait(?Send)]
    impl HttpClient for MockHttp {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.borrow_mut().push(req);
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no reply queued".into())))
        }
    }

    const REPORT_JSON: &str = r#"{
        "_id": "r1",
        "url": "http://example.com",
        "timestamp": "2024-05-01T10:00:00Z",
        "summary": {"total_issues": 3, "critical": 1, "moderate": 1, "minor": 1, "score": 72},
        "issues": []
    }"#;

    fn client(mock: MockHttp) -> ReportClient<MockHttp> {
        ReportClient::new("https://api.example.org/api/", mock)
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com").unwrap(), "http://example.com");
        assert_eq!(normalize_url("  https://a.org/x ").unwrap(), "https://a.org/x");
        assert_eq!(normalize_url("localhost:8080").unwrap(), "http://localhost:8080");
        assert_eq!(
            normalize_url("example.com/?next=https://b.org").unwrap(),
            "http://example.com/?next=https://b.org"
        );
        let err = normalize_url("   ").unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_submit_analysis_prefixes_scheme() {
        let c = client(MockHttp::replying(200, "OK", REPORT_JSON));

        let report = c.submit_analysis("example.com", "tok").await.unwrap();
        assert_eq!(report.id, "r1");
        assert_eq!(report.summary.score_percent(), Some(72));

        let sent = c.http.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://api.example.org/api/analyze");
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].header("Authorization"), Some("Bearer tok"));
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"url":"http://example.com"}"#));
    }

    #[tokio::test]
    async fn test_empty_url_never_hits_network() {
        let c = client(MockHttp::default());
        let err = c.submit_analysis("", "tok").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert!(c.http.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_surfaces_auth_error() {
        let c = client(MockHttp::replying(401, "Unauthorized", r#"{"detail":"Invalid token"}"#));
        let err = c.fetch_settings("stale").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Auth);
        assert!(err.requires_sign_in());
    }

    #[tokio::test]
    async fn test_missing_report_is_not_found() {
        let c = client(MockHttp::replying(404, "Not Found", r#"{"detail":"Report not found"}"#));
        let err = c.fetch_report("missing-id", "tok").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.spans()[0].detail.as_deref(), Some("missing-id"));
        assert_eq!(
            c.http.sent.borrow()[0].url,
            "https://api.example.org/api/reports/missing-id"
        );
    }

    #[tokio::test]
    async fn test_network_failure_is_distinguished() {
        let c = client(MockHttp::unreachable());
        let err = c.fetch_report("r1", "tok").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_backend_error_uses_status_text_fallback() {
        let c = client(MockHttp::replying(500, "Internal Server Error", "Traceback ..."));
        let err = c.submit_analysis("https://a.org", "tok").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Backend);
        assert_eq!(err.message(), "500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_backend_error() {
        let c = client(MockHttp::replying(200, "OK", "<html></html>"));
        let err = c.fetch_report("r1", "tok").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Backend);
    }

    #[tokio::test]
    async fn test_principal_without_reports_gets_empty_list() {
        let c = client(MockHttp::replying(200, "OK", "[]"));
        let reports = c.fetch_reports_for_principal("uid-1", "tok").await.unwrap();
        assert!(reports.is_empty());
        assert_eq!(
            c.http.sent.borrow()[0].url,
            "https://api.example.org/api/reports/user/uid-1"
        );
    }

    #[tokio::test]
    async fn test_save_settings_sends_put() {
        let c = client(MockHttp::replying(200, "OK", r#"{"message":"ok"}"#));
        let settings = Settings {
            email_notifications: true,
            theme: Theme::Dark,
        };
        c.save_settings(&settings, "tok").await.unwrap();

        let sent = c.http.sent.borrow();
        assert_eq!(sent[0].method, HttpMethod::Put);
        assert_eq!(sent[0].url, "https://api.example.org/api/settings");
        assert_eq!(
            sent[0].body.as_deref(),
            Some(r#"{"emailNotifications":true,"theme":"Dark"}"#)
        );
    }

    #[tokio::test]
    async fn test_get_requests_have_no_body() {
        let c = client(MockHttp::replying(200, "OK", r#"{"theme":"Light"}"#));
        let settings = c.fetch_settings("tok").await.unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert!(c.http.sent.borrow()[0].body.is_none());
    }
}
