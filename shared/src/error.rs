use std::fmt;

use serde::Deserialize;

use crate::transport::{HttpResponse, TransportError};

// =========================================================
// 错误类型枚举
// =========================================================

/// 报告服务调用的错误分类
///
/// 每种分类对应界面上不同的处理方式：
/// - `Auth`: 跳转登录
/// - `Network` / `Backend`: 显示重试按钮
/// - `NotFound`: 显示 "未找到" 状态
/// - `Validation`: 在发请求前就被拦下，直接提示用户修改输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 输入为空或格式错误（未发出任何网络请求）
    Validation,
    /// 401: 后端拒绝了凭据
    Auth,
    /// 404: 资源不存在或不属于当前用户
    NotFound,
    /// 请求根本没有到达后端（断网、CORS、DNS……）
    Network,
    /// 其它非 2xx 响应，或成功响应体无法解析
    Backend,
}

impl ApiErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Validation => "VALIDATION_ERROR",
            ApiErrorKind::Auth => "AUTH_ERROR",
            ApiErrorKind::NotFound => "NOT_FOUND",
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Backend => "BACKEND_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段，如 `fetch_report(abc123)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    pub operation: String,
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 报告客户端统一错误
///
/// - kind: 错误分类
/// - message: 面向人的错误消息（后端 `detail` 或状态行）
/// - status: 后端 HTTP 状态码（若有）
/// - spans: 调用追踪
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    spans: Vec<ErrorSpan>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Backend, message)
    }

    /// 将非 2xx 响应归类
    ///
    /// 401 -> Auth，404 -> NotFound，其余 -> Backend。
    /// 消息优先取结构化响应体中的 `detail`，否则退回状态行。
    pub fn from_response(resp: &HttpResponse) -> Self {
        let message = extract_detail(&resp.body).unwrap_or_else(|| resp.status_line());
        let kind = match resp.status {
            401 => ApiErrorKind::Auth,
            404 => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Backend,
        };
        Self {
            status: Some(resp.status),
            ..Self::new(kind, message)
        }
    }

    // --- Context builders ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    /// 是否需要重新登录
    pub fn requires_sign_in(&self) -> bool {
        self.kind == ApiErrorKind::Auth
    }

    /// 界面是否应提供 "重试" 按钮
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Network | ApiErrorKind::Backend)
    }

    /// 展示给用户的消息
    pub fn user_message(&self) -> String {
        match self.kind {
            ApiErrorKind::Validation => self.message.clone(),
            ApiErrorKind::Auth => {
                "Your session has expired or is no longer valid. Please log in again.".to_string()
            }
            ApiErrorKind::NotFound => {
                "The requested resource was not found or you do not have permission to view it."
                    .to_string()
            }
            ApiErrorKind::Network => format!(
                "Could not reach the analysis service ({}). Check your connection, the backend \
                 address, or the server's CORS configuration, then try again.",
                self.message
            ),
            ApiErrorKind::Backend => format!("The analysis service reported an error: {}", self.message),
        }
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::network(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::backend(format!("Malformed response from server: {}", e))
    }
}

// =========================================================
// 结构化错误响应体
// =========================================================

/// FastAPI 风格的错误响应：`{"detail": "..."}` 或 `{"detail": [{"msg": "..."}]}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Items(Vec<ErrorItem>),
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    msg: String,
}

fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let text = match parsed.detail? {
        ErrorDetail::Text(text) => text,
        ErrorDetail::Items(items) => items
            .into_iter()
            .map(|i| i.msg)
            .collect::<Vec<_>>()
            .join("; "),
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, status_text: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_unauthorized_maps_to_auth() {
        let err = ApiError::from_response(&response(401, "Unauthorized", r#"{"detail":"Token expired"}"#));
        assert_eq!(err.kind, ApiErrorKind::Auth);
        assert_eq!(err.message(), "Token expired");
        assert!(err.requires_sign_in());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_found_is_distinct() {
        let err = ApiError::from_response(&response(404, "Not Found", ""));
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn test_backend_detail_list_is_joined() {
        let body = r#"{"detail":[{"msg":"field required"},{"msg":"invalid url"}]}"#;
        let err = ApiError::from_response(&response(422, "Unprocessable Entity", body));
        assert_eq!(err.kind, ApiErrorKind::Backend);
        assert_eq!(err.message(), "field required; invalid url");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status_line() {
        let err = ApiError::from_response(&response(502, "Bad Gateway", "<html>oops</html>"));
        assert_eq!(err.message(), "502 Bad Gateway");

        let err = ApiError::from_response(&response(500, "", r#"{"detail":""}"#));
        assert_eq!(err.message(), "HTTP 500");
    }

    #[test]
    fn test_display_includes_trace() {
        let err = ApiError::network("connection refused")
            .in_op_with("fetch_report", "abc")
            .in_op("report_detail");
        assert_eq!(
            err.to_string(),
            "[NETWORK_ERROR] connection refused | trace: fetch_report(abc) -> report_detail"
        );
        assert!(err.user_message().contains("CORS"));
    }
}
