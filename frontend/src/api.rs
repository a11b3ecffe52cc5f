//! 报告服务的浏览器端接入
//!
//! - `GlooHttpClient`: 基于 gloo-net 的 `HttpClient` 实现
//! - `ApiContext`: 通过 Context 共享的 `ReportClient`
//! - `ScreenError`: 页面边界上的错误处理（记录日志、认证失效时登出、生成提示）

use std::future::Future;
use std::sync::Arc;

use a11y_analyzer_shared::transport::{
    HttpClient, HttpMethod, HttpRequest, HttpResponse, TransportError,
};
use a11y_analyzer_shared::{ApiError, ApiErrorKind, ApiResult, ReportClient};
use async_trait::async_trait;
use gloo_net::http::{Method, RequestBuilder};
use leptos::logging::error;
use leptos::prelude::*;

use crate::auth::{SessionContext, expire_session, fresh_token};

// =========================================================
// 传输层
// =========================================================

/// 浏览器 fetch 传输
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooHttpClient;

fn to_gloo_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait(?Send)]
impl HttpClient for GlooHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = RequestBuilder::new(&req.url).method(to_gloo_method(req.method));
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }

        let request = match req.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError(e.to_string()))?;

        let resp = request
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = resp.status();
        let status_text = resp.status_text();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            status_text,
            body,
        })
    }
}

// =========================================================
// Context
// =========================================================

pub type BrowserReportClient = ReportClient<GlooHttpClient>;

#[derive(Clone)]
pub struct ApiContext {
    client: Arc<BrowserReportClient>,
}

impl ApiContext {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Arc::new(ReportClient::new(base_url, GlooHttpClient)),
        }
    }

    pub fn client(&self) -> Arc<BrowserReportClient> {
        Arc::clone(&self.client)
    }
}

pub fn use_api() -> ApiContext {
    use_context::<ApiContext>().expect("ApiContext should be provided")
}

/// 取一个新令牌后执行请求
pub async fn authorized<T, F, Fut>(session: &SessionContext, call: F) -> ApiResult<T>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let token = fresh_token(session).await?;
    call(token).await
}

// =========================================================
// 页面边界的错误处理
// =========================================================

/// 页面上展示的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ScreenError {
    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }
}

impl From<&ApiError> for ScreenError {
    fn from(err: &ApiError) -> Self {
        Self {
            kind: err.kind,
            message: err.user_message(),
            retryable: err.is_retryable(),
        }
    }
}

/// 错误在页面边界被捕获：记录日志，认证失效时登出，返回提示
pub fn handle_error(session: &SessionContext, screen: &str, err: ApiError) -> ScreenError {
    error!("[{}] {}", screen, err);
    if err.requires_sign_in() {
        expire_session(session);
    }
    ScreenError::from(&err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_error_from_api_error() {
        let e = ScreenError::from(&ApiError::network("Failed to fetch"));
        assert_eq!(e.kind, ApiErrorKind::Network);
        assert!(e.retryable);
        assert!(e.message.contains("Failed to fetch"));

        let e = ScreenError::from(&ApiError::not_found("missing"));
        assert!(e.is_not_found());
        assert!(!e.retryable);

        let e = ScreenError::from(&ApiError::validation("Please enter a URL"));
        assert_eq!(e.message, "Please enter a URL");
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_gloo_method(HttpMethod::Put), Method::PUT);
        assert_eq!(to_gloo_method(HttpMethod::Get), Method::GET);
    }
}
