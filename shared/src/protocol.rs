use crate::transport::HttpMethod;
use crate::{Report, Settings};
use serde::{Serialize, de::DeserializeOwned};

/// 描述一个后端端点：请求体、路径、方法以及响应类型
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// 相对于 API 根地址的路径
    fn path(&self) -> String;

    /// 解析成功响应体，个别端点需要覆盖（如无响应体）
    fn decode(body: &str) -> serde_json::Result<Self::Response> {
        serde_json::from_str(body)
    }
}

/// 路径片段转义，防止 id 中的 `/`、`?` 破坏路径
fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

// =========================================================
// Request Definitions
// =========================================================

/// 提交 URL 进行分析
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

impl ApiRequest for AnalyzeRequest {
    type Response = Report;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/analyze".to_string()
    }
}

/// 获取单份报告
#[derive(Debug, Clone, Serialize)]
pub struct GetReportRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for GetReportRequest {
    type Response = Report;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/reports/{}", segment(&self.id))
    }
}

/// 获取某个用户的全部报告
#[derive(Debug, Clone, Serialize)]
pub struct ListUserReportsRequest {
    #[serde(skip)]
    pub principal_id: String,
}

impl ApiRequest for ListUserReportsRequest {
    type Response = Vec<Report>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/reports/user/{}", segment(&self.principal_id))
    }

    /// 空响应体或 `null` 视为没有报告
    fn decode(body: &str) -> serde_json::Result<Self::Response> {
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str::<Option<Vec<Report>>>(body).map(Option::unwrap_or_default)
    }
}

/// 读取当前用户设置
#[derive(Debug, Clone, Serialize)]
pub struct GetSettingsRequest;

impl ApiRequest for GetSettingsRequest {
    type Response = Settings;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/settings".to_string()
    }

    /// 空响应体视为默认设置
    fn decode(body: &str) -> serde_json::Result<Self::Response> {
        if body.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_json::from_str::<Option<Settings>>(body).map(Option::unwrap_or_default)
    }
}

/// 保存设置（请求体即 Settings 本身）
impl ApiRequest for Settings {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        "/settings".to_string()
    }

    /// 后端返回的确认消息不关心
    fn decode(_body: &str) -> serde_json::Result<Self::Response> {
        Ok(())
    }
}
