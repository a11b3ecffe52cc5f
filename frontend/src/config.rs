//! 运行时配置
//!
//! 构建时通过环境变量注入（Trunk 构建时 `option_env!` 读取），
//! 后端地址还可以在浏览器 LocalStorage 中覆盖，方便同一份产物指向不同环境。

use a11y_analyzer_shared::ApiConfig;
use gloo_storage::{LocalStorage, Storage};
use serde::Serialize;

/// LocalStorage 中后端地址覆盖值的键
pub const STORAGE_API_URL_KEY: &str = "a11y_api_base_url";

/// Firebase Web 配置（公开信息，不是密钥）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub app_id: String,
}

impl FirebaseConfig {
    fn from_build_env() -> Self {
        Self {
            api_key: option_env!("A11Y_FIREBASE_API_KEY").unwrap_or_default().to_string(),
            auth_domain: option_env!("A11Y_FIREBASE_AUTH_DOMAIN")
                .unwrap_or_default()
                .to_string(),
            project_id: option_env!("A11Y_FIREBASE_PROJECT_ID")
                .unwrap_or_default()
                .to_string(),
            app_id: option_env!("A11Y_FIREBASE_APP_ID").unwrap_or_default().to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.auth_domain.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub firebase: FirebaseConfig,
}

impl AppConfig {
    /// 读取配置：LocalStorage 覆盖 > 构建时变量 > 默认值
    pub fn load() -> Self {
        let runtime_override = LocalStorage::get::<String>(STORAGE_API_URL_KEY).ok();
        Self {
            api: ApiConfig::resolve(runtime_override.as_deref(), option_env!("A11Y_API_BASE_URL")),
            firebase: FirebaseConfig::from_build_env(),
        }
    }
}
