/// 未配置时使用的后端地址（本地开发）
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// 后端 API 地址配置
///
/// 优先级：运行时覆盖 > 构建时注入 > 默认值。空白值视为未设置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn resolve(runtime_override: Option<&str>, build_time: Option<&str>) -> Self {
        let base_url = [runtime_override, build_time]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        Self { base_url }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(ApiConfig::default().base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_precedence_and_trimming() {
        let c = ApiConfig::resolve(Some(" https://staging.example.org/api/ "), Some("https://prod"));
        assert_eq!(c.base_url, "https://staging.example.org/api");

        let c = ApiConfig::resolve(Some("   "), Some("https://prod.example.org/api"));
        assert_eq!(c.base_url, "https://prod.example.org/api");

        let c = ApiConfig::resolve(None, Some(""));
        assert_eq!(c.base_url, DEFAULT_API_BASE_URL);
    }
}
