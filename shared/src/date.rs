//! 时间处理模块
//!
//! 后端返回的报告时间戳是字符串，格式并不统一：
//! - RFC 3339（带时区），如 `2024-05-01T10:00:00Z`
//! - 不带时区的 ISO 8601（Python `datetime.isoformat()`），按 UTC 处理
//! - 纯日期 `2024-05-01`
//!
//! 这里统一解析为 `DateTime<Utc>`，解析失败返回 `None`。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// 解析报告时间戳
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 格式化为日期（`2024-05-01`），无法解析时返回 "N/A"
pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// 格式化为日期时间（`2024-05-01 10:00 UTC`），无法解析时原样返回
pub fn format_datetime(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-05-01T12:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_naive_python_isoformat() {
        let dt = parse_timestamp("2024-05-01T10:00:00.123456").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn test_parse_date_only() {
        assert!(parse_timestamp("2024-05-01").is_some());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert_eq!(format_date("yesterday"), "N/A");
        assert_eq!(format_datetime("yesterday"), "yesterday");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_date("2024-05-01T10:00:00Z"), "2024-05-01");
        assert_eq!(format_datetime("2024-05-01T10:00:00Z"), "2024-05-01 10:00 UTC");
    }
}
