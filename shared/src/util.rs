/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Render a millis timestamp as RFC 3339 UTC (`2024-01-01T00:00:00Z`)
///
/// Out-of-range values render as an empty string.
pub fn millis_to_rfc3339(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// New random resource id (uuid v4)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Settings are keyed by email; compare emails trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_rfc3339() {
        assert_eq!(millis_to_rfc3339(0), "1970-01-01T00:00:00Z");
        assert_eq!(millis_to_rfc3339(1_704_067_200_000), "2024-01-01T00:00:00Z");
        assert_eq!(millis_to_rfc3339(i64::MAX), "");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Chef@Jerk.COM "), "chef@jerk.com");
    }

    #[test]
    fn test_new_id_is_uuid() {
        let id = new_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_ne!(id, new_id());
    }
}
