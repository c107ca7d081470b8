//! User Settings Model
//!
//! 按用户邮箱存储的偏好设置，更新时做 JSON 深度合并 (last write wins)。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileSettings {
    pub name: String,
    pub phone: String,
    pub business_name: String,
    pub business_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub order_updates: bool,
    pub marketing_emails: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: false,
            push_notifications: true,
            order_updates: true,
            marketing_emails: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecuritySettings {
    pub two_factor_enabled: bool,
    pub session_timeout_minutes: u32,
    pub login_alerts: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_enabled: false,
            session_timeout_minutes: 30,
            login_alerts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceSettings {
    pub theme: String,
    pub language: String,
    pub timezone: String,
    pub date_format: String,
    /// 0 = never auto-complete picked up orders
    pub auto_complete_minutes: u32,
    pub default_view: String,
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            language: "en".to_string(),
            timezone: "UTC".to_string(),
            date_format: "MM/DD/YYYY".to_string(),
            auto_complete_minutes: 0,
            default_view: "orders".to_string(),
        }
    }
}

/// Settings bag for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub email: String,
    pub profile: ProfileSettings,
    pub notifications: NotificationSettings,
    pub security: SecuritySettings,
    pub preferences: PreferenceSettings,
    pub updated_at: i64,
}

impl UserSettings {
    pub fn defaults_for(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: UserSettings =
            serde_json::from_str(r#"{"email":"a@b.co","preferences":{"theme":"dark"}}"#).unwrap();
        assert_eq!(s.preferences.theme, "dark");
        assert_eq!(s.preferences.language, "en");
        assert!(s.notifications.email_notifications);
        assert_eq!(s.security.session_timeout_minutes, 30);
    }
}
