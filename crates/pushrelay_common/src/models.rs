// --- File: crates/pushrelay_common/src/models.rs ---

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Push platform a device token belongs to.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Android, Platform::Ios, Platform::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `android`, `ios`, `web`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPlatform(pub String);

impl fmt::Display for InvalidPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid platform: {}", self.0)
    }
}

impl std::error::Error for InvalidPlatform {}

impl FromStr for Platform {
    type Err = InvalidPlatform;

    /// Matching is exact: `"Android"` is not a platform.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            other => Err(InvalidPlatform(other.to_string())),
        }
    }
}

/// Device metadata sent by a client asking for a server-issued token.
///
/// Fields are kept as plain strings so that a missing or unknown value can be
/// reported as a validation failure instead of a body parse failure.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub user_id: String,
    pub platform: String,
    pub device_model: String,
    pub os_version: String,
    pub app_version: String,
    pub device_id: String,
    pub installation_id: String,
}

/// One device's registered push-delivery credential.
///
/// Addressed in the store by `(user_id, platform, device_id)`. Re-registering
/// the same address replaces the whole record.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTokenRecord {
    pub token: String,
    pub user_id: String,
    pub platform: Platform,
    pub device_model: String,
    pub os_version: String,
    pub app_version: String,
    pub device_id: String,
    pub installation_id: String,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl DeviceTokenRecord {
    /// Builds a record from already validated device metadata.
    pub fn from_device_info(
        token: String,
        platform: Platform,
        info: &DeviceInfo,
        generated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token,
            user_id: info.user_id.clone(),
            platform,
            device_model: info.device_model.clone(),
            os_version: info.os_version.clone(),
            app_version: info.app_version.clone(),
            device_id: info.device_id.clone(),
            installation_id: info.installation_id.clone(),
            generated_at,
            expires_at,
        }
    }

    /// The device metadata part of the record, in wire form.
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            user_id: self.user_id.clone(),
            platform: self.platform.to_string(),
            device_model: self.device_model.clone(),
            os_version: self.os_version.clone(),
            app_version: self.app_version.clone(),
            device_id: self.device_id.clone(),
            installation_id: self.installation_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_platform_parse() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>(), Ok(platform));
        }
        assert_eq!(
            "windows".parse::<Platform>(),
            Err(InvalidPlatform("windows".to_string()))
        );
        assert!("iOS".parse::<Platform>().is_err());
    }

    #[test]
    fn test_record_json_shape() {
        let generated_at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let record = DeviceTokenRecord {
            token: "fcm-abc".into(),
            user_id: "u1".into(),
            platform: Platform::Ios,
            device_model: "iPhone 14".into(),
            os_version: "iOS 17.0".into(),
            app_version: "1.0.0".into(),
            device_id: "dev-1".into(),
            installation_id: "inst-1".into(),
            generated_at,
            expires_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["platform"], "ios");
        assert_eq!(value["generated_at"], "2025-03-01T12:00:00Z");
        assert_eq!(value["expires_at"], "2026-03-01T12:00:00Z");
        assert_eq!(record.device_info().platform, "ios");
    }

    #[test]
    fn test_device_info_missing_fields_default_to_empty() {
        let info: DeviceInfo = serde_json::from_str(r#"{"user_id":"u1"}"#).unwrap();
        assert_eq!(info.user_id, "u1");
        assert!(info.platform.is_empty());
        assert!(info.installation_id.is_empty());
    }
}
