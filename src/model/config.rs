use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::toast::ToastKind;

/// Configuration from taskboard.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub toasts: ToastConfig,
    #[serde(default)]
    pub auth: AuthMessages,
}

/// Longest accepted inactivity timeout (one week)
pub const MAX_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

/// Error type for invalid settings values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("session.timeout_minutes must be at least 1")]
    ZeroTimeout,
    #[error("session.timeout_minutes must be at most {max}", max = MAX_TIMEOUT_MINUTES)]
    TimeoutTooLong,
    #[error("session.activity_throttle_ms must be at least 1")]
    ZeroThrottle,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.session.timeout_minutes == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        if self.session.timeout_minutes > MAX_TIMEOUT_MINUTES {
            return Err(SettingsError::TimeoutTooLong);
        }
        if self.session.activity_throttle_ms == 0 {
            return Err(SettingsError::ZeroThrottle);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inactivity before a forced logout
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,
    /// Minimum spacing between two activity-driven timer resets
    #[serde(default = "default_activity_throttle_ms")]
    pub activity_throttle_ms: u64,
    /// How long before logout the warning fires (only when the timeout is longer)
    #[serde(default = "default_warning_lead_minutes")]
    pub warning_lead_minutes: u64,
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_minutes.saturating_mul(60))
    }

    pub fn activity_throttle(&self) -> Duration {
        Duration::from_millis(self.activity_throttle_ms)
    }

    /// Offset of the warning from the start of the window, if one is due
    pub fn warning_after(&self) -> Option<Duration> {
        if self.timeout_minutes > self.warning_lead_minutes && self.warning_lead_minutes > 0 {
            Some(Duration::from_secs(
                (self.timeout_minutes - self.warning_lead_minutes).saturating_mul(60),
            ))
        } else {
            None
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            timeout_minutes: default_timeout_minutes(),
            activity_throttle_ms: default_activity_throttle_ms(),
            warning_lead_minutes: default_warning_lead_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastConfig {
    /// Dwell time for success, warning and info toasts
    #[serde(default = "default_toast_ms")]
    pub default_duration_ms: u64,
    /// Dwell time for error toasts
    #[serde(default = "default_error_toast_ms")]
    pub error_duration_ms: u64,
    /// Shown when a failure carries no usable message
    #[serde(default = "default_fallback_error_message")]
    pub fallback_error_message: String,
}

impl ToastConfig {
    pub fn duration_for(&self, kind: ToastKind) -> Duration {
        match kind {
            ToastKind::Error => Duration::from_millis(self.error_duration_ms),
            ToastKind::Success | ToastKind::Warning | ToastKind::Info => {
                Duration::from_millis(self.default_duration_ms)
            }
        }
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        ToastConfig {
            default_duration_ms: default_toast_ms(),
            error_duration_ms: default_error_toast_ms(),
            fallback_error_message: default_fallback_error_message(),
        }
    }
}

/// Response bodies for denied requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMessages {
    #[serde(default = "default_unauthenticated_message")]
    pub unauthenticated_message: String,
    #[serde(default = "default_forbidden_message")]
    pub forbidden_message: String,
}

impl Default for AuthMessages {
    fn default() -> Self {
        AuthMessages {
            unauthenticated_message: default_unauthenticated_message(),
            forbidden_message: default_forbidden_message(),
        }
    }
}

/// Defaults mirror the template written by `tb init`
fn default_timeout_minutes() -> u64 {
    30
}

fn default_activity_throttle_ms() -> u64 {
    1000
}

fn default_warning_lead_minutes() -> u64 {
    1
}

fn default_toast_ms() -> u64 {
    5000
}

fn default_error_toast_ms() -> u64 {
    7000
}

fn default_fallback_error_message() -> String {
    "An unexpected error occurred".to_string()
}

fn default_unauthenticated_message() -> String {
    "Authentication required".to_string()
}

fn default_forbidden_message() -> String {
    "Permission denied".to_string()
}
