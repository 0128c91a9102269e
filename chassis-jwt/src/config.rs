// Auth configuration

use chrono::Duration;

/// Fallback token lifetime when the configured value is unusable.
const DEFAULT_EFFECTIVE_MINUTES: i64 = 2 * 60;

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret.
    pub secret: String,
    /// Token lifetime in minutes.
    pub effective_minutes: i64,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            effective_minutes: DEFAULT_EFFECTIVE_MINUTES,
        }
    }

    pub fn with_effective_minutes(mut self, minutes: i64) -> Self {
        self.effective_minutes = minutes;
        self
    }

    /// The effective token lifetime. A misconfigured (non-positive) value
    /// falls back to two hours.
    pub fn effective_duration(&self) -> Duration {
        let minutes = if self.effective_minutes > 0 {
            self.effective_minutes
        } else {
            DEFAULT_EFFECTIVE_MINUTES
        };
        Duration::minutes(minutes)
    }
}
