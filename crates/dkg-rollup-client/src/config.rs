//! Client configuration

use std::time::Duration;

/// Exponential backoff for transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }
}

/// Chain API configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the chain API (e.g., "http://localhost:8080")
    pub base_url: String,
    /// Bearer token, if the API requires one
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::local()
    }
}

impl ClientConfig {
    /// Create a config for local development
    pub fn local() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a config for a remote testnet API
    pub fn testnet(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: Some(api_key.to_string()),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy {
                max_attempts: 8,
                initial_backoff: Duration::from_millis(500),
                max_backoff: Duration::from_secs(30),
            },
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(700),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(700));
        assert_eq!(policy.backoff_for(40), Duration::from_millis(700));
    }

    #[test]
    fn test_presets() {
        assert!(ClientConfig::local().api_key.is_none());
        let testnet = ClientConfig::testnet("https://api.example", "key");
        assert_eq!(testnet.api_key.as_deref(), Some("key"));
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
