use crate::{ClientError, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
pub const DEFAULT_EVALUATION_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(0),
        }
    }

    /// Exponential backoff: base, 2x base, 4x base, ...
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32 << (attempt - 1).min(16);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: Url,
    pub timeout: Duration,
    pub recommendation_limit: usize,
    pub evaluation_k: usize,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(api_base: &str) -> Result<Self> {
        let trimmed = api_base.trim();
        if trimmed.is_empty() {
            return Err(ClientError::InvalidArgument("api base is empty".to_string()));
        }
        Ok(Self {
            api_base: Url::parse(trimmed)?,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_recommendation_limit(mut self, limit: usize) -> Self {
        self.recommendation_limit = limit;
        self
    }

    /// Joins an endpoint path onto the base, keeping any path prefix the
    /// base already carries (e.g. `https://host/api`).
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.api_base.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", prefix, path.trim_start_matches('/')));
        url.set_query(None);
        url
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base is a valid url"),
            timeout: Duration::from_secs(30),
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
            evaluation_k: DEFAULT_EVALUATION_K,
            retry: RetryPolicy::default(),
        }
    }
}
