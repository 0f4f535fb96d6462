use std::future::Future;
use std::time::Duration;

use pw_core::{Error, Result};
use tracing::{error, info, warn};

/// How a single chat-completion attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// The provider answered with a non-success status.
    Status { status: u16, body: String },
    /// The request never produced a response.
    Transport(String),
    /// The provider answered 2xx with a body we could not use.
    Malformed(String),
}

impl AttemptError {
    pub fn status(&self) -> Option<u16> {
        match self {
            AttemptError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn is_auth(&self) -> bool {
        self.status() == Some(401)
    }

    fn is_rate_limit(&self) -> bool {
        self.status() == Some(429)
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Status { status, body } => write!(f, "{} - {}", status, body),
            AttemptError::Transport(message) => write!(f, "network error: {}", message),
            AttemptError::Malformed(message) => write!(f, "malformed response: {}", message),
        }
    }
}

/// Bounded retry with linear backoff. Rate limiting backs off on its own,
/// longer scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget without any waiting.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
        }
    }

    /// Wait before the attempt following failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32, failure: &AttemptError) -> Duration {
        let unit = if failure.is_rate_limit() {
            self.rate_limit_delay
        } else {
            self.base_delay
        };
        unit * attempt
    }

    /// Runs `op` until it succeeds, the budget is spent or the provider
    /// rejects our credentials.
    pub async fn run<F, Fut>(&self, provider: &str, mut op: F) -> Result<String>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = std::result::Result<String, AttemptError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            info!("🔄 Attempting {} API call (attempt {}/{})", provider, attempt, max_attempts);
            match op(attempt).await {
                Ok(text) => {
                    info!("✅ {} API call successful", provider);
                    return Ok(text);
                }
                Err(failure) if failure.is_auth() => {
                    error!("❌ {} API authentication failed", provider);
                    return Err(Error::ProviderAuth(format!(
                        "{} API authentication failed. Please check your API key.",
                        provider
                    )));
                }
                Err(failure) => {
                    warn!("⚠️ {} API error (attempt {}): {}", provider, attempt, failure);
                    if attempt < max_attempts {
                        let delay = self.delay_for(attempt, &failure);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    last_failure = Some(failure);
                }
            }
        }

        Err(exhausted(provider, max_attempts, last_failure))
    }
}

fn exhausted(provider: &str, attempts: u32, last: Option<AttemptError>) -> Error {
    match last {
        Some(AttemptError::Malformed(message)) => Error::MalformedResponse(format!(
            "{} API returned an unusable body after {} attempts: {}",
            provider, attempts, message
        )),
        Some(AttemptError::Status { status, .. }) => Error::ProviderUnavailable {
            attempts,
            status: Some(status),
            message: format!("{} API failed after {} attempts: {}", provider, attempts, status),
        },
        Some(AttemptError::Transport(message)) => Error::ProviderUnavailable {
            attempts,
            status: None,
            message: format!(
                "Failed to generate content after {} attempts: {}",
                attempts, message
            ),
        },
        None => Error::ProviderUnavailable {
            attempts,
            status: None,
            message: format!("{} API was never called", provider),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> AttemptError {
        AttemptError::Status {
            status: 500,
            body: "boom".to_string(),
        }
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1, &server_error()), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2, &server_error()), Duration::from_secs(2));

        let limited = AttemptError::Status {
            status: 429,
            body: String::new(),
        };
        assert_eq!(policy.delay_for(1, &limited), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2, &limited), Duration::from_secs(4));

        let transport = AttemptError::Transport("reset".to_string());
        assert_eq!(policy.delay_for(2, &transport), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::immediate(3)
            .run("DeepSeek", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(server_error())
                    } else {
                        Ok("done".to_string())
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::immediate(3)
            .run("DeepSeek", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(AttemptError::Status {
                        status: 401,
                        body: "unauthorized".to_string(),
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(Error::ProviderAuth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_status() {
        let result = RetryPolicy::immediate(3)
            .run("DeepSeek", |_| async { Err(server_error()) })
            .await;
        match result {
            Err(Error::ProviderUnavailable { attempts, status, message }) => {
                assert_eq!(attempts, 3);
                assert_eq!(status, Some(500));
                assert_eq!(message, "DeepSeek API failed after 3 attempts: 500");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_last_attempt() {
        let result = RetryPolicy::immediate(2)
            .run("OpenAI", |attempt| async move {
                if attempt == 1 {
                    Err(server_error())
                } else {
                    Err(AttemptError::Malformed("missing choices".to_string()))
                }
            })
            .await;
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }
}
