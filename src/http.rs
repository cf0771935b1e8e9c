use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

const USER_AGENT: &str = concat!("iptvman/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
    pub(crate) attempts: usize,
    pub(crate) retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
            attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum FetchError {
    #[error("HTTP status {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },

    #[error("transport error after {attempts} attempt(s): {detail}")]
    Transport { attempts: usize, detail: String },

    #[error("response decode failed: {0}")]
    Decode(String),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// GETs `url` as text, retrying throttling, server errors and transport failures.
pub(crate) fn get_text(url: &str, policy: &RetryPolicy) -> Result<String, FetchError> {
    let attempts = policy.attempts.max(1);
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(policy.connect_timeout)
        .timeout_read(policy.read_timeout)
        .user_agent(USER_AGENT)
        .build();

    let mut attempt = 1;
    loop {
        debug!(url, attempt, "fetching playlist");
        match agent.get(url).call() {
            Ok(response) => {
                return response
                    .into_string()
                    .map_err(|err| FetchError::Decode(err.to_string()));
            }
            Err(ureq::Error::Status(status, response)) => {
                if should_retry_http_status(status) && attempt < attempts {
                    warn!(url, status, attempt, "retryable HTTP status");
                    thread::sleep(policy.retry_delay);
                    attempt += 1;
                    continue;
                }
                let body = response.into_string().unwrap_or_default();
                return Err(FetchError::Status {
                    status,
                    body: body.trim().chars().take(240).collect(),
                });
            }
            Err(ureq::Error::Transport(err)) => {
                if attempt < attempts {
                    warn!(url, attempt, "transport error: {err}");
                    thread::sleep(policy.retry_delay);
                    attempt += 1;
                    continue;
                }
                return Err(FetchError::Transport {
                    attempts,
                    detail: err.to_string(),
                });
            }
        }
    }
}
