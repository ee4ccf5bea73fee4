//! Backoff-and-downgrade retry around upstream model calls.

use std::future::Future;
use std::time::Duration;

use ragent_config::RetrySettings;
use ragent_core::{AgentError, Model};
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(2) }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: settings.base_delay(),
        }
    }
}

impl RetryPolicy {
    /// Wait before the given retry (1-based): base, 2 x base, 4 x base...
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }
}

/// Progress of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    /// Retryable failures seen so far.
    pub retries: u32,
    pub current_model: Model,
}

#[derive(Debug)]
pub enum InvokeError {
    /// Every attempt hit a retryable failure.
    Exhausted(AgentError),
    /// A failure that retrying cannot fix.
    Terminal(AgentError),
}

pub struct RetryingInvoker {
    policy: RetryPolicy,
}

impl RetryingInvoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Runs `call` with `model`, retrying retryable failures on a downgraded
    /// model. Returns the value together with the model that produced it.
    pub async fn invoke<T, F, Fut>(&self, model: Model, mut call: F) -> Result<(T, Model), InvokeError>
    where
        F: FnMut(Model) -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
    {
        let mut state = RetryState { retries: 0, current_model: model };

        loop {
            let err = match call(state.current_model).await {
                Ok(value) => return Ok((value, state.current_model)),
                Err(e) => e,
            };

            if !err.is_retryable() {
                error!("Upstream call failed on {}: {}", state.current_model, err);
                return Err(InvokeError::Terminal(err));
            }

            state.retries += 1;
            if state.retries >= self.policy.max_attempts {
                warn!(
                    "Upstream call failed {} times, giving up: {}",
                    state.retries, err
                );
                return Err(InvokeError::Exhausted(err));
            }

            let delay = self.policy.delay_for(state.retries);
            let next = state.current_model.downgrade(state.retries);
            warn!(
                "Attempt {}/{} failed ({}), retrying in {:?} with {}",
                state.retries, self.policy.max_attempts, err, delay, next
            );
            tokio::time::sleep(delay).await;
            state.current_model = next;
        }
    }
}

/// How a call site words its failures.
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    pub apology: &'static str,
    pub error_prefix: &'static str,
}

pub const TOOL_RESPONSE: CallSite = CallSite {
    apology: "I apologize, but I'm experiencing API limitations. Please try asking a more specific question or wait a moment before trying again.",
    error_prefix: "Error with tools",
};

pub const FILE_SEARCH: CallSite = CallSite {
    apology: "I apologize, but I'm having trouble searching through the files due to API limitations. Could you try again with a more specific question or wait a moment before asking again?",
    error_prefix: "Error with file search",
};

impl CallSite {
    /// Text shown to the user in place of a reply.
    pub fn recover(&self, err: &InvokeError) -> String {
        match err {
            InvokeError::Exhausted(_) => self.apology.to_string(),
            InvokeError::Terminal(e) => format!("{}: {}", self.error_prefix, e.detail()),
        }
    }
}
