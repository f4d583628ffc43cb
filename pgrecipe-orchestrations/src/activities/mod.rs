//! Activity implementations
//!
//! Each module exposes `execute`, the host-neutral body, and `activity`, the
//! duroxide entry point registered in [`crate::registry`].

use std::future::Future;
use std::time::Duration;

use crate::activity_types::{ActivityCall, ActivityOutput};
use crate::backends::Backends;
use crate::error::ActivityError;

pub mod create_credential;
pub mod create_database;
pub mod delete_credential;
pub mod delete_database;
pub mod delete_resources;
pub mod deploy_resources;

/// Run the activity a call names against `backends`
pub async fn dispatch(backends: &Backends, call: ActivityCall) -> Result<ActivityOutput, ActivityError> {
    match call {
        ActivityCall::DeployResources(input) => deploy_resources::execute(backends, input)
            .await
            .map(ActivityOutput::DeployResources),
        ActivityCall::DeleteResources(input) => delete_resources::execute(backends, input)
            .await
            .map(ActivityOutput::DeleteResources),
        ActivityCall::CreateCredential(input) => create_credential::execute(backends, input)
            .await
            .map(ActivityOutput::CreateCredential),
        ActivityCall::DeleteCredential(input) => delete_credential::execute(backends, input)
            .await
            .map(ActivityOutput::DeleteCredential),
        ActivityCall::CreateDatabase(input) => create_database::execute(backends, input)
            .await
            .map(ActivityOutput::CreateDatabase),
        ActivityCall::DeleteDatabase(input) => delete_database::execute(backends, input)
            .await
            .map(ActivityOutput::DeleteDatabase),
    }
}

/// Retry applied to transient activity failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRetry {
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `backoff * n`
    pub backoff: Duration,
}

impl Default for ActivityRetry {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl ActivityRetry {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Run `op` until it succeeds, fails terminally, or attempts run out
    pub async fn retry<T, F, Fut>(&self, activity: &str, mut op: F) -> Result<T, ActivityError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ActivityError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        activity,
                        attempt,
                        error = %err,
                        "Transient activity failure, retrying"
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    pub async fn run(&self, backends: &Backends, call: ActivityCall) -> Result<ActivityOutput, ActivityError> {
        self.retry(call.name(), || dispatch(backends, call.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity_types::CreateCredentialInput;
    use crate::backends::simulated::Simulation;
    use crate::error::BackendError;

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let sim = Simulation::default();
        let retry = ActivityRetry::new(1, Duration::ZERO);
        sim.credentials
            .fail_next(BackendError::Unavailable("connection reset".to_string()));

        let result = retry
            .run(&sim.backends(), ActivityCall::CreateCredential(CreateCredentialInput {}))
            .await;
        assert!(matches!(result, Err(ActivityError::Transient(_))));
        assert_eq!(sim.credentials.calls(), 1);
    }

    #[tokio::test]
    async fn test_terminal_failure_is_not_retried() {
        let sim = Simulation::default();
        let backends = sim.backends();
        let retry = ActivityRetry::new(3, Duration::ZERO);
        sim.credentials
            .fail_next(BackendError::Failed("role limit reached".to_string()));

        let result = retry
            .retry(create_credential::NAME, || {
                create_credential::execute(&backends, CreateCredentialInput {})
            })
            .await;
        assert_eq!(result, Err(ActivityError::Terminal("role limit reached".to_string())));
        assert_eq!(sim.credentials.calls(), 1);
        assert_eq!(sim.credentials.role_count(), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let sim = Simulation::default();
        let retry = ActivityRetry::new(3, Duration::ZERO);
        sim.cluster
            .fail_next(BackendError::Unavailable("api server timeout".to_string()));

        let output = retry
            .run(
                &sim.backends(),
                ActivityCall::DeployResources(crate::activity_types::DeployResourcesInput {
                    namespace: "ns1".to_string(),
                    name: "db1".to_string(),
                }),
            )
            .await
            .unwrap();
        assert_eq!(output.name(), deploy_resources::NAME);
        assert_eq!(sim.cluster.calls(), 2);
    }
}
