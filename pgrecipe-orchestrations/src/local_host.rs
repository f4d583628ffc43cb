//! In-process orchestration host with event-sourced replay
//!
//! Every instance owns an [`InvocationLog`]. Driving an instance re-runs its
//! orchestrator body from the start against a [`ReplayContext`]: steps already
//! in the log return their recorded outcome, the first unrecorded step
//! dispatches its activity and appends the outcome. Resuming after a restart
//! is therefore just driving the instance again with its persisted log.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use pgrecipe_models::{FailureDetails, InstanceMetadata, RuntimeStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

pub use crate::activities::ActivityRetry;
use crate::activity_types::{ActivityCall, ActivityOutput};
use crate::backends::Backends;
use crate::error::HostError;
use crate::host::OrchestrationHost;
use crate::workflow::Workflow;

/// Orchestrator body as the local host drives it: raw JSON in, raw JSON out
pub type OrchestratorFn =
    Arc<dyn Fn(Arc<ReplayContext>, String) -> BoxFuture<'static, Result<String, String>> + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Invocation log
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum InvocationOutcome {
    Completed(Value),
    Failed(String),
}

/// One recorded activity invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationRecord {
    pub sequence: u64,
    pub activity: String,
    pub input: Value,
    pub outcome: InvocationOutcome,
}

/// Ordered history of an instance's activity invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvocationLog {
    pub records: Vec<InvocationRecord>,
}

impl InvocationLog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Activity names in invocation order
    pub fn activities(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.activity.as_str()).collect()
    }

    /// Drop every record from `len` on
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }
}

// ============================================================================
// Replay context
// ============================================================================

/// [`Workflow`] implementation backed by an invocation log
pub struct ReplayContext {
    instance_id: String,
    backends: Backends,
    retry: ActivityRetry,
    log: Arc<Mutex<InvocationLog>>,
    cursor: AtomicUsize,
}

impl ReplayContext {
    pub fn new(
        instance_id: impl Into<String>,
        backends: Backends,
        retry: ActivityRetry,
        log: Arc<Mutex<InvocationLog>>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            backends,
            retry,
            log,
            cursor: AtomicUsize::new(0),
        }
    }

    /// True while the body is still consuming recorded history
    pub fn is_replaying(&self) -> bool {
        self.cursor.load(Ordering::SeqCst) < lock(&self.log).len()
    }
}

#[async_trait]
impl Workflow for ReplayContext {
    async fn call_activity(&self, call: ActivityCall) -> Result<ActivityOutput, String> {
        let position = self.cursor.fetch_add(1, Ordering::SeqCst);
        let activity = call.name();
        let input = call
            .input_json()
            .map_err(|e| format!("Failed to encode input of '{}': {}", activity, e))?;
        let recorded = lock(&self.log).records.get(position).cloned();

        if let Some(record) = recorded {
            if record.activity != activity {
                return Err(format!(
                    "Non-deterministic orchestration: step {} was recorded as '{}' but replay issued '{}'",
                    position, record.activity, activity
                ));
            }
            if record.input != input {
                return Err(format!(
                    "Non-deterministic orchestration: step {} ('{}') was replayed with different input",
                    position, activity
                ));
            }
            return match record.outcome {
                InvocationOutcome::Completed(value) => ActivityOutput::decode(&record.activity, value),
                InvocationOutcome::Failed(message) => Err(message),
            };
        }

        tracing::debug!(instance_id = %self.instance_id, activity, sequence = position, "Dispatching activity");
        let result = self.retry.run(&self.backends, call).await;

        let outcome = match &result {
            Ok(output) => InvocationOutcome::Completed(
                output
                    .to_json()
                    .map_err(|e| format!("Failed to encode output of '{}': {}", activity, e))?,
            ),
            Err(err) => InvocationOutcome::Failed(err.to_string()),
        };
        lock(&self.log).records.push(InvocationRecord {
            sequence: position as u64,
            activity: activity.to_string(),
            input,
            outcome,
        });

        result.map_err(|e| e.to_string())
    }

    fn trace_info(&self, message: String) {
        if !self.is_replaying() {
            tracing::info!(instance_id = %self.instance_id, "{}", message);
        }
    }
}

// ============================================================================
// Host
// ============================================================================

/// Serializable form of an instance: enough to resume it elsewhere
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedInstance {
    pub id: String,
    pub name: String,
    pub input: String,
    pub log: InvocationLog,
}

struct InstanceEntry {
    name: String,
    input: String,
    log: Arc<Mutex<InvocationLog>>,
    status: RuntimeStatus,
    output: Option<String>,
    failure: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct Inner {
    backends: Backends,
    retry: ActivityRetry,
    orchestrators: HashMap<&'static str, OrchestratorFn>,
    instances: Mutex<HashMap<String, InstanceEntry>>,
}

/// In-process [`OrchestrationHost`]
#[derive(Clone)]
pub struct LocalHost {
    inner: Arc<Inner>,
}

impl LocalHost {
    /// Host running the Put and Delete orchestrations against `backends`
    pub fn new(backends: Backends) -> Self {
        Self::with_retry(backends, ActivityRetry::default())
    }

    pub fn with_retry(backends: Backends, retry: ActivityRetry) -> Self {
        Self::with_orchestrators(backends, retry, crate::registry::local_orchestrators())
    }

    pub fn with_orchestrators(
        backends: Backends,
        retry: ActivityRetry,
        orchestrators: HashMap<&'static str, OrchestratorFn>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backends,
                retry,
                orchestrators,
                instances: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Drive a Pending instance from its log. No-op once it is running or terminal.
    pub fn resume(&self, instance_id: &str) -> Result<(), HostError> {
        let (name, input, log, orchestrator) = {
            let mut instances = lock(&self.inner.instances);
            let entry = instances
                .get_mut(instance_id)
                .ok_or_else(|| HostError::InstanceNotFound(instance_id.to_string()))?;
            if entry.status != RuntimeStatus::Pending {
                return Ok(());
            }
            let orchestrator = self
                .inner
                .orchestrators
                .get(entry.name.as_str())
                .cloned()
                .ok_or_else(|| HostError::UnknownOrchestrator(entry.name.clone()))?;
            entry.status = RuntimeStatus::Running;
            entry.updated_at = Utc::now();
            (entry.name.clone(), entry.input.clone(), entry.log.clone(), orchestrator)
        };

        let ctx = Arc::new(ReplayContext::new(
            instance_id,
            self.inner.backends.clone(),
            self.inner.retry,
            log,
        ));
        let span = tracing::info_span!("orchestration", instance_id = %instance_id, orchestration = %name);
        let host = self.clone();
        let id = instance_id.to_string();

        tokio::spawn(
            async move {
                tracing::debug!(replaying = ctx.is_replaying(), "Orchestration started");

                match orchestrator(ctx, input).await {
                    Ok(output) => {
                        tracing::info!("Orchestration completed");
                        host.set_status(&id, RuntimeStatus::Completed, Some(output), None);
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "Orchestration failed");
                        host.set_status(&id, RuntimeStatus::Failed, None, Some(error));
                    }
                }
            }
            .instrument(span),
        );

        Ok(())
    }

    fn set_status(
        &self,
        instance_id: &str,
        status: RuntimeStatus,
        output: Option<String>,
        failure: Option<String>,
    ) {
        if let Some(entry) = lock(&self.inner.instances).get_mut(instance_id) {
            entry.status = status;
            entry.output = output;
            entry.failure = failure;
            entry.updated_at = Utc::now();
        }
    }

    /// Snapshot an instance for persistence
    pub fn export(&self, instance_id: &str) -> Option<PersistedInstance> {
        let instances = lock(&self.inner.instances);
        instances.get(instance_id).map(|entry| PersistedInstance {
            id: instance_id.to_string(),
            name: entry.name.clone(),
            input: entry.input.clone(),
            log: lock(&entry.log).clone(),
        })
    }

    /// Register a persisted instance as Pending without driving it.
    ///
    /// Call [`LocalHost::resume`] to continue it.
    pub fn import(&self, instance: PersistedInstance) -> Result<(), HostError> {
        if !self.inner.orchestrators.contains_key(instance.name.as_str()) {
            return Err(HostError::UnknownOrchestrator(instance.name));
        }
        let now = Utc::now();
        lock(&self.inner.instances).insert(
            instance.id,
            InstanceEntry {
                name: instance.name,
                input: instance.input,
                log: Arc::new(Mutex::new(instance.log)),
                status: RuntimeStatus::Pending,
                output: None,
                failure: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    /// Poll until the instance is terminal or `timeout` elapses
    pub async fn wait_for_terminal(
        &self,
        instance_id: &str,
        timeout: Duration,
    ) -> Result<InstanceMetadata, HostError> {
        let poll = async {
            loop {
                let metadata = self.fetch(instance_id).await?;
                if metadata.runtime_status.is_terminal() {
                    return Ok::<_, HostError>(metadata);
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            HostError::Backend(format!(
                "instance '{}' did not finish within {:?}",
                instance_id, timeout
            ))
        })?
    }
}

#[async_trait]
impl OrchestrationHost for LocalHost {
    async fn schedule(
        &self,
        name: &str,
        input: String,
        instance_id: Option<String>,
    ) -> Result<String, HostError> {
        if !self.inner.orchestrators.contains_key(name) {
            return Err(HostError::UnknownOrchestrator(name.to_string()));
        }
        serde_json::from_str::<Value>(&input).map_err(|e| HostError::InvalidInput(e.to_string()))?;

        let id = instance_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        {
            let mut instances = lock(&self.inner.instances);
            if instances.contains_key(&id) {
                tracing::info!(instance_id = %id, "Instance already exists, not starting again");
                return Ok(id);
            }
            let now = Utc::now();
            instances.insert(
                id.clone(),
                InstanceEntry {
                    name: name.to_string(),
                    input,
                    log: Arc::new(Mutex::new(InvocationLog::default())),
                    status: RuntimeStatus::Pending,
                    output: None,
                    failure: None,
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        tracing::info!(instance_id = %id, orchestration = %name, "Scheduled orchestration");
        self.resume(&id)?;
        Ok(id)
    }

    async fn fetch(&self, instance_id: &str) -> Result<InstanceMetadata, HostError> {
        let instances = lock(&self.inner.instances);
        let entry = instances
            .get(instance_id)
            .ok_or_else(|| HostError::InstanceNotFound(instance_id.to_string()))?;

        Ok(InstanceMetadata {
            id: instance_id.to_string(),
            name: entry.name.clone(),
            runtime_status: entry.status,
            created_at: Some(entry.created_at),
            last_updated_at: Some(entry.updated_at),
            serialized_input: Some(entry.input.clone()),
            serialized_output: entry.output.clone(),
            failure_details: entry
                .failure
                .clone()
                .map(|message| FailureDetails { message }),
        })
    }
}
