use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duroxide::runtime::{LogFormat, ObservabilityConfig, Runtime, RuntimeOptions};
use duroxide::{Client, OrchestrationStatus};
use duroxide_pg::PostgresProvider;
use pgrecipe_models::{FailureDetails, InstanceMetadata, RuntimeStatus};
use pgrecipe_orchestrations::backends::Backends;
use pgrecipe_orchestrations::names::orchestrations;
use pgrecipe_orchestrations::registry::{create_activity_registry, create_orchestration_registry};
use pgrecipe_orchestrations::{HostError, OrchestrationHost};
use uuid::Uuid;

use crate::config::Config;

/// Initialize Duroxide runtime and client. Any failure here is fatal to startup.
pub async fn initialize(config: &Config, backends: Backends) -> Result<(Arc<Runtime>, Arc<Client>)> {
    let db_url = config.require_database_url()?;

    tracing::info!("Connecting to Duroxide store (schema: {})", config.duroxide_schema);

    let store = Arc::new(
        PostgresProvider::new_with_schema(db_url, Some(config.duroxide_schema.as_str()))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize Duroxide store: {}", e))?,
    );

    // Initialize schema (creates tables if they don't exist)
    store
        .initialize_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize Duroxide schema: {}", e))?;

    let activities = Arc::new(create_activity_registry(Arc::new(backends)));
    let orchestrations = create_orchestration_registry();

    let mut runtime_options = RuntimeOptions::default();
    runtime_options.worker_lock_timeout = Duration::from_secs(300);

    let log_format = match config.duroxide_log_format.as_str() {
        "compact" => LogFormat::Compact,
        "pretty" => LogFormat::Pretty,
        _ => LogFormat::Json,
    };

    runtime_options.observability = ObservabilityConfig {
        metrics_enabled: false,
        log_format,
        log_level: config.duroxide_log_level.clone(),
        service_name: "pgrecipe".to_string(),
        service_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        ..Default::default()
    };

    tracing::info!("Starting Duroxide runtime with 5-minute activity timeout");
    let runtime = Runtime::start_with_options(store.clone(), activities, orchestrations, runtime_options).await;

    let client = Arc::new(Client::new(store));

    tracing::info!("✓ Duroxide runtime ready");

    Ok((runtime, client))
}

/// [`OrchestrationHost`] backed by a duroxide client
pub struct DuroxideHost {
    client: Arc<Client>,
}

impl DuroxideHost {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

fn timestamp(millis: u64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}

#[async_trait]
impl OrchestrationHost for DuroxideHost {
    async fn schedule(
        &self,
        name: &str,
        input: String,
        instance_id: Option<String>,
    ) -> Result<String, HostError> {
        if !orchestrations::ALL.contains(&name) {
            return Err(HostError::UnknownOrchestrator(name.to_string()));
        }

        let id = instance_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        if !matches!(
            self.client.get_orchestration_status(&id).await,
            OrchestrationStatus::NotFound
        ) {
            tracing::info!(instance_id = %id, "Instance already exists, not starting again");
            return Ok(id);
        }

        self.client
            .start_orchestration(&id, name, input)
            .await
            .map_err(|e| HostError::Backend(format!("Failed to start orchestration: {}", e)))?;

        tracing::info!(instance_id = %id, orchestration = %name, "Scheduled orchestration");
        Ok(id)
    }

    async fn fetch(&self, instance_id: &str) -> Result<InstanceMetadata, HostError> {
        let status = self.client.get_orchestration_status(instance_id).await;

        let (runtime_status, serialized_output, failure_details) = match status {
            OrchestrationStatus::Running { .. } => (RuntimeStatus::Running, None, None),
            OrchestrationStatus::Completed { output, .. } => (RuntimeStatus::Completed, Some(output), None),
            OrchestrationStatus::Failed { details, .. } => (
                RuntimeStatus::Failed,
                None,
                Some(FailureDetails {
                    message: format!("{:?}", details),
                }),
            ),
            OrchestrationStatus::NotFound => {
                return Err(HostError::InstanceNotFound(instance_id.to_string()));
            }
        };

        let mut metadata = InstanceMetadata {
            id: instance_id.to_string(),
            name: String::new(),
            runtime_status,
            created_at: None,
            last_updated_at: None,
            serialized_input: None,
            serialized_output,
            failure_details,
        };

        // Name and timestamps need the management API
        if self.client.has_management_capability() {
            match self.client.get_instance_info(instance_id).await {
                Ok(info) => {
                    metadata.name = info.orchestration_name;
                    metadata.created_at = timestamp(info.created_at);
                    metadata.last_updated_at = timestamp(info.updated_at);
                }
                Err(e) => tracing::warn!(instance_id, error = %e, "Failed to get instance info"),
            }
        }

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversion() {
        let converted = timestamp(1_700_000_000_000).unwrap();
        assert_eq!(converted.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }
}
