//! Deploy resources activity

use std::sync::Arc;

use duroxide::ActivityContext;

use super::ActivityRetry;
use crate::activity_names::activities;
use crate::activity_types::{DeployResourcesInput, DeployResourcesOutput};
use crate::backends::Backends;
use crate::error::ActivityError;

/// Activity name for registration and scheduling
pub const NAME: &str = activities::DEPLOY_RESOURCES;

pub async fn activity(
    ctx: ActivityContext,
    backends: Arc<Backends>,
    input: DeployResourcesInput,
) -> Result<DeployResourcesOutput, String> {
    ctx.trace_info(format!("Deploying resources: {}/{}", input.namespace, input.name));

    let output = ActivityRetry::default()
        .retry(NAME, || execute(&backends, input.clone()))
        .await
        .map_err(|e| e.to_string())?;

    ctx.trace_info(format!("Resources ready at {}:{}", output.host, output.port));
    Ok(output)
}

pub async fn execute(
    backends: &Backends,
    input: DeployResourcesInput,
) -> Result<DeployResourcesOutput, ActivityError> {
    if input.namespace.is_empty() || input.name.is_empty() {
        return Err(ActivityError::Terminal(
            "namespace and name are required to deploy resources".to_string(),
        ));
    }

    let deployment = backends
        .infrastructure
        .deploy(&input.namespace, &input.name)
        .await?;

    tracing::info!(
        namespace = %input.namespace,
        name = %input.name,
        resources = deployment.resources.len(),
        "Resources deployed"
    );

    Ok(DeployResourcesOutput {
        resources: deployment.resources,
        host: deployment.host,
        port: deployment.port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::simulated::Simulation;
    use crate::error::BackendError;

    #[tokio::test]
    async fn test_deploy_returns_handles() {
        let sim = Simulation::default();
        let output = execute(
            &sim.backends(),
            DeployResourcesInput {
                namespace: "ns1".to_string(),
                name: "db1".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.host, "ns1.db1.svc.cluster.local");
        assert_eq!(output.port, 5432);
        assert_eq!(
            output.resources,
            vec![
                "/planes/kubernetes/local/namespaces/ns1/providers/core/Service/db1".to_string(),
                "/planes/kubernetes/local/namespaces/ns1/providers/apps/Deployment/db1".to_string(),
            ]
        );
        assert!(sim.cluster.is_deployed("ns1", "db1"));
    }

    #[tokio::test]
    async fn test_unavailable_cluster_is_transient() {
        let sim = Simulation::default();
        sim.cluster
            .fail_next(BackendError::Unavailable("api server timeout".to_string()));

        let err = execute(
            &sim.backends(),
            DeployResourcesInput {
                namespace: "ns1".to_string(),
                name: "db1".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_missing_name_is_terminal() {
        let sim = Simulation::default();
        let err = execute(
            &sim.backends(),
            DeployResourcesInput {
                namespace: "ns1".to_string(),
                name: String::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(!err.is_transient());
        assert_eq!(sim.cluster.calls(), 0);
    }
}
