mod common;

use pgrecipe_orchestrations::activity_names::activities;
use pgrecipe_orchestrations::backends::simulated::Simulation;
use pgrecipe_orchestrations::orchestrations::delete_database::delete_database_orchestration;
use pgrecipe_orchestrations::orchestrations::put_database::put_database_orchestration;
use pgrecipe_orchestrations::{BackendError, TeardownOutput};
use serde_json::{json, Value};

use common::{binding, context, fresh_log, recipe};

#[tokio::test]
async fn test_delete_twice_leaves_nothing_behind() {
    let sim = Simulation::default();
    let put = put_database_orchestration(&context(&sim, fresh_log()), recipe("ns1", "db1", json!({})))
        .await
        .unwrap();
    assert!(!sim.is_empty());

    let database = put.values["database"].as_str().unwrap();
    let username = put.values["username"].as_str().unwrap();
    let input = recipe("ns1", "db1", binding(Some(database), Some(username)));

    let first = delete_database_orchestration(&context(&sim, fresh_log()), input.clone()).await;
    assert_eq!(first, Ok(TeardownOutput {}));
    assert!(sim.is_empty());

    let second = delete_database_orchestration(&context(&sim, fresh_log()), input).await;
    assert_eq!(second, Ok(TeardownOutput {}));
    assert!(sim.is_empty());
}

#[tokio::test]
async fn test_delete_after_partial_put() {
    let sim = Simulation::default();
    sim.credentials
        .fail_next(BackendError::Failed("role limit reached".to_string()));
    put_database_orchestration(&context(&sim, fresh_log()), recipe("ns1", "db1", json!({})))
        .await
        .unwrap_err();
    assert!(sim.cluster.is_deployed("ns1", "db1"));

    for _ in 0..2 {
        delete_database_orchestration(&context(&sim, fresh_log()), recipe("ns1", "db1", json!({})))
            .await
            .unwrap();
        assert!(sim.is_empty());
    }
}

#[tokio::test]
async fn test_delete_without_binding_only_deletes_resources() {
    let sim = Simulation::default();
    let log = fresh_log();

    delete_database_orchestration(&context(&sim, log.clone()), recipe("ns1", "db1", json!({})))
        .await
        .unwrap();

    assert_eq!(log.lock().unwrap().activities(), vec![activities::DELETE_RESOURCES]);
    assert_eq!(sim.credentials.calls(), 0);
    assert_eq!(sim.databases.calls(), 0);
}

#[tokio::test]
async fn test_delete_with_null_properties_only_deletes_resources() {
    let sim = Simulation::default();
    sim.backends().infrastructure.deploy("ns1", "db1").await.unwrap();
    let log = fresh_log();

    let output =
        delete_database_orchestration(&context(&sim, log.clone()), recipe("ns1", "db1", Value::Null))
            .await
            .unwrap();

    assert_eq!(output, TeardownOutput {});
    assert_eq!(log.lock().unwrap().activities(), vec![activities::DELETE_RESOURCES]);
    assert_eq!(sim.credentials.calls(), 0);
    assert_eq!(sim.databases.calls(), 0);
    assert!(!sim.cluster.is_deployed("ns1", "db1"));
}

#[tokio::test]
async fn test_delete_with_partial_status_tree() {
    let sim = Simulation::default();
    let log = fresh_log();
    let properties = json!({ "status": { "computedValues": { "host": "x" } } });

    delete_database_orchestration(&context(&sim, log.clone()), recipe("ns1", "db1", properties))
        .await
        .unwrap();

    assert_eq!(log.lock().unwrap().activities(), vec![activities::DELETE_RESOURCES]);
}

#[tokio::test]
async fn test_delete_order_and_backup() {
    let sim = Simulation::default();
    let backends = sim.backends();
    backends.infrastructure.deploy("ns1", "db1").await.unwrap();
    backends.credentials.create_role("pguser_1", "pw").await.unwrap();
    backends.databases.create_database("db1_a", "pguser_1").await.unwrap();
    let log = fresh_log();

    delete_database_orchestration(
        &context(&sim, log.clone()),
        recipe("ns1", "db1", binding(Some("db1_a"), Some("pguser_1"))),
    )
    .await
    .unwrap();

    assert_eq!(
        log.lock().unwrap().activities(),
        vec![
            activities::DELETE_DATABASE,
            activities::DELETE_CREDENTIAL,
            activities::DELETE_RESOURCES,
        ]
    );
    assert_eq!(sim.databases.backups(), vec!["db1_a.backup.1".to_string()]);
    assert!(sim.is_empty());
}

#[tokio::test]
async fn test_username_only_binding() {
    let sim = Simulation::default();
    let log = fresh_log();

    delete_database_orchestration(
        &context(&sim, log.clone()),
        recipe("ns1", "db1", binding(None, Some("pguser_1"))),
    )
    .await
    .unwrap();

    assert_eq!(
        log.lock().unwrap().activities(),
        vec![activities::DELETE_CREDENTIAL, activities::DELETE_RESOURCES]
    );
    assert!(sim.databases.backups().is_empty());
}

#[tokio::test]
async fn test_failure_aborts_remaining_steps() {
    let sim = Simulation::default();
    let backends = sim.backends();
    backends.infrastructure.deploy("ns1", "db1").await.unwrap();
    backends.credentials.create_role("pguser_1", "pw").await.unwrap();
    backends.databases.create_database("db1_a", "pguser_1").await.unwrap();
    sim.databases
        .fail_next(BackendError::Failed("snapshot quota exceeded".to_string()));
    let log = fresh_log();
    let input = recipe("ns1", "db1", binding(Some("db1_a"), Some("pguser_1")));

    let err = delete_database_orchestration(&context(&sim, log.clone()), input.clone())
        .await
        .unwrap_err();

    assert!(err.contains("snapshot quota exceeded"));
    assert_eq!(log.lock().unwrap().activities(), vec![activities::DELETE_DATABASE]);
    assert!(sim.credentials.has_role("pguser_1"));
    assert!(sim.cluster.is_deployed("ns1", "db1"));

    // Operator re-runs the delete
    delete_database_orchestration(&context(&sim, fresh_log()), input)
        .await
        .unwrap();
    assert!(sim.is_empty());
}
