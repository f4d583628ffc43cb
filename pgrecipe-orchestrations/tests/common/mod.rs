#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pgrecipe_models::RecipeContext;
use pgrecipe_orchestrations::backends::simulated::Simulation;
use pgrecipe_orchestrations::local_host::{ActivityRetry, InvocationLog, ReplayContext};
use serde_json::{json, Value};

pub fn recipe(namespace: &str, name: &str, properties: Value) -> RecipeContext {
    serde_json::from_value(json!({
        "resource": {
            "name": name,
            "id": format!("/planes/radius/local/resourceGroups/test/providers/Applications.Datastores/postgres/{}", name),
            "type": "Applications.Datastores/postgres",
            "properties": properties,
        },
        "application": { "name": "app", "id": "/applications/app" },
        "environment": { "name": "env", "id": "/environments/env" },
        "runtime": {
            "kubernetes": { "namespace": namespace, "environmentNamespace": "env-ns" }
        }
    }))
    .unwrap()
}

pub fn binding(database: Option<&str>, username: Option<&str>) -> Value {
    let mut binding = serde_json::Map::new();
    if let Some(database) = database {
        binding.insert("database".to_string(), json!(database));
    }
    if let Some(username) = username {
        binding.insert("username".to_string(), json!(username));
    }
    json!({ "status": { "binding": binding } })
}

pub fn fresh_log() -> Arc<Mutex<InvocationLog>> {
    Arc::new(Mutex::new(InvocationLog::default()))
}

pub fn context(sim: &Simulation, log: Arc<Mutex<InvocationLog>>) -> ReplayContext {
    ReplayContext::new("test-instance", sim.backends(), ActivityRetry::new(3, Duration::ZERO), log)
}
