//! In-memory backends that pretend to provision
//!
//! Used by `--host memory`, local development and tests. State is observable
//! so teardown can be verified, and each backend can be told to fail its
//! next call.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{
    Backends, CredentialStore, DatabaseServer, Deployment, InfrastructureProvisioner,
    POSTGRES_PORT,
};
use crate::error::BackendError;

/// One-shot failure slot plus call counter shared by the simulated backends
#[derive(Default)]
struct Faults {
    next: Mutex<Option<BackendError>>,
    calls: AtomicUsize,
}

impl Faults {
    fn enter(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.next).take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn inject(&self, err: BackendError) {
        *lock(&self.next) = Some(err);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn pause(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

/// Pretend Kubernetes cluster: tracks deployed `(namespace, name)` pairs
#[derive(Default)]
pub struct SimulatedCluster {
    deployed: Mutex<BTreeSet<(String, String)>>,
    latency: Duration,
    faults: Faults,
}

impl SimulatedCluster {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn is_deployed(&self, namespace: &str, name: &str) -> bool {
        lock(&self.deployed).contains(&(namespace.to_string(), name.to_string()))
    }

    pub fn deployed_count(&self) -> usize {
        lock(&self.deployed).len()
    }

    pub fn fail_next(&self, err: BackendError) {
        self.faults.inject(err);
    }

    pub fn calls(&self) -> usize {
        self.faults.calls()
    }
}

/// Resource identifiers a deployment of `name` in `namespace` owns
pub fn resource_ids(namespace: &str, name: &str) -> Vec<String> {
    vec![
        format!("/planes/kubernetes/local/namespaces/{namespace}/providers/core/Service/{name}"),
        format!("/planes/kubernetes/local/namespaces/{namespace}/providers/apps/Deployment/{name}"),
    ]
}

#[async_trait]
impl InfrastructureProvisioner for SimulatedCluster {
    async fn deploy(&self, namespace: &str, name: &str) -> Result<Deployment, BackendError> {
        self.faults.enter()?;

        tracing::info!(namespace, name, "Deploying Kubernetes Deployment");
        tracing::info!(namespace, name, "Deploying Kubernetes Service");
        tracing::info!(namespace, name, "Waiting for pods to be ready");
        pause(self.latency).await;

        let created = lock(&self.deployed).insert((namespace.to_string(), name.to_string()));
        if created {
            tracing::info!(namespace, name, "Pods are ready");
        } else {
            tracing::info!(namespace, name, "Resources already exist, reusing");
        }

        Ok(Deployment {
            resources: resource_ids(namespace, name),
            host: format!("{namespace}.{name}.svc.cluster.local"),
            port: POSTGRES_PORT,
        })
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<bool, BackendError> {
        self.faults.enter()?;

        tracing::info!(namespace, name, "Deleting Kubernetes Deployment");
        tracing::info!(namespace, name, "Deleting Kubernetes Service");

        Ok(lock(&self.deployed).remove(&(namespace.to_string(), name.to_string())))
    }
}

/// Pretend role store. Passwords are kept only to model the role existing.
#[derive(Default)]
pub struct SimulatedCredentialStore {
    roles: Mutex<HashMap<String, String>>,
    latency: Duration,
    faults: Faults,
}

impl SimulatedCredentialStore {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn has_role(&self, username: &str) -> bool {
        lock(&self.roles).contains_key(username)
    }

    pub fn role_count(&self) -> usize {
        lock(&self.roles).len()
    }

    pub fn fail_next(&self, err: BackendError) {
        self.faults.inject(err);
    }

    pub fn calls(&self) -> usize {
        self.faults.calls()
    }
}

#[async_trait]
impl CredentialStore for SimulatedCredentialStore {
    async fn create_role(&self, username: &str, password: &str) -> Result<(), BackendError> {
        self.faults.enter()?;
        pause(self.latency).await;

        let mut roles = lock(&self.roles);
        if roles.contains_key(username) {
            return Err(BackendError::Failed(format!("role '{username}' already exists")));
        }
        roles.insert(username.to_string(), password.to_string());
        Ok(())
    }

    async fn revoke_role(&self, username: &str) -> Result<bool, BackendError> {
        self.faults.enter()?;
        Ok(lock(&self.roles).remove(username).is_some())
    }
}

/// Pretend PostgreSQL server: databases and the backups taken of them
#[derive(Default)]
pub struct SimulatedDatabaseServer {
    databases: Mutex<HashMap<String, String>>,
    backups: Mutex<Vec<String>>,
    latency: Duration,
    faults: Faults,
}

impl SimulatedDatabaseServer {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn has_database(&self, database: &str) -> bool {
        lock(&self.databases).contains_key(database)
    }

    pub fn owner_of(&self, database: &str) -> Option<String> {
        lock(&self.databases).get(database).cloned()
    }

    pub fn database_count(&self) -> usize {
        lock(&self.databases).len()
    }

    /// Backup ids, oldest first
    pub fn backups(&self) -> Vec<String> {
        lock(&self.backups).clone()
    }

    pub fn fail_next(&self, err: BackendError) {
        self.faults.inject(err);
    }

    pub fn calls(&self) -> usize {
        self.faults.calls()
    }
}

#[async_trait]
impl DatabaseServer for SimulatedDatabaseServer {
    async fn create_database(&self, database: &str, owner: &str) -> Result<(), BackendError> {
        self.faults.enter()?;

        let mut databases = lock(&self.databases);
        if databases.contains_key(database) {
            return Err(BackendError::Failed(format!("database '{database}' already exists")));
        }
        databases.insert(database.to_string(), owner.to_string());
        Ok(())
    }

    async fn backup_database(&self, database: &str) -> Result<Option<String>, BackendError> {
        self.faults.enter()?;

        if !self.has_database(database) {
            return Ok(None);
        }
        pause(self.latency).await;

        let mut backups = lock(&self.backups);
        let backup_id = format!("{database}.backup.{}", backups.len() + 1);
        backups.push(backup_id.clone());
        Ok(Some(backup_id))
    }

    async fn drop_database(&self, database: &str) -> Result<bool, BackendError> {
        self.faults.enter()?;
        Ok(lock(&self.databases).remove(database).is_some())
    }
}

/// The three simulated backends, kept concrete so callers can inspect them
#[derive(Clone, Default)]
pub struct Simulation {
    pub cluster: Arc<SimulatedCluster>,
    pub credentials: Arc<SimulatedCredentialStore>,
    pub databases: Arc<SimulatedDatabaseServer>,
}

impl Simulation {
    pub fn new(latency: Duration) -> Self {
        Self {
            cluster: Arc::new(SimulatedCluster::new(latency)),
            credentials: Arc::new(SimulatedCredentialStore::new(latency)),
            databases: Arc::new(SimulatedDatabaseServer::new(latency)),
        }
    }

    pub fn backends(&self) -> Backends {
        Backends::new(
            self.cluster.clone(),
            self.credentials.clone(),
            self.databases.clone(),
        )
    }

    /// True when nothing is deployed and no role or database exists
    pub fn is_empty(&self) -> bool {
        self.cluster.deployed_count() == 0
            && self.credentials.role_count() == 0
            && self.databases.database_count() == 0
    }

    /// Total backend calls so far, across all three backends
    pub fn total_calls(&self) -> usize {
        self.cluster.calls() + self.credentials.calls() + self.databases.calls()
    }
}
