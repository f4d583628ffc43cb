//! Capability interfaces activities perform their side effects through
//!
//! Activities never reach infrastructure directly; they go through these
//! traits, bundled in [`Backends`] and handed to the activity registry at
//! construction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendError;

pub mod simulated;

/// Port every deployment exposes PostgreSQL on
pub const POSTGRES_PORT: u16 = 5432;

/// What a deployment produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Resource identifiers, in creation order
    pub resources: Vec<String>,
    pub host: String,
    pub port: u16,
}

/// Provisions the compute/network resources for a database backend
#[async_trait]
pub trait InfrastructureProvisioner: Send + Sync {
    /// Create (or adopt existing) resources for `name` in `namespace`
    async fn deploy(&self, namespace: &str, name: &str) -> Result<Deployment, BackendError>;

    /// Remove the resources. Returns `false` if nothing was there.
    async fn delete(&self, namespace: &str, name: &str) -> Result<bool, BackendError>;
}

/// Stores access credentials (database roles)
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_role(&self, username: &str, password: &str) -> Result<(), BackendError>;

    /// Returns `false` if the role did not exist
    async fn revoke_role(&self, username: &str) -> Result<bool, BackendError>;
}

/// Manages logical databases on the PostgreSQL server
#[async_trait]
pub trait DatabaseServer: Send + Sync {
    async fn create_database(&self, database: &str, owner: &str) -> Result<(), BackendError>;

    /// Snapshot a database. Returns the backup id, `None` if the database is absent.
    async fn backup_database(&self, database: &str) -> Result<Option<String>, BackendError>;

    /// Returns `false` if the database did not exist
    async fn drop_database(&self, database: &str) -> Result<bool, BackendError>;
}

/// The full set of capabilities activities run against
#[derive(Clone)]
pub struct Backends {
    pub infrastructure: Arc<dyn InfrastructureProvisioner>,
    pub credentials: Arc<dyn CredentialStore>,
    pub databases: Arc<dyn DatabaseServer>,
}

impl Backends {
    pub fn new(
        infrastructure: Arc<dyn InfrastructureProvisioner>,
        credentials: Arc<dyn CredentialStore>,
        databases: Arc<dyn DatabaseServer>,
    ) -> Self {
        Self {
            infrastructure,
            credentials,
            databases,
        }
    }
}
