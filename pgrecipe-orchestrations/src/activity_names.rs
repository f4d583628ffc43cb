//! Name constants for pgrecipe activities
//!
//! Following the Duroxide naming convention: {crate-name}::{type}::{name}

/// Activity names
pub mod activities {
    /// Deploy the compute/network resources backing the database
    ///
    /// **Input:** [`crate::activity_types::DeployResourcesInput`]
    /// **Output:** [`crate::activity_types::DeployResourcesOutput`]
    /// **Idempotent:** Yes (existing resources are reported, not recreated)
    pub const DEPLOY_RESOURCES: &str = "pgrecipe-orchestrations::activity::deploy-resources";

    /// Tear down the resources created by [`DEPLOY_RESOURCES`]
    ///
    /// **Input:** [`crate::activity_types::DeleteResourcesInput`]
    /// **Output:** [`crate::activity_types::DeleteResourcesOutput`]
    /// **Idempotent:** Yes (no-op if already deleted)
    pub const DELETE_RESOURCES: &str = "pgrecipe-orchestrations::activity::delete-resources";

    /// Mint a new access credential
    ///
    /// **Input:** [`crate::activity_types::CreateCredentialInput`]
    /// **Output:** [`crate::activity_types::CreateCredentialOutput`]
    /// **Idempotent:** No. A duplicate run mints a second credential and the
    /// first one is abandoned.
    pub const CREATE_CREDENTIAL: &str = "pgrecipe-orchestrations::activity::create-credential";

    /// Revoke a credential
    ///
    /// **Input:** [`crate::activity_types::DeleteCredentialInput`]
    /// **Output:** [`crate::activity_types::DeleteCredentialOutput`]
    /// **Idempotent:** Yes
    pub const DELETE_CREDENTIAL: &str = "pgrecipe-orchestrations::activity::delete-credential";

    /// Create a logical database named `{prefix}_{uuid}`
    ///
    /// **Input:** [`crate::activity_types::CreateDatabaseInput`]
    /// **Output:** [`crate::activity_types::CreateDatabaseOutput`]
    /// **Idempotent:** No. Every run picks a fresh name, so concurrent runs
    /// sharing a prefix never collide.
    pub const CREATE_DATABASE: &str = "pgrecipe-orchestrations::activity::create-database";

    /// Optionally back up, then drop, a logical database
    ///
    /// **Input:** [`crate::activity_types::DeleteDatabaseInput`]
    /// **Output:** [`crate::activity_types::DeleteDatabaseOutput`]
    /// **Idempotent:** Yes (no backup and no-op if already dropped)
    pub const DELETE_DATABASE: &str = "pgrecipe-orchestrations::activity::delete-database";
}
