//! Name constants for pgrecipe orchestrations
//!
//! Orchestrator names are the public identifiers callers pass to
//! `PUT /workflows`, so they keep their established spelling.

/// Orchestration names
pub mod orchestrations {
    /// Create or update a PostgreSQL database for a recipe resource
    ///
    /// **Input:** [`pgrecipe_models::RecipeContext`]
    /// **Output:** [`pgrecipe_models::RecipeResult`]
    /// **Activities used:**
    /// - [`crate::activity_names::activities::DEPLOY_RESOURCES`]
    /// - [`crate::activity_names::activities::CREATE_CREDENTIAL`]
    /// - [`crate::activity_names::activities::CREATE_DATABASE`]
    pub const POSTGRES_DATABASES_PUT: &str = "PostgresSQLDatabasesPut";

    /// Tear down a PostgreSQL database for a recipe resource
    ///
    /// **Input:** [`pgrecipe_models::RecipeContext`] (with `status.binding` from a prior put)
    /// **Output:** [`crate::types::TeardownOutput`]
    /// **Activities used:**
    /// - [`crate::activity_names::activities::DELETE_DATABASE`] (if a database was recorded)
    /// - [`crate::activity_names::activities::DELETE_CREDENTIAL`] (if a username was recorded)
    /// - [`crate::activity_names::activities::DELETE_RESOURCES`]
    /// **Note:** Safe to re-run; every delete is a no-op when the target is gone
    pub const POSTGRES_DATABASES_DELETE: &str = "PostgresSQLDatabasesDelete";

    /// All registered orchestrator names
    pub const ALL: &[&str] = &[POSTGRES_DATABASES_PUT, POSTGRES_DATABASES_DELETE];
}
