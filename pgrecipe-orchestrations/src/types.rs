//! Orchestration-level types and constants

use serde::{Deserialize, Serialize};

pub use pgrecipe_models::{RecipeContext, RecipeResult};

/// Status paths a previous Put's outputs are surfaced under
pub mod binding {
    pub const DATABASE: &str = "/status/binding/database";
    pub const USERNAME: &str = "/status/binding/username";
}

/// Keys of [`RecipeResult::values`]
pub mod values {
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const USERNAME: &str = "username";
    pub const DATABASE: &str = "database";
}

/// Keys of [`RecipeResult::secrets`]
pub mod secrets {
    pub const PASSWORD: &str = "password";
    pub const URI: &str = "uri";
}

/// Output of the Delete orchestration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeardownOutput {}
