//! Input and output types for pgrecipe activities
//!
//! Every activity has a plain-data input and output. [`ActivityCall`] and
//! [`ActivityOutput`] close over the whole set so a host can record and
//! replay invocations without knowing the concrete types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity_names::activities;

// ============================================================================
// Deploy Resources Activity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployResourcesInput {
    /// Kubernetes namespace
    pub namespace: String,
    /// Resource name (used for Service/Deployment names)
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployResourcesOutput {
    /// Identifiers of the created resources, in creation order
    pub resources: Vec<String>,
    /// Connection host
    pub host: String,
    /// Connection port
    pub port: u16,
}

// ============================================================================
// Delete Resources Activity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResourcesInput {
    /// Kubernetes namespace
    pub namespace: String,
    /// Resource name
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResourcesOutput {}

// ============================================================================
// Create Credential Activity
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCredentialInput {}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCredentialOutput {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CreateCredentialOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateCredentialOutput")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

// ============================================================================
// Delete Credential Activity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteCredentialInput {
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteCredentialOutput {}

// ============================================================================
// Create Database Activity
// ============================================================================

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseInput {
    /// Owner of the new database
    pub username: String,
    pub password: String,
    /// Prefix of the generated database name
    pub database_prefix: String,
}

impl fmt::Debug for CreateDatabaseInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateDatabaseInput")
            .field("username", &self.username)
            .field("password", &"********")
            .field("database_prefix", &self.database_prefix)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateDatabaseOutput {
    /// Generated database name
    pub database: String,
}

// ============================================================================
// Delete Database Activity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDatabaseInput {
    pub database: String,
    /// Snapshot the database before dropping it
    pub create_backup: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteDatabaseOutput {}

// ============================================================================
// Closed call/output sets
// ============================================================================

/// One activity invocation, as issued by an orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityCall {
    DeployResources(DeployResourcesInput),
    DeleteResources(DeleteResourcesInput),
    CreateCredential(CreateCredentialInput),
    DeleteCredential(DeleteCredentialInput),
    CreateDatabase(CreateDatabaseInput),
    DeleteDatabase(DeleteDatabaseInput),
}

impl ActivityCall {
    /// Registered activity name
    pub fn name(&self) -> &'static str {
        match self {
            ActivityCall::DeployResources(_) => activities::DEPLOY_RESOURCES,
            ActivityCall::DeleteResources(_) => activities::DELETE_RESOURCES,
            ActivityCall::CreateCredential(_) => activities::CREATE_CREDENTIAL,
            ActivityCall::DeleteCredential(_) => activities::DELETE_CREDENTIAL,
            ActivityCall::CreateDatabase(_) => activities::CREATE_DATABASE,
            ActivityCall::DeleteDatabase(_) => activities::DELETE_DATABASE,
        }
    }

    /// Input as plain JSON, for recording
    pub fn input_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            ActivityCall::DeployResources(input) => serde_json::to_value(input),
            ActivityCall::DeleteResources(input) => serde_json::to_value(input),
            ActivityCall::CreateCredential(input) => serde_json::to_value(input),
            ActivityCall::DeleteCredential(input) => serde_json::to_value(input),
            ActivityCall::CreateDatabase(input) => serde_json::to_value(input),
            ActivityCall::DeleteDatabase(input) => serde_json::to_value(input),
        }
    }
}

/// Output of one activity invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityOutput {
    DeployResources(DeployResourcesOutput),
    DeleteResources(DeleteResourcesOutput),
    CreateCredential(CreateCredentialOutput),
    DeleteCredential(DeleteCredentialOutput),
    CreateDatabase(CreateDatabaseOutput),
    DeleteDatabase(DeleteDatabaseOutput),
}

impl ActivityOutput {
    pub fn name(&self) -> &'static str {
        match self {
            ActivityOutput::DeployResources(_) => activities::DEPLOY_RESOURCES,
            ActivityOutput::DeleteResources(_) => activities::DELETE_RESOURCES,
            ActivityOutput::CreateCredential(_) => activities::CREATE_CREDENTIAL,
            ActivityOutput::DeleteCredential(_) => activities::DELETE_CREDENTIAL,
            ActivityOutput::CreateDatabase(_) => activities::CREATE_DATABASE,
            ActivityOutput::DeleteDatabase(_) => activities::DELETE_DATABASE,
        }
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            ActivityOutput::DeployResources(output) => serde_json::to_value(output),
            ActivityOutput::DeleteResources(output) => serde_json::to_value(output),
            ActivityOutput::CreateCredential(output) => serde_json::to_value(output),
            ActivityOutput::DeleteCredential(output) => serde_json::to_value(output),
            ActivityOutput::CreateDatabase(output) => serde_json::to_value(output),
            ActivityOutput::DeleteDatabase(output) => serde_json::to_value(output),
        }
    }

    /// Decode a recorded output for the named activity
    pub fn decode(activity: &str, value: Value) -> Result<Self, String> {
        let decoded = match activity {
            activities::DEPLOY_RESOURCES => serde_json::from_value(value).map(ActivityOutput::DeployResources),
            activities::DELETE_RESOURCES => serde_json::from_value(value).map(ActivityOutput::DeleteResources),
            activities::CREATE_CREDENTIAL => serde_json::from_value(value).map(ActivityOutput::CreateCredential),
            activities::DELETE_CREDENTIAL => serde_json::from_value(value).map(ActivityOutput::DeleteCredential),
            activities::CREATE_DATABASE => serde_json::from_value(value).map(ActivityOutput::CreateDatabase),
            activities::DELETE_DATABASE => serde_json::from_value(value).map(ActivityOutput::DeleteDatabase),
            other => return Err(format!("unknown activity '{}'", other)),
        };
        decoded.map_err(|e| format!("Failed to decode output of '{}': {}", activity, e))
    }
}

/// Ties an activity input type to its output type
pub trait ActivityStep: Into<ActivityCall> {
    type Output;

    /// Extract this step's output, `None` if the variant does not match
    fn extract(output: ActivityOutput) -> Option<Self::Output>;
}

macro_rules! activity_step {
    ($input:ty, $output:ty, $variant:ident) => {
        impl From<$input> for ActivityCall {
            fn from(input: $input) -> Self {
                ActivityCall::$variant(input)
            }
        }

        impl ActivityStep for $input {
            type Output = $output;

            fn extract(output: ActivityOutput) -> Option<Self::Output> {
                match output {
                    ActivityOutput::$variant(output) => Some(output),
                    _ => None,
                }
            }
        }
    };
}

activity_step!(DeployResourcesInput, DeployResourcesOutput, DeployResources);
activity_step!(DeleteResourcesInput, DeleteResourcesOutput, DeleteResources);
activity_step!(CreateCredentialInput, CreateCredentialOutput, CreateCredential);
activity_step!(DeleteCredentialInput, DeleteCredentialOutput, DeleteCredential);
activity_step!(CreateDatabaseInput, CreateDatabaseOutput, CreateDatabase);
activity_step!(DeleteDatabaseInput, DeleteDatabaseOutput, DeleteDatabase);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let input = CreateDatabaseInput {
            username: "pguser_1".to_string(),
            password: "secret".to_string(),
            database_prefix: "db1".to_string(),
        };
        let encoded = serde_json::to_value(&input).unwrap();
        assert_eq!(encoded["databasePrefix"], "db1");

        let input = DeleteDatabaseInput {
            database: "db1_x".to_string(),
            create_backup: true,
        };
        assert_eq!(serde_json::to_value(&input).unwrap()["createBackup"], true);
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let output = CreateCredentialOutput {
            username: "pguser_1".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", output);
        assert!(debug.contains("pguser_1"));
        assert!(!debug.contains("hunter2"));

        let input = CreateDatabaseInput {
            username: "pguser_1".to_string(),
            password: "hunter2".to_string(),
            database_prefix: "db1".to_string(),
        };
        assert!(!format!("{:?}", input).contains("hunter2"));
    }

    #[test]
    fn test_decode_recorded_output() {
        let decoded = ActivityOutput::decode(
            activities::DEPLOY_RESOURCES,
            json!({ "resources": ["a"], "host": "h", "port": 5432 }),
        )
        .unwrap();
        assert_eq!(decoded.name(), activities::DEPLOY_RESOURCES);

        let extracted = DeployResourcesInput::extract(decoded).unwrap();
        assert_eq!(extracted.port, 5432);
    }

    #[test]
    fn test_decode_rejects_mismatched_shape() {
        assert!(ActivityOutput::decode(activities::CREATE_DATABASE, json!({ "nope": 1 })).is_err());
        assert!(ActivityOutput::decode("unknown", json!({})).is_err());
    }

    #[test]
    fn test_extract_wrong_variant() {
        let output = ActivityOutput::DeleteResources(DeleteResourcesOutput {});
        assert!(CreateDatabaseInput::extract(output).is_none());
    }

    #[test]
    fn test_call_names() {
        let call: ActivityCall = DeleteCredentialInput {
            username: "u".to_string(),
        }
        .into();
        assert_eq!(call.name(), activities::DELETE_CREDENTIAL);
        assert_eq!(call.input_json().unwrap(), json!({ "username": "u" }));
    }
}
