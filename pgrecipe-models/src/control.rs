use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error codes used by the control-plane envelope
pub mod codes {
    /// Malformed or incomplete request
    pub const INVALID: &str = "Invalid";
    /// Everything else
    pub const INTERNAL: &str = "Internal";
}

/// Body of `PUT /workflows`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowRequest {
    /// Registered orchestrator name
    #[serde(default)]
    pub name: String,
    /// Raw orchestrator input; `null` counts as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Caller-chosen instance id for idempotent scheduling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl WorkflowRequest {
    /// Validate the required fields, returning the reason on failure
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.input.is_none() {
            return Err("name and input are required".to_string());
        }
        Ok(())
    }

    /// Caller-supplied instance id, ignoring empty strings
    pub fn instance_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Body of a successful `PUT /workflows`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Lifecycle state of an orchestration instance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuntimeStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Terminated,
}

impl RuntimeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RuntimeStatus::Completed | RuntimeStatus::Failed | RuntimeStatus::Terminated
        )
    }
}

/// Observed state of an orchestration instance, as reported by the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadata {
    pub id: String,
    pub name: String,
    pub runtime_status: RuntimeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_details: Option<FailureDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureDetails {
    pub message: String,
}

/// Uniform error envelope: `{"error": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code: code.to_string(),
                message: message.into(),
                target: None,
                additional_info: Vec::new(),
                details: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_info: Vec<ErrorAdditionalInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorAdditionalInfo {
    #[serde(rename = "type")]
    pub info_type: String,
    pub info: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_validation() {
        let request: WorkflowRequest =
            serde_json::from_value(json!({ "name": "", "input": {} })).unwrap();
        assert!(request.validate().is_err());

        let request: WorkflowRequest =
            serde_json::from_value(json!({ "name": "PostgresSQLDatabasesPut" })).unwrap();
        assert!(request.validate().is_err());

        let request: WorkflowRequest =
            serde_json::from_value(json!({ "name": "PostgresSQLDatabasesPut", "input": null }))
                .unwrap();
        assert!(request.validate().is_err());

        let request: WorkflowRequest = serde_json::from_value(json!({
            "name": "PostgresSQLDatabasesPut",
            "input": { "resource": { "name": "db1" } }
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.instance_id(), None);
    }

    #[test]
    fn test_empty_id_is_ignored() {
        let request: WorkflowRequest =
            serde_json::from_value(json!({ "name": "n", "input": 1, "id": "" })).unwrap();
        assert_eq!(request.instance_id(), None);

        let request: WorkflowRequest =
            serde_json::from_value(json!({ "name": "n", "input": 1, "id": "abc" })).unwrap();
        assert_eq!(request.instance_id(), Some("abc"));
    }

    #[test]
    fn test_error_envelope_shape() {
        let encoded = serde_json::to_value(ErrorResponse::new(codes::INVALID, "bad")).unwrap();
        assert_eq!(
            encoded,
            json!({ "error": { "code": "Invalid", "message": "bad" } })
        );
    }

    #[test]
    fn test_instance_metadata_shape() {
        let metadata = InstanceMetadata {
            id: "abc".to_string(),
            name: "PostgresSQLDatabasesDelete".to_string(),
            runtime_status: RuntimeStatus::Failed,
            created_at: None,
            last_updated_at: None,
            serialized_input: Some("{}".to_string()),
            serialized_output: None,
            failure_details: Some(FailureDetails {
                message: "boom".to_string(),
            }),
        };

        let encoded = serde_json::to_value(&metadata).unwrap();
        assert_eq!(encoded["runtimeStatus"], "Failed");
        assert_eq!(encoded["serializedInput"], "{}");
        assert_eq!(encoded["failureDetails"]["message"], "boom");
        assert!(encoded.get("serializedOutput").is_none());
        assert!(RuntimeStatus::Failed.is_terminal());
        assert!(!RuntimeStatus::Running.is_terminal());
    }
}
