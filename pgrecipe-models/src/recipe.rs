use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Input document for a provisioning or teardown run.
///
/// Serialized once when the orchestration is scheduled and treated as
/// read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipeContext {
    /// The resource being created or deleted
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource: Resource,
    /// Owning application
    #[serde(default, deserialize_with = "null_as_default")]
    pub application: ResourceInfo,
    /// Owning environment
    #[serde(default, deserialize_with = "null_as_default")]
    pub environment: ResourceInfo,
    /// Kubernetes runtime configuration
    #[serde(default, deserialize_with = "null_as_default")]
    pub runtime: RuntimeConfiguration,
    /// Azure provider scope, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<ProviderAzure>,
    /// AWS provider scope, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<ProviderAws>,
}

impl RecipeContext {
    /// Namespace the resource is deployed into.
    ///
    /// Falls back to the environment namespace when the application namespace
    /// is empty. `None` when the context carries no Kubernetes runtime at all.
    pub fn kubernetes_namespace(&self) -> Option<&str> {
        let kubernetes = self.runtime.kubernetes.as_ref()?;
        if !kubernetes.namespace.is_empty() {
            Some(kubernetes.namespace.as_str())
        } else if !kubernetes.environment_namespace.is_empty() {
            Some(kubernetes.environment_namespace.as_str())
        } else {
            None
        }
    }
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Name and fully qualified id of a resource or scope
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    #[serde(flatten)]
    pub info: ResourceInfo,
    /// Namespace/type combination, e.g. `Applications.Datastores/sqlDatabases`
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    /// Open-ended property bag; may carry status written by a previous run
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// Resolve a JSON pointer (`/status/binding/database`) into `properties`.
    ///
    /// Strings resolve to themselves, numbers and booleans to their JSON text.
    /// Anything else (missing segment, object, array, null, malformed pointer)
    /// is [`Lookup::Absent`].
    pub fn lookup(&self, pointer: &str) -> Lookup {
        let Some(path) = pointer.strip_prefix('/') else {
            return Lookup::Absent;
        };

        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        let Some(root) = self.properties.get(&unescape_segment(head)) else {
            return Lookup::Absent;
        };

        let value = match rest {
            Some(rest) => match root.pointer(&format!("/{rest}")) {
                Some(value) => value,
                None => return Lookup::Absent,
            },
            None => root,
        };

        match value {
            Value::String(s) => Lookup::Found(s.clone()),
            Value::Number(n) => Lookup::Found(n.to_string()),
            Value::Bool(b) => Lookup::Found(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => Lookup::Absent,
        }
    }
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Result of a property lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(String),
    Absent,
}

impl Lookup {
    pub fn into_option(self) -> Option<String> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesRuntime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesRuntime {
    /// Application namespace for application-scoped resources, environment
    /// namespace otherwise
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub environment_namespace: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAzure {
    #[serde(default)]
    pub resource_group: AzureResourceGroup,
    #[serde(default)]
    pub subscription: AzureSubscription,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AzureResourceGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AzureSubscription {
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderAws {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub account: String,
}

/// Output of a provisioning run
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipeResult {
    /// Non-sensitive outputs (host, port, username, database)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub values: Map<String, Value>,
    /// Sensitive outputs (password, uri). Never logged.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub secrets: Map<String, Value>,
    /// Identifiers of created resources, in creation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

impl fmt::Debug for RecipeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret_keys: Vec<&String> = self.secrets.keys().collect();
        f.debug_struct("RecipeResult")
            .field("values", &self.values)
            .field("secrets", &format_args!("{:?} (redacted)", secret_keys))
            .field("resources", &self.resources)
            .finish()
    }
}
