//! pgrecipe orchestrations - durable provisioning of PostgreSQL databases
//!
//! This crate provides the Put and Delete orchestrations, the activities they
//! schedule, and the hosts that run them: duroxide registries for production
//! and an in-process replay host for local runs and tests.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pgrecipe_orchestrations::backends::simulated::Simulation;
//! use pgrecipe_orchestrations::registry::{create_activity_registry, create_orchestration_registry};
//!
//! let backends = Arc::new(Simulation::default().backends());
//! let activities = create_activity_registry(backends);
//! let orchestrations = create_orchestration_registry();
//!
//! // Use with Duroxide runtime
//! // client.start_orchestration(
//! //     "instance-1",
//! //     pgrecipe_orchestrations::names::orchestrations::POSTGRES_DATABASES_PUT,
//! //     input_json,
//! // ).await?;
//! ```

// Orchestration exports
pub mod host;
pub mod local_host;
pub mod names;
pub mod orchestrations;
pub mod registry;
pub mod types;
pub mod workflow;

// Activity exports
pub mod activities;
pub mod activity_names;
pub mod activity_types;
pub mod backends;
pub mod error;

// Re-export key types for convenience
pub use activity_types::*;
pub use error::{ActivityError, BackendError, HostError};
pub use host::OrchestrationHost;
pub use local_host::LocalHost;
pub use types::*;
pub use workflow::Workflow;
