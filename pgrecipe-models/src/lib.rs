//! Shared data model for pgrecipe
//!
//! - [`recipe`]: the Recipe Context handed to an orchestration and the Recipe
//!   Result it produces.
//! - [`control`]: wire types for the control-plane HTTP surface.

pub mod control;
pub mod recipe;

pub use control::*;
pub use recipe::*;
