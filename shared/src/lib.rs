//! Shared types and models for the EcoGuardian late blight monitor
//!
//! This crate contains the weather aggregation and risk classification core
//! shared between the backend, the browser dashboard (via WASM), and tests.

pub mod aggregation;
pub mod inference;
pub mod models;
pub mod types;
pub mod validation;

pub use aggregation::*;
pub use inference::*;
pub use models::*;
pub use types::*;
pub use validation::*;
