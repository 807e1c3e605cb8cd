//! Domain models for the EcoGuardian platform

mod history;
mod risk;
mod weather;

pub use history::*;
pub use risk::*;
pub use weather::*;
