//! HTTP handlers

mod assistant;
mod health;
mod history;
mod risk;

pub use assistant::*;
pub use health::*;
pub use history::*;
pub use risk::*;
