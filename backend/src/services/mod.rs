//! Business logic services

pub mod assistant;
pub mod history;
pub mod risk;

pub use assistant::AssistantService;
pub use history::HistoryService;
pub use risk::{LocationAssessment, RiskPipeline};
