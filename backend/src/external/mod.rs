//! External integrations

pub mod assistant;
pub mod model;
pub mod nasa_power;

pub use assistant::GeminiClient;
pub use model::{DenseNetwork, ModelHandle};
pub use nasa_power::NasaPowerClient;
