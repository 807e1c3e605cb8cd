//! Risk classification model artifact and its lazily loaded handle
//!
//! The trained network is exported as JSON: an input width plus a stack of
//! dense layers. The handle loads it on first use and keeps it for the life of
//! the process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use shared::{ClassificationModel, InferenceError, ModelOutput};
use thiserror::Error;
use tokio::sync::OnceCell;

/// Errors raised while loading a model artifact
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Invalid(String),
}

/// Layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    fn apply(&self, values: &mut [f32]) {
        match self {
            Activation::Linear => {}
            Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
            Activation::Sigmoid => values.iter_mut().for_each(|v| *v = 1.0 / (1.0 + (-*v).exp())),
            Activation::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
            Activation::Softmax => {
                let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let mut sum = 0.0;
                for v in values.iter_mut() {
                    *v = (*v - max).exp();
                    sum += *v;
                }
                if sum > 0.0 {
                    values.iter_mut().for_each(|v| *v /= sum);
                }
            }
        }
    }
}

/// Fully connected layer, weights laid out as `units × inputs`
#[derive(Debug, Clone, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    #[serde(default = "default_activation")]
    pub activation: Activation,
}

fn default_activation() -> Activation {
    Activation::Linear
}

impl DenseLayer {
    fn units(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut out: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect();
        self.activation.apply(&mut out);
        out
    }
}

/// Dense feed-forward classifier exported from training
#[derive(Debug, Clone, Deserialize)]
pub struct DenseNetwork {
    pub input_features: usize,
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Parse and validate a network from its JSON export
    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let network: DenseNetwork = serde_json::from_str(json)?;
        network.validate()?;
        Ok(network)
    }

    /// Layer widths must chain from the input to the last layer
    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.input_features == 0 {
            return Err(ModelLoadError::Invalid("input_features must be positive".into()));
        }
        if self.layers.is_empty() {
            return Err(ModelLoadError::Invalid("model has no layers".into()));
        }

        let mut width = self.input_features;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.units() == 0 {
                return Err(ModelLoadError::Invalid(format!("layer {} has no units", i)));
            }
            if layer.bias.len() != layer.units() {
                return Err(ModelLoadError::Invalid(format!(
                    "layer {} has {} units but {} biases",
                    i,
                    layer.units(),
                    layer.bias.len()
                )));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != width) {
                return Err(ModelLoadError::Invalid(format!(
                    "layer {} expects {} inputs, got a row of {}",
                    i,
                    width,
                    row.len()
                )));
            }
            width = layer.units();
        }
        Ok(())
    }

    pub fn output_classes(&self) -> usize {
        self.layers.last().map(DenseLayer::units).unwrap_or(0)
    }
}

impl ClassificationModel for DenseNetwork {
    fn input_features(&self) -> Option<usize> {
        Some(self.input_features)
    }

    fn predict(&self, features: &[f32]) -> Result<ModelOutput, InferenceError> {
        if features.len() != self.input_features {
            return Err(InferenceError::FeatureMismatch {
                expected: self.input_features,
                actual: features.len(),
            });
        }

        let output = self
            .layers
            .iter()
            .fold(features.to_vec(), |acc, layer| layer.forward(&acc));

        // A batch of one, as the training framework returns it
        Ok(ModelOutput::Batch(vec![output]))
    }
}

/// Load a network artifact from disk
pub async fn load_network(path: &Path) -> Result<DenseNetwork, ModelLoadError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ModelLoadError::NotFound(path.to_path_buf()));
    }
    let json = tokio::fs::read_to_string(path).await?;
    DenseNetwork::from_json(&json)
}

/// Process-wide, lazily loaded classification model.
///
/// The first caller loads the artifact; concurrent first callers wait on the
/// same load. A failed load is not cached, so a model file that appears later
/// is picked up by the next request.
pub struct ModelHandle {
    path: PathBuf,
    model: OnceCell<Arc<dyn ClassificationModel>>,
}

impl ModelHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: OnceCell::new(),
        }
    }

    /// Handle that already holds a model (for testing)
    pub fn preloaded(model: Arc<dyn ClassificationModel>) -> Self {
        Self {
            path: PathBuf::new(),
            model: OnceCell::new_with(Some(model)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Return the model, loading it on first use
    pub async fn get(&self) -> Result<Arc<dyn ClassificationModel>, ModelLoadError> {
        self.model
            .get_or_try_init(|| async {
                let network = load_network(&self.path).await?;
                tracing::info!(
                    "Model loaded from {} (expects {} input features, {} classes)",
                    self.path.display(),
                    network.input_features,
                    network.output_classes()
                );
                Ok::<_, ModelLoadError>(Arc::new(network) as Arc<dyn ClassificationModel>)
            })
            .await
            .cloned()
    }
}
