//! Normalization of classification model output into a risk verdict
//!
//! Models trained at different times expect different feature layouts and
//! emit differently shaped predictions. This module builds the feature vector
//! a model expects and reduces whatever it returns to one verdict from the
//! shared taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{RiskLevel, RiskVerdict};

/// Placeholder values for the fields of the legacy nine-feature schema that
/// can not be derived from a single reading
const LEGACY_PLACEHOLDERS: [f32; 3] = [2.0, 200.0, 700.0];

/// Errors raised while building features or running inference
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("model returned an empty prediction")]
    EmptyOutput,

    #[error("model returned a non-finite prediction")]
    NonFiniteOutput,

    #[error("model expects {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("{0}")]
    Model(String),
}

/// Raw prediction as produced by a model, tagged by shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "values", rename_all = "snake_case")]
pub enum ModelOutput {
    /// Batch × class probabilities
    Batch(Vec<Vec<f32>>),
    /// Class probabilities without a batch axis
    Vector(Vec<f32>),
    /// A single class value
    Scalar(f32),
}

/// A loaded classification model
pub trait ClassificationModel: Send + Sync {
    /// Width of the input the model was trained on, when known
    fn input_features(&self) -> Option<usize>;

    /// Run the model on one feature vector
    fn predict(&self, features: &[f32]) -> Result<ModelOutput, InferenceError>;
}

/// Feature layout expected by a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    /// `[t, h, p]`
    Basic,
    /// `[t, t+6, t-6, h, p, 2.0, 200.0, 700.0, t-5]`
    Legacy,
}

impl FeatureSchema {
    /// Pick the layout from the model's declared input width; anything other
    /// than nine falls back to the basic layout
    pub fn for_width(width: Option<usize>) -> Self {
        match width {
            Some(9) => FeatureSchema::Legacy,
            _ => FeatureSchema::Basic,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            FeatureSchema::Basic => 3,
            FeatureSchema::Legacy => 9,
        }
    }

    pub fn build(&self, temperature: f32, humidity: f32, precipitation: f32) -> Vec<f32> {
        match self {
            FeatureSchema::Basic => vec![temperature, humidity, precipitation],
            FeatureSchema::Legacy => {
                let [a, b, c] = LEGACY_PLACEHOLDERS;
                vec![
                    temperature,
                    temperature + 6.0,
                    temperature - 6.0,
                    humidity,
                    precipitation,
                    a,
                    b,
                    c,
                    temperature - 5.0,
                ]
            }
        }
    }
}

/// Index and value of the largest element, first one wins on ties
fn argmax(values: &[f32]) -> Result<(usize, f32), InferenceError> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(InferenceError::NonFiniteOutput);
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.ok_or(InferenceError::EmptyOutput)
}

fn scalar_rank(value: f32) -> Result<i64, InferenceError> {
    if !value.is_finite() {
        return Err(InferenceError::NonFiniteOutput);
    }
    Ok(f64::from(value).round_ties_even() as i64)
}

/// Reduce a raw prediction to an unclamped 1-based class rank and a confidence
pub fn rank_prediction(output: &ModelOutput) -> Result<(i64, f64), InferenceError> {
    match output {
        ModelOutput::Batch(rows) => {
            let first = rows.first().ok_or(InferenceError::EmptyOutput)?;
            let (idx, prob) = argmax(first)?;
            Ok((idx as i64 + 1, f64::from(prob)))
        }
        ModelOutput::Vector(values) if values.len() > 1 => {
            let (idx, prob) = argmax(values)?;
            Ok((idx as i64 + 1, f64::from(prob)))
        }
        ModelOutput::Vector(values) => {
            let value = values.first().ok_or(InferenceError::EmptyOutput)?;
            Ok((scalar_rank(*value)?, 1.0))
        }
        ModelOutput::Scalar(value) => Ok((scalar_rank(*value)?, 1.0)),
    }
}

/// Map a raw prediction onto the risk taxonomy
pub fn normalize_output(output: &ModelOutput) -> Result<RiskVerdict, InferenceError> {
    let (rank, confidence) = rank_prediction(output)?;
    Ok(RiskVerdict::from_model(RiskLevel::from_rank(rank), confidence))
}

/// Build features for `model`, run it, and normalize the prediction
pub fn classify_with_model(
    model: &dyn ClassificationModel,
    temperature: f64,
    humidity: f64,
    precipitation: f64,
) -> Result<RiskVerdict, InferenceError> {
    let schema = FeatureSchema::for_width(model.input_features());
    let features = schema.build(temperature as f32, humidity as f32, precipitation as f32);
    let output = model.predict(&features)?;
    normalize_output(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedModel {
        width: Option<usize>,
        output: ModelOutput,
        seen: Mutex<Vec<f32>>,
    }

    impl FixedModel {
        fn new(width: Option<usize>, output: ModelOutput) -> Self {
            Self {
                width,
                output,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ClassificationModel for FixedModel {
        fn input_features(&self) -> Option<usize> {
            self.width
        }

        fn predict(&self, features: &[f32]) -> Result<ModelOutput, InferenceError> {
            *self.seen.lock().unwrap() = features.to_vec();
            Ok(self.output.clone())
        }
    }

    struct FailingModel;

    impl ClassificationModel for FailingModel {
        fn input_features(&self) -> Option<usize> {
            Some(3)
        }

        fn predict(&self, _features: &[f32]) -> Result<ModelOutput, InferenceError> {
            Err(InferenceError::Model("weights are corrupt".to_string()))
        }
    }

    #[test]
    fn test_batch_output_uses_argmax_of_first_row() {
        let output = ModelOutput::Batch(vec![vec![0.1, 0.7, 0.1, 0.1], vec![0.9, 0.0, 0.0, 0.1]]);
        let verdict = normalize_output(&output).unwrap();
        assert_eq!(verdict.level, RiskLevel::Rancha);
        assert_eq!(verdict.code, "rancha");
        assert!((verdict.confidence.unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_vector_output_uses_argmax() {
        let output = ModelOutput::Vector(vec![0.05, 0.05, 0.2, 0.7]);
        let verdict = normalize_output(&output).unwrap();
        assert_eq!(verdict.level, RiskLevel::MuyFavorable);
        assert_eq!(verdict.label, "MUY FAVORABLE");
    }

    #[test]
    fn test_scalar_output_rounds_to_class() {
        let verdict = normalize_output(&ModelOutput::Scalar(3.6)).unwrap();
        assert_eq!(verdict.level, RiskLevel::MuyFavorable);
        assert_eq!(verdict.confidence, Some(1.0));

        let verdict = normalize_output(&ModelOutput::Scalar(2.4)).unwrap();
        assert_eq!(verdict.level, RiskLevel::Rancha);
    }

    #[test]
    fn test_scalar_halves_round_to_even() {
        assert_eq!(rank_prediction(&ModelOutput::Scalar(2.5)).unwrap().0, 2);
        assert_eq!(rank_prediction(&ModelOutput::Scalar(3.5)).unwrap().0, 4);
    }

    #[test]
    fn test_single_element_vector_is_scalar() {
        let (rank, confidence) = rank_prediction(&ModelOutput::Vector(vec![2.8])).unwrap();
        assert_eq!(rank, 3);
        assert_eq!(confidence, 1.0);
    }

    #[test]
    fn test_single_column_batch_is_still_argmax() {
        let (rank, confidence) = rank_prediction(&ModelOutput::Batch(vec![vec![0.8]])).unwrap();
        assert_eq!(rank, 1);
        assert!((confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_classes_are_clamped() {
        assert_eq!(normalize_output(&ModelOutput::Scalar(0.0)).unwrap().level, RiskLevel::Optimo);
        assert_eq!(normalize_output(&ModelOutput::Scalar(5.0)).unwrap().level, RiskLevel::MuyFavorable);
        assert_eq!(normalize_output(&ModelOutput::Scalar(-3.0)).unwrap().level, RiskLevel::Optimo);

        // six output classes, last one wins: rank 6 clamps to 4
        let output = ModelOutput::Vector(vec![0.0, 0.0, 0.0, 0.0, 0.1, 0.9]);
        assert_eq!(normalize_output(&output).unwrap().level, RiskLevel::MuyFavorable);
    }

    #[test]
    fn test_ties_pick_first_class() {
        let output = ModelOutput::Vector(vec![0.4, 0.4, 0.2]);
        assert_eq!(rank_prediction(&output).unwrap().0, 1);
    }

    #[test]
    fn test_degenerate_outputs_are_errors() {
        assert_eq!(
            normalize_output(&ModelOutput::Batch(vec![])),
            Err(InferenceError::EmptyOutput)
        );
        assert_eq!(
            normalize_output(&ModelOutput::Batch(vec![vec![]])),
            Err(InferenceError::EmptyOutput)
        );
        assert_eq!(
            normalize_output(&ModelOutput::Vector(vec![])),
            Err(InferenceError::EmptyOutput)
        );
        assert_eq!(
            normalize_output(&ModelOutput::Scalar(f32::NAN)),
            Err(InferenceError::NonFiniteOutput)
        );
        assert_eq!(
            normalize_output(&ModelOutput::Vector(vec![0.2, f32::NAN])),
            Err(InferenceError::NonFiniteOutput)
        );
    }

    #[test]
    fn test_legacy_schema_features() {
        let features = FeatureSchema::Legacy.build(20.0, 80.0, 5.0);
        assert_eq!(
            features,
            vec![20.0, 26.0, 14.0, 80.0, 5.0, 2.0, 200.0, 700.0, 15.0]
        );
        assert_eq!(features.len(), FeatureSchema::Legacy.width());
    }

    #[test]
    fn test_schema_selection_by_width() {
        assert_eq!(FeatureSchema::for_width(Some(9)), FeatureSchema::Legacy);
        assert_eq!(FeatureSchema::for_width(Some(3)), FeatureSchema::Basic);
        assert_eq!(FeatureSchema::for_width(Some(5)), FeatureSchema::Basic);
        assert_eq!(FeatureSchema::for_width(None), FeatureSchema::Basic);
    }

    #[test]
    fn test_classify_with_model_feeds_expected_layout() {
        let model = FixedModel::new(Some(9), ModelOutput::Batch(vec![vec![0.1, 0.1, 0.7, 0.1]]));
        let verdict = classify_with_model(&model, 20.0, 80.0, 5.0).unwrap();
        assert_eq!(verdict.level, RiskLevel::Favorable);
        assert_eq!(
            *model.seen.lock().unwrap(),
            vec![20.0, 26.0, 14.0, 80.0, 5.0, 2.0, 200.0, 700.0, 15.0]
        );

        let model = FixedModel::new(None, ModelOutput::Scalar(1.0));
        classify_with_model(&model, 12.5, 91.0, 0.3).unwrap();
        assert_eq!(*model.seen.lock().unwrap(), vec![12.5, 91.0, 0.3]);
    }

    #[test]
    fn test_model_failure_surfaces_message() {
        let err = classify_with_model(&FailingModel, 20.0, 80.0, 5.0).unwrap_err();
        assert_eq!(err.to_string(), "weights are corrupt");
    }

    #[test]
    fn test_output_shape_serialization() {
        let json = serde_json::to_value(ModelOutput::Scalar(2.0)).unwrap();
        assert_eq!(json["shape"], "scalar");
        let parsed: ModelOutput =
            serde_json::from_str(r#"{"shape":"batch","values":[[0.1,0.9]]}"#).unwrap();
        assert_eq!(parsed, ModelOutput::Batch(vec![vec![0.1, 0.9]]));
    }
}
