//! Serde wire structs for the classifier service's JSON bodies.

use serde::{Deserialize, Serialize};

use super::{PredictionLabel, PredictionResult, TrainingStatus, TrainingSummary};
use crate::sequence_sanitize::Sequence;

#[derive(Clone, Debug, Serialize)]
pub(super) struct TrainRequestWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<&'a str>,
}

#[derive(Clone, Debug, Serialize)]
pub(super) struct PredictRequestWire<'a> {
    pub sequence: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub(super) struct BatchPredictRequestWire<'a> {
    pub sequences: Vec<&'a str>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct HealthWire {
    #[serde(default)]
    pub model_trained: bool,
    pub accuracy: Option<f64>,
    pub dataset_size: Option<u64>,
    pub training_samples: Option<u64>,
    pub test_samples: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct TrainWire {
    #[serde(default)]
    pub success: bool,
    pub accuracy: Option<f64>,
    pub dataset_size: Option<u64>,
    pub training_samples: Option<u64>,
    pub test_samples: Option<u64>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct ProbabilitiesWire {
    pub non_coding: f64,
    pub coding: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct PredictWire {
    #[serde(default)]
    pub success: bool,
    pub prediction: Option<i64>,
    pub confidence: Option<f64>,
    pub probabilities: Option<ProbabilitiesWire>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct BatchItemWire {
    pub prediction: Option<i64>,
    pub confidence: Option<f64>,
    pub probabilities: Option<ProbabilitiesWire>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct BatchPredictWire {
    #[serde(default)]
    pub success: bool,
    pub results: Option<Vec<BatchItemWire>>,
    pub error: Option<String>,
}

/// Body shape shared by error replies from every endpoint.
#[derive(Clone, Debug, Deserialize)]
pub(super) struct ErrorWire {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorWire {
    /// Extract a server-provided message from an error body, if any.
    pub(super) fn message_from_body(body: &str) -> Option<String> {
        let wire: ErrorWire = serde_json::from_str(body).ok()?;
        wire.error.or(wire.message).filter(|m| !m.trim().is_empty())
    }
}

impl From<HealthWire> for TrainingStatus {
    fn from(wire: HealthWire) -> Self {
        Self {
            is_trained: wire.model_trained,
            accuracy: wire.accuracy,
            dataset_size: wire.dataset_size,
            training_samples: wire.training_samples,
            test_samples: wire.test_samples,
        }
    }
}

impl From<TrainWire> for TrainingSummary {
    fn from(wire: TrainWire) -> Self {
        Self {
            accuracy: wire.accuracy,
            dataset_size: wire.dataset_size,
            training_samples: wire.training_samples,
            test_samples: wire.test_samples,
        }
    }
}

/// Build a result from a single-predict body, which carries a full
/// two-class probability vector.
pub(super) fn prediction_from_wire(
    sequence: &Sequence,
    wire: PredictWire,
) -> Result<PredictionResult, String> {
    let class_index = wire
        .prediction
        .ok_or_else(|| "Missing 'prediction' field".to_string())?;
    let confidence = wire
        .confidence
        .ok_or_else(|| "Missing 'confidence' field".to_string())?;
    let probabilities = wire
        .probabilities
        .ok_or_else(|| "Missing 'probabilities' field".to_string())?;
    Ok(PredictionResult {
        sequence: sequence.clone(),
        label: PredictionLabel::from_class_index(class_index),
        confidence,
        non_coding_probability: probabilities.non_coding,
        coding_probability: probabilities.coding,
    })
}

/// Build a result from a batch item.
///
/// Batch items usually omit the probability vector, in which case the pair is
/// derived from confidence (`coding = confidence`, `non_coding = 1 -
/// confidence`). That is an approximation, not a true distribution.
pub(super) fn prediction_from_batch_item(
    sequence: &Sequence,
    item: BatchItemWire,
) -> Result<PredictionResult, String> {
    let class_index = item
        .prediction
        .ok_or_else(|| "Missing 'prediction' field in batch item".to_string())?;
    let confidence = item
        .confidence
        .ok_or_else(|| "Missing 'confidence' field in batch item".to_string())?;
    let (non_coding, coding) = match item.probabilities {
        Some(p) => (p.non_coding, p.coding),
        None => (1.0 - confidence, confidence),
    };
    Ok(PredictionResult {
        sequence: sequence.clone(),
        label: PredictionLabel::from_class_index(class_index),
        confidence,
        non_coding_probability: non_coding,
        coding_probability: coding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence_sanitize::clean;

    fn sequence() -> Sequence {
        clean("ATGCGT").unwrap()
    }

    #[test]
    fn predict_body_decodes_into_coding_result() {
        let wire: PredictWire = serde_json::from_str(
            r#"{
                "success": true,
                "sequence": "ATGCGT",
                "prediction": 1,
                "prediction_label": "Coding",
                "confidence": 0.92,
                "probabilities": { "non_coding": 0.08, "coding": 0.92 }
            }"#,
        )
        .unwrap();
        let result = prediction_from_wire(&sequence(), wire).unwrap();
        assert_eq!(result.label, PredictionLabel::Coding);
        assert!((result.confidence - 0.92).abs() < 1e-9);
        assert!((result.coding_probability - 0.92).abs() < 1e-9);
        assert!((result.non_coding_probability - 0.08).abs() < 1e-9);
    }

    #[test]
    fn class_index_zero_decodes_as_non_coding() {
        let wire: PredictWire = serde_json::from_str(
            r#"{
                "success": true,
                "prediction": 0,
                "confidence": 0.61,
                "probabilities": { "non_coding": 0.61, "coding": 0.39 }
            }"#,
        )
        .unwrap();
        let result = prediction_from_wire(&sequence(), wire).unwrap();
        assert_eq!(result.label, PredictionLabel::NonCoding);
    }

    #[test]
    fn predict_body_without_probabilities_is_rejected() {
        let wire: PredictWire =
            serde_json::from_str(r#"{ "success": true, "prediction": 1, "confidence": 0.9 }"#)
                .unwrap();
        let err = prediction_from_wire(&sequence(), wire).unwrap_err();
        assert!(err.contains("probabilities"));
    }

    #[test]
    fn batch_item_without_probabilities_derives_pair_from_confidence() {
        let item: BatchItemWire =
            serde_json::from_str(r#"{ "sequence": "ATGCGT", "prediction": 0, "confidence": 0.7 }"#)
                .unwrap();
        let result = prediction_from_batch_item(&sequence(), item).unwrap();
        assert_eq!(result.label, PredictionLabel::NonCoding);
        assert!((result.non_coding_probability - 0.3).abs() < 1e-9);
        assert!((result.coding_probability - 0.7).abs() < 1e-9);
    }

    #[test]
    fn batch_item_with_probabilities_uses_them_verbatim() {
        let item: BatchItemWire = serde_json::from_str(
            r#"{
                "prediction": 1,
                "confidence": 0.8,
                "probabilities": { "non_coding": 0.2, "coding": 0.8 }
            }"#,
        )
        .unwrap();
        let result = prediction_from_batch_item(&sequence(), item).unwrap();
        assert!((result.non_coding_probability - 0.2).abs() < 1e-9);
    }

    #[test]
    fn health_body_defaults_model_trained_to_false() {
        let wire: HealthWire = serde_json::from_str(r#"{ "status": "ok" }"#).unwrap();
        let status = TrainingStatus::from(wire);
        assert!(!status.is_trained);
        assert_eq!(status.accuracy, None);
    }

    #[test]
    fn health_body_carries_optional_metrics() {
        let wire: HealthWire = serde_json::from_str(
            r#"{ "model_trained": true, "accuracy": 0.95, "dataset_size": 4380 }"#,
        )
        .unwrap();
        let status = TrainingStatus::from(wire);
        assert!(status.is_trained);
        assert_eq!(status.dataset_size, Some(4380));
    }

    #[test]
    fn error_message_prefers_error_field_over_message() {
        let body = r#"{ "error": "Model not trained", "message": "other" }"#;
        assert_eq!(
            ErrorWire::message_from_body(body).as_deref(),
            Some("Model not trained")
        );
        assert_eq!(ErrorWire::message_from_body("not json"), None);
        assert_eq!(ErrorWire::message_from_body(r#"{ "error": "  " }"#), None);
    }
}
