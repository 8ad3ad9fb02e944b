//! Typed client for the remote DNA classification service.
//!
//! Wraps the service's JSON-over-HTTP contract (health, train, predict,
//! batch predict) and decodes responses into typed results or typed failures.
//! The session layer talks to [`ClassifierApi`] rather than the concrete
//! client so tests can substitute a double.

mod client;
mod wire;

use thiserror::Error;

use crate::sequence_sanitize::Sequence;

pub use client::PredictionClient;

/// Classification verdict for one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionLabel {
    /// The model's positive class (class index 1).
    Coding,
    /// The model's negative class (class index 0).
    NonCoding,
}

impl PredictionLabel {
    /// Map the server's class index onto a label. Coding iff the index is 1.
    pub fn from_class_index(index: i64) -> Self {
        if index == 1 {
            Self::Coding
        } else {
            Self::NonCoding
        }
    }

    /// Human-readable label text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coding => "Coding",
            Self::NonCoding => "Non-Coding",
        }
    }
}

/// A decoded classification verdict for one sequence.
///
/// Immutable once constructed; the session replaces it wholesale on the next
/// prediction or an explicit clear.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// The sequence the verdict applies to.
    pub sequence: Sequence,
    pub label: PredictionLabel,
    /// Model confidence in the predicted label, in [0, 1].
    pub confidence: f64,
    /// Probability of the non-coding class. In batch mode this is derived
    /// from confidence rather than a true class probability.
    pub non_coding_probability: f64,
    /// Probability of the coding class. Same batch-mode caveat as above.
    pub coding_probability: f64,
}

/// Server-side model readiness, refreshed by a health check.
///
/// Never mutated in place; each health check produces a fresh value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingStatus {
    pub is_trained: bool,
    pub accuracy: Option<f64>,
    pub dataset_size: Option<u64>,
    pub training_samples: Option<u64>,
    pub test_samples: Option<u64>,
}

/// Summary returned by a successful train call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingSummary {
    pub accuracy: Option<f64>,
    pub dataset_size: Option<u64>,
    pub training_samples: Option<u64>,
    pub test_samples: Option<u64>,
}

/// Failures the session must handle in distinct ways.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// DNS failure, refused connection, unreachable host, or timeout.
    #[error("Could not reach the classifier service: {0}")]
    Connectivity(String),
    /// The server reported an application-level failure.
    #[error("Classifier service rejected the request: {0}")]
    ServerRejected(String),
    /// The response body could not be decoded against the contract.
    #[error("Unexpected response from the classifier service: {0}")]
    Malformed(String),
    /// A train call did not produce an explicit success.
    #[error("Training failed: {0}")]
    TrainingFailed(String),
}

impl TransportError {
    /// Whether this failure means the host could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// The server-provided message, when one exists.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ServerRejected(message) | Self::TrainingFailed(message) => Some(message),
            Self::Connectivity(_) | Self::Malformed(_) => None,
        }
    }
}

/// Operations the prediction session needs from the classifier service.
pub trait ClassifierApi {
    /// Fetch server-side model readiness.
    fn check_health(&self) -> Result<TrainingStatus, TransportError>;
    /// Ask the server to (re)train its model, optionally from a dataset path.
    fn train(&self, file_path: Option<&str>) -> Result<TrainingSummary, TransportError>;
    /// Classify a single sequence.
    fn predict(&self, sequence: &Sequence) -> Result<PredictionResult, TransportError>;
    /// Classify a list of sequences in one request.
    fn batch_predict(&self, sequences: &[Sequence]) -> Result<Vec<PredictionResult>, TransportError>;
}
