//! HTTP implementation of [`ClassifierApi`] over `ureq`.

use std::time::Duration;

use super::wire::{
    BatchPredictRequestWire, BatchPredictWire, ErrorWire, HealthWire, PredictRequestWire,
    PredictWire, TrainRequestWire, TrainWire, prediction_from_batch_item, prediction_from_wire,
};
use super::{ClassifierApi, PredictionResult, TrainingStatus, TrainingSummary, TransportError};
use crate::config::ClientConfig;
use crate::http_client;
use crate::sequence_sanitize::Sequence;

const MAX_RESPONSE_BYTES: usize = 256 * 1024;
const MAX_BATCH_RESPONSE_BYTES: usize = 1024 * 1024;

const HEALTH_PATH: &str = "/api/health";
const TRAIN_PATH: &str = "/api/train";
const PREDICT_PATH: &str = "/api/predict";
const BATCH_PREDICT_PATH: &str = "/api/batch_predict";

/// API key header name expected by the service, sent only when configured.
const API_KEY_HEADER: &str = "X-API-Key";

/// Client for one classifier service endpoint.
pub struct PredictionClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: Option<String>,
}

impl PredictionClient {
    /// Build a client from externally supplied configuration.
    pub fn new(config: &ClientConfig) -> Self {
        let agent = http_client::agent(
            Some(Duration::from_secs(config.connect_timeout_secs)),
            Some(Duration::from_secs(config.request_timeout_secs)),
        );
        Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// The configured base endpoint, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get(&self, path: &str) -> ureq::Request {
        self.with_headers(self.agent.get(&format!("{}{path}", self.endpoint)))
    }

    fn post(&self, path: &str) -> ureq::Request {
        self.with_headers(self.agent.post(&format!("{}{path}", self.endpoint)))
    }

    fn with_headers(&self, mut request: ureq::Request) -> ureq::Request {
        request = request
            .set("Accept", "application/json")
            .set("Content-Type", "application/json");
        if let Some(key) = self.api_key.as_deref() {
            request = request.set(API_KEY_HEADER, key);
        }
        request
    }
}

impl ClassifierApi for PredictionClient {
    fn check_health(&self) -> Result<TrainingStatus, TransportError> {
        tracing::debug!("Checking classifier health at {}", self.endpoint);
        let response = match self.get(HEALTH_PATH).call() {
            Ok(response) => response,
            Err(err) => return Err(map_request_error(err, MAX_RESPONSE_BYTES)),
        };
        let body = read_body(response, MAX_RESPONSE_BYTES)?;
        let wire: HealthWire = decode(&body)?;
        Ok(TrainingStatus::from(wire))
    }

    fn train(&self, file_path: Option<&str>) -> Result<TrainingSummary, TransportError> {
        tracing::info!("Requesting model training (dataset: {file_path:?})");
        let request = TrainRequestWire { file_path };
        let response = match self.post(TRAIN_PATH).send_json(&request) {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = http_client::read_body_limited(response, MAX_RESPONSE_BYTES)
                    .unwrap_or_default();
                let message = ErrorWire::message_from_body(&body)
                    .unwrap_or_else(|| format!("HTTP {code}"));
                return Err(TransportError::TrainingFailed(message));
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError::Connectivity(err.to_string()));
            }
        };
        let body = read_body(response, MAX_RESPONSE_BYTES)?;
        let wire: TrainWire = decode(&body)?;
        if !wire.success {
            let message = wire
                .error
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Server did not confirm training success".to_string());
            return Err(TransportError::TrainingFailed(message));
        }
        Ok(TrainingSummary::from(wire))
    }

    fn predict(&self, sequence: &Sequence) -> Result<PredictionResult, TransportError> {
        tracing::debug!("Predicting {}-base sequence", sequence.len());
        let request = PredictRequestWire {
            sequence: sequence.as_str(),
        };
        let response = match self.post(PREDICT_PATH).send_json(&request) {
            Ok(response) => response,
            Err(err) => return Err(map_request_error(err, MAX_RESPONSE_BYTES)),
        };
        let body = read_body(response, MAX_RESPONSE_BYTES)?;
        let wire: PredictWire = decode(&body)?;
        if !wire.success {
            return Err(TransportError::ServerRejected(rejection_message(wire.error)));
        }
        prediction_from_wire(sequence, wire).map_err(TransportError::Malformed)
    }

    fn batch_predict(
        &self,
        sequences: &[Sequence],
    ) -> Result<Vec<PredictionResult>, TransportError> {
        tracing::debug!("Predicting batch of {} sequences", sequences.len());
        let request = BatchPredictRequestWire {
            sequences: sequences.iter().map(Sequence::as_str).collect(),
        };
        let response = match self.post(BATCH_PREDICT_PATH).send_json(&request) {
            Ok(response) => response,
            Err(err) => return Err(map_request_error(err, MAX_BATCH_RESPONSE_BYTES)),
        };
        let body = read_body(response, MAX_BATCH_RESPONSE_BYTES)?;
        let wire: BatchPredictWire = decode(&body)?;
        if !wire.success {
            return Err(TransportError::ServerRejected(rejection_message(wire.error)));
        }
        let items = wire
            .results
            .ok_or_else(|| TransportError::Malformed("Missing 'results' field".to_string()))?;
        if items.len() != sequences.len() {
            return Err(TransportError::Malformed(format!(
                "Expected {} batch results, got {}",
                sequences.len(),
                items.len()
            )));
        }
        sequences
            .iter()
            .zip(items)
            .map(|(sequence, item)| {
                prediction_from_batch_item(sequence, item).map_err(TransportError::Malformed)
            })
            .collect()
    }
}

fn map_request_error(err: ureq::Error, max_bytes: usize) -> TransportError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = http_client::read_body_limited(response, max_bytes).unwrap_or_default();
            let message = ErrorWire::message_from_body(&body)
                .unwrap_or_else(|| format!("HTTP {code}"));
            TransportError::ServerRejected(message)
        }
        ureq::Error::Transport(err) => TransportError::Connectivity(err.to_string()),
    }
}

fn read_body(response: ureq::Response, max_bytes: usize) -> Result<String, TransportError> {
    http_client::read_body_limited(response, max_bytes).map_err(TransportError::Malformed)
}

fn decode<'a, T: serde::Deserialize<'a>>(body: &'a str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|err| TransportError::Malformed(err.to_string()))
}

fn rejection_message(error: Option<String>) -> String {
    error
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Server reported a failure without a message".to_string())
}
