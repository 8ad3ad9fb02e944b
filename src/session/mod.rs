//! Orchestration of sequence validation, request lifecycle, and observable
//! UI state for one app lifetime.
//!
//! The session is the single writer of [`SessionState`]; observers receive a
//! snapshot after every state commit. Transitions run to completion on the
//! caller's thread, and every network-backed transition stamps a request
//! generation so a superseded response can never overwrite newer state.


use crate::classifier_api::{ClassifierApi, PredictionResult, TrainingStatus, TransportError};
use crate::sequence_sanitize;

/// Error shown when the server reports a healthy but untrained model.
pub const MSG_MODEL_NOT_TRAINED: &str =
    "Model is not trained yet. Train the model to enable predictions.";
/// Error shown when a prediction fails because the model is untrained or unloaded.
pub const MSG_MODEL_NOT_READY: &str = "Model is not ready. Train the model and try again.";

/// UI-relevant state owned exclusively by the session.
///
/// Observers receive clones; nothing outside the session mutates it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    /// Whether a network-backed transition is in flight.
    pub is_loading: bool,
    /// Human-readable failure message from the most recent transition.
    pub error_message: Option<String>,
    /// Verdict of the most recent successful prediction.
    pub last_prediction: Option<PredictionResult>,
    /// Server-side readiness from the most recent health check.
    pub training_status: Option<TrainingStatus>,
    pub is_model_trained: bool,
}

/// Token identifying one network-backed transition.
///
/// Captured when the transition starts; a response is committed only while
/// its token is still the newest, so stale responses are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

type Observer = Box<dyn FnMut(&SessionState) + Send>;

/// Client-side orchestrator for the remote classifier.
pub struct PredictionSession<C: ClassifierApi> {
    client: C,
    state: SessionState,
    generation: u64,
    observers: Vec<Observer>,
}

impl<C: ClassifierApi> PredictionSession<C> {
    /// Create a session in its initial state: not loading, nothing known
    /// about the model.
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: SessionState::default(),
            generation: 0,
            observers: Vec::new(),
        }
    }

    /// Current state. Callers needing a snapshot should clone it.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Register an observer invoked with a snapshot after every state commit.
    pub fn subscribe(&mut self, observer: impl FnMut(&SessionState) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Refresh server-side model readiness.
    pub fn initialize(&mut self) {
        let token = self.begin_request();
        let outcome = self.client.check_health();
        self.finish_initialize(token, outcome);
    }

    /// Ask the server to (re)train, then refresh the authoritative status.
    pub fn train(&mut self, file_path: Option<&str>) {
        let token = self.begin_request();
        let outcome = self.client.train(file_path);
        match outcome {
            Ok(_) => {
                if self.commit(token, |state| {
                    // Optimistic; initialize() fetches the authoritative answer.
                    state.is_model_trained = true;
                    state.is_loading = false;
                }) {
                    self.initialize();
                }
            }
            Err(err) => {
                self.commit(token, |state| {
                    state.error_message = Some(err.to_string());
                    state.is_loading = false;
                });
            }
        }
    }

    /// Validate raw input and, if it passes, request a prediction for it.
    ///
    /// Validation failures set a kind-specific message and perform no network
    /// call.
    pub fn predict_sequence(&mut self, raw: &str) {
        let sequence = match sequence_sanitize::clean(raw) {
            Ok(sequence) => sequence,
            Err(err) => {
                self.state.error_message = Some(err.to_string());
                self.notify();
                return;
            }
        };
        let token = self.begin_request();
        let outcome = self.client.predict(&sequence);
        self.finish_predict(token, outcome);
    }

    /// Drop the last prediction and error, leaving model status untouched.
    pub fn clear_prediction(&mut self) {
        self.state.last_prediction = None;
        self.state.error_message = None;
        self.notify();
    }

    /// Start a network-backed transition: bump the generation, raise the
    /// loading flag, clear the previous error.
    fn begin_request(&mut self) -> RequestToken {
        self.generation += 1;
        self.state.is_loading = true;
        self.state.error_message = None;
        self.notify();
        RequestToken(self.generation)
    }

    /// Apply `update` only while `token` is still the newest request.
    ///
    /// Returns whether the update was committed. A stale token means a newer
    /// transition has started and owns the state, including the loading flag.
    fn commit(&mut self, token: RequestToken, update: impl FnOnce(&mut SessionState)) -> bool {
        if token.0 != self.generation {
            tracing::debug!("Discarding stale response for superseded request");
            return false;
        }
        update(&mut self.state);
        self.notify();
        true
    }

    fn finish_initialize(
        &mut self,
        token: RequestToken,
        outcome: Result<TrainingStatus, TransportError>,
    ) {
        self.commit(token, |state| {
            match outcome {
                Ok(status) => {
                    state.is_model_trained = status.is_trained;
                    if !status.is_trained {
                        // Non-fatal: the user can still trigger training.
                        state.error_message = Some(MSG_MODEL_NOT_TRAINED.to_string());
                    }
                    state.training_status = Some(status);
                }
                Err(err) if err.is_connectivity() => {
                    state.is_model_trained = false;
                    state.error_message = Some(format!(
                        "Cannot reach the classifier service. Is the server running? ({err})"
                    ));
                }
                Err(err) => {
                    state.is_model_trained = false;
                    state.error_message =
                        Some(format!("Failed to connect to the classifier service: {err}"));
                }
            }
            state.is_loading = false;
        });
    }

    fn finish_predict(
        &mut self,
        token: RequestToken,
        outcome: Result<PredictionResult, TransportError>,
    ) {
        self.commit(token, |state| {
            match outcome {
                Ok(result) => {
                    state.last_prediction = Some(result);
                    state.error_message = None;
                }
                Err(err) => {
                    tracing::warn!("Prediction failed: {err}");
                    state.error_message = Some(prediction_error_message(&err));
                }
            }
            state.is_loading = false;
        });
    }

    /// Invoke every observer with the current state.
    fn notify(&mut self) {
        // Observers cannot re-borrow the session, so take/restore is safe.
        let mut observers = std::mem::take(&mut self.observers);
        for observer in &mut observers {
            observer(&self.state);
        }
        self.observers = observers;
    }
}

/// Map a prediction failure onto the message the UI should display.
fn prediction_error_message(err: &TransportError) -> String {
    if err.is_connectivity() {
        return format!("Cannot reach the classifier service. Is the server running? ({err})");
    }
    if let Some(message) = err.server_message() {
        let lowered = message.to_lowercase();
        if lowered.contains("not trained") || lowered.contains("not loaded") {
            return MSG_MODEL_NOT_READY.to_string();
        }
    }
    format!("Prediction failed: {err}")
}
