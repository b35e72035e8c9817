use std::future::Future;

use super::AnalysisError;

/// Inference backend abstraction (allows mocking).
///
/// One call is one request: implementations must not retry.
pub trait InferenceBackend: Send + Sync {
    /// Send a prepared request payload and return the reply's text content.
    fn generate(&self, payload: &str) -> impl Future<Output = Result<String, AnalysisError>> + Send;
}
