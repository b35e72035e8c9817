use tracing::Instrument;

use super::backend::InferenceBackend;
use super::fallback::analyze_with_keywords;
use super::gemini::GeminiClient;
use super::normalize::normalize_provider_analysis;
use super::parser::parse_provider_reply;
use super::prompt::build_analysis_prompt;
use super::AnalysisError;
use crate::config::{AnalyzerConfig, FailurePolicy};
use crate::history::HistoryStore;
use crate::models::AnalysisResult;

/// Longest accepted symptom description, in characters.
pub const MAX_SYMPTOM_CHARS: usize = 4000;

/// Lifecycle of a single `analyze` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    Submitted,
    Analyzing,
    Completed,
    Failed,
}

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStrategy {
    Inference,
    Heuristic,
}

impl AnalysisStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inference => "inference",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Orchestrates one symptom analysis:
/// validate → (prompt → backend → parse → normalize | keyword fallback) → record
pub struct SymptomAnalyzer<B = GeminiClient> {
    backend: Option<B>,
    history: HistoryStore,
    failure_policy: FailurePolicy,
}

impl SymptomAnalyzer<GeminiClient> {
    /// Build from configuration. Without a credential the analyzer uses the
    /// keyword heuristic for every request.
    pub fn from_config(
        config: &AnalyzerConfig,
        history: HistoryStore,
    ) -> Result<Self, AnalysisError> {
        let backend = match GeminiClient::from_config(config) {
            Ok(client) => {
                tracing::info!(endpoint = %client.endpoint(), "Inference backend configured");
                Some(client)
            }
            Err(AnalysisError::Configuration) => {
                tracing::info!("No inference credential, using keyword heuristic");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self::new(backend, history).with_failure_policy(config.failure_policy))
    }
}

impl<B: InferenceBackend> SymptomAnalyzer<B> {
    pub fn new(backend: Option<B>, history: HistoryStore) -> Self {
        Self {
            backend,
            history,
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Strategy the next call will start with.
    pub fn strategy(&self) -> AnalysisStrategy {
        if self.backend.is_some() {
            AnalysisStrategy::Inference
        } else {
            AnalysisStrategy::Heuristic
        }
    }

    /// Analyze a free-text symptom description and record it in history.
    pub async fn analyze(&self, symptoms: &str) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_with_progress(symptoms, |_| {}).await
    }

    /// Same as `analyze`, reporting each lifecycle transition to `on_phase`.
    pub async fn analyze_with_progress<F>(
        &self,
        symptoms: &str,
        mut on_phase: F,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        F: FnMut(AnalysisPhase) + Send,
    {
        let mut transition = |phase: AnalysisPhase| {
            tracing::debug!(?phase, "Analysis phase");
            on_phase(phase);
        };

        transition(AnalysisPhase::Idle);
        let symptoms = validate_symptoms(symptoms)?;
        transition(AnalysisPhase::Submitted);

        let span = tracing::info_span!(
            "analyze",
            strategy = self.strategy().as_str(),
            input_len = symptoms.chars().count()
        );

        transition(AnalysisPhase::Analyzing);
        let result = match self.run_strategy(symptoms).instrument(span).await {
            Ok(result) => result,
            Err(e) => {
                transition(AnalysisPhase::Failed);
                return Err(e);
            }
        };

        self.history.create(symptoms, &result);
        transition(AnalysisPhase::Completed);

        tracing::info!(
            severity = result.severity.level(),
            conditions = result.conditions.len(),
            "Analysis completed"
        );
        Ok(result)
    }

    async fn run_strategy(&self, symptoms: &str) -> Result<AnalysisResult, AnalysisError> {
        let Some(backend) = &self.backend else {
            return Ok(analyze_with_keywords(symptoms));
        };

        match infer(backend, symptoms).await {
            Ok(result) => Ok(result),
            Err(e) if self.failure_policy == FailurePolicy::DegradeToHeuristic => {
                tracing::warn!(error = %e, "Inference failed, degrading to keyword heuristic");
                Ok(analyze_with_keywords(symptoms))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Inference failed");
                Err(e)
            }
        }
    }
}

/// One inference attempt: prompt → backend → parse → normalize.
async fn infer<B: InferenceBackend>(
    backend: &B,
    symptoms: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let prompt = build_analysis_prompt(symptoms);
    let reply = backend.generate(&prompt).await?;
    let provider = parse_provider_reply(&reply)?;
    Ok(normalize_provider_analysis(provider))
}

/// Trim and bound-check the description before any work happens.
fn validate_symptoms(symptoms: &str) -> Result<&str, AnalysisError> {
    let trimmed = symptoms.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let len = trimmed.chars().count();
    if len > MAX_SYMPTOM_CHARS {
        return Err(AnalysisError::InputTooLong {
            len,
            max: MAX_SYMPTOM_CHARS,
        });
    }
    Ok(trimmed)
}
