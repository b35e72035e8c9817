use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "SymptomScout";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gemini-compatible `generateContent` endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

pub const ENV_API_KEY: &str = "SYMPTOM_SCOUT_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "GEMINI_API_KEY";
pub const ENV_ENDPOINT: &str = "SYMPTOM_SCOUT_ENDPOINT";
pub const ENV_ON_FAILURE: &str = "SYMPTOM_SCOUT_ON_FAILURE";
pub const ENV_TEMPERATURE: &str = "SYMPTOM_SCOUT_TEMPERATURE";
pub const ENV_MAX_OUTPUT_TOKENS: &str = "SYMPTOM_SCOUT_MAX_OUTPUT_TOKENS";

/// Get the application data directory
/// ~/SymptomScout/ on all platforms, or ./SymptomScout when no home is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the directory holding persisted storage slots
pub fn storage_dir() -> PathBuf {
    app_data_dir().join("storage")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "symptom_scout_lib=info,warn"
}

/// What the analyzer does when a configured backend fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return the backend error to the caller.
    #[default]
    Surface,
    /// Log the error and answer with the keyword heuristic instead.
    DegradeToHeuristic,
}

impl FailurePolicy {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "surface" => Some(Self::Surface),
            "degrade" | "degrade_to_heuristic" | "heuristic" => Some(Self::DegradeToHeuristic),
            _ => None,
        }
    }
}

/// Sampling parameters sent with every inference request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

/// Everything the analyzer needs to pick and drive a strategy.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Inference credential. `None` selects the keyword heuristic.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub generation: GenerationOptions,
    pub failure_policy: FailurePolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            generation: GenerationOptions::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Blank values count as unset;
    /// unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        config.api_key = get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK));

        if let Some(endpoint) = get(ENV_ENDPOINT) {
            config.endpoint = endpoint;
        }

        if let Some(raw) = get(ENV_ON_FAILURE) {
            match FailurePolicy::from_key(&raw) {
                Some(policy) => config.failure_policy = policy,
                None => tracing::warn!(value = %raw, "Unknown failure policy, using default"),
            }
        }

        if let Some(raw) = get(ENV_TEMPERATURE) {
            match raw.parse::<f32>() {
                Ok(t) if (0.0..=2.0).contains(&t) => config.generation.temperature = t,
                _ => tracing::warn!(value = %raw, "Invalid temperature, using default"),
            }
        }

        if let Some(raw) = get(ENV_MAX_OUTPUT_TOKENS) {
            match raw.parse::<u32>() {
                Ok(n) if n > 0 => config.generation.max_output_tokens = n,
                _ => tracing::warn!(value = %raw, "Invalid max output tokens, using default"),
            }
        }

        config
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
