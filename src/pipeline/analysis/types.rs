use serde::{Deserialize, Serialize};

/// Analysis as the inference backend phrases it, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAnalysis {
    pub possible_conditions: Vec<ProviderCondition>,
    /// Raw urgency key; expected to be one of low/medium/high/emergency.
    pub urgency_level: String,
    pub recommendations: Vec<String>,
    pub requires_attention: bool,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCondition {
    pub name: String,
    /// Likelihood on a 0–1 scale.
    pub probability: f64,
    #[serde(default)]
    pub description: String,
}
