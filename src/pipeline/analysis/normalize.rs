use super::types::ProviderAnalysis;
use crate::models::{sort_by_probability, AnalysisResult, Condition, Severity, UrgencyLevel};

/// Subject used in the summary when the backend names no condition.
pub const UNNAMED_SUBJECT: &str = "the described symptoms";

/// Map a provider-schema analysis onto the canonical result. Total: every
/// well-formed `ProviderAnalysis` yields a valid `AnalysisResult`.
pub fn normalize_provider_analysis(analysis: ProviderAnalysis) -> AnalysisResult {
    let urgency = UrgencyLevel::from_key(&analysis.urgency_level);
    if urgency.is_none() {
        tracing::debug!(
            urgency = %analysis.urgency_level,
            "Unrecognized urgency level, treating as low"
        );
    }
    let severity = urgency.map(|u| u.severity()).unwrap_or(Severity::Mild);

    let mut conditions: Vec<Condition> = analysis
        .possible_conditions
        .into_iter()
        .map(|c| Condition {
            name: c.name,
            description: c.description,
            probability: Some(scale_probability(c.probability)),
        })
        .collect();
    sort_by_probability(&mut conditions);

    let subject = conditions
        .first()
        .map(|c| c.name.as_str())
        .unwrap_or(UNNAMED_SUBJECT);
    let summary = compose_summary(subject, urgency.unwrap_or(UrgencyLevel::Low));

    AnalysisResult {
        summary,
        conditions,
        severity,
        recommendations: analysis.recommendations,
        requires_attention: analysis.requires_attention,
        disclaimer: analysis.disclaimer,
    }
}

/// Summary line shared by both analysis strategies.
pub fn compose_summary(subject: &str, urgency: UrgencyLevel) -> String {
    format!(
        "Your symptoms are most consistent with {subject}. {}",
        urgency.advisory()
    )
}

/// 0–1 likelihood to the 0–100 scale, clamped; NaN becomes 0.
fn scale_probability(p: f64) -> f64 {
    if p.is_nan() {
        return 0.0;
    }
    (p * 100.0).clamp(0.0, 100.0)
}
