use std::fmt::Write;

use super::user_message;
use crate::models::AnalysisResult;
use crate::pipeline::analysis::{InferenceBackend, SymptomAnalyzer};

/// Runs one analysis and records it in history.
pub async fn analyze_symptoms<B: InferenceBackend>(
    analyzer: &SymptomAnalyzer<B>,
    text: &str,
) -> Result<AnalysisResult, String> {
    analyzer.analyze(text).await.map_err(|e| {
        tracing::error!(error = %e, "Analysis failed");
        user_message(&e)
    })
}

/// Human-readable report of an analysis.
pub fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", result.summary);
    let _ = writeln!(
        out,
        "\nSeverity: {}/4 ({}){}",
        result.severity.level(),
        result.severity.label(),
        if result.requires_attention {
            " · medical attention recommended"
        } else {
            ""
        }
    );

    if !result.conditions.is_empty() {
        let _ = writeln!(out, "\nPossible conditions:");
        for condition in &result.conditions {
            match condition.probability {
                Some(p) => {
                    let _ = writeln!(out, "  - {} ({p:.0}%)", condition.name);
                }
                None => {
                    let _ = writeln!(out, "  - {}", condition.name);
                }
            }
            if !condition.description.is_empty() {
                let _ = writeln!(out, "    {}", condition.description);
            }
        }
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommendations:");
        for (i, recommendation) in result.recommendations.iter().enumerate() {
            let _ = writeln!(out, "  {}. {recommendation}", i + 1);
        }
    }

    if !result.disclaimer.is_empty() {
        let _ = writeln!(out, "\n{}", result.disclaimer);
    }

    out
}
