use serde::{Deserialize, Serialize};

use super::enums::Severity;

/// Disclaimer attached to every result that does not bring its own.
pub const STANDARD_DISCLAIMER: &str = "This analysis is for informational purposes only and \
is not a substitute for professional medical advice, diagnosis, or treatment. Always consult \
a qualified healthcare provider about your symptoms.";

/// One candidate condition in an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub name: String,
    pub description: String,
    /// Likelihood on a 0–100 scale. `None` when the producing strategy
    /// does not estimate one (keyword fallback).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl Condition {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            probability: None,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }
}

/// Canonical output of a symptom analysis, whichever strategy produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    /// Ordered by probability, highest first.
    pub conditions: Vec<Condition>,
    pub severity: Severity,
    pub recommendations: Vec<String>,
    pub requires_attention: bool,
    pub disclaimer: String,
}

impl AnalysisResult {
    /// The leading condition, if any.
    pub fn top_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// Sort conditions by probability, highest first. Stable, so conditions
/// without a probability keep their relative order at the end.
pub fn sort_by_probability(conditions: &mut [Condition]) {
    conditions.sort_by(|a, b| {
        let a = a.probability.unwrap_or(f64::NEG_INFINITY);
        let b = b.probability.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            summary: "Summary".into(),
            conditions: vec![
                Condition::new("Migraine", "Recurring headache").with_probability(62.5),
                Condition::new("Tension Headache", "Stress related"),
            ],
            severity: Severity::Moderate,
            recommendations: vec!["Rest".into()],
            requires_attention: true,
            disclaimer: STANDARD_DISCLAIMER.into(),
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["requiresAttention"], true);
        assert_eq!(json["severity"], 2);
        assert_eq!(json["conditions"][0]["probability"], 62.5);
        assert!(json["conditions"][1].get("probability").is_none());
    }

    #[test]
    fn deserializes_what_it_serializes() {
        let original = sample();
        let json = serde_json::to_string(&original).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn rejects_stored_result_with_bad_severity() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["severity"] = serde_json::json!(7);
        assert!(serde_json::from_value::<AnalysisResult>(json).is_err());
    }

    #[test]
    fn sort_puts_highest_first_and_unknown_last() {
        let mut conditions = vec![
            Condition::new("Unknown", ""),
            Condition::new("Low", "").with_probability(10.0),
            Condition::new("High", "").with_probability(80.0),
            Condition::new("Mid", "").with_probability(45.0),
        ];
        sort_by_probability(&mut conditions);
        let names: Vec<&str> = conditions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low", "Unknown"]);
    }

    #[test]
    fn top_condition_is_first() {
        assert_eq!(sample().top_condition().unwrap().name, "Migraine");
    }
}
