//! Keyword heuristic used when no inference backend is configured.
//!
//! Rules are evaluated in order against the lowercased description and the
//! first match wins. Combination rules sit before the single-keyword rules
//! they overlap with; the final rule matches everything.

use super::normalize::compose_summary;
use crate::models::{AnalysisResult, Condition, Severity, STANDARD_DISCLAIMER};

/// Fixed outcome attached to a rule.
pub struct FallbackOutcome {
    pub conditions: &'static [(&'static str, &'static str)],
    pub severity: Severity,
    pub requires_attention: bool,
    pub remedies: &'static [&'static str],
    pub consultation_reason: &'static str,
}

/// A `(predicate, outcome)` pair in the ordered rule table.
pub struct FallbackRule {
    pub name: &'static str,
    matches: fn(&str) -> bool,
    pub outcome: FallbackOutcome,
}

impl FallbackRule {
    /// `lowered` must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        (self.matches)(lowered)
    }
}

impl FallbackOutcome {
    fn build(&self) -> AnalysisResult {
        let conditions: Vec<Condition> = self
            .conditions
            .iter()
            .map(|(name, description)| Condition::new(name, description))
            .collect();

        let names: Vec<&str> = self.conditions.iter().map(|(name, _)| *name).collect();
        let subject = join_names(&names);

        let mut recommendations: Vec<String> =
            self.remedies.iter().map(|r| r.to_string()).collect();
        recommendations.push(format!(
            "See a healthcare provider {}",
            self.consultation_reason
        ));

        AnalysisResult {
            summary: compose_summary(&subject, self.severity.urgency()),
            conditions,
            severity: self.severity,
            recommendations,
            requires_attention: self.requires_attention,
            disclaimer: STANDARD_DISCLAIMER.to_string(),
        }
    }
}

fn headache_with_fever(t: &str) -> bool {
    t.contains("headache") && t.contains("fever")
}

fn cough_with_fever(t: &str) -> bool {
    t.contains("cough") && t.contains("fever")
}

fn headache(t: &str) -> bool {
    t.contains("headache")
}

fn fatigue(t: &str) -> bool {
    t.contains("fatigue")
}

fn anything(_: &str) -> bool {
    true
}

static RULES: [FallbackRule; 5] = [
    FallbackRule {
        name: "headache_with_fever",
        matches: headache_with_fever,
        outcome: FallbackOutcome {
            conditions: &[
                ("Common Cold", "A viral infection of the nose and throat, usually mild and self-limiting."),
                ("Influenza", "A contagious respiratory illness that often brings fever, aches and headache."),
            ],
            severity: Severity::Moderate,
            requires_attention: true,
            remedies: &[
                "Rest and get plenty of sleep",
                "Drink plenty of fluids",
                "Use an over-the-counter fever reducer as directed on the label",
            ],
            consultation_reason: "if the fever lasts more than three days or goes above 39.4°C (103°F).",
        },
    },
    FallbackRule {
        name: "cough_with_fever",
        matches: cough_with_fever,
        outcome: FallbackOutcome {
            conditions: &[
                ("Bronchitis", "Inflammation of the airways that carry air to the lungs, often after a cold."),
                ("Pneumonia", "An infection that inflames the air sacs in one or both lungs."),
            ],
            severity: Severity::Moderate,
            requires_attention: true,
            remedies: &[
                "Rest and avoid strenuous activity",
                "Drink warm fluids and use a humidifier",
                "Avoid smoke and other airway irritants",
            ],
            consultation_reason: "if you have difficulty breathing, chest pain, or the cough lasts more than a week.",
        },
    },
    FallbackRule {
        name: "headache",
        matches: headache,
        outcome: FallbackOutcome {
            conditions: &[
                ("Tension Headache", "A common headache often linked to stress, posture or muscle tension."),
                ("Migraine", "A recurring headache that can cause throbbing pain and sensitivity to light."),
            ],
            severity: Severity::Mild,
            requires_attention: false,
            remedies: &[
                "Rest in a quiet, dark room",
                "Stay hydrated and avoid skipping meals",
                "Limit screen time and take regular breaks",
            ],
            consultation_reason: "if headaches are severe, sudden, or keep coming back.",
        },
    },
    FallbackRule {
        name: "fatigue",
        matches: fatigue,
        outcome: FallbackOutcome {
            conditions: &[
                ("Chronic Fatigue Syndrome", "Long-lasting tiredness that does not improve with rest."),
                ("Iron Deficiency", "Low iron levels that can leave you weak and short of energy."),
            ],
            severity: Severity::Mild,
            requires_attention: true,
            remedies: &[
                "Keep a regular sleep schedule",
                "Eat a balanced diet with iron-rich foods",
                "Add light exercise gradually",
            ],
            consultation_reason: "to check for underlying causes such as anemia or thyroid problems.",
        },
    },
    FallbackRule {
        name: "general",
        matches: anything,
        outcome: FallbackOutcome {
            conditions: &[(
                "General Malaise",
                "A general feeling of discomfort or being unwell without a clear single cause.",
            )],
            severity: Severity::Mild,
            requires_attention: false,
            remedies: &[
                "Rest and monitor how your symptoms change",
                "Stay hydrated and eat regular meals",
            ],
            consultation_reason: "if your symptoms get worse or do not improve within a few days.",
        },
    },
];

/// The ordered rule table, first match wins.
pub fn fallback_rules() -> &'static [FallbackRule] {
    &RULES
}

/// The first rule matching `symptoms` (case-insensitive).
pub fn match_rule(symptoms: &str) -> &'static FallbackRule {
    let lowered = symptoms.to_lowercase();
    let rules = fallback_rules();
    rules
        .iter()
        .find(|rule| rule.matches(&lowered))
        // The catch-all rule is last, so this only guards an empty table.
        .unwrap_or(&rules[rules.len() - 1])
}

/// Analyze symptoms without any network call. Never fails.
pub fn analyze_with_keywords(symptoms: &str) -> AnalysisResult {
    let rule = match_rule(symptoms);
    tracing::info!(rule = rule.name, "Keyword fallback matched");
    rule.outcome.build()
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}
