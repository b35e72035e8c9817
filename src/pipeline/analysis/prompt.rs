/// Build the analysis request for a symptom description.
///
/// The caller must have rejected empty input already.
pub fn build_analysis_prompt(symptoms: &str) -> String {
    format!(
        r#"You are a medical information assistant. A user has described their symptoms below.
Suggest possible conditions that could explain them, how urgent the situation is,
and practical next steps. You are not diagnosing the user.

<symptoms>
{symptoms}
</symptoms>

Respond with a single JSON object and nothing else, using exactly this structure:

{{
  "possibleConditions": [
    {{
      "name": "condition name",
      "probability": 0.0,
      "description": "one or two plain-language sentences"
    }}
  ],
  "urgencyLevel": "low | medium | high | emergency",
  "recommendations": ["recommendation 1", "recommendation 2"],
  "requiresAttention": false,
  "disclaimer": "short medical disclaimer"
}}

Rules:
- List possibleConditions from most to least likely.
- probability is a number between 0 and 1.
- urgencyLevel must be exactly one of: low, medium, high, emergency.
- requiresAttention is true when the user should see a healthcare provider.
"#
    )
}
