use serde::Deserialize;
use thiserror::Error;

use super::types::{ProviderAnalysis, ProviderCondition};

/// Why a reply could not be turned into a `ProviderAnalysis`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyParseError {
    #[error("no JSON object found in reply")]
    NoJsonObject,

    #[error("invalid JSON object: {0}")]
    InvalidJson(String),
}

/// Parse the backend's free-form reply text into the provider schema.
///
/// Every balanced `{...}` candidate is tried in order, so prose braces ahead
/// of the real object do not hide it. The first candidate's error is
/// reported when none of them parse.
pub fn parse_provider_reply(reply: &str) -> Result<ProviderAnalysis, ReplyParseError> {
    let mut first_error = None;
    for candidate in json_object_candidates(reply) {
        match parse_provider_json(candidate) {
            Ok(analysis) => return Ok(analysis),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or(ReplyParseError::NoJsonObject))
}

/// Locate the first balanced `{...}` object in free-form text.
///
/// Braces inside JSON string literals (including escaped quotes) do not
/// count towards the balance. Candidates that never close are skipped in
/// favour of a later opening brace.
pub fn extract_json_object(text: &str) -> Result<&str, ReplyParseError> {
    json_object_candidates(text)
        .next()
        .ok_or(ReplyParseError::NoJsonObject)
}

/// Balanced `{...}` spans in order of their opening brace, without overlap.
fn json_object_candidates(text: &str) -> impl Iterator<Item = &str> + '_ {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    std::iter::from_fn(move || {
        while let Some(offset) = text.get(search_from..)?.find('{') {
            let start = search_from + offset;
            if let Some(end) = matching_brace(bytes, start) {
                search_from = end + 1;
                return Some(&text[start..=end]);
            }
            search_from = start + 1;
        }
        None
    })
}

/// Index of the `}` closing the object that opens at `start`.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Deserialize the located object, tolerating missing optional fields and
/// skipping condition entries that do not fit the schema.
fn parse_provider_json(json_str: &str) -> Result<ProviderAnalysis, ReplyParseError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawReply {
        possible_conditions: Option<Vec<serde_json::Value>>,
        urgency_level: Option<String>,
        recommendations: Option<Vec<serde_json::Value>>,
        requires_attention: Option<bool>,
        disclaimer: Option<String>,
    }

    let raw: RawReply = serde_json::from_str(json_str)
        .map_err(|e| ReplyParseError::InvalidJson(e.to_string()))?;

    let possible_conditions: Vec<ProviderCondition> =
        parse_array_lenient(raw.possible_conditions.as_deref());

    // Recommendations occasionally arrive as non-string values; keep the strings.
    let recommendations = raw
        .recommendations
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    Ok(ProviderAnalysis {
        possible_conditions,
        urgency_level: raw.urgency_level.unwrap_or_default(),
        recommendations,
        requires_attention: raw.requires_attention.unwrap_or(false),
        disclaimer: raw.disclaimer.unwrap_or_default(),
    })
}

/// Parse an array leniently — skip items that fail to deserialize.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(
    items: Option<&[serde_json::Value]>,
) -> Vec<T> {
    match items {
        None => vec![],
        Some(arr) => arr
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}
