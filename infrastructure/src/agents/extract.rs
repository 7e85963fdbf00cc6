//! Answer extraction from raw model output.
//!
//! Models are asked for a short final answer but reply in many shapes: a
//! JSON object, `Final answer: ...` prose, or a bare line. These helpers
//! turn any of them into the (answer, confidence, predicted-majority)
//! triple the consensus core consumes.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Longest answer taken from a bare first line
const MAX_LINE_ANSWER_CHARS: usize = 256;

/// Confidence assumed when a parsed reply has an answer but no confidence
const ANSWERED_CONFIDENCE: f64 = 0.55;

static ANSWER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)final answer\s*[:\-]\s*(.+)", r"(?i)answer\s*[:\-]\s*(.+)"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Fields extracted from one completion
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCompletion {
    pub answer: String,
    pub predicted_majority: String,
    pub confidence: f64,
    pub token_count: usize,
}

/// Parse a JSON object from the whole text, or from its outermost `{...}` span
pub fn safe_json_parse(text: &str) -> Option<Map<String, Value>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(Value::Object(map)) = serde_json::from_str(text) {
        return Some(map);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Best-effort answer from the raw text.
///
/// Order: a non-empty JSON `answer` field, then `final answer:` / `answer:`
/// prose (rest of that line), then the first non-empty line truncated to
/// 256 characters.
pub fn extract_answer(raw_text: &str, parsed: Option<&Map<String, Value>>) -> String {
    if let Some(answer) = parsed.and_then(|p| p.get("answer")).map(value_text)
        && !answer.is_empty()
    {
        return answer;
    }

    for pattern in ANSWER_PATTERNS.iter() {
        if let Some(found) = pattern.captures(raw_text).and_then(|c| c.get(1)) {
            return found.as_str().lines().next().unwrap_or("").trim().to_string();
        }
    }

    raw_text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(MAX_LINE_ANSWER_CHARS).collect())
        .unwrap_or_default()
}

/// Confidence from a JSON value (number or numeric string), clamped to [0, 1]
pub fn parse_confidence(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|c| !c.is_nan())
        .unwrap_or(default)
        .clamp(0.0, 1.0)
}

/// Rough token count: number of word runs, at least 1
pub fn approx_token_count(text: &str) -> usize {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .count()
        .max(1)
}

/// Extract every field the consensus core needs from one completion
pub fn parse_completion(raw_text: &str, eval_count: Option<u64>) -> ParsedCompletion {
    let parsed = safe_json_parse(raw_text);
    let answer = extract_answer(raw_text, parsed.as_ref());

    let predicted_majority = parsed
        .as_ref()
        .and_then(|p| p.get("predicted_majority"))
        .map(value_text)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| answer.clone());

    let default_confidence = if answer.is_empty() {
        0.0
    } else {
        ANSWERED_CONFIDENCE
    };
    let confidence = parse_confidence(
        parsed.as_ref().and_then(|p| p.get("confidence")),
        default_confidence,
    );

    let token_count = eval_count
        .filter(|&n| n > 0)
        .map(|n| n as usize)
        .unwrap_or_else(|| approx_token_count(raw_text));

    ParsedCompletion {
        answer,
        predicted_majority,
        confidence,
        token_count,
    }
}
