use super::ChatError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Shorter answers are treated as low confidence.
pub const MIN_CONFIDENT_LEN: usize = 20;

pub const CLARIFICATION_REPLY: &str =
    "I might need a bit more context to answer that clearly. Could you give an example or clarify?";

/// Answer fields, in the order they are probed.
const ANSWER_FIELDS: [&str; 6] = [
    "text",
    "response",
    "generated_text",
    "output",
    "message",
    "result",
];

static HEDGING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)don't know|do not know|not sure|can't|cannot|insufficient|no information|no idea|unknown|false",
    )
    .expect("hedging pattern is valid")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Usable answer, already trimmed.
    Confident(String),
    /// Empty, too short or hedging; `raw` is what the backend said.
    LowConfidence { raw: String },
}

impl Classification {
    pub fn is_low_confidence(&self) -> bool {
        matches!(self, Classification::LowConfidence { .. })
    }
}

/// Pull the answer text out of a response body.
///
/// Returns `MalformedResponse` when none of the known fields is present.
pub fn answer_field(body: &Value) -> Result<String, ChatError> {
    let found = ANSWER_FIELDS
        .iter()
        .find_map(|field| body.get(field).filter(|value| !value.is_null()))
        .or_else(|| {
            body.as_array()
                .and_then(|items| items.first())
                .and_then(|first| first.get("text"))
                .filter(|value| !value.is_null())
        });

    match found {
        Some(Value::String(text)) => Ok(text.trim().to_string()),
        Some(other) => Ok(stringify(other).trim().to_string()),
        None => Err(ChatError::MalformedResponse(format!(
            "no answer field in {}",
            truncate_for_log(&body.to_string())
        ))),
    }
}

/// Like `answer_field`, but a body without an answer resolves to `""`.
pub fn resolve_answer(body: &Value) -> String {
    answer_field(body).unwrap_or_default()
}

pub fn classify(body: &Value) -> Classification {
    let answer = match answer_field(body) {
        Ok(answer) => answer,
        Err(err) => {
            debug!("{}", err);
            return Classification::LowConfidence { raw: String::new() };
        }
    };

    if is_low_confidence(&answer) {
        Classification::LowConfidence { raw: answer }
    } else {
        Classification::Confident(answer)
    }
}

/// Text form of a non-string answer, as a browser client would render it:
/// arrays join their items with `,`, objects collapse to `[object Object]`.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

/// Length is counted in UTF-16 code units, so astral characters count twice.
pub fn is_low_confidence(answer: &str) -> bool {
    answer.is_empty()
        || answer.encode_utf16().count() < MIN_CONFIDENT_LEN
        || HEDGING.is_match(answer)
}

fn truncate_for_log(raw: &str) -> String {
    if raw.chars().count() > 120 {
        let head: String = raw.chars().take(120).collect();
        format!("{head}…")
    } else {
        raw.to_string()
    }
}
