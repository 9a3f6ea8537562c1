//! Lenient decoding of the backend's `{status, message, data|result}` envelope.

use medadmin_core::{AppError, AppResult};
use serde_json::{Map, Value};

const FAILURE_WORDS: [&str; 4] = ["error", "fail", "failed", "failure"];

/// Unwrapped payload of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decoded {
    pub(crate) data: Value,
    pub(crate) message: Option<String>,
}

/// Decodes a response body received with HTTP status `http_status`.
///
/// Bodies that are not envelopes are returned as-is. A failure flag inside
/// the envelope wins over a 2xx HTTP status.
pub(crate) fn decode(http_status: u16, body: &str) -> AppResult<Decoded> {
    let parsed = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(_) if !is_success(http_status) => Value::String(body.trim().to_owned()),
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "backend returned malformed JSON: {error}"
                )));
            }
        }
    };

    let envelope = match parsed {
        Value::Object(object) if is_envelope(&object) => object,
        Value::String(text) if !is_success(http_status) => {
            return Err(status_error(http_status, non_blank(text)));
        }
        other if is_success(http_status) => {
            return Ok(Decoded {
                data: other,
                message: None,
            });
        }
        _ => return Err(status_error(http_status, None)),
    };

    let message = envelope
        .get("message")
        .or_else(|| envelope.get("error"))
        .and_then(Value::as_str)
        .and_then(|text| non_blank(text.to_owned()));

    if !is_success(http_status) {
        return Err(status_error(http_status, message));
    }

    if let Some(code) = failure_code(envelope.get("status")) {
        return Err(match code {
            Some(code) => status_error(code, message),
            None => AppError::Request(
                message.unwrap_or_else(|| "backend reported a failure".to_owned()),
            ),
        });
    }

    let data = envelope
        .get("data")
        .or_else(|| envelope.get("result"))
        .cloned()
        .unwrap_or(Value::Null);

    Ok(Decoded { data, message })
}

/// Maps an HTTP-style status code to the error taxonomy.
pub(crate) fn status_error(code: u16, message: Option<String>) -> AppError {
    let message = message.unwrap_or_else(|| format!("backend responded with HTTP {code}"));
    match code {
        400 | 422 => AppError::Validation(message),
        401 => AppError::Unauthorized(message),
        403 => AppError::Forbidden(message),
        404 => AppError::NotFound(message),
        409 => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}

fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

// Records may carry their own `status` column, so a bare object only counts
// as an envelope when it has no identity of its own.
fn is_envelope(object: &Map<String, Value>) -> bool {
    object.contains_key("data")
        || object.contains_key("result")
        || (!object.contains_key("id")
            && (object.contains_key("status") || object.contains_key("message")))
}

/// `Some(code)` when the status flag signals failure; the inner code is set
/// when the flag was numeric.
fn failure_code(status: Option<&Value>) -> Option<Option<u16>> {
    match status? {
        Value::Bool(false) => Some(None),
        Value::Number(number) => number
            .as_u64()
            .filter(|code| *code >= 400)
            .map(|code| Some(u16::try_from(code).unwrap_or(500))),
        Value::String(text) => {
            let text = text.trim().to_ascii_lowercase();
            if let Ok(code) = text.parse::<u16>() {
                return (code >= 400).then_some(Some(code));
            }
            FAILURE_WORDS.contains(&text.as_str()).then_some(None)
        }
        _ => None,
    }
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
