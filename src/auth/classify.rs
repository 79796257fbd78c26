//! Response classifier: turns a non-success provider response into a
//! [`HandshakeError`].
//!
//! Provider error bodies arrive as JSON, as a hosted HTML error page, or as
//! bare text. The body format is detected once and the message extracted
//! with the matching strategy: JSON message fields at any status, the HTML
//! alert element only on 403, nothing from bare text. Every stage shares the
//! same rule and only contributes its fallback text.

use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde_json::Value;

use super::session::StageResponse;
use crate::error::{HandshakeError, Stage};

const JSON_MESSAGE_PATHS: [&str; 4] = ["message", "detail", "error_description", "error.message"];

/// Detected shape of a response body.
#[derive(Debug)]
pub enum BodyFormat {
    Json(Value),
    Html(Html),
    Unknown,
}

/// Detect the body format from the content type, then by sniffing.
pub fn detect_format(content_type: Option<&str>, body: &str) -> BodyFormat {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    let trimmed = body.trim_start();

    if content_type.contains("json") || trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return BodyFormat::Json(value);
        }
    }
    if content_type.contains("html") || trimmed.starts_with('<') {
        return BodyFormat::Html(Html::parse_document(body));
    }
    BodyFormat::Unknown
}

/// Extract the provider's human-readable message, if the body carries one.
pub fn provider_message(
    format: &BodyFormat,
    status: StatusCode,
    alert_selector: &str,
) -> Option<String> {
    match format {
        BodyFormat::Json(value) => json_message(value),
        // The alert is only read from 403 pages.
        BodyFormat::Html(document) if status == StatusCode::FORBIDDEN => {
            select_text(document, alert_selector)
        }
        BodyFormat::Html(_) | BodyFormat::Unknown => None,
    }
}

/// Classify a non-success response of `stage`.
///
/// The status is always preserved; the message is the provider's when one
/// can be extracted, else the stage's fallback.
pub fn classify(stage: Stage, response: &StageResponse, alert_selector: &str) -> HandshakeError {
    let format = detect_format(response.content_type.as_deref(), &response.body);
    let message = provider_message(&format, response.status, alert_selector)
        .unwrap_or_else(|| stage.fallback_message().to_string());
    HandshakeError::stage(stage, response.status.as_u16(), message)
}

/// Trimmed text of the first element matching `selector`.
pub fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Attribute value of the first element matching `selector`.
pub fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let value = document.select(&selector).next()?.value().attr(attr)?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Look up a dotted path (`user.id`) in parsed JSON.
pub fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

/// String at a dotted path; numbers are rendered as text.
pub fn json_string(value: &Value, path: &str) -> Option<String> {
    match json_path(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_message(value: &Value) -> Option<String> {
    JSON_MESSAGE_PATHS
        .iter()
        .filter_map(|path| json_path(value, path).and_then(Value::as_str))
        .chain(value.get("error").and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
