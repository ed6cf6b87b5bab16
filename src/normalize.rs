//! Request normalization
//!
//! Every invocation - batch input object or raw HTTP request - funnels into
//! one canonical [`TransformRequest`]. Normalization never fails: malformed
//! bodies, missing fields, and absent query parameters all resolve through
//! documented fallbacks so the actor always has something to respond with.

use serde::Deserialize;

/// Placeholder message used when no source provides one
pub const DEFAULT_MESSAGE: &str = "Hello, world!";

/// Transform applied when none is requested
pub const DEFAULT_TRANSFORM: &str = "uppercase";

/// Canonical per-invocation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    /// Text to transform
    pub message: String,
    /// Registry name of the requested transform
    pub transform: String,
}

/// The wire shape accepted from batch input and JSON bodies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInput {
    /// Text to transform
    #[serde(default)]
    pub message: Option<String>,
    /// Requested transform name
    #[serde(default)]
    pub transform: Option<String>,
}

impl From<RawInput> for TransformRequest {
    fn from(raw: RawInput) -> Self {
        Self {
            message: raw.message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            transform: raw
                .transform
                .unwrap_or_else(|| DEFAULT_TRANSFORM.to_string()),
        }
    }
}

/// Normalize a batch-mode input object
#[must_use]
pub fn from_batch_input(input: &serde_json::Value) -> TransformRequest {
    let raw: RawInput = serde_json::from_value(input.clone()).unwrap_or_default();
    raw.into()
}

/// Normalize raw HTTP request parts.
///
/// Precedence:
/// 1. non-empty body with a JSON content-type: parsed as `{message,
///    transform}`; a body that fails to parse becomes the literal message;
/// 2. non-empty body with any other content-type: the body text is the
///    message;
/// 3. otherwise: `message` / `transform` query parameters.
///
/// Whatever is still missing afterwards takes the documented defaults.
#[must_use]
pub fn from_http_parts(query: Option<&str>, content_type: Option<&str>, body: &[u8]) -> TransformRequest {
    if !body.is_empty() {
        let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        if is_json {
            if let Ok(raw) = serde_json::from_slice::<RawInput>(body) {
                return raw.into();
            }
        }
        // Plain-text body, or a JSON body that did not parse: the whole
        // body is the message, transform falls back to the default.
        return RawInput {
            message: Some(String::from_utf8_lossy(body).into_owned()),
            transform: None,
        }
        .into();
    }

    let mut raw = RawInput::default();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "message" => raw.message = Some(value.into_owned()),
                "transform" => raw.transform = Some(value.into_owned()),
                _ => {}
            }
        }
    }
    raw.into()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn json_body_wins() {
        let req = from_http_parts(
            Some("message=ignored"),
            Some("application/json"),
            br#"{"message":"hi","transform":"uppercase"}"#,
        );
        assert_eq!(
            req,
            TransformRequest {
                message: "hi".to_string(),
                transform: "uppercase".to_string(),
            }
        );
    }

    #[test]
    fn malformed_json_body_becomes_the_message() {
        let req = from_http_parts(None, Some("application/json; charset=utf-8"), b"{not json");
        assert_eq!(req.message, "{not json");
        assert_eq!(req.transform, DEFAULT_TRANSFORM);
    }

    #[test]
    fn plain_text_body_is_the_message() {
        let req = from_http_parts(None, Some("text/plain"), b"hi");
        assert_eq!(req.message, "hi");
        assert_eq!(req.transform, DEFAULT_TRANSFORM);
    }

    #[test]
    fn body_without_content_type_is_the_message() {
        let req = from_http_parts(None, None, b"hi there");
        assert_eq!(req.message, "hi there");
        assert_eq!(req.transform, DEFAULT_TRANSFORM);
    }

    #[test]
    fn query_parameters_fill_an_empty_body() {
        let req = from_http_parts(Some("message=hi&transform=reverse"), None, b"");
        assert_eq!(
            req,
            TransformRequest {
                message: "hi".to_string(),
                transform: "reverse".to_string(),
            }
        );
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let req = from_http_parts(Some("message=hello%20world&other=x"), None, b"");
        assert_eq!(req.message, "hello world");
    }

    #[test]
    fn everything_absent_yields_defaults() {
        let req = from_http_parts(None, None, b"");
        assert_eq!(req.message, DEFAULT_MESSAGE);
        assert_eq!(req.transform, DEFAULT_TRANSFORM);
    }

    #[test]
    fn batch_input_defaults_missing_fields() {
        let req = from_batch_input(&serde_json::json!({ "message": "batch" }));
        assert_eq!(req.message, "batch");
        assert_eq!(req.transform, DEFAULT_TRANSFORM);

        let req = from_batch_input(&serde_json::json!("not an object"));
        assert_eq!(req.message, DEFAULT_MESSAGE);
    }
}
