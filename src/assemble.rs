//! Result assembly
//!
//! Pure construction of the output record. The timestamp is the wall-clock
//! time of assembly, not request arrival.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::TransformRequest;
use crate::transform::available_transforms;

/// The record appended to the dataset and echoed to standby callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// The input text as normalized
    pub original: String,
    /// The engine's output
    pub transformed: String,
    /// Registry name that was requested (even if unknown)
    pub transformation: String,
    /// All registry names in registration order
    pub available_transforms: Vec<String>,
    /// ISO-8601 assembly time, UTC
    pub timestamp: String,
    /// Always `"success"`; failures never produce a record
    pub status: String,
}

/// Assemble the output record from the normalized request and the engine's
/// output.
#[must_use]
pub fn assemble(request: &TransformRequest, transformed: String) -> TransformResult {
    TransformResult {
        original: request.message.clone(),
        transformed,
        transformation: request.transform.clone(),
        available_transforms: available_transforms(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        status: "success".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transform::TRANSFORM_NAMES;

    #[test]
    fn record_carries_the_full_registry_in_order() {
        let request = TransformRequest {
            message: "hi".to_string(),
            transform: "reverse".to_string(),
        };
        let result = assemble(&request, "ih".to_string());

        assert_eq!(result.original, "hi");
        assert_eq!(result.transformed, "ih");
        assert_eq!(result.transformation, "reverse");
        assert_eq!(result.status, "success");
        let expected: Vec<String> = TRANSFORM_NAMES.iter().map(ToString::to_string).collect();
        assert_eq!(result.available_transforms, expected);
        assert!(result.timestamp.ends_with('Z'));
    }

    #[test]
    fn wire_names_are_camel_case() {
        let request = TransformRequest {
            message: "hi".to_string(),
            transform: "reverse".to_string(),
        };
        let value = serde_json::to_value(assemble(&request, "ih".to_string())).unwrap();
        assert!(value.get("availableTransforms").is_some());
        assert!(value.get("available_transforms").is_none());
    }
}
