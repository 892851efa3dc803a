//! Response body decoding.
//!
//! Pure and synchronous. Fails closed: anything that is not a JSON object
//! with an integer `time` field is rejected rather than partially accepted.

use serde::{Deserialize, Serialize};

use crate::upstream::error::FailureKind;

/// The validated upstream payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeValue {
    pub time: i64,
}

/// Parse and validate a raw upstream body.
pub fn decode(body: &str) -> Result<TimeValue, FailureKind> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        tracing::debug!(error = %e, "Can't parse upstream body");
        FailureKind::MalformedBody
    })?;

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "Upstream body failed schema validation");
        FailureKind::SchemaInvalid
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_valid_body() {
        assert_eq!(decode(r#"{"time": 123}"#), Ok(TimeValue { time: 123 }));
    }

    #[test]
    fn test_ignores_extra_fields() {
        assert_eq!(
            decode(r#"{"time": 7, "server": "eu-1"}"#),
            Ok(TimeValue { time: 7 })
        );
    }

    #[test]
    fn test_malformed_json() {
        assert_eq!(decode("wrong json"), Err(FailureKind::MalformedBody));
        assert_eq!(decode(""), Err(FailureKind::MalformedBody));
        assert_eq!(decode("{'time': 123}"), Err(FailureKind::MalformedBody));
    }

    #[test]
    fn test_schema_violations() {
        assert_eq!(decode("{}"), Err(FailureKind::SchemaInvalid));
        assert_eq!(decode(r#"{"time": "soon"}"#), Err(FailureKind::SchemaInvalid));
        assert_eq!(decode(r#"{"time": 1.5}"#), Err(FailureKind::SchemaInvalid));
        assert_eq!(decode(r#"{"time": null}"#), Err(FailureKind::SchemaInvalid));
        assert_eq!(decode("[1, 2, 3]"), Err(FailureKind::SchemaInvalid));
        assert_eq!(decode("42"), Err(FailureKind::SchemaInvalid));
    }

    #[test]
    fn test_serializes_back_to_wire_shape() {
        let json = serde_json::to_string(&TimeValue { time: 42 }).unwrap();
        assert_eq!(json, r#"{"time":42}"#);
    }
}
