//! Error types for boundary checking.
//!
//! Only loading and resolution failures are errors. Conflicts and invalid
//! geometry are findings and are reported, not returned.

use thiserror::Error;

pub type CheckResult<T> = Result<T, CheckError>;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("malformed date '{value}'")]
    MalformedDate { value: String },

    #[error("feature {id} is missing required property '{key}'")]
    MissingProperty { id: String, key: String },

    #[error("out of order coordinate copy: {id} references {reference}, which is not resolved yet")]
    OutOfOrderCopy { id: String, reference: String },

    #[error("feature {id} has a {kind} geometry where a polygon was expected")]
    NotAreal { id: String, kind: String },

    #[error("malformed document: {0}")]
    Document(String),

    #[error("bad coordinates for feature {id}: {reason}")]
    Coordinates { id: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CheckError {
    pub fn malformed_date(value: impl Into<String>) -> Self {
        Self::MalformedDate {
            value: value.into(),
        }
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_message() {
        let err = CheckError::OutOfOrderCopy {
            id: "prussia_1815".into(),
            reference: "saxony_1815".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("out of order coordinate copy"));
        assert!(msg.contains("saxony_1815"));
    }

    #[test]
    fn test_io_preserves_source() {
        let err = CheckError::from(std::io::Error::other("boom"));
        assert!(err.to_string().contains("boom"));
    }
}
