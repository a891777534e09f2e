//! Failure taxonomy carried inside `ApiResponse::Failure`.
//!
//! # Design
//! Every variant renders to the human-readable message callers show to
//! users, so `error.to_string()` is the envelope's `error` string. None of
//! these are ever returned as `Err` from the request path; they always ride
//! inside an envelope.

use thiserror::Error;

pub(crate) const NETWORK_ERROR: &str = "Network error occurred";
pub(crate) const PARSE_ERROR: &str = "Failed to parse response";

/// Reasons a request did not produce a success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The transport could not complete the round-trip.
    #[error("{0}")]
    Network(String),

    /// The body could not be decoded per its declared content type, or the
    /// decoded payload did not fit the expected record.
    #[error("Failed to parse response")]
    Decode,

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Rejected locally before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// The request payload could not be encoded.
    #[error("failed to encode request: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Build a network failure, substituting a generic message for an empty
    /// description.
    pub fn network(description: impl Into<String>) -> Self {
        let description = description.into();
        if description.trim().is_empty() {
            ApiError::Network(NETWORK_ERROR.to_string())
        } else {
            ApiError::Network(description)
        }
    }

    /// HTTP status for `Http` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_network_description_falls_back() {
        assert_eq!(ApiError::network("").to_string(), NETWORK_ERROR);
        assert_eq!(
            ApiError::network("connection refused").to_string(),
            "connection refused"
        );
    }

    #[test]
    fn decode_message_is_fixed() {
        assert_eq!(ApiError::Decode.to_string(), PARSE_ERROR);
    }

    #[test]
    fn http_failure_displays_message_only() {
        let err = ApiError::Http {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.status(), Some(404));
    }
}
