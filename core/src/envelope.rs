//! The uniform result every service operation resolves to.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// Success or failure of one API call.
///
/// `Success` always carries `data`; `Failure` always carries a non-empty,
/// human-readable `error` plus whatever body the server sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success {
        data: T,
        message: Option<String>,
    },
    Failure {
        error: ApiError,
        data: Option<Value>,
    },
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse::Success {
            data,
            message: None,
        }
    }

    pub fn failure(error: ApiError) -> Self {
        ApiResponse::Failure { error, data: None }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ApiResponse::Success { message, .. } => message.as_deref(),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ApiResponse::Success { .. } => None,
            ApiResponse::Failure { error, .. } => Some(error),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Raw body attached to a failure, if any.
    pub fn failure_data(&self) -> Option<&Value> {
        match self {
            ApiResponse::Success { .. } => None,
            ApiResponse::Failure { data, .. } => data.as_ref(),
        }
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Success { data, .. } => Ok(data),
            ApiResponse::Failure { error, .. } => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success { data, message } => ApiResponse::Success {
                data: f(data),
                message,
            },
            ApiResponse::Failure { error, data } => ApiResponse::Failure { error, data },
        }
    }
}

impl ApiResponse<Value> {
    /// Convert the success payload into a typed record. A payload that does
    /// not fit `T` becomes a decode failure that keeps the raw payload as
    /// failure data.
    pub fn decode<T: DeserializeOwned>(self) -> ApiResponse<T> {
        match self {
            ApiResponse::Success { data, message } => match T::deserialize(&data) {
                Ok(typed) => ApiResponse::Success {
                    data: typed,
                    message,
                },
                Err(e) => {
                    tracing::debug!(error = %e, "response payload did not match expected shape");
                    ApiResponse::Failure {
                        error: ApiError::Decode,
                        data: Some(data),
                    }
                }
            },
            ApiResponse::Failure { error, data } => ApiResponse::Failure { error, data },
        }
    }
}
