//! Turns a raw `HttpResponse` into an `ApiResponse`.
//!
//! # Design
//! The body is decoded once into a `ResponseBody`, chosen by the declared
//! content type. Everything after that branches on the tag instead of probing
//! the payload's shape again.

use serde_json::{json, Value};

use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::http::HttpResponse;

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// JSON object, array, or null.
    Structured(Value),
    /// Plain text, or a JSON scalar rendered as text.
    Text(String),
}

impl ResponseBody {
    /// Decode `body` as JSON when `content_type` says so, else as text.
    pub fn decode(content_type: Option<&str>, body: &str) -> Result<Self, ApiError> {
        let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
        if !is_json {
            return Ok(ResponseBody::Text(body.to_string()));
        }
        let value: Value = serde_json::from_str(body).map_err(|_| ApiError::Decode)?;
        Ok(match value {
            Value::String(s) => ResponseBody::Text(s),
            Value::Bool(_) | Value::Number(_) => ResponseBody::Text(value.to_string()),
            other => ResponseBody::Structured(other),
        })
    }

    /// Top-level `message` string of a structured body.
    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseBody::Structured(v) => v.get("message").and_then(Value::as_str),
            ResponseBody::Text(_) => None,
        }
    }

    /// Best-effort error text: `message`, then `error`, then the raw text.
    /// Empty strings count as absent.
    pub fn error_text(&self) -> Option<&str> {
        let text = match self {
            ResponseBody::Structured(v) => ["message", "error"]
                .iter()
                .filter_map(|key| v.get(*key).and_then(Value::as_str))
                .find(|s| !s.is_empty()),
            ResponseBody::Text(s) => Some(s.as_str()),
        };
        text.filter(|s| !s.is_empty())
    }

    /// The body as a JSON value, without wrapping text.
    pub fn to_value(&self) -> Value {
        match self {
            ResponseBody::Structured(v) => v.clone(),
            ResponseBody::Text(s) => Value::String(s.clone()),
        }
    }

    /// Success payload: structured bodies pass through, text is wrapped as
    /// `{"message": text}`.
    pub fn into_data(self) -> Value {
        match self {
            ResponseBody::Structured(v) => v,
            ResponseBody::Text(s) => json!({ "message": s }),
        }
    }
}

/// Normalize a response into a success or failure envelope.
pub fn normalize(response: HttpResponse) -> ApiResponse<Value> {
    let body = match ResponseBody::decode(response.header("content-type"), &response.body) {
        Ok(body) => body,
        Err(error) => return ApiResponse::failure(error),
    };

    if !response.is_success() {
        let message = body.error_text().map(str::to_string).unwrap_or_else(|| {
            format!("HTTP {}: {}", response.status, response.status_text())
        });
        return ApiResponse::Failure {
            error: ApiError::Http {
                status: response.status,
                message,
            },
            data: Some(body.to_value()),
        };
    }

    let message = body.message().map(str::to_string);
    ApiResponse::Success {
        data: body.into_data(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn json_error_uses_message_field() {
        let resp = normalize(response(404, "application/json", r#"{"message":"not found"}"#));
        assert_eq!(resp.error_message().as_deref(), Some("not found"));
        assert_eq!(resp.failure_data(), Some(&json!({"message": "not found"})));
        assert_eq!(resp.error().and_then(ApiError::status), Some(404));
    }

    #[test]
    fn json_error_falls_back_to_error_field() {
        let resp = normalize(response(
            400,
            "application/json;charset=UTF-8",
            r#"{"error":"bad email","message":""}"#,
        ));
        assert_eq!(resp.error_message().as_deref(), Some("bad email"));
    }

    #[test]
    fn error_without_message_is_synthesized() {
        let resp = normalize(response(500, "application/json", r#"{"code":17}"#));
        assert_eq!(
            resp.error_message().as_deref(),
            Some("HTTP 500: Internal Server Error")
        );
    }

    #[test]
    fn empty_text_error_is_synthesized() {
        let resp = normalize(response(401, "text/plain", ""));
        assert_eq!(resp.error_message().as_deref(), Some("HTTP 401: Unauthorized"));
        assert_eq!(resp.failure_data(), Some(&json!("")));
    }

    #[test]
    fn text_error_uses_raw_body() {
        let resp = normalize(response(403, "text/plain", "Access denied"));
        assert_eq!(resp.error_message().as_deref(), Some("Access denied"));
    }

    #[test]
    fn text_success_is_wrapped() {
        let resp = normalize(response(200, "text/plain", "OK"));
        assert_eq!(resp.data(), Some(&json!({"message": "OK"})));
        assert_eq!(resp.message(), None);
    }

    #[test]
    fn missing_content_type_is_text() {
        let resp = normalize(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"{"a":1}"#.to_string(),
        });
        assert_eq!(resp.data(), Some(&json!({"message": r#"{"a":1}"#})));
    }

    #[test]
    fn json_success_surfaces_message() {
        let resp = normalize(response(
            200,
            "application/json",
            r#"{"message":"Logged out","ok":true}"#,
        ));
        assert_eq!(resp.message(), Some("Logged out"));
        assert_eq!(resp.data(), Some(&json!({"message": "Logged out", "ok": true})));
    }

    #[test]
    fn json_array_passes_through() {
        let resp = normalize(response(200, "application/json", r#"[{"id":"1"}]"#));
        assert_eq!(resp.data(), Some(&json!([{"id": "1"}])));
    }

    #[test]
    fn json_string_is_treated_as_text() {
        let resp = normalize(response(200, "application/json", r#""done""#));
        assert_eq!(resp.data(), Some(&json!({"message": "done"})));
    }

    #[test]
    fn malformed_json_is_parse_failure() {
        let resp = normalize(response(200, "application/json", "{not json"));
        assert_eq!(resp.error(), Some(&ApiError::Decode));
        assert!(resp.failure_data().is_none());

        let resp = normalize(response(500, "application/json", ""));
        assert_eq!(resp.error(), Some(&ApiError::Decode));
    }
}
