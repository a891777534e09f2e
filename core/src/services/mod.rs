//! Typed facades over `ApiClient`, one per backend capability.
//!
//! Each operation fixes an endpoint, method, and payload shape and returns
//! the client's envelope. Local behavior is limited to session bookkeeping
//! (auth), the agent status branch (admin), and query building (property).

pub mod admin;
pub mod auth;
pub mod property;

pub use admin::AdminService;
pub use auth::{Access, AuthService};
pub use property::PropertyService;

use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiClient, RequestOptions};
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::http::HttpMethod;

/// Send `payload` as JSON, or fail locally if it cannot be encoded.
async fn send_json<T: Serialize + ?Sized>(
    client: &ApiClient,
    endpoint: &str,
    method: HttpMethod,
    payload: &T,
) -> ApiResponse<Value> {
    match RequestOptions::json(method, payload) {
        Ok(options) => client.request(endpoint, options).await,
        Err(error) => ApiResponse::failure(error),
    }
}

/// JSON text for a multipart field.
fn json_field<T: Serialize + ?Sized>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))
}
