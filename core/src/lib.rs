//! Async API client core for the BrickBroker marketplace backend.
//!
//! # Overview
//! `ApiClient` builds requests, attaches the session's bearer token, executes
//! them through a `Transport`, and normalizes every outcome into an
//! `ApiResponse` envelope. The `services` facades fix the endpoint, method,
//! and payload for each backend capability on top of it.
//!
//! # Design
//! - Request building (`ApiClient::build_request`) and response handling
//!   (`normalize`) are pure functions over plain `HttpRequest` /
//!   `HttpResponse` values; only the `Transport` does I/O.
//! - No call on the request path returns `Err` or panics. Network, decode,
//!   HTTP, and local validation failures all become `ApiResponse::Failure`.
//! - Session state is an injected `SessionStore`, not a global.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod directory;
pub mod envelope;
pub mod error;
pub mod http;
pub mod normalize;
pub mod services;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use directory::{AgentCard, AgentDirectory, SortKey};
pub use envelope::ApiResponse;
pub use error::ApiError;
pub use http::{FileUpload, FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
pub use normalize::{normalize, ResponseBody};
pub use services::{Access, AdminService, AuthService, PropertyService};
pub use session::{FileSession, MemorySession, SessionField, SessionStore};
pub use transport::{ReqwestTransport, Transport};
