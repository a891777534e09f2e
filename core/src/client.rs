//! Request envelope builder for the BrickBroker API.
//!
//! # Design
//! `ApiClient` holds the base URL, the session, and a transport. Each call is
//! split the same way: `build_request` merges headers and produces a plain
//! `HttpRequest`, the transport executes it, and `normalize` turns the
//! response into an `ApiResponse`. Nothing on this path returns `Err`; every
//! outcome is an envelope.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, MultipartForm, RequestBody};
use crate::normalize::normalize;
use crate::session::SessionStore;
use crate::transport::{ReqwestTransport, Transport};

/// Per-call method, extra headers, and body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn method(method: HttpMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    /// Serialize `payload` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(method: HttpMethod, payload: &T) -> Result<Self, ApiError> {
        let text =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Self {
            method: Some(method),
            headers: Vec::new(),
            body: RequestBody::Json(text),
        })
    }

    pub fn multipart(method: HttpMethod, form: MultipartForm) -> Self {
        Self {
            method: Some(method),
            headers: Vec::new(),
            body: RequestBody::Multipart(form),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

pub struct ApiClient {
    base_url: String,
    session: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            transport,
        }
    }

    /// Client over `reqwest` with the given session.
    pub fn with_reqwest(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Self {
        Self::new(config, session, Arc::new(ReqwestTransport::new()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Resolve the URL and merge headers without issuing the request.
    ///
    /// Multipart bodies get only `authorization`; every other body also gets
    /// `content-type: application/json`. Caller headers replace defaults with
    /// the same name, compared case-insensitively.
    pub fn build_request(&self, endpoint: &str, options: &RequestOptions) -> HttpRequest {
        let mut headers = Vec::new();
        if !options.body.is_multipart() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.session.bearer_token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        HttpRequest {
            method: options.method.unwrap_or(HttpMethod::Get),
            url: format!("{}{endpoint}", self.base_url),
            headers,
            body: options.body.clone(),
        }
    }

    /// Issue one request and normalize the outcome.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> ApiResponse<Value> {
        let request = self.build_request(endpoint, &options);
        tracing::debug!(method = request.method.as_str(), url = %request.url, "api request");

        match self.transport.execute(request).await {
            Ok(response) => {
                tracing::debug!(status = response.status, endpoint, "api response");
                normalize(response)
            }
            Err(error) => {
                tracing::warn!(endpoint, error = %error, "api request failed");
                ApiResponse::failure(error)
            }
        }
    }

    /// `request`, with the success payload decoded into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResponse<T> {
        self.request(endpoint, options).await.decode()
    }

    /// `GET /health`; true only if a 2xx response arrives.
    pub async fn check_health(&self) -> bool {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/health", self.base_url),
            headers: Vec::new(),
            body: RequestBody::Empty,
        };
        match self.transport.execute(request).await {
            Ok(response) => response.is_success(),
            Err(error) => {
                tracing::debug!(error = %error, "health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::FileUpload;
    use crate::session::{MemorySession, SessionField};
    use crate::testing::FakeTransport;

    fn client_with(session: MemorySession, transport: Arc<FakeTransport>) -> ApiClient {
        ApiClient::new(
            &ClientConfig::new("http://localhost:8080/"),
            Arc::new(session),
            transport,
        )
    }

    fn anonymous() -> ApiClient {
        client_with(MemorySession::new(), Arc::new(FakeTransport::new()))
    }

    #[test]
    fn get_request_has_json_content_type_and_no_auth() {
        let req = anonymous().build_request("/profile", &RequestOptions::get());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/profile");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn admin_token_is_preferred() {
        let session = MemorySession::new();
        session.set_all(&[
            (SessionField::AdminToken, "admin".to_string()),
            (SessionField::UserToken, "user".to_string()),
        ]);
        let client = client_with(session, Arc::new(FakeTransport::new()));
        let req = client.build_request("/profile", &RequestOptions::get());
        assert_eq!(req.header("authorization"), Some("Bearer admin"));
    }

    #[test]
    fn multipart_never_gets_content_type() {
        let session = MemorySession::new();
        session.set_all(&[(SessionField::UserToken, "user".to_string())]);
        let client = client_with(session, Arc::new(FakeTransport::new()));
        let form = MultipartForm::new()
            .text("user", "{}")
            .file("profilePicture", FileUpload::new("me.png", vec![1, 2]));
        let req = client.build_request(
            "/profile/register-user",
            &RequestOptions::multipart(HttpMethod::Post, form),
        );
        assert_eq!(req.header("content-type"), None);
        assert_eq!(req.header("authorization"), Some("Bearer user"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn caller_headers_override_case_insensitively() {
        let options = RequestOptions::method(HttpMethod::Post)
            .header("Content-Type", "application/x-www-form-urlencoded");
        let req = anonymous().build_request("/send-reset-otp", &options);
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(
            req.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
    }

    #[test]
    fn caller_may_set_content_type_on_multipart() {
        let options = RequestOptions::multipart(HttpMethod::Post, MultipartForm::new())
            .header("content-type", "multipart/form-data; boundary=x");
        let req = anonymous().build_request("/api/properties", &options);
        assert_eq!(req.header("content-type"), Some("multipart/form-data; boundary=x"));
    }

    #[test]
    fn json_options_serialize_payload() {
        let options = RequestOptions::json(HttpMethod::Post, &json!({"otp": "1234"})).unwrap();
        assert_eq!(options.body, RequestBody::Json(r#"{"otp":"1234"}"#.to_string()));
    }

    #[tokio::test]
    async fn network_failure_becomes_envelope() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_error(ApiError::network("connection refused"));
        let client = client_with(MemorySession::new(), transport.clone());

        let resp = client.request("/profile", RequestOptions::get()).await;
        assert_eq!(resp.error_message().as_deref(), Some("connection refused"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn request_normalizes_response() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, json!({"id": "u1", "message": "hello"}));
        let client = client_with(MemorySession::new(), transport);

        let resp = client.request("/profile", RequestOptions::get()).await;
        assert_eq!(resp.data(), Some(&json!({"id": "u1", "message": "hello"})));
        assert_eq!(resp.message(), Some("hello"));
    }

    #[tokio::test]
    async fn health_check_reflects_status() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_text(200, "UP");
        transport.push_text(503, "");
        transport.push_error(ApiError::network("refused"));
        let client = client_with(MemorySession::new(), transport.clone());

        assert!(client.check_health().await);
        assert!(!client.check_health().await);
        assert!(!client.check_health().await);
        assert_eq!(transport.requests()[0].url, "http://localhost:8080/health");
    }
}
