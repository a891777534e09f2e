//! Recording transport for unit tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

type Outcome = Result<HttpResponse, ApiError>;

/// Replays queued outcomes and records every request it sees.
///
/// Routed outcomes answer only requests whose URL ends with their path;
/// unrouted ones answer anything, in order. No match answers 500.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    outcomes: Mutex<VecDeque<(Option<String>, Outcome)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_json(&self, status: u16, body: Value) {
        self.outcomes.lock().push_back((None, Ok(json_response(status, body))));
    }

    pub(crate) fn push_text(&self, status: u16, body: &str) {
        self.outcomes.lock().push_back((None, Ok(text_response(status, body))));
    }

    pub(crate) fn push_error(&self, error: ApiError) {
        self.outcomes.lock().push_back((None, Err(error)));
    }

    pub(crate) fn route_json(&self, path: &str, status: u16, body: Value) {
        self.outcomes
            .lock()
            .push_back((Some(path.to_string()), Ok(json_response(status, body))));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut outcomes = self.outcomes.lock();
        let position = outcomes.iter().position(|(route, _)| match route {
            Some(path) => request.url.ends_with(path.as_str()),
            None => true,
        });
        self.requests.lock().push(request);
        position
            .and_then(|i| outcomes.remove(i))
            .map(|(_, outcome)| outcome)
            .unwrap_or_else(|| Ok(text_response(500, "no canned response")))
    }
}

fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.to_string(),
    }
}

fn text_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "text/plain".to_string())],
        body: body.to_string(),
    }
}
