//! Scripted HTTP client shared by the unit tests.

#![allow(clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bookcheck_domain::{RequestSpec, ResponseSpec};
use serde_json::Value;

use crate::ports::{HttpClient, HttpClientError};

/// Answers requests from a queue and records what it was sent.
#[derive(Default)]
pub struct MockHttpClient {
    responses: Mutex<VecDeque<Result<ResponseSpec, HttpClientError>>>,
    requests: Mutex<Vec<RequestSpec>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: ResponseSpec) -> Self {
        self.responses.lock().expect("Lock poisoned").push_back(Ok(response));
        self
    }

    pub fn fail(self, error: HttpClientError) -> Self {
        self.responses.lock().expect("Lock poisoned").push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().expect("Lock poisoned").clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        self.requests.lock().expect("Lock poisoned").push(request.clone());
        self.responses
            .lock()
            .expect("Lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpClientError::Other("no scripted response".to_string())))
    }
}

pub fn text_response(status: u16, body: &str) -> ResponseSpec {
    ResponseSpec::new(
        status,
        HashMap::from([("content-type".to_string(), "text/plain".to_string())]),
        body.as_bytes().to_vec(),
        Duration::from_millis(5),
    )
}

pub fn json_response(status: u16, body: &Value) -> ResponseSpec {
    ResponseSpec::new(
        status,
        HashMap::from([("content-type".to_string(), "application/json".to_string())]),
        body.to_string().into_bytes(),
        Duration::from_millis(5),
    )
}
