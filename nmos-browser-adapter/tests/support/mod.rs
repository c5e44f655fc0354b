//! In-process transport for driving the adapter without a server.

#![allow(dead_code)]

use async_trait::async_trait;
use nmos_browser_adapter::{AdapterError, AdapterResult, HttpRequest, HttpResponse, Transport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers requests from a fixed URL → response table and records every
/// request it sees.
#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, url: &str, body: Value) -> Self {
        self.respond(url, 200, body.to_string(), None)
    }

    pub fn text(self, url: &str, body: &str) -> Self {
        self.respond(url, 200, body.to_string(), None)
    }

    pub fn status(self, url: &str, status: u16, body: Value) -> Self {
        self.respond(url, status, body.to_string(), None)
    }

    pub fn respond(mut self, url: &str, status: u16, body: String, link: Option<&str>) -> Self {
        self.routes.insert(
            url.to_string(),
            HttpResponse {
                status,
                link: link.map(str::to_string),
                body,
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> AdapterResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.routes
            .get(&request.url)
            .cloned()
            .ok_or_else(|| AdapterError::Network(format!("connection refused: {}", request.url)))
    }
}
