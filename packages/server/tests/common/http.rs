//! Minimal request helpers that drive the router in-process.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use super::harness::TEST_WEBHOOK_SECRET;

/// Status and decoded JSON body of a response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub struct RequestBuilder {
    method: Method,
    uri: String,
    token: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestBuilder {
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach the shared secret callbacks must present
    pub fn webhook_secret(self) -> Self {
        self.header("x-webhook-secret", TEST_WEBHOOK_SECRET)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Send `body` verbatim under a JSON content type
    pub fn raw_json(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub async fn send(self, router: &Router) -> TestResponse {
        let mut request = Request::builder().method(self.method).uri(self.uri);

        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let request = match self.body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => request.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

fn request(method: Method, uri: &str) -> RequestBuilder {
    RequestBuilder {
        method,
        uri: uri.to_string(),
        token: None,
        headers: Vec::new(),
        body: None,
    }
}

pub fn get(uri: &str) -> RequestBuilder {
    request(Method::GET, uri)
}

pub fn post(uri: &str) -> RequestBuilder {
    request(Method::POST, uri)
}

pub fn patch(uri: &str) -> RequestBuilder {
    request(Method::PATCH, uri)
}

pub fn delete(uri: &str) -> RequestBuilder {
    request(Method::DELETE, uri)
}
