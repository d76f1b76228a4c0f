//! In-process request driver for axum routers.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request};
use http_body_util::BodyExt;
use toboggan_application::RequestDriver;
use tower::ServiceExt;
use tracing::debug;

use super::{DriverFailure, ResponseExpectation, StatusExpectation};

/// Response captured by the driver.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl TestResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// All response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of header `name`, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Response body as text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// Issues requests against a router without binding a socket.
#[derive(Debug, Clone)]
pub struct TestClient {
    router: Router,
}

impl TestClient {
    /// Creates a client for `router`.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Starts a request with an arbitrary method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestRequest {
        TestRequest {
            router: self.router.clone(),
            method,
            uri: uri.into(),
            headers: Vec::new(),
            body: String::new(),
            expectations: Vec::new(),
        }
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl Into<String>) -> TestRequest {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl Into<String>) -> TestRequest {
        self.request(Method::POST, uri)
    }
}

/// A request under construction, with the expectations its response must meet.
#[derive(Debug)]
#[must_use]
pub struct TestRequest {
    router: Router,
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: String,
    expectations: Vec<ResponseExpectation>,
}

impl TestRequest {
    /// Adds a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a response expectation.
    pub fn expect(mut self, expectation: ResponseExpectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Expects a status code or range.
    pub fn expect_status(self, status: impl Into<StatusExpectation>) -> Self {
        self.expect(ResponseExpectation::Status(status.into()))
    }

    /// Expects header `name` with exactly `value`.
    pub fn expect_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.expect(ResponseExpectation::Header {
            name: name.into(),
            value: Some(value.into()),
        })
    }

    /// Expects the body to contain `text`.
    pub fn expect_body(self, text: impl Into<String>) -> Self {
        self.expect(ResponseExpectation::BodyContains {
            text: text.into(),
            ignore_case: false,
        })
    }

    /// Expects the body to match the regex `pattern`.
    pub fn expect_body_matches(self, pattern: impl Into<String>) -> Self {
        self.expect(ResponseExpectation::BodyMatches {
            pattern: pattern.into(),
        })
    }

    /// Returns the expectations added so far.
    #[must_use]
    pub fn expectations(&self) -> &[ResponseExpectation] {
        &self.expectations
    }

    /// Sends the request and captures the response without checking expectations.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` or `Body` if the exchange itself fails.
    pub async fn send(self) -> Result<TestResponse, DriverFailure> {
        let Self {
            router,
            method,
            uri,
            headers,
            body,
            ..
        } = self;

        let mut builder = Request::builder().method(method.clone()).uri(uri.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(Body::from(body))
            .map_err(|e| DriverFailure::InvalidRequest(e.to_string()))?;

        let response = router
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| DriverFailure::Body(e.to_string()))?
            .to_bytes();

        debug!(%method, uri = %uri, status, "test request completed");
        Ok(TestResponse::new(
            status,
            headers,
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    }
}

impl RequestDriver for TestRequest {
    type Response = TestResponse;
    type Failure = DriverFailure;

    async fn end(mut self) -> Result<TestResponse, DriverFailure> {
        let expectations = std::mem::take(&mut self.expectations);
        let response = self.send().await?;
        for expectation in &expectations {
            expectation.check(&response)?;
        }
        Ok(response)
    }
}
