//! HTTP transport seam.
//!
//! The operation modules never talk to the network directly; they hand a
//! [`HttpRequest`] to a [`Transport`] and receive the status and body back.
//! [`ReqwestTransport`] is the production implementation; the replaying
//! double lives in [`crate::testing`].

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::error::{PublishError, Result};

/// HTTP methods used by the GitHub operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// A fully prepared HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The raw status and body returned by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A network-level failure: connection refused, timeout, cancellation.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Performs HTTP requests on behalf of the GitHub client.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Transport backed by a blocking reqwest client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport; `timeout` bounds each request end to end.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PublishError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                TransportError(format!("request timed out: {}", e))
            } else {
                TransportError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method) -> HttpRequest {
        HttpRequest {
            method,
            url: "https://api.github.com/user/repos".into(),
            headers: vec![("Accept".into(), "application/json".into())],
            body: None,
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = request(Method::Get);

        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("Authorization"), None);
    }
}
