//! GitHub API client.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{ClientSettings, Credential};
use crate::error::{PublishError, Result};
use crate::github::outcome::{Outcome, classify};
use crate::github::transport::{HttpRequest, Method, ReqwestTransport, Transport};

const API_VERSION: &str = "2022-11-28";

/// Page size requested from list endpoints; GitHub's maximum.
pub(crate) const PER_PAGE: usize = 100;

/// Upper bound on pages fetched from a single list endpoint.
const MAX_PAGES: usize = 50;

/// Percent-encode each `/`-separated segment of a path that goes into a URL.
///
/// Separators are kept so nested paths and branch names such as
/// `release/1.0` still address the right resource.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Client for the GitHub REST API.
///
/// The client holds no credential; every call takes one explicitly so the
/// caller decides when a token is reloaded.
#[derive(Clone)]
pub struct GitHubClient<T = ReqwestTransport> {
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
    pub(crate) transport: T,
}

impl GitHubClient<ReqwestTransport> {
    /// Create a client talking to the network with the given settings.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let transport = ReqwestTransport::new(settings.timeout_secs.map(Duration::from_secs))?;
        Ok(Self::with_transport(transport, settings))
    }
}

impl<T: Transport> GitHubClient<T> {
    /// Create a client over an arbitrary transport.
    pub fn with_transport(transport: T, settings: &ClientSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            user_agent: settings.user_agent.clone(),
            transport,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn headers(&self, credential: &Credential, has_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", credential.expose()),
            ),
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
        ];
        if has_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers
    }

    fn send(
        &self,
        operation: &str,
        method: Method,
        endpoint: &str,
        credential: &Credential,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        log::debug!("{}: {} {}", operation, method.as_str(), url);

        let request = HttpRequest {
            method,
            headers: self.headers(credential, body.is_some()),
            url,
            body,
        };

        let response = self
            .transport
            .send(request)
            .map_err(|e| PublishError::Transport {
                operation: operation.to_string(),
                message: e.to_string(),
            })?;

        let outcome = classify(response.status);
        log::debug!("{}: HTTP {} ({:?})", operation, response.status, outcome);

        Ok(ApiResponse {
            operation: operation.to_string(),
            status: response.status,
            outcome,
            body: response.body,
        })
    }

    /// Make a GET request to the GitHub API.
    pub(crate) fn get(
        &self,
        operation: &str,
        endpoint: &str,
        credential: &Credential,
    ) -> Result<ApiResponse> {
        self.send(operation, Method::Get, endpoint, credential, None)
    }

    /// Fetch every page of a list endpoint.
    ///
    /// `decode` maps each page's response to its items or an error. Paging
    /// stops at the first page shorter than [`PER_PAGE`].
    pub(crate) fn get_all<D>(
        &self,
        operation: &str,
        endpoint: &str,
        credential: &Credential,
        mut decode: impl FnMut(ApiResponse) -> Result<Vec<D>>,
    ) -> Result<Vec<D>> {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let paged = format!("{}{}per_page={}&page={}", endpoint, separator, PER_PAGE, page);
            let batch = decode(self.get(operation, &paged, credential)?)?;
            let last = batch.len() < PER_PAGE;
            items.extend(batch);
            if last {
                return Ok(items);
            }
        }

        log::warn!("{}: stopped after {} pages", operation, MAX_PAGES);
        Ok(items)
    }

    /// Make a request with a JSON body to the GitHub API.
    pub(crate) fn send_json<B: Serialize>(
        &self,
        operation: &str,
        method: Method,
        endpoint: &str,
        credential: &Credential,
        body: &B,
    ) -> Result<ApiResponse> {
        let bytes = serde_json::to_vec(body)?;
        self.send(operation, method, endpoint, credential, Some(bytes))
    }
}

/// A classified API response.
#[derive(Debug, Clone)]
pub(crate) struct ApiResponse {
    pub operation: String,
    pub status: u16,
    pub outcome: Outcome,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// The body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<D: DeserializeOwned>(&self) -> Result<D> {
        serde_json::from_slice(&self.body).map_err(|e| PublishError::Parse {
            operation: self.operation.clone(),
            message: e.to_string(),
        })
    }

    /// The generic failure for an outcome with no dedicated handling.
    pub fn unexpected(&self) -> PublishError {
        PublishError::UnexpectedStatus {
            operation: self.operation.clone(),
            status: self.status,
            body: self.text(),
        }
    }
}
