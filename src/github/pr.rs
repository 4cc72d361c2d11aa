//! Pull request operations.

use crate::config::Credential;
use crate::error::{PublishError, Result};
use crate::github::GitHubClient;
use crate::github::models::{CreatedPullRequest, PullRequest, PullRequestDescriptor};
use crate::github::outcome::Outcome;
use crate::github::transport::{Method, Transport};

const CREATE: &str = "create pull request";
const LIST: &str = "list pull requests";

/// Result of asking GitHub to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestOutcome {
    /// A new pull request was opened.
    Created { url: Option<String> },
    /// A pull request for the same head and base is already open. `url` is
    /// set when the existing one could be found.
    AlreadyExists { url: Option<String> },
}

impl PullRequestOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            PullRequestOutcome::Created { url } | PullRequestOutcome::AlreadyExists { url } => {
                url.as_deref()
            }
        }
    }
}

/// Find the pull request whose head and base match exactly.
pub fn find_matching<'a>(
    pulls: &'a [PullRequest],
    head: &str,
    base: &str,
) -> Option<&'a PullRequest> {
    pulls
        .iter()
        .find(|pr| pr.head.ref_name == head && pr.base.ref_name == base)
}

/// Pull request operations.
pub trait PullRequestOps {
    /// Open a pull request, recovering the existing one if GitHub reports a
    /// duplicate.
    fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        descriptor: &PullRequestDescriptor,
        credential: &Credential,
    ) -> Result<PullRequestOutcome>;

    /// List open pull requests for a repository.
    fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        credential: &Credential,
    ) -> Result<Vec<PullRequest>>;
}

impl<T: Transport> GitHubClient<T> {
    fn lookup_existing(
        &self,
        owner: &str,
        repo: &str,
        descriptor: &PullRequestDescriptor,
        credential: &Credential,
    ) -> Option<String> {
        match self.list_pull_requests(owner, repo, credential) {
            Ok(pulls) => {
                let found = find_matching(&pulls, &descriptor.head, &descriptor.base);
                if found.is_none() {
                    log::warn!(
                        "No open pull request matches {} -> {}",
                        descriptor.head,
                        descriptor.base
                    );
                }
                found.map(|pr| pr.html_url.clone())
            }
            Err(e) => {
                log::warn!("Could not look up the existing pull request: {}", e);
                None
            }
        }
    }
}

impl<T: Transport> PullRequestOps for GitHubClient<T> {
    fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        descriptor: &PullRequestDescriptor,
        credential: &Credential,
    ) -> Result<PullRequestOutcome> {
        let endpoint = format!("/repos/{}/{}/pulls", owner, repo);
        let response = self.send_json(CREATE, Method::Post, &endpoint, credential, descriptor)?;

        match response.outcome {
            Outcome::Success => {
                let url = response
                    .json::<CreatedPullRequest>()
                    .ok()
                    .and_then(|created| created.html_url);
                log::info!(
                    "Pull request {} -> {} created (HTTP {})",
                    descriptor.head,
                    descriptor.base,
                    response.status
                );
                Ok(PullRequestOutcome::Created { url })
            }
            Outcome::Forbidden => Err(PublishError::Permission {
                operation: CREATE.into(),
            }),
            Outcome::UnprocessableEntity => {
                let text = response.text();
                if text.contains("already exists") {
                    log::info!(
                        "A pull request with head {} and base {} already exists",
                        descriptor.head,
                        descriptor.base
                    );
                    let url = self.lookup_existing(owner, repo, descriptor, credential);
                    Ok(PullRequestOutcome::AlreadyExists { url })
                } else {
                    Err(PublishError::Validation {
                        operation: CREATE.into(),
                        body: text,
                    })
                }
            }
            _ => Err(response.unexpected()),
        }
    }

    fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        credential: &Credential,
    ) -> Result<Vec<PullRequest>> {
        let endpoint = format!("/repos/{}/{}/pulls?state=open", owner, repo);
        self.get_all(LIST, &endpoint, credential, |response| match response.outcome {
            Outcome::Success => response.json(),
            _ => Err(response.unexpected()),
        })
    }
}
