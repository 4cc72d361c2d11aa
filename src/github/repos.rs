//! GitHub repository operations.

use crate::config::Credential;
use crate::error::{PublishError, Result};
use crate::github::GitHubClient;
use crate::github::models::Repository;
use crate::github::outcome::Outcome;
use crate::github::transport::Transport;

const OPERATION: &str = "list repositories";

/// Repository listing operations.
pub trait RepoOps {
    /// List the repositories of the authenticated user.
    ///
    /// An empty list is returned as `Ok`; whether that is acceptable is the
    /// caller's decision.
    fn list_repositories(&self, credential: &Credential) -> Result<Vec<Repository>>;
}

impl<T: Transport> RepoOps for GitHubClient<T> {
    fn list_repositories(&self, credential: &Credential) -> Result<Vec<Repository>> {
        let repos: Vec<Repository> =
            self.get_all(OPERATION, "/user/repos", credential, |response| {
                match response.outcome {
                    Outcome::Success => response.json(),
                    Outcome::Unauthorized => Err(PublishError::Credential {
                        operation: OPERATION.into(),
                    }),
                    Outcome::Forbidden => Err(PublishError::Permission {
                        operation: OPERATION.into(),
                    }),
                    _ => Err(response.unexpected()),
                }
            })?;
        log::info!("Fetched {} repositories", repos.len());
        Ok(repos)
    }
}
