//! Interactive publishing workflow.
//!
//! [`Orchestrator`] wraps a fallible operation in a retry loop driven by
//! the user. [`Workflow`] chains the GitHub operations: list repositories,
//! select one, create the branch, publish the file and open the pull
//! request. Each step gates the next.

use std::fmt;

use crate::config::{Credential, TokenSource};
use crate::error::{PublishError, Result};
use crate::github::{
    BranchOps, BranchResolution, ContentOps, GitHubClient, PublishOutcome, PullRequestDescriptor,
    PullRequestOps, PullRequestOutcome, RepoOps, Repository, Transport,
};
use crate::interaction::Interaction;

/// Lifecycle of one operation under the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    Running,
    AwaitingRetryChoice,
    Succeeded,
    Aborted,
}

/// What came out of an orchestrated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Succeeded(T),
    /// The user chose not to retry after a failure.
    Abandoned,
}

impl<T> Attempt<T> {
    pub fn succeeded(self) -> Option<T> {
        match self {
            Attempt::Succeeded(value) => Some(value),
            Attempt::Abandoned => None,
        }
    }
}

/// Runs operations until they succeed or the user stops retrying.
///
/// The credential is loaded lazily and reloaded before every retry, so a
/// token fixed on disk between attempts is picked up.
pub struct Orchestrator<'a> {
    tokens: &'a dyn TokenSource,
    ui: &'a dyn Interaction,
    credential: Option<Credential>,
    state: RetryState,
    history: Vec<(String, RetryState)>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(tokens: &'a dyn TokenSource, ui: &'a dyn Interaction) -> Self {
        Self {
            tokens,
            ui,
            credential: None,
            state: RetryState::Idle,
            history: Vec::new(),
        }
    }

    /// State of the most recent operation.
    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Every state transition so far, tagged with the operation name.
    pub fn history(&self) -> &[(String, RetryState)] {
        &self.history
    }

    fn transition(&mut self, operation: &str, state: RetryState) {
        log::debug!("{}: {:?} -> {:?}", operation, self.state, state);
        self.state = state;
        self.history.push((operation.to_string(), state));
    }

    fn credential(&mut self) -> Result<Credential> {
        if let Some(credential) = &self.credential {
            return Ok(credential.clone());
        }
        let credential = self.tokens.load()?;
        self.credential = Some(credential.clone());
        Ok(credential)
    }

    /// Run `op` until it succeeds or the user declines to retry.
    ///
    /// Only an explicit yes retries; anything else abandons the operation.
    pub fn retry<T>(
        &mut self,
        operation: &str,
        mut op: impl FnMut(&Credential) -> Result<T>,
    ) -> Attempt<T> {
        self.transition(operation, RetryState::Running);

        loop {
            match self.credential().and_then(|credential| op(&credential)) {
                Ok(value) => {
                    self.transition(operation, RetryState::Succeeded);
                    return Attempt::Succeeded(value);
                }
                Err(e) => {
                    // The error already names the operation that failed.
                    log::warn!("{}", e);
                    self.ui.notify(&format!("Error: {}", e));
                    self.transition(operation, RetryState::AwaitingRetryChoice);

                    if !self.ui.confirm("Do you want to retry?") {
                        self.transition(operation, RetryState::Aborted);
                        return Attempt::Abandoned;
                    }

                    self.credential = None;
                    self.transition(operation, RetryState::Running);
                }
            }
        }
    }
}

/// What to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub branch: String,
    pub base: String,
    pub path: String,
    pub content: Vec<u8>,
    pub title: String,
    pub body: String,
}

impl PublishRequest {
    /// A request with the default title `Add <path>` and body `Added <path>`.
    pub fn new(
        branch: impl Into<String>,
        base: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let path = path.into();
        Self {
            branch: branch.into(),
            base: base.into(),
            title: format!("Add {}", path),
            body: format!("Added {}", path),
            path,
            content: content.into(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Steps of the workflow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ListRepositories,
    SelectRepository,
    CreateBranch,
    PublishFile,
    CreatePullRequest,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ListRepositories => "fetch repositories",
            Stage::SelectRepository => "select repository",
            Stage::CreateBranch => "create branch",
            Stage::PublishFile => "publish file",
            Stage::CreatePullRequest => "create pull request",
        };
        f.write_str(name)
    }
}

/// Result of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowReport {
    Completed {
        repository: Repository,
        branch: String,
        file: PublishOutcome,
        pull_request: PullRequestOutcome,
    },
    /// The workflow stopped at `stage`, either by user choice or an invalid
    /// selection. Not an error.
    NotCompleted { stage: Stage },
}

impl WorkflowReport {
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkflowReport::Completed { .. })
    }
}

/// Drives the whole publishing sequence.
pub struct Workflow<'a, T: Transport> {
    client: &'a GitHubClient<T>,
    ui: &'a dyn Interaction,
    orchestrator: Orchestrator<'a>,
}

impl<'a, T: Transport> Workflow<'a, T> {
    pub fn new(
        client: &'a GitHubClient<T>,
        tokens: &'a dyn TokenSource,
        ui: &'a dyn Interaction,
    ) -> Self {
        Self {
            client,
            ui,
            orchestrator: Orchestrator::new(tokens, ui),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<'a> {
        &self.orchestrator
    }

    /// Fetch repositories, treating an empty list as a retryable failure.
    pub fn fetch_repositories(&mut self) -> Attempt<Vec<Repository>> {
        let client = self.client;
        self.orchestrator.retry(&Stage::ListRepositories.to_string(), |credential| {
            let repos = client.list_repositories(credential)?;
            if repos.is_empty() {
                return Err(PublishError::EmptyRepositoryList);
            }
            Ok(repos)
        })
    }

    fn select_repository(&self, repos: &[Repository]) -> Option<Repository> {
        let options: Vec<String> = repos
            .iter()
            .map(|repo| {
                format!(
                    "Name: {}, URL: {}, Private: {}",
                    repo.name, repo.html_url, repo.is_private
                )
            })
            .collect();

        self.ui
            .notify(&format!("Available repositories: {}", repos.len()));
        match self
            .ui
            .select("Enter the number of the repository:", &options)
            .and_then(|index| repos.get(index))
        {
            Some(repo) => {
                self.ui
                    .notify(&format!("Selected repository: {}", repo.name));
                Some(repo.clone())
            }
            None => {
                self.ui.notify("Invalid selected repository index.");
                None
            }
        }
    }

    /// Run the workflow to completion or until the user stops it.
    pub fn run(&mut self, request: &PublishRequest) -> WorkflowReport {
        let client = self.client;
        let ui = self.ui;

        let Some(repos) = self.fetch_repositories().succeeded() else {
            return WorkflowReport::NotCompleted {
                stage: Stage::ListRepositories,
            };
        };

        let Some(repository) = self.select_repository(&repos) else {
            return WorkflowReport::NotCompleted {
                stage: Stage::SelectRepository,
            };
        };
        let owner = repository.owner_login().to_string();
        let repo = repository.name.clone();

        let branch = self
            .orchestrator
            .retry(&Stage::CreateBranch.to_string(), |credential| {
                match client.create_branch_interactive(
                    &owner,
                    &repo,
                    &request.branch,
                    &request.base,
                    credential,
                    ui,
                )? {
                    BranchResolution::Ready(name) => Ok(name),
                    BranchResolution::Aborted => Err(PublishError::UserDeclined {
                        operation: Stage::CreateBranch.to_string(),
                    }),
                }
            });
        let Some(branch) = branch.succeeded() else {
            return WorkflowReport::NotCompleted {
                stage: Stage::CreateBranch,
            };
        };
        ui.notify(&format!("Using branch {}", branch));

        let file = self
            .orchestrator
            .retry(&Stage::PublishFile.to_string(), |credential| {
                client.publish_file(
                    &owner,
                    &repo,
                    &branch,
                    &request.path,
                    &request.content,
                    credential,
                    ui,
                )
            });
        let Some(file) = file.succeeded() else {
            return WorkflowReport::NotCompleted {
                stage: Stage::PublishFile,
            };
        };
        match file {
            PublishOutcome::Created => ui.notify(&format!("File {} added to {}", request.path, branch)),
            PublishOutcome::Replaced => {
                ui.notify(&format!("File {} updated in {}", request.path, branch))
            }
        }

        let descriptor =
            PullRequestDescriptor::new(&request.title, &request.body, &branch, &request.base);
        let pull_request = self
            .orchestrator
            .retry(&Stage::CreatePullRequest.to_string(), |credential| {
                client.create_pull_request(&owner, &repo, &descriptor, credential)
            });
        let Some(pull_request) = pull_request.succeeded() else {
            return WorkflowReport::NotCompleted {
                stage: Stage::CreatePullRequest,
            };
        };
        match &pull_request {
            PullRequestOutcome::Created { url } => ui.notify(&format!(
                "Pull request created: {}",
                url.as_deref().unwrap_or("(no link returned)")
            )),
            PullRequestOutcome::AlreadyExists { url } => ui.notify(&format!(
                "A pull request with head {} and base {} already exists: {}",
                branch,
                request.base,
                url.as_deref().unwrap_or("(not found among open pull requests)")
            )),
        }

        WorkflowReport::Completed {
            repository,
            branch,
            file,
            pull_request,
        }
    }
}
