//! GitHub API operations for publishing a single change.
//!
//! This module provides a client for the GitHub REST API that can:
//! - List the authenticated user's repositories
//! - Create a branch from a base branch
//! - Create or replace a file on a branch
//! - Open a pull request, recovering an existing one
//!
//! Every response is classified into an [`Outcome`] before any decision is
//! made on it.
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_publish::config::{ClientSettings, Credential};
//! use gh_publish::github::{GitHubClient, RepoOps};
//!
//! let client = GitHubClient::new(&ClientSettings::new())?;
//! let credential = Credential::new("ghp_your_token_here");
//!
//! for repo in client.list_repositories(&credential)? {
//!     println!("{}: {}", repo.name, repo.html_url);
//! }
//! # Ok::<(), gh_publish::error::PublishError>(())
//! ```

mod branch;
mod client;
mod content;
mod models;
mod outcome;
mod pr;
mod repos;
mod transport;

pub use branch::{BranchOps, BranchOutcome, BranchResolution, MAX_BRANCH_RENAMES};
pub use client::GitHubClient;
pub use content::{ContentOps, PublishOutcome, decode_content, encode_content};
pub use models::{
    BranchRef, FileHandle, Owner, PullRequest, PullRequestDescriptor, PullRequestRef, RefObject,
    Repository,
};
pub use outcome::{Outcome, classify};
pub use pr::{PullRequestOps, PullRequestOutcome, find_matching};
pub use repos::RepoOps;
pub use transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError,
};
