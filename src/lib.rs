//! # gh-publish
//!
//! Publish a single file to a GitHub repository through a pull request.
//!
//! The crate lists the authenticated user's repositories, lets the user pick
//! one, creates a branch from a base branch, writes (or replaces) a file on
//! that branch and opens a pull request. Every step can be retried on user
//! request.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gh_publish::prelude::*;
//!
//! let client = GitHubClient::new(&ClientSettings::new())?;
//! let tokens = FileTokenSource::new("config.json");
//! let ui = ConsoleInteraction::new();
//!
//! let request = PublishRequest::new("test", "main", "Hello.txt", "Hello world");
//! let report = Workflow::new(&client, &tokens, &ui).run(&request);
//!
//! if !report.is_completed() {
//!     println!("Not completed");
//! }
//! # Ok::<(), gh_publish::error::PublishError>(())
//! ```
//!
//! ## Using the operations directly
//!
//! ```rust,no_run
//! use gh_publish::prelude::*;
//!
//! let client = GitHubClient::new(&ClientSettings::new())?;
//! let credential = Credential::new("ghp_your_token_here");
//!
//! let sha = client.resolve_base_sha("octo", "demo", "main", &credential)?;
//! println!("main is at {}", sha);
//! # Ok::<(), gh_publish::error::PublishError>(())
//! ```

pub mod config;
pub mod error;
pub mod github;
pub mod interaction;
pub mod testing;
pub mod workflow;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{
        ClientSettings, Config, Credential, EnvTokenSource, FileTokenSource, StaticToken,
        TokenSource,
    };
    pub use crate::error::{PublishError, Result};
    pub use crate::github::{
        BranchOps, BranchOutcome, BranchResolution, ContentOps, GitHubClient, Outcome,
        PublishOutcome, PullRequestDescriptor, PullRequestOps, PullRequestOutcome, RepoOps,
        Repository, Transport, classify,
    };
    pub use crate::interaction::{ConsoleInteraction, Interaction};
    pub use crate::workflow::{
        Attempt, Orchestrator, PublishRequest, RetryState, Stage, Workflow, WorkflowReport,
    };
}

pub use prelude::*;
