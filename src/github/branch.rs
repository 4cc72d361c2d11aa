//! Branch creation from a base branch.

use crate::config::Credential;
use crate::error::{PublishError, Result};
use crate::github::GitHubClient;
use crate::github::client::encode_path;
use crate::github::models::{BranchRef, CreateRef};
use crate::github::outcome::Outcome;
use crate::github::transport::{Method, Transport};
use crate::interaction::Interaction;

/// How many times the user may rename a branch that already exists before
/// branch creation gives up.
pub const MAX_BRANCH_RENAMES: usize = 5;

const RESOLVE: &str = "resolve base branch";
const CREATE: &str = "create branch";

/// Result of a single branch creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    /// The branch was created.
    Created(String),
    /// GitHub reported that the reference already exists.
    AlreadyExists(String),
}

/// Final result of interactive branch creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchResolution {
    /// The named branch exists and can be written to.
    Ready(String),
    /// The user gave up.
    Aborted,
}

/// Branch operations.
pub trait BranchOps {
    /// Resolve the commit SHA `heads/<base>` points to.
    fn resolve_base_sha(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        credential: &Credential,
    ) -> Result<String>;

    /// Create `refs/heads/<name>` at the tip of `base`.
    fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        base: &str,
        credential: &Credential,
    ) -> Result<BranchOutcome>;

    /// Create a branch, asking the user how to proceed when it already
    /// exists: reuse it, pick another name, or give up.
    fn create_branch_interactive(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        base: &str,
        credential: &Credential,
        ui: &dyn Interaction,
    ) -> Result<BranchResolution>;
}

/// States of interactive branch creation.
#[derive(Debug)]
enum BranchStep {
    Attempt(String),
    Exists(String),
    Done(String),
    Aborted,
}

impl<T: Transport> BranchOps for GitHubClient<T> {
    fn resolve_base_sha(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        credential: &Credential,
    ) -> Result<String> {
        let endpoint = format!(
            "/repos/{}/{}/git/refs/heads/{}",
            owner,
            repo,
            encode_path(base)
        );
        let response = self.get(RESOLVE, &endpoint, credential)?;

        match response.outcome {
            Outcome::Success => {
                let branch: BranchRef = response.json()?;
                if branch.object.sha.trim().is_empty() {
                    return Err(PublishError::Parse {
                        operation: RESOLVE.into(),
                        message: format!("empty SHA for {}", branch.ref_name),
                    });
                }
                log::debug!("{} is at {}", base, branch.object.sha);
                Ok(branch.object.sha)
            }
            Outcome::NotFound => Err(PublishError::NotFound {
                operation: RESOLVE.into(),
                message: format!("base branch {} not found", base),
            }),
            Outcome::Conflict => Err(PublishError::Conflict {
                operation: RESOLVE.into(),
                message: response.text(),
            }),
            _ => Err(response.unexpected()),
        }
    }

    fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        base: &str,
        credential: &Credential,
    ) -> Result<BranchOutcome> {
        let sha = self.resolve_base_sha(owner, repo, base, credential)?;

        let endpoint = format!("/repos/{}/{}/git/refs", owner, repo);
        let body = CreateRef {
            ref_name: format!("refs/heads/{}", name),
            sha: &sha,
        };
        let response = self.send_json(CREATE, Method::Post, &endpoint, credential, &body)?;

        match response.outcome {
            Outcome::Success => {
                log::info!("Branch {} created from {} ({})", name, base, sha);
                Ok(BranchOutcome::Created(name.to_string()))
            }
            Outcome::Conflict => Err(PublishError::Duplicate {
                operation: CREATE.into(),
                resource: format!("branch {}", name),
            }),
            Outcome::UnprocessableEntity => {
                let text = response.text();
                if text.to_lowercase().contains("reference already exists") {
                    log::info!("Branch {} already exists", name);
                    Ok(BranchOutcome::AlreadyExists(name.to_string()))
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

    fn create_branch_interactive(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        base: &str,
        credential: &Credential,
        ui: &dyn Interaction,
    ) -> Result<BranchResolution> {
        let mut renames = 0;
        let mut step = BranchStep::Attempt(name.to_string());

        loop {
            log::debug!("Branch creation step: {:?}", step);
            step = match step {
                BranchStep::Attempt(name) => {
                    match self.create_branch(owner, repo, &name, base, credential)? {
                        BranchOutcome::Created(name) => BranchStep::Done(name),
                        BranchOutcome::AlreadyExists(name) => BranchStep::Exists(name),
                    }
                }
                BranchStep::Exists(name) => {
                    ui.notify(&format!("Branch {} already exists", name));
                    if ui.confirm("Do you want to use the existing branch?") {
                        BranchStep::Done(name)
                    } else if renames >= MAX_BRANCH_RENAMES {
                        ui.notify("Too many renames. Giving up on branch creation.");
                        BranchStep::Aborted
                    } else if ui.confirm("Do you want to retry with a different branch name?") {
                        match ui.input("Enter a new branch name:") {
                            Some(new_name) if !new_name.trim().is_empty() => {
                                renames += 1;
                                BranchStep::Attempt(new_name.trim().to_string())
                            }
                            _ => {
                                ui.notify("Invalid branch name.");
                                BranchStep::Aborted
                            }
                        }
                    } else {
                        BranchStep::Aborted
                    }
                }
                BranchStep::Done(name) => return Ok(BranchResolution::Ready(name)),
                BranchStep::Aborted => return Ok(BranchResolution::Aborted),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientSettings;
    use crate::testing::{Answer, MockTransport, ScriptedInteraction};

    const REF_MAIN: &str = r#"{
        "ref": "refs/heads/main",
        "node_id": "MDM6UmVm",
        "url": "https://api.github.com/repos/o/r/git/refs/heads/main",
        "object": {"sha": "abc123", "type": "commit", "url": "https://api.github.com/x"}
    }"#;
    const ALREADY_EXISTS: &str = r#"{"message": "Reference already exists"}"#;

    fn client(mock: MockTransport) -> GitHubClient<MockTransport> {
        GitHubClient::with_transport(mock, &ClientSettings::new())
    }

    fn credential() -> Credential {
        Credential::new("t")
    }

    #[test]
    fn test_resolve_base_sha() {
        let client = client(MockTransport::new().respond(200, REF_MAIN));

        let sha = client.resolve_base_sha("o", "r", "main", &credential()).unwrap();
        assert_eq!(sha, "abc123");
        assert_eq!(
            client.transport().requests()[0].url,
            "https://api.github.com/repos/o/r/git/refs/heads/main"
        );
    }

    #[test]
    fn test_resolve_base_sha_encodes_branch_name() {
        let client = client(MockTransport::new().respond(200, REF_MAIN).respond(200, REF_MAIN));

        client.resolve_base_sha("o", "r", "release/1.0", &credential()).unwrap();
        client.resolve_base_sha("o", "r", "fix#2", &credential()).unwrap();

        let requests = client.transport().requests();
        assert_eq!(
            requests[0].url,
            "https://api.github.com/repos/o/r/git/refs/heads/release/1.0"
        );
        assert_eq!(
            requests[1].url,
            "https://api.github.com/repos/o/r/git/refs/heads/fix%232"
        );
    }

    #[test]
    fn test_resolve_base_sha_not_found() {
        let client = client(MockTransport::new().respond(404, ""));

        let err = client.resolve_base_sha("o", "r", "nope", &credential()).unwrap_err();
        assert!(matches!(err, PublishError::NotFound { ref message, .. } if message.contains("nope")));
    }

    #[test]
    fn test_resolve_base_sha_conflict() {
        let client = client(MockTransport::new().respond(409, "Git Repository is empty."));

        let err = client.resolve_base_sha("o", "r", "main", &credential()).unwrap_err();
        assert!(matches!(err, PublishError::Conflict { .. }));
    }

    #[test]
    fn test_resolve_base_sha_malformed_payload() {
        let client = client(MockTransport::new().respond(200, r#"{"ref": "refs/heads/main"}"#));

        let err = client.resolve_base_sha("o", "r", "main", &credential()).unwrap_err();
        assert!(matches!(err, PublishError::Parse { .. }));
    }

    #[test]
    fn test_resolve_base_sha_unexpected() {
        let client = client(MockTransport::new().respond(502, "bad gateway"));

        let err = client.resolve_base_sha("o", "r", "main", &credential()).unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_create_branch_posts_ref() {
        let client = client(MockTransport::new().respond(200, REF_MAIN).respond(201, "{}"));

        let outcome = client.create_branch("o", "r", "feature", "main", &credential()).unwrap();
        assert_eq!(outcome, BranchOutcome::Created("feature".into()));

        let post = &client.transport().requests()[1];
        assert_eq!(post.method, Method::Post);
        assert_eq!(post.url, "https://api.github.com/repos/o/r/git/refs");
        assert_eq!(
            post.json_body().unwrap(),
            serde_json::json!({"ref": "refs/heads/feature", "sha": "abc123"})
        );
    }

    #[test]
    fn test_create_branch_stops_when_base_missing() {
        let client = client(MockTransport::new().respond(404, ""));

        let err = client.create_branch("o", "r", "feature", "main", &credential()).unwrap_err();
        assert!(matches!(err, PublishError::NotFound { .. }));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[test]
    fn test_create_branch_already_exists() {
        let client = client(MockTransport::new().respond(200, REF_MAIN).respond(422, ALREADY_EXISTS));

        let outcome = client.create_branch("o", "r", "feature", "main", &credential()).unwrap();
        assert_eq!(outcome, BranchOutcome::AlreadyExists("feature".into()));
    }

    #[test]
    fn test_create_branch_conflict_is_duplicate() {
        let client = client(MockTransport::new().respond(200, REF_MAIN).respond(409, ""));

        let err = client.create_branch("o", "r", "feature", "main", &credential()).unwrap_err();
        assert!(matches!(err, PublishError::Duplicate { .. }));
    }

    #[test]
    fn test_create_branch_other_validation_error() {
        let client = client(
            MockTransport::new()
                .respond(200, REF_MAIN)
                .respond(422, r#"{"message": "Reference update failed"}"#),
        );

        let err = client.create_branch("o", "r", "bad..name", "main", &credential()).unwrap_err();
        assert!(matches!(err, PublishError::Validation { ref body, .. } if body.contains("update failed")));
    }

    #[test]
    fn test_interactive_reuse_existing_branch() {
        let client = client(MockTransport::new().respond(200, REF_MAIN).respond(422, ALREADY_EXISTS));
        let ui = ScriptedInteraction::new([Answer::Confirm(true)]);

        let resolution = client
            .create_branch_interactive("o", "r", "feature", "main", &credential(), &ui)
            .unwrap();
        assert_eq!(resolution, BranchResolution::Ready("feature".into()));
    }

    #[test]
    fn test_interactive_rename() {
        let client = client(
            MockTransport::new()
                .respond(200, REF_MAIN)
                .respond(422, ALREADY_EXISTS)
                .respond(200, REF_MAIN)
                .respond(201, "{}"),
        );
        let ui = ScriptedInteraction::new([
            Answer::Confirm(false),
            Answer::Confirm(true),
            Answer::Text("  feature-2 ".into()),
        ]);

        let resolution = client
            .create_branch_interactive("o", "r", "feature", "main", &credential(), &ui)
            .unwrap();
        assert_eq!(resolution, BranchResolution::Ready("feature-2".into()));

        let post = &client.transport().requests()[3];
        assert_eq!(post.json_body().unwrap()["ref"], "refs/heads/feature-2");
    }

    #[test]
    fn test_interactive_blank_name_aborts() {
        let client = client(MockTransport::new().respond(200, REF_MAIN).respond(422, ALREADY_EXISTS));
        let ui = ScriptedInteraction::new([
            Answer::Confirm(false),
            Answer::Confirm(true),
            Answer::Text("   ".into()),
        ]);

        let resolution = client
            .create_branch_interactive("o", "r", "feature", "main", &credential(), &ui)
            .unwrap();
        assert_eq!(resolution, BranchResolution::Aborted);
        assert_eq!(client.transport().requests().len(), 2);
    }

    #[test]
    fn test_interactive_decline_both_aborts() {
        let client = client(MockTransport::new().respond(200, REF_MAIN).respond(422, ALREADY_EXISTS));
        let ui = ScriptedInteraction::new([Answer::Confirm(false), Answer::Confirm(false)]);

        let resolution = client
            .create_branch_interactive("o", "r", "feature", "main", &credential(), &ui)
            .unwrap();
        assert_eq!(resolution, BranchResolution::Aborted);
    }

    #[test]
    fn test_interactive_rename_is_bounded() {
        let mut mock = MockTransport::new();
        for _ in 0..=MAX_BRANCH_RENAMES {
            mock = mock.respond(200, REF_MAIN).respond(422, ALREADY_EXISTS);
        }
        let client = client(mock);

        let mut answers = Vec::new();
        for i in 0..=MAX_BRANCH_RENAMES {
            answers.push(Answer::Confirm(false));
            answers.push(Answer::Confirm(true));
            answers.push(Answer::Text(format!("feature-{}", i)));
        }
        let ui = ScriptedInteraction::new(answers);

        let resolution = client
            .create_branch_interactive("o", "r", "feature", "main", &credential(), &ui)
            .unwrap();
        assert_eq!(resolution, BranchResolution::Aborted);
        assert_eq!(client.transport().requests().len(), 2 * (MAX_BRANCH_RENAMES + 1));
    }

    #[test]
    fn test_interactive_propagates_errors() {
        let client = client(MockTransport::new().fail("connection reset"));
        let ui = ScriptedInteraction::new([]);

        let err = client
            .create_branch_interactive("o", "r", "feature", "main", &credential(), &ui)
            .unwrap_err();
        assert!(matches!(err, PublishError::Transport { .. }));
    }
}
