//! Wire models for the GitHub REST API.
//!
//! Response types only name the fields this crate reads; serde ignores the
//! rest so new fields in the API do not break decoding.

use serde::{Deserialize, Serialize};

/// Repository information from `GET /user/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
    pub html_url: String,
    #[serde(rename = "private")]
    pub is_private: bool,
}

impl Repository {
    pub fn owner_login(&self) -> &str {
        &self.owner.login
    }
}

/// The owner of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// A git reference as returned by `GET /repos/{owner}/{repo}/git/refs/heads/{branch}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub object: RefObject,
}

/// The object a reference points to.
#[derive(Debug, Clone, Deserialize)]
pub struct RefObject {
    pub sha: String,
}

/// A file in a repository, as far as this crate cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: String,
    /// Present when the file already exists on the target branch.
    pub sha: Option<String>,
}

impl FileHandle {
    pub fn exists(&self) -> bool {
        self.sha.is_some()
    }
}

/// Metadata from `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentInfo {
    pub sha: String,
}

/// An open pull request from `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
}

/// A branch endpoint of a pull request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// The inputs for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestDescriptor {
    pub title: String,
    pub body: String,
    /// The branch with the changes.
    pub head: String,
    /// The branch to merge into.
    pub base: String,
}

impl PullRequestDescriptor {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        head: impl Into<String>,
        base: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            head: head.into(),
            base: base.into(),
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/git/refs`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateRef<'a> {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: &'a str,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(crate) struct PutContent<'a> {
    pub message: String,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// Fields read back from a created pull request.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedPullRequest {
    pub html_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_ignores_unknown_fields() {
        let json = r#"{
            "id": 1,
            "name": "demo",
            "full_name": "octo/demo",
            "owner": {"login": "octo", "id": 7},
            "html_url": "https://github.com/octo/demo",
            "private": true,
            "topics": []
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "demo");
        assert_eq!(repo.owner_login(), "octo");
        assert!(repo.is_private);
    }

    #[test]
    fn test_create_ref_wire_names() {
        let body = CreateRef {
            ref_name: "refs/heads/feature".into(),
            sha: "abc",
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, serde_json::json!({"ref": "refs/heads/feature", "sha": "abc"}));
    }

    #[test]
    fn test_put_content_omits_missing_sha() {
        let body = PutContent {
            message: "Add a.txt".into(),
            content: "aGk=".into(),
            branch: "test",
            sha: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("sha").is_none());
        assert_eq!(value["branch"], "test");
    }

    #[test]
    fn test_descriptor_wire_names() {
        let pr = PullRequestDescriptor::new("Title", "Body", "feature", "main");

        let value = serde_json::to_value(&pr).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "Title", "body": "Body", "head": "feature", "base": "main"})
        );
    }

    #[test]
    fn test_file_handle_exists() {
        let absent = FileHandle { path: "a".into(), sha: None };
        let present = FileHandle { path: "a".into(), sha: Some("x".into()) };

        assert!(!absent.exists());
        assert!(present.exists());
    }
}
