//! Single-file content publishing.

use base64::prelude::{BASE64_STANDARD, Engine as _};

use crate::config::Credential;
use crate::error::{PublishError, Result};
use crate::github::GitHubClient;
use crate::github::client::encode_path;
use crate::github::models::{ContentInfo, FileHandle, PutContent};
use crate::github::outcome::Outcome;
use crate::github::transport::{Method, Transport};
use crate::interaction::Interaction;

const CHECK: &str = "check file";
const CREATE: &str = "create file";
const REPLACE: &str = "replace file";
const PUBLISH: &str = "publish file";

/// How a file ended up on the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Created,
    Replaced,
}

/// Encode raw bytes the way the contents API expects them.
pub fn encode_content(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// Decode content returned by the contents API, which wraps lines.
pub fn decode_content(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64_STANDARD
        .decode(compact)
        .map_err(|e| PublishError::Parse {
            operation: "decode content".into(),
            message: e.to_string(),
        })
}

fn contents_endpoint(owner: &str, repo: &str, path: &str) -> String {
    format!(
        "/repos/{}/{}/contents/{}",
        owner,
        repo,
        encode_path(path.trim_start_matches('/'))
    )
}

fn contents_at_ref(owner: &str, repo: &str, path: &str, branch: &str) -> String {
    format!(
        "{}?ref={}",
        contents_endpoint(owner, repo, path),
        urlencoding::encode(branch)
    )
}

/// File content operations.
pub trait ContentOps {
    /// Look up the blob SHA of `path` on `branch`.
    ///
    /// Any failure, including a missing file, yields `None`.
    fn check_exists(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        credential: &Credential,
    ) -> Option<String>;

    /// Create a new file on `branch`.
    fn create_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: &[u8],
        credential: &Credential,
    ) -> Result<()>;

    /// Replace an existing file on `branch`, using its current SHA.
    fn replace_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: &[u8],
        credential: &Credential,
    ) -> Result<()>;

    /// Create the file, or replace it if the user agrees to overwrite.
    #[allow(clippy::too_many_arguments)]
    fn publish_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: &[u8],
        credential: &Credential,
        ui: &dyn Interaction,
    ) -> Result<PublishOutcome>;
}

impl<T: Transport> GitHubClient<T> {
    fn put_content(
        &self,
        operation: &str,
        owner: &str,
        repo: &str,
        path: &str,
        body: &PutContent<'_>,
        credential: &Credential,
    ) -> Result<()> {
        let endpoint = contents_endpoint(owner, repo, path);
        let response = self.send_json(operation, Method::Put, &endpoint, credential, body)?;

        match response.outcome {
            Outcome::Success => Ok(()),
            _ => Err(response.unexpected()),
        }
    }

    /// Locate `path` on `branch`.
    pub fn file_handle(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        credential: &Credential,
    ) -> FileHandle {
        FileHandle {
            path: path.to_string(),
            sha: self.check_exists(owner, repo, branch, path, credential),
        }
    }
}

impl<T: Transport> ContentOps for GitHubClient<T> {
    fn check_exists(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        credential: &Credential,
    ) -> Option<String> {
        let endpoint = contents_at_ref(owner, repo, path, branch);
        let response = match self.get(CHECK, &endpoint, credential) {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Could not check whether {} exists: {}", path, e);
                return None;
            }
        };

        if !response.outcome.is_success() {
            log::debug!("{} not present on {} ({:?})", path, branch, response.outcome);
            return None;
        }

        match response.json::<ContentInfo>() {
            Ok(info) => Some(info.sha),
            Err(e) => {
                log::warn!("Unreadable metadata for {}: {}", path, e);
                None
            }
        }
    }

    fn create_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: &[u8],
        credential: &Credential,
    ) -> Result<()> {
        let body = PutContent {
            message: format!("Add {}", path),
            content: encode_content(content),
            branch,
            sha: None,
        };
        self.put_content(CREATE, owner, repo, path, &body, credential)?;
        log::info!("Added {} to {}", path, branch);
        Ok(())
    }

    fn replace_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: &[u8],
        credential: &Credential,
    ) -> Result<()> {
        // The SHA must be the current one or GitHub rejects the write.
        let endpoint = contents_at_ref(owner, repo, path, branch);
        let response = self.get(REPLACE, &endpoint, credential)?;
        if !response.outcome.is_success() {
            return Err(response.unexpected());
        }
        let current: ContentInfo = response.json()?;

        let body = PutContent {
            message: format!("Update {}", path),
            content: encode_content(content),
            branch,
            sha: Some(&current.sha),
        };
        self.put_content(REPLACE, owner, repo, path, &body, credential)?;
        log::info!("Updated {} on {}", path, branch);
        Ok(())
    }

    fn publish_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: &[u8],
        credential: &Credential,
        ui: &dyn Interaction,
    ) -> Result<PublishOutcome> {
        let handle = self.file_handle(owner, repo, branch, path, credential);

        if !handle.exists() {
            self.create_file(owner, repo, branch, path, content, credential)?;
            return Ok(PublishOutcome::Created);
        }

        ui.notify(&format!("File {} already exists in branch {}.", path, branch));
        if !ui.confirm("Do you want to replace the file?") {
            return Err(PublishError::UserDeclined {
                operation: PUBLISH.into(),
            });
        }

        self.replace_file(owner, repo, branch, path, content, credential)?;
        Ok(PublishOutcome::Replaced)
    }
}
