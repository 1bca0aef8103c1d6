//! REST client implementing [`pipeline::PullRequestHost`].
//!
//! All GitHub API details (endpoint layout, authentication headers, response
//! shapes, pagination) are handled here; the domain sees only the port trait.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use pipeline::{
    AccessToken, ChangedFile, CommitSha, FileStatus, HostError, LabelName, PullRequestDetails,
    PullRequestHost, PullRequestNumber, RepositoryId,
};

/// Default API root for the public platform.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("prsentry/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const FILES_PER_PAGE: usize = 100;

// ---------------------------------------------------------------------------
// Wire shapes (REST responses)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    number: u64,
    title: String,
    body: Option<String>,
    labels: Vec<ApiLabel>,
    head: ApiRef,
    state: String,
}

#[derive(Debug, Deserialize)]
struct ApiLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    filename: String,
    status: FileStatus,
    patch: Option<String>,
}

impl ApiPullRequest {
    fn into_details(self) -> Result<PullRequestDetails, HostError> {
        let number = PullRequestNumber::new(self.number)
            .ok_or_else(|| HostError::Decode("pull request number is zero".to_string()))?;
        let head_sha = CommitSha::new(&self.head.sha)
            .ok_or_else(|| HostError::Decode("head commit SHA is empty".to_string()))?;
        Ok(PullRequestDetails {
            number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            head_sha,
            open: self.state == "open",
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated client for one repository.
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    repository: RepositoryId,
    token: AccessToken,
}

impl GithubClient {
    /// Creates a client bound to one repository.
    ///
    /// `api_url` overrides the API root (self-hosted instances, tests);
    /// trailing slashes are stripped.
    pub fn new(
        repository: RepositoryId,
        token: AccessToken,
        api_url: Option<&str>,
    ) -> Result<Self, HostError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HostError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_url: api_url
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            repository,
            token,
        })
    }

    /// The repository this client operates on.
    pub fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.repository, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, HostError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status_reason(status));
        Err(HostError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn status_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unrecognised status")
        .to_string()
}

fn transport(e: reqwest::Error) -> HostError {
    HostError::Transport(e.to_string())
}

#[async_trait]
impl PullRequestHost for GithubClient {
    async fn pull_request(
        &self,
        number: PullRequestNumber,
    ) -> Result<PullRequestDetails, HostError> {
        let url = self.url(&format!("pulls/{number}"));
        debug!(%url, "fetching pull request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose())
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await
            .map_err(transport)?;
        let pr: ApiPullRequest = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| HostError::Decode(e.to_string()))?;
        pr.into_details()
    }

    async fn changed_files(
        &self,
        number: PullRequestNumber,
    ) -> Result<Vec<ChangedFile>, HostError> {
        let mut files = Vec::new();
        let mut page = 1usize;

        loop {
            let url = self.url(&format!(
                "pulls/{number}/files?per_page={FILES_PER_PAGE}&page={page}"
            ));
            debug!(%url, "fetching changed files");

            let response = self
                .http
                .get(&url)
                .bearer_auth(self.token.expose())
                .header(reqwest::header::ACCEPT, ACCEPT)
                .send()
                .await
                .map_err(transport)?;
            let batch: Vec<ApiFile> = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| HostError::Decode(e.to_string()))?;

            let batch_len = batch.len();
            files.extend(batch.into_iter().map(|f| ChangedFile {
                filename: f.filename,
                status: f.status,
                patch: f.patch,
            }));

            if batch_len < FILES_PER_PAGE {
                return Ok(files);
            }
            page += 1;
        }
    }

    async fn create_comment(
        &self,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<(), HostError> {
        let url = self.url(&format!("issues/{number}/comments"));
        debug!(%url, "posting comment");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose())
            .header(reqwest::header::ACCEPT, ACCEPT)
            .json(&json!({ "body": body }))
            .send()
            .await
            .map_err(transport)?;
        Self::check(response).await.map(|_| ())
    }

    async fn add_label(
        &self,
        number: PullRequestNumber,
        label: &LabelName,
    ) -> Result<(), HostError> {
        let url = self.url(&format!("issues/{number}/labels"));
        debug!(%url, label = %label, "adding label");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose())
            .header(reqwest::header::ACCEPT, ACCEPT)
            .json(&json!({ "labels": [label.as_str()] }))
            .send()
            .await
            .map_err(transport)?;
        Self::check(response).await.map(|_| ())
    }

    async fn close_pull_request(&self, number: PullRequestNumber) -> Result<(), HostError> {
        let url = self.url(&format!("pulls/{number}"));
        debug!(%url, "closing pull request");

        let response = self
            .http
            .patch(&url)
            .bearer_auth(self.token.expose())
            .header(reqwest::header::ACCEPT, ACCEPT)
            .json(&json!({ "state": "closed" }))
            .send()
            .await
            .map_err(transport)?;
        Self::check(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GithubClient {
        GithubClient::new(
            RepositoryId::new("org/proj").unwrap(),
            AccessToken::new("ghs_test").unwrap(),
            Some("https://github.example.com/api/v3/"),
        )
        .unwrap()
    }

    #[test]
    fn url_layout_includes_repository() {
        let c = client();
        assert_eq!(
            c.url("pulls/42"),
            "https://github.example.com/api/v3/repos/org/proj/pulls/42"
        );
    }

    #[test]
    fn default_api_url_applies_when_unset() {
        let c = GithubClient::new(
            RepositoryId::new("org/proj").unwrap(),
            AccessToken::new("ghs_test").unwrap(),
            None,
        )
        .unwrap();
        assert!(c.url("pulls/1").starts_with("https://api.github.com/repos/"));
    }

    #[test]
    fn api_pull_request_decodes_and_converts() {
        let json = r#"{
            "number": 42,
            "title": "Fix pagination #35108",
            "body": null,
            "labels": [{"name": "bug"}, {"name": "backport"}],
            "head": {"ref": "fix/pagination", "sha": "f88f7bd4"},
            "state": "open",
            "user": {"login": "contributor"}
        }"#;
        let pr: ApiPullRequest = serde_json::from_str(json).unwrap();
        let details = pr.into_details().unwrap();

        assert_eq!(details.number.as_u64(), 42);
        assert_eq!(details.body, "");
        assert_eq!(details.labels, vec!["bug", "backport"]);
        assert!(details.open);
    }

    #[test]
    fn api_file_decodes_unmodelled_status() {
        let json = r#"[
            {"filename": "django/utils/text.py", "status": "modified", "patch": "@@ -1 +1 @@"},
            {"filename": "assets/logo.png", "status": "copied", "patch": null}
        ]"#;
        let files: Vec<ApiFile> = serde_json::from_str(json).unwrap();
        assert_eq!(files[0].status, FileStatus::Modified);
        assert_eq!(files[1].status, FileStatus::Other);
        assert!(files[1].patch.is_none());
    }
}
