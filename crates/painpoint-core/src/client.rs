//! HTTP client for the content host (a GitHub-style repository contents API).
//!
//! Reads return a tagged [`Fetched`] so callers can tell an absent path from a
//! failing host; the fetcher collapses that to `Option` at its boundary. Writes
//! return `Result` and always surface upstream failures.

use crate::config::ContentConfig;
use crate::error::{PainPointError, Result};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;

// ---------------------------------------------------------------------------
// Fetched
// ---------------------------------------------------------------------------

/// Outcome of a single read against the content host.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Found(T),
    /// The path does not exist (404).
    Absent,
    /// Any other non-2xx status.
    Upstream(u16),
    /// The host answered but the payload could not be parsed.
    Malformed(String),
    /// The request never completed.
    Transport(String),
}

impl<T> Fetched<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Found(v) => Fetched::Found(f(v)),
            Fetched::Absent => Fetched::Absent,
            Fetched::Upstream(s) => Fetched::Upstream(s),
            Fetched::Malformed(r) => Fetched::Malformed(r),
            Fetched::Transport(r) => Fetched::Transport(r),
        }
    }

    /// Collapse to `Option`, logging why a value is missing.
    pub fn into_option(self, what: &str) -> Option<T> {
        match self {
            Fetched::Found(v) => Some(v),
            Fetched::Absent => {
                tracing::debug!(what, "content absent");
                None
            }
            Fetched::Upstream(status) => {
                tracing::warn!(what, status, "content host returned an error status");
                None
            }
            Fetched::Malformed(reason) => {
                tracing::warn!(what, reason = %reason, "content is malformed");
                None
            }
            Fetched::Transport(reason) => {
                tracing::warn!(what, reason = %reason, "content request failed");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    author: Option<CommitSignature>,
    #[serde(default)]
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// ContentClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    branch: Option<String>,
    root: String,
    token: Option<String>,
    token_env: String,
}

impl ContentClient {
    /// Build a client using the token from the configured environment variable.
    pub fn from_config(config: &ContentConfig) -> Result<Self> {
        Self::new(config, config.token())
    }

    pub fn new(config: &ContentConfig, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("painpoints/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            root: config.root.trim_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            token_env: config.token_env.clone(),
        })
    }

    /// Repository directory holding one folder per pain point.
    pub fn content_root(&self) -> &str {
        &self.root
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_base, self.owner, self.repo, tail)
    }

    fn contents_url(&self, path: &str) -> String {
        self.repo_url(&format!("contents/{}", path.trim_matches('/')))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn api_get(&self, url: &str) -> RequestBuilder {
        let req = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        self.authorized(req)
    }

    /// GET `url` and return the body text, folding failures into [`Fetched`].
    async fn get_text(&self, req: RequestBuilder, label: &str) -> Fetched<String> {
        let start = Instant::now();
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => return Fetched::Transport(e.to_string()),
        };
        let status = resp.status();
        tracing::debug!(
            path = %label,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "content GET"
        );
        if status == StatusCode::NOT_FOUND {
            return Fetched::Absent;
        }
        if !status.is_success() {
            return Fetched::Upstream(status.as_u16());
        }
        match resp.text().await {
            Ok(body) => Fetched::Found(body),
            Err(e) => Fetched::Transport(e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// `GET {base}/contents/{path}`: a directory listing.
    pub async fn list_directory(&self, path: &str) -> Fetched<Vec<DirEntry>> {
        let mut req = self.api_get(&self.contents_url(path));
        if let Some(branch) = &self.branch {
            req = req.query(&[("ref", branch.as_str())]);
        }
        match self.get_text(req, path).await {
            Fetched::Found(body) => match serde_json::from_str::<Vec<DirEntry>>(&body) {
                Ok(entries) => Fetched::Found(entries),
                Err(e) => Fetched::Malformed(format!("not a directory listing: {e}")),
            },
            other => other.map(|_| Vec::new()),
        }
    }

    /// Raw file text from a listing entry's download URL.
    pub async fn download(&self, url: &str) -> Fetched<String> {
        let req = self.authorized(self.http.get(url));
        self.get_text(req, url).await
    }

    /// Date of the oldest commit touching `path`.
    pub async fn oldest_commit_date(&self, path: &str) -> Fetched<DateTime<Utc>> {
        let mut req = self.api_get(&self.repo_url("commits")).query(&[
            ("path", path),
            ("per_page", "1"),
            ("order", "asc"),
        ]);
        if let Some(branch) = &self.branch {
            req = req.query(&[("sha", branch.as_str())]);
        }
        let body = match self.get_text(req, &format!("commits?path={path}")).await {
            Fetched::Found(body) => body,
            other => return other.map(|_| Utc::now()),
        };
        let commits: Vec<CommitEntry> = match serde_json::from_str(&body) {
            Ok(c) => c,
            Err(e) => return Fetched::Malformed(format!("not a commit list: {e}")),
        };
        commits
            .into_iter()
            .filter_map(|c| c.commit.author.or(c.commit.committer).map(|s| s.date))
            .min()
            .map(Fetched::Found)
            .unwrap_or(Fetched::Absent)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// `PUT {base}/contents/{path}` creating a new file. Returns the written path.
    pub async fn put_file(&self, path: &str, content: &str, message: &str) -> Result<String> {
        let Some(token) = &self.token else {
            return Err(PainPointError::MissingToken(self.token_env.clone()));
        };
        let body = PutFileBody {
            message,
            content: base64::engine::general_purpose::STANDARD.encode(content.as_bytes()),
            branch: self.branch.as_deref(),
        };

        let start = Instant::now();
        let resp = self
            .http
            .put(self.contents_url(path))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        tracing::debug!(
            path = %path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "content PUT"
        );

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = status.as_u16(), body = body.trim(), "content PUT rejected");
            return Err(PainPointError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(path.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(base: &str) -> ContentConfig {
        ContentConfig {
            api_base: base.to_string(),
            owner: "acme".to_string(),
            repo: "site".to_string(),
            ..ContentConfig::default()
        }
    }

    #[test]
    fn fetched_map_and_collapse() {
        let found: Fetched<u8> = Fetched::Found(2);
        assert_eq!(found.clone().map(|v| v * 2), Fetched::Found(4));
        assert_eq!(found.into_option("x"), Some(2));
        assert_eq!(Fetched::<u8>::Upstream(500).into_option("x"), None);
        assert_eq!(Fetched::<u8>::Absent.into_option("x"), None);
    }

    #[test]
    fn listing_entry_kinds() {
        let entries: Vec<DirEntry> = serde_json::from_str(
            r#"[{"name":"a.yaml","path":"p/a.yaml","type":"file","download_url":"http://x/a"},
                {"name":"s1","type":"dir","download_url":null},
                {"name":"link","type":"symlink"}]"#,
        )
        .unwrap();
        assert!(entries[0].is_file());
        assert!(entries[1].is_dir());
        assert_eq!(entries[2].kind, EntryKind::Other);
    }

    #[tokio::test]
    async fn missing_directory_is_absent() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/acme/site/contents/pain-points/nope")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let client = ContentClient::new(&config(&server.url()), None).unwrap();
        assert_eq!(client.list_directory("pain-points/nope").await, Fetched::Absent);
    }

    #[tokio::test]
    async fn server_error_is_upstream_and_file_object_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _err = server
            .mock("GET", "/repos/acme/site/contents/broken")
            .with_status(502)
            .create_async()
            .await;
        let _file = server
            .mock("GET", "/repos/acme/site/contents/a-file.yaml")
            .with_status(200)
            .with_body(r#"{"name":"a-file.yaml","type":"file"}"#)
            .create_async()
            .await;

        let client = ContentClient::new(&config(&server.url()), None).unwrap();
        assert_eq!(client.list_directory("broken").await, Fetched::Upstream(502));
        assert!(matches!(
            client.list_directory("a-file.yaml").await,
            Fetched::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn branch_is_sent_as_ref_and_token_as_bearer() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/repos/acme/site/contents/pain-points")
            .match_query(Matcher::UrlEncoded("ref".into(), "content".into()))
            .match_header("authorization", "Bearer s3cret")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let mut cfg = config(&server.url());
        cfg.branch = Some("content".to_string());
        let client = ContentClient::new(&cfg, Some("s3cret".to_string())).unwrap();
        assert_eq!(client.list_directory("pain-points").await, Fetched::Found(vec![]));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn oldest_commit_date_picks_earliest() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/acme/site/commits")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[{"commit":{"author":{"date":"2024-03-02T00:00:00Z"}}},
                    {"commit":{"committer":{"date":"2024-01-15T08:00:00Z"}}}]"#,
            )
            .create_async()
            .await;

        let client = ContentClient::new(&config(&server.url()), None).unwrap();
        let date = client.oldest_commit_date("pain-points/p1/p1.yaml").await;
        assert_eq!(
            date,
            Fetched::Found("2024-01-15T08:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
    }

    #[tokio::test]
    async fn put_without_token_fails_before_request() {
        let client = ContentClient::new(&config("http://127.0.0.1:9"), None).unwrap();
        let err = client.put_file("a/b.yaml", "x: 1", "add").await.unwrap_err();
        assert!(matches!(err, PainPointError::MissingToken(ref env) if env == "GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn put_sends_base64_content_and_surfaces_failures() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("PUT", "/repos/acme/site/contents/pain-points/p1/p1.yaml")
            .match_header("authorization", "Bearer t0k")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "message": "Add pain point p1",
                "content": "dGl0bGU6IFAx",
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;
        let _conflict = server
            .mock("PUT", "/repos/acme/site/contents/pain-points/p2/p2.yaml")
            .with_status(422)
            .with_body(r#"{"message":"sha wasn't supplied"}"#)
            .create_async()
            .await;

        let client = ContentClient::new(&config(&server.url()), Some("t0k".to_string())).unwrap();
        let path = client
            .put_file("pain-points/p1/p1.yaml", "title: P1", "Add pain point p1")
            .await
            .unwrap();
        assert_eq!(path, "pain-points/p1/p1.yaml");
        ok.assert_async().await;

        let err = client
            .put_file("pain-points/p2/p2.yaml", "title: P2", "Add pain point p2")
            .await
            .unwrap_err();
        match err {
            PainPointError::Upstream { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("sha wasn't supplied"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
