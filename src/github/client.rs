// src/github/client.rs
// =============================================================================
// This module talks HTTP to the GitHub content API.
//
// The network sits behind the `ContentSource` trait. The real
// implementation (`GithubClient`) uses reqwest; tests plug in a fake that
// serves canned responses. Everything above this layer (memoization, tree
// walking, note rendering) only ever sees the trait.
//
// Endpoint:
//   GET {api_base}/repos/{owner}/{repo}/contents/{path}?ref={branch}
//   Authorization: token {TOKEN}
//
// Rust concepts:
// - Traits: A shared interface for real and fake sources
// - async-trait: Async methods on a trait object (Arc<dyn ContentSource>)
// - Builder pattern: reqwest::Client::builder()
// =============================================================================

use crate::config::Settings;
use crate::github::content::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::info;
use url::Url;

// Characters left literal in a repository path: letters, digits, `_.-~`
// and the `/` separator. Everything else is %XX-escaped.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

// A raw HTTP answer: status code plus the body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

// Anything that can answer "GET this repository path"
//
// Only transport failures are errors here; a 404 is still a reply.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn get(&self, path: &str) -> Result<RawReply, FetchError>;
}

// The reqwest-backed content source
pub struct GithubClient {
    http: Client,
    api_base: Url,
    owner: String,
    repo: String,
    branch: String,
}

impl GithubClient {
    // Builds a client for the repository described by `settings`
    //
    // The token (if any) is baked into the default headers so it never
    // has to be passed around again.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        if let Some(token) = settings.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("token {}", token))
                .context("GitHub token contains characters not allowed in a header")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let api_base = Url::parse(&settings.api_base)
            .with_context(|| format!("Invalid API base URL '{}'", settings.api_base))?;

        Ok(Self {
            http,
            api_base,
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            branch: settings.branch.clone(),
        })
    }

    // Builds the content API URL for a repository path
    //
    // Example:
    //   "Daily Notes/2024.md" on branch "main" ->
    //   https://api.github.com/repos/me/vault/contents/Daily%20Notes/2024.md?ref=main
    pub fn contents_url(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.api_base.as_str().trim_end_matches('/');
        let path = path.trim_matches('/');

        let mut url = Url::parse(&format!(
            "{}/repos/{}/{}/contents/{}",
            base,
            utf8_percent_encode(&self.owner, PATH_ENCODE_SET),
            utf8_percent_encode(&self.repo, PATH_ENCODE_SET),
            encode_path(path),
        ))?;

        url.query_pairs_mut().append_pair("ref", &self.branch);
        Ok(url)
    }
}

// Percent-encodes a repository path, keeping '/' separators
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

#[async_trait]
impl ContentSource for GithubClient {
    async fn get(&self, path: &str) -> Result<RawReply, FetchError> {
        let request_error = |message: String| FetchError::Request {
            path: path.to_string(),
            message,
        };

        let url = self
            .contents_url(path)
            .map_err(|e| request_error(e.to_string()))?;

        info!(%url, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(describe_request_error(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| request_error(describe_request_error(&e)))?;

        Ok(RawReply { status, body })
    }
}

// Gives reqwest errors a short, human-readable label
fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

// Never print the token
impl fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn client() -> GithubClient {
        let settings = Settings {
            owner: "jive".to_string(),
            repo: "vault".to_string(),
            branch: "main".to_string(),
            token: Some("secret-token".to_string()),
            ..Settings::default()
        };
        GithubClient::new(&settings).unwrap()
    }

    #[test]
    fn test_encode_path_keeps_slashes() {
        assert_eq!(encode_path("notes/a b/c.md"), "notes/a%20b/c.md");
        assert_eq!(encode_path("x_y-z.~.md"), "x_y-z.~.md");
        assert_eq!(encode_path("ü#?.md"), "%C3%BC%23%3F.md");
    }

    #[test]
    fn test_contents_url() {
        let url = client().contents_url("Daily Notes/2024.md").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/jive/vault/contents/Daily%20Notes/2024.md?ref=main"
        );
    }

    #[test]
    fn test_contents_url_for_root() {
        let url = client().contents_url("").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/jive/vault/contents/?ref=main"
        );
    }

    #[test]
    fn test_branch_is_query_encoded() {
        let settings = Settings {
            owner: "jive".to_string(),
            repo: "vault".to_string(),
            branch: "feature/notes&more".to_string(),
            ..Settings::default()
        };
        let url = GithubClient::new(&settings).unwrap().contents_url("a.md").unwrap();
        assert_eq!(url.query(), Some("ref=feature%2Fnotes%26more"));
    }

    // Accepts one connection, answers it with an empty listing and hands
    // back the raw request head.
    fn capture_one_request(listener: TcpListener) -> thread::JoinHandle<String> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]")
                .unwrap();
            String::from_utf8(request).unwrap()
        })
    }

    #[tokio::test]
    async fn test_request_line_and_headers_on_the_wire() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = capture_one_request(listener);

        let settings = Settings {
            owner: "jive".to_string(),
            repo: "vault".to_string(),
            branch: "main".to_string(),
            api_base: format!("http://127.0.0.1:{}", port),
            token: Some("TKN".to_string()),
            ..Settings::default()
        };
        let reply = GithubClient::new(&settings)
            .unwrap()
            .get("Daily Notes/a#b.md")
            .await
            .unwrap();

        assert_eq!(
            reply,
            RawReply {
                status: 200,
                body: "[]".to_string()
            }
        );

        let request = server.join().unwrap();
        let mut lines = request.lines();
        assert_eq!(
            lines.next(),
            Some("GET /repos/jive/vault/contents/Daily%20Notes/a%23b.md?ref=main HTTP/1.1")
        );

        let headers: Vec<String> = lines.map(str::to_ascii_lowercase).collect();
        let has = |expected: &str| headers.iter().any(|h| h == expected);
        assert!(has("authorization: token tkn"), "headers: {:?}", headers);
        assert!(has("accept: application/vnd.github+json"), "headers: {:?}", headers);
        assert!(
            has(&format!("user-agent: repo-notes/{}", env!("CARGO_PKG_VERSION"))),
            "headers: {:?}",
            headers
        );
    }

    #[tokio::test]
    async fn test_no_authorization_without_token() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = capture_one_request(listener);

        let settings = Settings {
            owner: "jive".to_string(),
            repo: "vault".to_string(),
            api_base: format!("http://127.0.0.1:{}/", port),
            ..Settings::default()
        };
        GithubClient::new(&settings).unwrap().get("").await.unwrap();

        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /repos/jive/vault/contents/?ref=main http/1.1"));
        assert!(!request.contains("authorization:"));
    }

    #[test]
    fn test_debug_hides_token() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("vault"));
    }
}
