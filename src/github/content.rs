// src/github/content.rs
// =============================================================================
// This module turns raw content API responses into typed values.
//
// The GitHub content API answers the same endpoint in two shapes:
// - A JSON array when the path is a directory (one record per entry)
// - A JSON object when the path is a file, with the body base64-encoded
//   under a `content` field
//
// We map those onto the `Content` enum and report everything that can go
// wrong as a `FetchError`. Nothing in here touches the network, so all of it
// can be tested with plain strings.
//
// Rust concepts:
// - serde: Deriving Deserialize for the JSON records
// - thiserror: Deriving Display/Error for our error enum
// - #[serde(untagged)]: Letting serde pick a variant by shape
// =============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// The `type` field of a listing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A directory we can recurse into
    Dir,
    /// A regular file
    File,
    /// Symlinks, submodules, anything else the API reports
    #[serde(other)]
    Other,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Dir => "dir",
            ItemType::File => "file",
            ItemType::Other => "other",
        }
    }
}

// One record of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

// A successfully fetched and decoded response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    /// A single file, already decoded to text
    File {
        name: String,
        path: String,
        text: String,
    },
    /// A directory listing, in the order the API returned it
    Directory { entries: Vec<ContentItem> },
}

// The coarse error taxonomy callers care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    MalformedResponse,
    Decode,
    /// The caller asked for something that can't be served (e.g. not a note)
    InvalidRequest,
}

// Everything that can go wrong while fetching one path
//
// Errors are Clone because failed lookups are memoized like successful ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Failed to fetch {path}: {status}")]
    Status { path: String, status: u16 },

    #[error("Request for {path} failed: {message}")]
    Request { path: String, message: String },

    #[error("Failed to parse JSON from {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("No content field found in {path}")]
    MissingContent { path: String },

    #[error("Error decoding {path}: {message}")]
    Decode { path: String, message: String },

    #[error("{path} is a directory, not a file")]
    NotAFile { path: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Status { .. } | FetchError::Request { .. } => ErrorKind::Transport,
            FetchError::Malformed { .. }
            | FetchError::MissingContent { .. }
            | FetchError::NotAFile { .. } => ErrorKind::MalformedResponse,
            FetchError::Decode { .. } => ErrorKind::Decode,
        }
    }
}

// The wire shape of a file response
//
// Only the fields we need; serde ignores the rest (sha, size, urls, ...).
#[derive(Debug, Deserialize)]
struct FileRecord {
    name: String,
    path: String,
    content: Option<String>,
    encoding: Option<String>,
}

// Either shape the endpoint can return
//
// serde tries the variants in order: an array can only be a listing,
// an object can only be a file record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawResponse {
    Directory(Vec<ContentItem>),
    File(FileRecord),
}

// Parses a 200 response body for `path` into typed content
//
// Parameters:
//   path: the repository path that was requested (used in error messages)
//   body: the raw response body
//
// Returns: Content on success, FetchError describing the failure otherwise
pub fn parse_response(path: &str, body: &str) -> Result<Content, FetchError> {
    let raw: RawResponse = serde_json::from_str(body).map_err(|e| FetchError::Malformed {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    match raw {
        RawResponse::Directory(entries) => Ok(Content::Directory { entries }),
        RawResponse::File(record) => {
            // Files over the API size limit come back with encoding "none"
            // and an empty content string - there is nothing to decode.
            let encoded = match (record.content, record.encoding.as_deref()) {
                (Some(_), Some("none")) | (None, _) => {
                    return Err(FetchError::MissingContent {
                        path: path.to_string(),
                    })
                }
                (Some(content), _) => content,
            };

            let text = decode_content(&encoded).map_err(|message| FetchError::Decode {
                path: path.to_string(),
                message,
            })?;

            Ok(Content::File {
                name: record.name,
                path: record.path,
                text,
            })
        }
    }
}

// Decodes a base64 `content` field into UTF-8 text
//
// The API wraps the payload at 60 columns with '\n', so whitespace is
// stripped before decoding.
pub fn decode_content(encoded: &str) -> Result<String, String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| format!("invalid base64: {}", e))?;

    String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {}", e))
}
