// src/testing.rs
// Test helpers: an in-memory ContentSource with canned replies.

use crate::github::{ContentSource, FetchError, RawReply};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeSource {
    replies: HashMap<String, RawReply>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, path: &str, status: u16, body: &str) -> Self {
        self.replies.insert(
            path.to_string(),
            RawReply {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn with_ok(self, path: &str, body: &str) -> Self {
        self.with_reply(path, 200, body)
    }

    // Number of times `path` was requested
    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn get(&self, path: &str) -> Result<RawReply, FetchError> {
        *self.calls.lock().unwrap().entry(path.to_string()).or_default() += 1;

        self.replies
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Request {
                path: path.to_string(),
                message: "no canned reply".to_string(),
            })
    }
}

// A file response body with `text` base64-encoded the way the API does it
pub fn file_body(path: &str, text: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    serde_json::json!({
        "name": name,
        "path": path,
        "type": "file",
        "encoding": "base64",
        "content": STANDARD.encode(text),
    })
    .to_string()
}

// A listing body from (name, type) pairs under `dir`
pub fn listing(dir: &str, entries: &[(&str, &str)]) -> String {
    let records: Vec<_> = entries
        .iter()
        .map(|(name, kind)| {
            let path = if dir.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", dir, name)
            };
            serde_json::json!({ "name": name, "path": path, "type": kind })
        })
        .collect();
    serde_json::Value::Array(records).to_string()
}
