// src/github/fetch.rs
// =============================================================================
// This module fetches files and directory listings from a GitHub repository.
//
// Strategy:
// - Ask the content source (normally the GitHub content API) for the path
// - Treat anything but HTTP 200 as a failure for that path
// - Decode the body into a typed `Content` (see content.rs)
// - Remember the result, good or bad, so the same path is never requested
//   twice until someone clears the cache
//
// Failures are logged and returned, never raised: one missing folder should
// not stop the rest of the tree from rendering.
//
// Rust concepts:
// - Arc<dyn Trait>: Shared ownership of a trait object
// - Result: Errors as values that callers can match on
// =============================================================================

use crate::cache::{CacheKey, Cached, MemoCache, Operation};
use crate::github::client::ContentSource;
use crate::github::content::{parse_response, Content, FetchError};
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn ContentSource>,
    cache: Arc<MemoCache>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn ContentSource>, cache: Arc<MemoCache>) -> Self {
        Self { source, cache }
    }

    // Fetches a repository path, memoized per path
    //
    // Parameters:
    //   path: repository-relative path ("" for the repository root)
    //
    // Returns:
    //   Content::File with decoded text, or Content::Directory with the
    //   listing in API order. Errors are memoized too.
    pub async fn fetch(&self, path: &str) -> Result<Content, FetchError> {
        let key = CacheKey::new(Operation::Fetch, path);
        if let Some(Cached::Content(result)) = self.cache.get(&key) {
            return result;
        }

        let result = self.fetch_uncached(path).await;
        if let Err(e) = &result {
            error!(path, kind = ?e.kind(), "{}", e);
        }

        self.cache.insert(key, Cached::Content(result.clone()));
        result
    }

    // Fetches a path that must be a file and returns its text
    pub async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        match self.fetch(path).await? {
            Content::File { text, .. } => Ok(text),
            Content::Directory { .. } => Err(FetchError::NotAFile {
                path: path.to_string(),
            }),
        }
    }

    async fn fetch_uncached(&self, path: &str) -> Result<Content, FetchError> {
        let reply = self.source.get(path).await?;

        if reply.status != 200 {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: reply.status,
            });
        }

        parse_response(path, &reply.body)
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc<dyn ContentSource> instead of a generic?
//    - The fetcher is cloned into the tree builder and the renderer
//    - A trait object keeps those types simple (no <S: ContentSource> everywhere)
//    - Tests swap in a fake source without touching this file
//
// 2. Why cache errors?
//    - A path that 404s once will 404 again in the same session
//    - Repeating the request only costs rate limit
//    - Clearing the cache is how the user asks to try again
//
// 3. What does `return result;` inside `if let` do?
//    - It exits the async function early with the cached value
//    - The network code below only runs on a cache miss
// -----------------------------------------------------------------------------
