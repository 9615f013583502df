// src/github/mod.rs
// =============================================================================
// This module reads files and directory listings from a GitHub repository
// through the content API.
//
// Submodules:
// - client: HTTP access (reqwest) behind the ContentSource trait
// - content: Typed responses, base64 decoding and FetchError
// - fetch: The memoized Fetcher everything else goes through
// =============================================================================

mod client;
mod content;
mod fetch;

pub use client::{ContentSource, GithubClient};
#[cfg(test)]
pub use client::RawReply;
pub use content::{Content, ErrorKind, FetchError, ItemType};
pub use fetch::Fetcher;
