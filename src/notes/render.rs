// src/notes/render.rs
// =============================================================================
// This module fetches and decodes a single note for display.
//
// A note is rendered as its raw Markdown text. Failures are typed
// (`RenderError`) so callers can tell an error apart from real content, but
// their Display text is what a reader should see in place of the note:
//
//   - nothing could be fetched  -> "Could not fetch note content."
//   - the bytes would not decode -> "Error decoding file: ..."
//
// Paths that don't end in the note extension are refused up front, before
// any request goes out.
// =============================================================================

use crate::cache::{CacheKey, Cached, MemoCache, Operation};
use crate::github::{ErrorKind, FetchError, Fetcher};
use crate::notes::tree::NoteRules;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Could not fetch note content.")]
    Unavailable { kind: ErrorKind },

    #[error("Error decoding file: {0}")]
    Decode(String),

    #[error("{0} is not a note")]
    NotANote(String),
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Unavailable { kind } => *kind,
            RenderError::Decode(_) => ErrorKind::Decode,
            RenderError::NotANote(_) => ErrorKind::InvalidRequest,
        }
    }
}

impl From<FetchError> for RenderError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Decode { message, .. } => RenderError::Decode(message),
            other => RenderError::Unavailable { kind: other.kind() },
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteRenderer {
    fetcher: Fetcher,
    cache: Arc<MemoCache>,
    rules: NoteRules,
}

impl NoteRenderer {
    pub fn new(fetcher: Fetcher, cache: Arc<MemoCache>, rules: NoteRules) -> Self {
        Self {
            fetcher,
            cache,
            rules,
        }
    }

    // Returns the decoded text of the note at `path`, memoized per path
    pub async fn render_note(&self, path: &str) -> Result<String, RenderError> {
        if !self.rules.is_note_name(path) {
            warn!(path, "refusing to render a non-note path");
            return Err(RenderError::NotANote(path.to_string()));
        }

        let key = CacheKey::new(Operation::RenderNote, path);
        if let Some(Cached::Note(result)) = self.cache.get(&key) {
            return result;
        }

        let result = self
            .fetcher
            .fetch_text(path)
            .await
            .map_err(RenderError::from);

        self.cache.insert(key, Cached::Note(result.clone()));
        result
    }

    // Like render_note, but errors come back as their display text
    pub async fn render_note_text(&self, path: &str) -> String {
        match self.render_note(path).await {
            Ok(text) => text,
            Err(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{file_body, FakeSource};

    fn renderer(source: FakeSource) -> (NoteRenderer, Arc<FakeSource>) {
        let source = Arc::new(source);
        let cache = Arc::new(MemoCache::new());
        let fetcher = Fetcher::new(source.clone(), cache.clone());
        (NoteRenderer::new(fetcher, cache, NoteRules::default()), source)
    }

    #[tokio::test]
    async fn test_renders_decoded_text() {
        let (renderer, _) = renderer(
            FakeSource::new().with_ok("notes/day.md", &file_body("notes/day.md", "# Day\nnotes ✓\n")),
        );

        let text = renderer.render_note("notes/day.md").await.unwrap();
        assert_eq!(text, "# Day\nnotes ✓\n");
    }

    #[tokio::test]
    async fn test_missing_content_gives_sentinel() {
        let (renderer, _) = renderer(
            FakeSource::new().with_ok("a.md", r#"{"name": "a.md", "path": "a.md", "type": "file"}"#),
        );

        let err = renderer.render_note("a.md").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert_eq!(
            renderer.render_note_text("a.md").await,
            "Could not fetch note content."
        );
    }

    #[tokio::test]
    async fn test_http_failure_gives_sentinel() {
        let (renderer, _) = renderer(FakeSource::new().with_reply("a.md", 404, r#"{"message": "Not Found"}"#));

        let err = renderer.render_note("a.md").await.unwrap_err();
        assert_eq!(
            err,
            RenderError::Unavailable {
                kind: ErrorKind::Transport
            }
        );
        assert_eq!(err.to_string(), "Could not fetch note content.");
    }

    #[tokio::test]
    async fn test_decode_failure_is_described() {
        let (renderer, _) = renderer(
            FakeSource::new().with_ok("a.md", r#"{"name": "a.md", "path": "a.md", "content": "*"}"#),
        );

        let text = renderer.render_note_text("a.md").await;
        assert!(text.starts_with("Error decoding file: invalid base64"));
    }

    #[tokio::test]
    async fn test_non_note_path_is_rejected_without_request() {
        let (renderer, source) = renderer(FakeSource::new().with_ok("img.png", "{}"));

        let err = renderer.render_note("img.png").await.unwrap_err();
        assert_eq!(err, RenderError::NotANote("img.png".to_string()));
        assert_eq!(source.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_render_is_memoized() {
        let (renderer, source) =
            renderer(FakeSource::new().with_ok("a.md", &file_body("a.md", "text")));

        renderer.render_note("a.md").await.unwrap();
        renderer.render_note("a.md").await.unwrap();

        assert_eq!(source.calls("a.md"), 1);
    }
}
