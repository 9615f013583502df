// src/notes/mod.rs
// =============================================================================
// This module turns a repository of Markdown files into something you can
// browse: a navigation tree plus the text of individual notes.
//
// Submodules:
// - tree: Recursive folder walk -> ordered TreeNode tree
// - render: Fetch + decode one note
// - markdown: Headings and links inside a note
//
// `NoteExplorer` wires all of it to one Fetcher and one shared MemoCache,
// and is the only thing the CLI talks to.
// =============================================================================

mod markdown;
mod render;
mod tree;

pub use markdown::{note_links, outline};
pub use render::{NoteRenderer, RenderError};
pub use tree::{count, find, notes, NoteRules, TreeBuilder, TreeNode};

use crate::cache::{CacheStats, MemoCache};
use crate::github::{Content, ContentSource, FetchError, Fetcher};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct NoteExplorer {
    cache: Arc<MemoCache>,
    fetcher: Fetcher,
    tree: TreeBuilder,
    renderer: NoteRenderer,
}

impl NoteExplorer {
    pub fn new(source: Arc<dyn ContentSource>, rules: NoteRules) -> Self {
        let cache = Arc::new(MemoCache::new());
        let fetcher = Fetcher::new(source, cache.clone());

        Self {
            tree: TreeBuilder::new(fetcher.clone(), cache.clone(), rules.clone()),
            renderer: NoteRenderer::new(fetcher.clone(), cache.clone(), rules),
            fetcher,
            cache,
        }
    }

    pub async fn fetch(&self, path: &str) -> Result<Content, FetchError> {
        self.fetcher.fetch(path).await
    }

    pub async fn build_tree(&self, root: &str) -> Vec<TreeNode> {
        self.tree.build_tree(root).await
    }

    pub async fn render_note(&self, path: &str) -> Result<String, RenderError> {
        self.renderer.render_note(path).await
    }

    pub async fn render_note_text(&self, path: &str) -> String {
        self.renderer.render_note_text(path).await
    }

    // Forgets every memoized fetch, tree and note
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        info!(removed, "cache cleared");
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{file_body, listing, FakeSource};

    #[tokio::test]
    async fn test_tree_then_note_shares_cache() {
        let source = Arc::new(
            FakeSource::new()
                .with_ok("vault", &listing("vault", &[("a.md", "file")]))
                .with_ok("vault/a.md", &file_body("vault/a.md", "# A\n")),
        );
        let explorer = NoteExplorer::new(source.clone(), NoteRules::default());

        let tree = explorer.build_tree("vault").await;
        let first = notes(&tree).next().unwrap();
        let text = explorer.render_note(first.id()).await.unwrap();

        assert_eq!(text, "# A\n");
        // The note fetch and a raw fetch of the same path hit the cache
        explorer.fetch("vault/a.md").await.unwrap();
        assert_eq!(source.calls("vault/a.md"), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_refetches_everything() {
        let source = Arc::new(FakeSource::new().with_ok("", &listing("", &[("a.md", "file")])));
        let explorer = NoteExplorer::new(source.clone(), NoteRules::default());

        explorer.build_tree("").await;
        assert!(explorer.clear_cache() > 0);
        explorer.build_tree("").await;

        assert_eq!(source.calls(""), 2);
        assert_eq!(explorer.cache_stats().entries, 2);
    }
}
