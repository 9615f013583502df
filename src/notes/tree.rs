// src/notes/tree.rs
// =============================================================================
// This module builds the navigation tree of a notes vault.
//
// How it works:
// 1. List the root folder through the Fetcher
// 2. Skip the reserved folder (".obsidian" by default)
// 3. Recurse into every other folder, depth-first
// 4. Keep files that end with the note extension (".md" by default)
// 5. Drop every other file without complaint
//
// The order of entries is exactly the order the API lists them in. We never
// sort, so the tree looks the same as the repository does on GitHub.
//
// A folder that fails to list is logged by the Fetcher and shows up as an
// empty folder; the rest of the tree still renders.
//
// Rust concepts:
// - Recursive async: async fns can't call themselves directly, so the walk
//   returns a boxed future (BoxFuture)
// - #[serde(untagged)]: Serializes Folder/Note without a variant tag
// - Custom iterators: Walking the finished tree without recursion
// =============================================================================

use crate::cache::{CacheKey, Cached, MemoCache, Operation};
use crate::github::{Content, Fetcher, ItemType};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

// One entry of the navigation tree
//
// Serialized as {"id","name","children"} for folders and
// {"id","name","path"} for notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Folder {
        id: String,
        name: String,
        children: Vec<TreeNode>,
    },
    Note {
        id: String,
        name: String,
        path: String,
    },
}

impl TreeNode {
    pub fn folder(path: &str, name: &str, children: Vec<TreeNode>) -> Self {
        TreeNode::Folder {
            id: path.to_string(),
            name: name.to_string(),
            children,
        }
    }

    pub fn note(path: &str, name: &str) -> Self {
        TreeNode::Note {
            id: path.to_string(),
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    // The repository path of this node
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Folder { id, .. } | TreeNode::Note { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder { name, .. } | TreeNode::Note { name, .. } => name,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, TreeNode::Note { .. })
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Folder { children, .. } => children,
            TreeNode::Note { .. } => &[],
        }
    }
}

// Naming rules the builder filters with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRules {
    pub reserved_dir: String,
    pub note_extension: String,
}

impl NoteRules {
    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.reserved_dir
    }

    // Case-sensitive suffix match: "a.MD" is not a note
    pub fn is_note_name(&self, name: &str) -> bool {
        name.ends_with(&self.note_extension)
    }
}

impl Default for NoteRules {
    fn default() -> Self {
        Self {
            reserved_dir: ".obsidian".to_string(),
            note_extension: ".md".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeBuilder {
    fetcher: Fetcher,
    cache: Arc<MemoCache>,
    rules: NoteRules,
}

impl TreeBuilder {
    pub fn new(fetcher: Fetcher, cache: Arc<MemoCache>, rules: NoteRules) -> Self {
        Self {
            fetcher,
            cache,
            rules,
        }
    }

    // Builds the full tree under `root`, memoized per root path
    //
    // Returns: top-level nodes in listing order (empty if the root can't be
    // listed)
    pub async fn build_tree(&self, root: &str) -> Vec<TreeNode> {
        let key = CacheKey::new(Operation::BuildTree, root);
        if let Some(Cached::Tree(tree)) = self.cache.get(&key) {
            return tree;
        }

        let tree = self.walk(root.to_string()).await;
        let count = count(&tree);
        debug!(root, folders = count.folders, notes = count.notes, "tree built");

        self.cache.insert(key, Cached::Tree(tree.clone()));
        tree
    }

    // Lists one folder and recurses into its subfolders
    fn walk(&self, path: String) -> BoxFuture<'_, Vec<TreeNode>> {
        async move {
            let entries = match self.fetcher.fetch(&path).await {
                Ok(Content::Directory { entries }) => entries,
                Ok(Content::File { .. }) => {
                    warn!(path = %path, "expected a folder but found a file");
                    return Vec::new();
                }
                // Already reported by the fetcher
                Err(_) => return Vec::new(),
            };

            let mut nodes = Vec::new();
            for entry in entries {
                if self.rules.is_reserved(&entry.name) {
                    continue;
                }

                match entry.item_type {
                    ItemType::Dir => {
                        let children = self.walk(entry.path.clone()).await;
                        nodes.push(TreeNode::folder(&entry.path, &entry.name, children));
                    }
                    ItemType::File if self.rules.is_note_name(&entry.name) => {
                        nodes.push(TreeNode::note(&entry.path, &entry.name));
                    }
                    _ => {}
                }
            }
            nodes
        }
        .boxed()
    }
}

// Depth-first iterator over the notes of a tree
#[derive(Debug)]
pub struct Notes<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Notes<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                TreeNode::Note { .. } => return Some(node),
                TreeNode::Folder { children, .. } => self.stack.extend(children.iter().rev()),
            }
        }
        None
    }
}

// Every note under `nodes`, in the order a reader would see them
pub fn notes(nodes: &[TreeNode]) -> Notes<'_> {
    Notes {
        stack: nodes.iter().rev().collect(),
    }
}

// Finds a node (folder or note) by its id
pub fn find<'a>(nodes: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = find(node.children(), id) {
            return Some(found);
        }
    }
    None
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeCount {
    pub folders: usize,
    pub notes: usize,
}

pub fn count(nodes: &[TreeNode]) -> TreeCount {
    nodes.iter().fold(TreeCount::default(), |acc, node| match node {
        TreeNode::Note { .. } => TreeCount {
            notes: acc.notes + 1,
            ..acc
        },
        TreeNode::Folder { children, .. } => {
            let inner = count(children);
            TreeCount {
                folders: acc.folders + 1 + inner.folders,
                notes: acc.notes + inner.notes,
            }
        }
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BoxFuture?
//    - An async fn's future contains the futures of everything it awaits
//    - If it awaits itself, that type would be infinitely large
//    - Boxing puts the inner future on the heap, giving it a fixed size
//    - .boxed() (from FutureExt) does the Box::pin for us
//
// 2. Why does walk take an owned String?
//    - The boxed future must own everything it uses
//    - Borrowing from the entry we are iterating over would not live long enough
//
// 3. What is `ItemType::File if ...`?
//    - A match guard: the arm only matches when the condition is true too
//    - Files that fail the guard fall through to `_ => {}` and are dropped
// -----------------------------------------------------------------------------
