// src/cache.rs
// =============================================================================
// An explicit memoization cache shared by the fetcher, tree builder and
// note renderer.
//
// Every cached value is keyed by the operation that produced it plus the
// argument it was called with, so `fetch("notes")` and
// `build_tree("notes")` never collide. Nothing expires on its own; the
// presentation layer calls `clear()` when it wants fresh data.
//
// Rust concepts:
// - Mutex: Interior mutability behind a shared reference (&self)
// - Atomics: Lock-free hit/miss counters
// - Arc: The cache is created once and shared by all components
// =============================================================================

use crate::github::{Content, FetchError};
use crate::notes::{RenderError, TreeNode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

// Which memoized function a cache entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    BuildTree,
    RenderNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub op: Operation,
    pub arg: String,
}

impl CacheKey {
    pub fn new(op: Operation, arg: &str) -> Self {
        Self {
            op,
            arg: arg.to_string(),
        }
    }
}

// A memoized result of one of the three operations
#[derive(Debug, Clone)]
pub enum Cached {
    Content(Result<Content, FetchError>),
    Tree(Vec<TreeNode>),
    Note(Result<String, RenderError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct MemoCache {
    entries: Mutex<HashMap<CacheKey, Cached>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Looks up a key, counting the hit or miss
    pub fn get(&self, key: &CacheKey) -> Option<Cached> {
        let found = self.lock().get(key).cloned();

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(op = ?key.op, arg = %key.arg, "cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(op = ?key.op, arg = %key.arg, "cache miss");
        }

        found
    }

    pub fn insert(&self, key: CacheKey, value: Cached) {
        self.lock().insert(key, value);
    }

    // Drops every entry and returns how many there were
    //
    // Hit/miss counters are kept so `stats()` still describes the session.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        debug!(removed, "cache cleared");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lock().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    // A panic while holding the lock cannot leave the map half-written
    // (every operation is a single insert/clear), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Cached>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
