// Chunk: docs/chunks/preview_cache - Keyed preview caches with fetch dedup
//!
//! Per-key caches of fetched file and diff content.
//!
//! A cache pairs a map of entries with an in-flight set. `ensure` is the
//! only way a fetch starts:
//!
//! - a key already in flight joins the pending fetch,
//! - an entry that loaded without error is reused,
//! - anything else (missing, never loaded, errored) marks the entry loading
//!   and returns [`Ensure::Fetch`], registering the key as in flight.
//!
//! The key leaves the in-flight set when its completion is applied, never
//! earlier, so there is at most one outstanding fetch per key no matter how
//! many times `ensure` runs meanwhile. A completion whose entry was removed
//! (its tab closed) is discarded and does not recreate the entry.

use std::collections::{HashMap, HashSet};

use crate::services::{DiffContent, FileContent};

/// What `ensure` decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensure {
    /// The caller must start a fetch for the key.
    Fetch,
    /// A fetch for the key is already outstanding.
    InFlight,
    /// The entry is loaded and error-free.
    Cached,
}

/// Behaviour every cache entry shares.
pub trait CacheEntry: Default {
    /// Payload of a successful fetch.
    type Payload;

    fn is_loading(&self) -> bool;
    fn error(&self) -> Option<&str>;
    /// Whether a successful fetch has ever been applied.
    fn has_content(&self) -> bool;

    fn set_loading(&mut self, loading: bool);
    fn apply_loaded(&mut self, payload: Self::Payload);
    /// Records a failure. Content from an earlier fetch is kept.
    fn apply_failed(&mut self, message: String);

    fn is_ready(&self) -> bool {
        !self.is_loading() && self.error().is_none() && self.has_content()
    }
}

/// Entries plus the in-flight set for one kind of preview.
#[derive(Debug)]
pub struct PreviewCache<E> {
    entries: HashMap<String, E>,
    in_flight: HashSet<String>,
}

impl<E> Default for PreviewCache<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }
}

impl<E: CacheEntry> PreviewCache<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure `key` is loaded or loading. See the module docs.
    pub fn ensure(&mut self, key: &str) -> Ensure {
        if self.in_flight.contains(key) {
            // A tab reopened mid-fetch gets its entry back in loading state.
            self.entries.entry(key.to_string()).or_default().set_loading(true);
            return Ensure::InFlight;
        }

        let entry = self.entries.entry(key.to_string()).or_default();
        if entry.is_ready() {
            return Ensure::Cached;
        }

        entry.set_loading(true);
        self.in_flight.insert(key.to_string());
        Ensure::Fetch
    }

    /// Applies a fetch result. Returns false if the entry no longer exists.
    pub fn complete(&mut self, key: &str, result: Result<E::Payload, String>) -> bool {
        self.in_flight.remove(key);

        let Some(entry) = self.entries.get_mut(key) else {
            tracing::debug!(key, "dropping completion for closed preview");
            return false;
        };

        entry.set_loading(false);
        match result {
            Ok(payload) => entry.apply_loaded(payload),
            Err(message) => {
                tracing::warn!(key, error = %message, "preview fetch failed");
                entry.apply_failed(message);
            }
        }
        true
    }

    /// Removes the entry. An outstanding fetch stays registered in flight.
    pub fn remove(&mut self, key: &str) -> Option<E> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&E> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut E> {
        self.entries.get_mut(key)
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains(key)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry and forgets outstanding fetches.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
    }
}

// =============================================================================
// FilePreview
// =============================================================================

/// Cached file content plus the draft layered on top of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePreview {
    pub loading: bool,
    pub error: Option<String>,
    /// Last content fetched from (or saved to) the file service.
    pub content: Option<String>,
    pub truncated: bool,
    pub is_binary: bool,
    /// Locally edited text. Mirrors `content` while not dirty.
    pub draft: String,
    pub dirty: bool,
    pub saving: bool,
    pub save_error: Option<String>,
}

impl CacheEntry for FilePreview {
    type Payload = FileContent;

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn has_content(&self) -> bool {
        self.content.is_some()
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn apply_loaded(&mut self, payload: FileContent) {
        self.error = None;
        self.truncated = payload.truncated;
        self.is_binary = payload.is_binary;
        if self.dirty {
            self.dirty = self.draft != payload.content;
        } else {
            self.draft = payload.content.clone();
        }
        self.content = Some(payload.content);
    }

    fn apply_failed(&mut self, message: String) {
        self.error = Some(message);
    }
}

// =============================================================================
// DiffPreview
// =============================================================================

/// Cached diff text. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffPreview {
    pub loading: bool,
    pub error: Option<String>,
    pub diff: Option<String>,
    pub truncated: bool,
}

impl CacheEntry for DiffPreview {
    type Payload = DiffContent;

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn has_content(&self) -> bool {
        self.diff.is_some()
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn apply_loaded(&mut self, payload: DiffContent) {
        self.error = None;
        self.diff = Some(payload.diff);
        self.truncated = payload.truncated;
    }

    fn apply_failed(&mut self, message: String) {
        self.error = Some(message);
    }
}

// =============================================================================
// Tests
// =============================================================================
