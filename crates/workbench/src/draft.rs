// Chunk: docs/chunks/preview_cache - Draft buffer for the editable file kind
//!
//! Draft editing layered on a [`FilePreview`].
//!
//! Only one file kind is editable (see `WorkbenchConfig::is_editable`).
//! Entries still loading, or whose read failed, have no content and never
//! accept edits; neither do binary or truncated ones. A save snapshots the
//! draft; once it succeeds the snapshot becomes the new `content`.

use crate::preview::FilePreview;

/// Why a save request did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRejected {
    NotEditable,
    AlreadySaving,
    ReadOnly,
    Clean,
}

impl FilePreview {
    /// Whether the entry can be edited at all.
    pub fn accepts_edits(&self) -> bool {
        self.content.is_some() && !self.is_binary && !self.truncated
    }

    /// Replaces the draft text. No-op on entries that do not accept edits.
    pub fn update_draft(&mut self, text: String) -> bool {
        if !self.accepts_edits() {
            return false;
        }
        self.dirty = self.content.as_deref() != Some(text.as_str());
        self.draft = text;
        self.save_error = None;
        true
    }

    /// Discards local edits.
    pub fn revert_draft(&mut self) {
        self.draft = self.content.clone().unwrap_or_default();
        self.dirty = false;
    }

    /// Starts a save, returning the text to write.
    pub fn begin_save(&mut self, editable: bool) -> Result<String, SaveRejected> {
        if !editable {
            return Err(SaveRejected::NotEditable);
        }
        if self.saving {
            return Err(SaveRejected::AlreadySaving);
        }
        if !self.accepts_edits() {
            return Err(SaveRejected::ReadOnly);
        }
        if !self.dirty {
            return Err(SaveRejected::Clean);
        }
        self.saving = true;
        self.save_error = None;
        Ok(self.draft.clone())
    }

    /// Applies the outcome of a save started with `saved` as its text.
    ///
    /// On failure the draft and content are untouched and the entry stays
    /// dirty.
    pub fn complete_save(&mut self, saved: String, result: Result<(), String>) {
        self.saving = false;
        match result {
            Ok(()) => {
                self.dirty = self.draft != saved;
                self.content = Some(saved);
                self.save_error = None;
            }
            Err(message) => {
                self.save_error = Some(message);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
