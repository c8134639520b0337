// Chunk: docs/chunks/tab_view_state - Tab strip and active view state machine
//!
//! The ordered list of open tabs plus the single active view.
//!
//! Transitions are total: opening, activating and closing can never fail.
//!
//! - **open**: an existing key is only activated; a new tab is appended and
//!   activated.
//! - **activate**: points the active view at an open tab and clears its
//!   unread badge.
//! - **close**: removes the tab. If it was active, the last remaining tab in
//!   strip order becomes active, or `Empty` when none remain. There is no
//!   navigation history; "last tab" is the whole policy.
//! - **show_output / show_empty**: move to the two views that have no tab.

use crate::tab::{tab_label, Tab, TabKey, View};

/// A tab in the strip with its display state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTab {
    pub tab: Tab,
    pub key: TabKey,
    /// Display label (file name, "Terminal 2", ...)
    pub label: String,
    /// Whether the tab has unseen content (terminal output while inactive)
    pub unread: bool,
}

/// Result of an open transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The tab was already open and is now active.
    Activated,
    /// The tab was appended to the strip and is now active.
    Added,
}

/// Ordered tabs plus the active view.
#[derive(Debug, Default)]
pub struct TabStrip {
    tabs: Vec<OpenTab>,
    active: View,
    /// Numbering for terminal labels, in open order.
    terminals_opened: usize,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `tab`, or activates it if a tab with the same key is open.
    pub fn open(&mut self, tab: Tab) -> OpenOutcome {
        let key = tab.key();
        if self.contains(&key) {
            self.activate(&key);
            return OpenOutcome::Activated;
        }

        if matches!(tab, Tab::Terminal { .. }) {
            self.terminals_opened += 1;
        }
        let label = tab_label(&tab, self.terminals_opened);
        self.active = tab.view();
        self.tabs.push(OpenTab {
            tab,
            key,
            label,
            unread: false,
        });
        OpenOutcome::Added
    }

    /// Makes the tab with `key` active. Returns false if no such tab is open.
    pub fn activate(&mut self, key: &TabKey) -> bool {
        match self.tabs.iter_mut().find(|t| &t.key == key) {
            Some(open) => {
                open.unread = false;
                self.active = open.tab.view();
                true
            }
            None => false,
        }
    }

    /// Closes the tab with `key`, returning it.
    ///
    /// Falls back to the last remaining tab when the closed tab was active.
    pub fn close(&mut self, key: &TabKey) -> Option<Tab> {
        let index = self.tabs.iter().position(|t| &t.key == key)?;
        let removed = self.tabs.remove(index);

        if self.active.tab_key().as_ref() == Some(key) {
            self.active = match self.tabs.last_mut() {
                Some(last) => {
                    last.unread = false;
                    last.tab.view()
                }
                None => View::Empty,
            };
        }

        Some(removed.tab)
    }

    pub fn show_output(&mut self) {
        self.active = View::Output;
    }

    pub fn show_empty(&mut self) {
        self.active = View::Empty;
    }

    /// Marks a tab as having unseen content, unless it is the active one.
    pub fn mark_unread(&mut self, key: &TabKey) -> bool {
        if self.active.tab_key().as_ref() == Some(key) {
            return false;
        }
        match self.tabs.iter_mut().find(|t| &t.key == key) {
            Some(open) if !open.unread => {
                open.unread = true;
                true
            }
            _ => false,
        }
    }

    /// Removes every tab and resets the active view to `Empty`.
    pub fn clear(&mut self) -> Vec<Tab> {
        self.active = View::Empty;
        self.terminals_opened = 0;
        self.tabs.drain(..).map(|open| open.tab).collect()
    }

    pub fn active(&self) -> &View {
        &self.active
    }

    pub fn tabs(&self) -> &[OpenTab] {
        &self.tabs
    }

    pub fn get(&self, key: &TabKey) -> Option<&OpenTab> {
        self.tabs.iter().find(|t| &t.key == key)
    }

    pub fn contains(&self, key: &TabKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
