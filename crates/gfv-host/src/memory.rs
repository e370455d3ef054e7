// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory [`EditorHost`] that records what the orchestrator asked for.

use crate::{EditorHost, Region};
use std::path::PathBuf;

/// A popup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    /// Popup body.
    pub text: String,
    /// Maximum width.
    pub max_width: u32,
    /// Maximum height.
    pub max_height: u32,
}

/// Document held in memory. Useful for tests and headless callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    /// Document text.
    pub text: String,
    /// Current selection.
    pub selection: Option<Region>,
    /// Path on disk.
    pub path: Option<PathBuf>,
    /// Popups shown, oldest first.
    pub popups: Vec<Popup>,
    /// Status messages, oldest first.
    pub statuses: Vec<String>,
    /// Number of `replace_region` calls.
    pub replacements: usize,
}

impl MemoryHost {
    /// Unsaved document with `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the document path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the selection.
    pub fn with_selection(mut self, region: Region) -> Self {
        self.selection = Some(region);
        self
    }
}

impl EditorHost for MemoryHost {
    fn document_text(&self) -> String {
        self.text.clone()
    }

    fn selection(&self) -> Option<Region> {
        self.selection
    }

    fn replace_region(&mut self, region: Region, text: &str) {
        self.text.replace_range(region.range(), text);
        self.replacements += 1;
        if let Some(sel) = self.selection.as_mut() {
            *sel = Region::new(region.start, region.start + text.len());
        }
    }

    fn show_transient_message(&mut self, text: &str, max_width: u32, max_height: u32) {
        self.popups.push(Popup {
            text: text.to_string(),
            max_width,
            max_height,
        });
    }

    fn document_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn status_message(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }
}
