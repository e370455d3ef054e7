// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editor seam.

use std::ops::Range;
use std::path::PathBuf;

/// Half-open byte range into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Region {
    /// Region `start..end`. Reversed bounds are swapped.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The whole of `text`.
    pub fn whole(text: &str) -> Self {
        Self::new(0, text.len())
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for a zero-length region.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// As a `Range`.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The slice of `text` this region covers, if it lies on char
    /// boundaries inside `text`.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.range())
    }
}

/// What the orchestrator needs from an editor.
///
/// Implementations wrap whatever the editor exposes for the active document.
/// Every method is synchronous; the orchestrator calls them before and after
/// the external tool runs, never during.
pub trait EditorHost {
    /// Full text of the active document.
    fn document_text(&self) -> String;

    /// Current selection, if the editor has one.
    fn selection(&self) -> Option<Region>;

    /// Replace `region` with `text`.
    fn replace_region(&mut self, region: Region, text: &str);

    /// Show `text` in a transient popup no larger than the given size.
    fn show_transient_message(&mut self, text: &str, max_width: u32, max_height: u32);

    /// Path of the document on disk, if it has been saved.
    fn document_path(&self) -> Option<PathBuf>;

    /// One-line, non-blocking notification.
    fn status_message(&mut self, text: &str);
}
