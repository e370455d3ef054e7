// SPDX-License-Identifier: MIT OR Apache-2.0
//! An [`EditorHost`] backed by a file on disk.

use anyhow::{Context, Result};
use gfv_core::TextEncoding;
use gfv_host::{EditorHost, Region};
use std::path::{Path, PathBuf};

/// A file loaded into memory. Edits stay in memory until [`save`](Self::save).
#[derive(Debug)]
pub struct FileHost {
    path: PathBuf,
    encoding: TextEncoding,
    text: String,
    dirty: bool,
    popups: Vec<String>,
    statuses: Vec<String>,
}

impl FileHost {
    /// Read `path`, decoding it with `encoding`.
    pub fn open(path: &Path, encoding: TextEncoding) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
        let text = encoding
            .decode(&bytes)
            .with_context(|| format!("decode '{}'", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            encoding,
            text,
            dirty: false,
            popups: Vec::new(),
            statuses: Vec::new(),
        })
    }

    /// Current text, including unsaved edits.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the text differs from what was read.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Popup bodies shown so far.
    pub fn popups(&self) -> &[String] {
        &self.popups
    }

    /// Status messages posted so far.
    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    /// Write the text back, encoded as it was read.
    pub fn save(&mut self) -> Result<()> {
        let bytes = self
            .encoding
            .encode(&self.text)
            .with_context(|| format!("encode '{}'", self.path.display()))?;
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("write '{}'", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }
}

impl EditorHost for FileHost {
    fn document_text(&self) -> String {
        self.text.clone()
    }

    fn selection(&self) -> Option<Region> {
        None
    }

    fn replace_region(&mut self, region: Region, text: &str) {
        self.text.replace_range(region.range(), text);
        self.dirty = true;
    }

    fn show_transient_message(&mut self, text: &str, _max_width: u32, _max_height: u32) {
        self.popups.push(text.to_string());
    }

    fn document_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn status_message(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }
}
