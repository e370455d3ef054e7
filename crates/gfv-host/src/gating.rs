// SPDX-License-Identifier: MIT OR Apache-2.0
//! Which documents the commands apply to.

use crate::EditorHost;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions the commands are offered for.
const GO_EXTENSIONS: &[&str] = &["go"];

/// The two editor commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Replace the document (or selection) with formatter output.
    Format,
    /// Show linter diagnostics for the document's package.
    Lint,
}

impl ToolKind {
    /// Menu entry text.
    pub fn description(self) -> &'static str {
        match self {
            Self::Format => "Format Current File (`go fmt <filename>`)",
            Self::Lint => "Lint Current File (`go vet <filename>`)",
        }
    }

    /// Short name used as a prefix in status messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Format => "gofmt",
            Self::Lint => "go vet",
        }
    }

    /// Config section holding this tool's settings.
    pub fn section(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Lint => "lint",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns `true` when `path` names a Go source file.
pub fn is_go_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| GO_EXTENSIONS.contains(&e))
}

/// The file a command targets: the first explicit path, else the active
/// document's path.
pub fn target_path<H: EditorHost + ?Sized>(paths: &[PathBuf], host: &H) -> Option<PathBuf> {
    paths.first().cloned().or_else(|| host.document_path())
}

/// Whether a command is enabled (and visible) for this target.
pub fn command_enabled<H: EditorHost + ?Sized>(paths: &[PathBuf], host: &H) -> bool {
    target_path(paths, host).is_some_and(|p| is_go_file(&p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryHost;

    #[test]
    fn go_extension_only() {
        assert!(is_go_file(Path::new("main.go")));
        assert!(is_go_file(Path::new("/src/pkg/util.go")));
        assert!(!is_go_file(Path::new("main.go.orig")));
        assert!(!is_go_file(Path::new("go")));
        assert!(!is_go_file(Path::new("README.md")));
    }

    #[test]
    fn explicit_path_wins() {
        let host = MemoryHost::new("").with_path("/a/active.go");
        let target = target_path(&[PathBuf::from("/b/other.txt")], &host);
        assert_eq!(target, Some(PathBuf::from("/b/other.txt")));
        assert!(!command_enabled(&[PathBuf::from("/b/other.txt")], &host));
    }

    #[test]
    fn falls_back_to_active_document() {
        let host = MemoryHost::new("").with_path("/a/active.go");
        assert!(command_enabled(&[], &host));
    }

    #[test]
    fn unsaved_document_is_disabled() {
        assert!(!command_enabled(&[], &MemoryHost::new("package main")));
    }

    #[test]
    fn descriptions_name_the_go_command() {
        assert!(ToolKind::Format.description().contains("go fmt"));
        assert!(ToolKind::Lint.description().contains("go vet"));
        assert_eq!(ToolKind::Lint.to_string(), "go vet");
    }
}
