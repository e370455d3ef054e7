// SPDX-License-Identifier: MIT OR Apache-2.0
//! Point-in-time copies of the process environment.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// An owned copy of environment variables.
///
/// Every invocation gets its own merged copy, so overrides applied for one
/// invocation are never visible to another. Names and values are kept as
/// OS strings; nothing is dropped for not being Unicode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<OsString, OsString>,
}

impl EnvSnapshot {
    /// Copy the current process environment.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable by exact name. `None` also when the value is not
    /// Unicode; see [`get_os`](Self::get_os).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key).and_then(OsStr::to_str)
    }

    /// Look up a variable by exact name, as an OS string.
    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    /// Look up a variable ignoring ASCII case (Windows semantics).
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k.to_str().is_some_and(|k| k.eq_ignore_ascii_case(key)))
            .and_then(|(_, v)| v.to_str())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` when no variables are present.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// A new map: this snapshot (when `inherit`) with `overrides` applied.
    pub fn merged_with(
        &self,
        overrides: &BTreeMap<String, String>,
        inherit: bool,
    ) -> BTreeMap<OsString, OsString> {
        let mut out = if inherit {
            self.vars.clone()
        } else {
            BTreeMap::new()
        };
        out.extend(
            overrides
                .iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v))),
        );
        out
    }
}
