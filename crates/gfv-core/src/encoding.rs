// SPDX-License-Identifier: MIT OR Apache-2.0
//! Payload text encodings.

use crate::GfvError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text encoding used for payloads sent to and read from external tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum TextEncoding {
    /// UTF-8.
    #[default]
    #[serde(rename = "utf-8", alias = "utf8", alias = "UTF-8")]
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl TextEncoding {
    /// Canonical label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
        }
    }

    /// Strictly decode `bytes`.
    pub fn decode(self, bytes: &[u8]) -> Result<String, GfvError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| GfvError::Decode {
                encoding: self.label(),
                offset: e.utf8_error().valid_up_to(),
            }),
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    /// Decode `bytes`, replacing invalid sequences with U+FFFD.
    pub fn decode_lossy(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// Encode `text`; fails on characters the encoding cannot represent.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, GfvError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 => text
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    u8::try_from(u32::from(c)).map_err(|_| GfvError::Encode {
                        encoding: self.label(),
                        index: i,
                        ch: c,
                    })
                })
                .collect(),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            other => Err(format!("unknown encoding '{other}'")),
        }
    }
}
