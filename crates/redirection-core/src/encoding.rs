//! Best-effort decoding of CSV fields whose encoding is unknown.
//!
//! Spreadsheet exports arrive as UTF-8 or as one of the legacy Western
//! single-byte encodings. Fields are tried against an ordered preference
//! list; the first encoding that decodes the bytes without error wins.
//! If none does, the bytes are decoded as lossy UTF-8. Decoding never fails.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// A source encoding the normalizer knows how to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SourceEncoding {
    Utf8,
    /// ISO-8859-1. Every byte maps to the code point of the same value.
    Latin1,
    /// ISO-8859-15.
    Latin9,
    Windows1252,
}

/// UTF-8, then ISO-8859-1, ISO-8859-15 and Windows-1252.
pub const DEFAULT_ENCODINGS: [SourceEncoding; 4] = [
    SourceEncoding::Utf8,
    SourceEncoding::Latin1,
    SourceEncoding::Latin9,
    SourceEncoding::Windows1252,
];

impl SourceEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "iso-8859-1",
            Self::Latin9 => "iso-8859-15",
            Self::Windows1252 => "windows-1252",
        }
    }

    /// Decode strictly. `None` when the bytes are not valid in this encoding.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Self::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes)),
            Self::Latin9 => {
                encoding_rs::ISO_8859_15.decode_without_bom_handling_and_without_replacement(bytes)
            }
            Self::Windows1252 => {
                encoding_rs::WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(Self::Latin1),
            "iso-8859-15" | "latin9" | "latin-9" => Ok(Self::Latin9),
            "windows-1252" | "cp1252" => Ok(Self::Windows1252),
            other => Err(format!(
                "Unknown encoding: '{}'. Must be utf-8, iso-8859-1, iso-8859-15, or windows-1252.",
                other
            )),
        }
    }
}

impl TryFrom<String> for SourceEncoding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Decode `bytes` using the first encoding in `preference` that accepts them.
pub fn decode_field(bytes: &[u8], preference: &[SourceEncoding]) -> String {
    preference
        .iter()
        .find_map(|enc| enc.decode(bytes))
        .unwrap_or_else(|| String::from_utf8_lossy(bytes))
        .into_owned()
}
