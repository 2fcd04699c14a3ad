//! EPC payload to `TagId` decoding.
//!
//! A reader reports a tag's EPC as hex digit pairs. Each pair is one byte
//! and each byte becomes the character with that code point, so the id can
//! carry any value 0-255 and still travel as text.

use crate::error::DecodeError;
use hex::FromHexError;
use std::fmt;

/// Canonical identifier of a physical tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(String);

impl TagId {
    /// Build an id from raw bytes, one character per byte.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.iter().map(|&b| char::from(b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The byte values this id was decoded from.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Every char was built from a single byte.
        self.0.chars().map(|c| c as u32 as u8).collect()
    }

    /// Uppercase hex rendering, the inverse of [`decode`].
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.to_bytes())
    }

    /// Number of bytes (and characters) in the id.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Ids are usually printable ("0042") but need not be.
        if self.0.chars().all(|c| c.is_ascii_graphic()) {
            f.write_str(&self.0)
        } else {
            write!(f, "0x{}", self.to_hex())
        }
    }
}

impl From<TagId> for String {
    fn from(id: TagId) -> Self {
        id.0
    }
}

/// Decode a hex EPC payload into a `TagId`.
pub fn decode(raw: &str) -> Result<TagId, DecodeError> {
    let raw = strip_quotes(raw.trim());
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = hex::decode(raw).map_err(|e| match e {
        FromHexError::InvalidHexCharacter { c, index } => DecodeError::InvalidHex {
            offset: index,
            found: c,
        },
        FromHexError::OddLength | FromHexError::InvalidStringLength => {
            DecodeError::OddLength(raw.len())
        }
    })?;

    Ok(TagId::from_bytes(&bytes))
}

// Some drivers hand back the EPC wrapped in one pair of quotes.
fn strip_quotes(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = raw.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    raw
}
