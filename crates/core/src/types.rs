//! Identifier and height types
//!
//! This module defines the foundational scalar types shared by every record:
//! - Height: revision-aware block height keying consensus states
//! - Identifier validation for client, connection, port and channel ids

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Maximum identifier length accepted by [`validate_identifier`]
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Block height with revision number
///
/// Ordered first by revision number, then by revision height.
/// Rendered as `"{revision_number}-{revision_height}"`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Height {
    /// Revision (chain upgrade epoch)
    pub revision_number: u64,
    /// Height within the revision
    pub revision_height: u64,
}

impl Height {
    /// Create a new height
    pub fn new(revision_number: u64, revision_height: u64) -> Self {
        Height {
            revision_number,
            revision_height,
        }
    }

    /// True for the zero height
    pub fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

impl FromStr for Height {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, height) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidOperation(format!("invalid height: {s:?}")))?;
        let revision_number = number
            .parse::<u64>()
            .map_err(|e| Error::InvalidOperation(format!("invalid revision number {number:?}: {e}")))?;
        let revision_height = height
            .parse::<u64>()
            .map_err(|e| Error::InvalidOperation(format!("invalid revision height {height:?}: {e}")))?;
        Ok(Height::new(revision_number, revision_height))
    }
}

/// Validate a client, connection, port or channel identifier
///
/// Identifiers become path segments of store keys, so they must be
/// non-empty, at most [`MAX_IDENTIFIER_LEN`] bytes, and restricted to
/// ASCII alphanumerics plus `. _ + - # [ ] < >`.
pub fn validate_identifier(id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::InvalidOperation("identifier cannot be empty".into()));
    }
    if id.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::InvalidOperation(format!(
            "identifier {id:?} exceeds {MAX_IDENTIFIER_LEN} bytes"
        )));
    }
    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || ".-_+#[]<>".contains(*c)))
    {
        return Err(Error::InvalidOperation(format!(
            "identifier {id:?} contains invalid character {c:?}"
        )));
    }
    Ok(())
}
