//! Status file format detection
//!
//! OpenVPN writes three incompatible status layouts. They are told apart by
//! the first bytes of the file:
//!
//! - `TITLE,` - server, status version 2 (comma separated)
//! - `TITLE\t` - server, status version 3 (tab separated)
//! - `OpenVPN STATISTICS` - client statistics block

use crate::error::{ExporterError, Result};

/// Number of leading bytes inspected by [`detect`]
pub const PREFIX_LEN: usize = 18;

/// Layout of a status source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFormat {
    ServerV2,
    ServerV3,
    Client,
}

impl StatusFormat {
    /// Field separator used by this layout
    pub fn separator(self) -> char {
        match self {
            StatusFormat::ServerV3 => '\t',
            StatusFormat::ServerV2 | StatusFormat::Client => ',',
        }
    }
}

/// Classifies a status source from its leading bytes
///
/// Only the first [`PREFIX_LEN`] bytes are looked at; anything beyond is ignored.
pub fn detect(prefix: &[u8]) -> Result<StatusFormat> {
    let prefix = &prefix[..prefix.len().min(PREFIX_LEN)];

    if prefix.starts_with(b"TITLE,") {
        Ok(StatusFormat::ServerV2)
    } else if prefix.starts_with(b"TITLE\t") {
        Ok(StatusFormat::ServerV3)
    } else if prefix.starts_with(b"OpenVPN STATISTICS") {
        Ok(StatusFormat::Client)
    } else {
        Err(ExporterError::UnrecognizedFormat(
            String::from_utf8_lossy(prefix).into_owned(),
        ))
    }
}
