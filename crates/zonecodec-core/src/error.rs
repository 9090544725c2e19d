//! Error types for the ZoneCodec decode pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding the geometry or attribute stream.
///
/// Per-record anomalies that the format tolerates (an unrecognized shape
/// type code, a malformed part index) are NOT errors — they surface as
/// `Geometry::Unknown` or clamped rings and the stream keeps going.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("invalid shapefile magic: expected 9994, found {found}")]
    InvalidMagic { found: i32 },

    #[error("truncated stream at byte {offset}: needed {needed} bytes, got {got}")]
    Truncated {
        offset: u64,
        needed: usize,
        got: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a batch pipeline invocation.
///
/// A failed call reports the error and performs no offset arithmetic, so
/// the external driver can retry the same offset.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("decode failed in {stream} stream: {source}")]
    Decode {
        /// Which stream failed: "geometry" or "attribute" — or "entry"
        /// when the failure cannot be attributed to one side.
        stream: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("{0}")]
    Other(String),
}

impl From<DecodeError> for BatchError {
    fn from(source: DecodeError) -> Self {
        BatchError::Decode {
            stream: "entry",
            source,
        }
    }
}

/// Errors from the zone registry and the delimited feed loader.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("malformed feed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
