//! # zonecodec-shapefile
//!
//! Decoders for the shapefile format family: the binary geometry stream
//! (`.shp`), the fixed-width tabular attribute stream (`.dbf`), and the
//! `EntryCursor` that advances both in lock-step to produce paired
//! entries.
//!
//! Both decoders are forward-only. Record lengths vary per entry (by
//! shape type on the geometry side, by deleted-row tombstones on the
//! attribute side), so there is no random access without a prior full
//! scan — callers that need resumability replay from the start and
//! discard, which is exactly what `zonecodec-batch` does.

pub mod cursor;
pub mod dbf;
pub mod shp;

pub use cursor::EntryCursor;
pub use dbf::{DbfHeader, DbfReader};
pub use shp::{ShpHeader, ShpReader};

use std::io::{self, Read};

/// Read until `buf` is full or the stream ends; returns bytes filled.
/// Unlike `read_exact` a clean EOF is not an error here — callers decide
/// whether a short read means "end of stream" or "truncated".
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
