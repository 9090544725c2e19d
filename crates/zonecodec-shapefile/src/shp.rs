//! Geometry stream (`.shp`) decoder.
//!
//! Layout: a fixed 100-byte header (magic file code 9994 big-endian at
//! offset 0, shape type i32 little-endian at offset 32), then sequential
//! variable-length records. Each record carries an 8-byte big-endian
//! header — record number, then content length in 16-bit words — followed
//! by exactly that many content bytes. Record content is little-endian.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use tracing::debug;
use zonecodec_core::{BoundingBox, Coord, DecodeError, Geometry, Ring};

use crate::read_full;

/// The magic file code every geometry stream starts with (0x0000270A).
pub const FILE_CODE: i32 = 9994;

const HEADER_LEN: usize = 100;
const RECORD_HEADER_LEN: usize = 8;

const SHAPE_NULL: i32 = 0;
const SHAPE_POINT: i32 = 1;
const SHAPE_POLYLINE: i32 = 3;
const SHAPE_POLYGON: i32 = 5;

/// Parsed fixed header of the geometry stream.
///
/// The declared file length is informational only — iteration is driven
/// by record headers and end-of-stream, never by this value.
#[derive(Debug, Clone)]
pub struct ShpHeader {
    /// File-level declared shape type. Per-record types may legally
    /// differ from this only for Null records.
    pub shape_type: i32,
    /// Declared total file length in 16-bit words.
    pub file_length_words: i32,
    pub bbox: BoundingBox,
}

/// Forward-only reader over the geometry stream.
#[derive(Debug)]
pub struct ShpReader<R> {
    reader: R,
    header: ShpHeader,
    /// Bytes consumed so far, for truncation diagnostics.
    offset: u64,
}

impl ShpReader<BufReader<File>> {
    /// Open a `.shp` file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DecodeError::NotFound {
                path: path.to_path_buf(),
            },
            _ => DecodeError::Io(e),
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read> ShpReader<R> {
    /// Wrap an arbitrary byte stream positioned at the start of the file.
    pub fn from_reader(mut reader: R) -> Result<Self, DecodeError> {
        let mut raw = [0u8; HEADER_LEN];
        let got = read_full(&mut reader, &mut raw)?;
        if got < HEADER_LEN {
            return Err(DecodeError::Truncated {
                offset: got as u64,
                needed: HEADER_LEN,
                got,
            });
        }

        let mut cur = Cursor::new(&raw[..]);
        let file_code = cur.read_i32::<BigEndian>()?;
        if file_code != FILE_CODE {
            return Err(DecodeError::InvalidMagic { found: file_code });
        }

        // Five reserved big-endian words
        for _ in 0..5 {
            cur.read_i32::<BigEndian>()?;
        }
        let file_length_words = cur.read_i32::<BigEndian>()?;
        let _version = cur.read_i32::<LittleEndian>()?;
        let shape_type = cur.read_i32::<LittleEndian>()?;
        let bbox = BoundingBox {
            x_min: cur.read_f64::<LittleEndian>()?,
            y_min: cur.read_f64::<LittleEndian>()?,
            x_max: cur.read_f64::<LittleEndian>()?,
            y_max: cur.read_f64::<LittleEndian>()?,
        };
        // z/m ranges occupy the rest of the header; nothing here uses them.

        debug!(shape_type, file_length_words, "opened geometry stream");

        Ok(Self {
            reader,
            header: ShpHeader {
                shape_type,
                file_length_words,
                bbox,
            },
            offset: HEADER_LEN as u64,
        })
    }

    pub fn header(&self) -> &ShpHeader {
        &self.header
    }

    /// Decode the next shape record.
    ///
    /// Returns `Ok(None)` when the stream ends exactly at a record
    /// boundary. A record header or content cut short is `Truncated` —
    /// a hard stop, not skippable, because nothing downstream of a
    /// short record can be framed.
    pub fn next_record(&mut self) -> Result<Option<Geometry>, DecodeError> {
        let mut head = [0u8; RECORD_HEADER_LEN];
        let got = read_full(&mut self.reader, &mut head)?;
        if got == 0 {
            return Ok(None);
        }
        if got < RECORD_HEADER_LEN {
            return Err(DecodeError::Truncated {
                offset: self.offset,
                needed: RECORD_HEADER_LEN,
                got,
            });
        }

        let mut cur = Cursor::new(&head[..]);
        let _record_number = cur.read_i32::<BigEndian>()?;
        let content_words = cur.read_u32::<BigEndian>()?;
        let content_len = content_words as usize * 2;
        self.offset += RECORD_HEADER_LEN as u64;

        let mut content = vec![0u8; content_len];
        let got = read_full(&mut self.reader, &mut content)?;
        if got < content_len {
            return Err(DecodeError::Truncated {
                offset: self.offset,
                needed: content_len,
                got,
            });
        }
        let record_offset = self.offset;
        self.offset += content_len as u64;

        parse_record(&content, record_offset).map(Some)
    }
}

/// Parse one record's content bytes into a `Geometry`.
fn parse_record(content: &[u8], record_offset: u64) -> Result<Geometry, DecodeError> {
    let truncated = |cur: &Cursor<&[u8]>, needed: usize| DecodeError::Truncated {
        offset: record_offset + cur.position(),
        needed,
        got: content.len().saturating_sub(cur.position() as usize),
    };

    let mut cur = Cursor::new(content);
    if content.len() < 4 {
        return Err(truncated(&cur, 4));
    }
    let shape_type = cur.read_i32::<LittleEndian>()?;

    match shape_type {
        SHAPE_NULL => Ok(Geometry::Null),
        SHAPE_POINT => {
            if content.len() < 4 + 16 {
                return Err(truncated(&cur, 16));
            }
            let x = cur.read_f64::<LittleEndian>()?;
            let y = cur.read_f64::<LittleEndian>()?;
            Ok(Geometry::Point { x, y })
        }
        SHAPE_POLYLINE | SHAPE_POLYGON => {
            // bbox + part count + point count
            if content.len() < 4 + 32 + 8 {
                return Err(truncated(&cur, 40));
            }
            let bbox = BoundingBox {
                x_min: cur.read_f64::<LittleEndian>()?,
                y_min: cur.read_f64::<LittleEndian>()?,
                x_max: cur.read_f64::<LittleEndian>()?,
                y_max: cur.read_f64::<LittleEndian>()?,
            };
            let num_parts = cur.read_u32::<LittleEndian>()? as usize;
            let num_points = cur.read_u32::<LittleEndian>()? as usize;

            // Frame check before allocating anything count-sized.
            let needed = num_parts
                .saturating_mul(4)
                .saturating_add(num_points.saturating_mul(16));
            let remaining = content.len() - cur.position() as usize;
            if remaining < needed {
                return Err(truncated(&cur, needed));
            }

            let mut parts = Vec::with_capacity(num_parts);
            for _ in 0..num_parts {
                parts.push(cur.read_u32::<LittleEndian>()?);
            }
            let mut points = Vec::with_capacity(num_points);
            for _ in 0..num_points {
                let x = cur.read_f64::<LittleEndian>()?;
                let y = cur.read_f64::<LittleEndian>()?;
                points.push(Coord::new(x, y));
            }

            let rings = expand_rings(&parts, &points);
            if shape_type == SHAPE_POLYGON {
                Ok(Geometry::Polygon { bbox, rings })
            } else {
                Ok(Geometry::PolyLine { bbox, rings })
            }
        }
        other => {
            debug!(shape_type = other, "unrecognized shape type, passing through");
            Ok(Geometry::Unknown { shape_type: other })
        }
    }
}

/// Expand the flat point array into distinct rings using the part-start
/// index array. Ring `i` spans `[parts[i], parts[i+1])`; the last ring
/// runs to the point count. Malformed indices clamp to the point array
/// rather than aborting the record.
fn expand_rings(parts: &[u32], points: &[Coord]) -> Vec<Ring> {
    let n = points.len();
    let mut rings = Vec::with_capacity(parts.len());
    for (i, &start) in parts.iter().enumerate() {
        let start = (start as usize).min(n);
        let end = parts
            .get(i + 1)
            .map(|&e| (e as usize).min(n))
            .unwrap_or(n);
        if start >= end {
            continue;
        }
        rings.push(points[start..end].to_vec());
    }
    rings
}
