//! Attribute stream (`.dbf`) decoder.
//!
//! Layout: a fixed 32-byte header (record count u32 LE at offset 4,
//! header length u16 LE at offset 8), then one 32-byte descriptor per
//! field (name in bytes 0-10, type byte at 11, byte length at 16), a
//! single terminator byte, then fixed-width records. Every record starts
//! with a marker byte: 0x2A flags a deleted row, 0x1A ends the stream.
//!
//! Deleted rows are consumed and discarded here — callers never observe
//! them and they never occupy a logical position. The header's record
//! count is a *physical* count (tombstones included), so termination
//! tracks physical consumption, not the visible rows.

use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use tracing::debug;
use zonecodec_core::{AttributeRecord, AttributeValue, DecodeError, FieldDescriptor, FieldKind};

use crate::read_full;

const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
/// Bytes of header accounting before the descriptors: the 32-byte fixed
/// block plus the terminator byte.
const HEADER_OVERHEAD: u16 = 33;

const MARKER_DELETED: u8 = 0x2A;
const MARKER_EOF: u8 = 0x1A;

/// Parsed fixed header plus field layout of the attribute stream.
#[derive(Debug, Clone)]
pub struct DbfHeader {
    /// Physical record count, deleted rows included. Authoritative upper
    /// bound for iteration.
    pub record_count: u32,
    pub header_length: u16,
    pub fields: Vec<FieldDescriptor>,
}

impl DbfHeader {
    /// Fixed byte width of one record, marker byte included.
    pub fn record_length(&self) -> usize {
        1 + self.fields.iter().map(|f| f.length as usize).sum::<usize>()
    }
}

/// Forward-only reader over the attribute stream.
#[derive(Debug)]
pub struct DbfReader<R> {
    reader: R,
    header: DbfHeader,
    /// Physical records consumed so far (deleted rows included).
    physical_read: u32,
    finished: bool,
    /// Bytes consumed so far, for truncation diagnostics.
    offset: u64,
}

impl DbfReader<BufReader<File>> {
    /// Open a `.dbf` file from disk.
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

impl<R: Read> DbfReader<R> {
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
        let _version = cur.read_u8()?;
        // last-update date, unused
        cur.set_position(4);
        let record_count = cur.read_u32::<LittleEndian>()?;
        let header_length = cur.read_u16::<LittleEndian>()?;

        let field_count = (header_length.saturating_sub(HEADER_OVERHEAD) as usize) / DESCRIPTOR_LEN;
        let mut offset = HEADER_LEN as u64;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let mut desc = [0u8; DESCRIPTOR_LEN];
            let got = read_full(&mut reader, &mut desc)?;
            if got < DESCRIPTOR_LEN {
                return Err(DecodeError::Truncated {
                    offset: offset + got as u64,
                    needed: DESCRIPTOR_LEN,
                    got,
                });
            }
            offset += DESCRIPTOR_LEN as u64;

            let name = String::from_utf8_lossy(&desc[0..11])
                .trim_matches('\0')
                .trim()
                .to_string();
            fields.push(FieldDescriptor {
                name,
                kind: FieldKind::from_code(desc[11]),
                length: desc[16],
            });
        }

        // Single terminator byte (0x0D) after the descriptor block
        let mut term = [0u8; 1];
        read_full(&mut reader, &mut term)?;
        offset += 1;

        debug!(record_count, field_count, "opened attribute stream");

        Ok(Self {
            reader,
            header: DbfHeader {
                record_count,
                header_length,
                fields,
            },
            physical_read: 0,
            finished: false,
            offset,
        })
    }

    pub fn header(&self) -> &DbfHeader {
        &self.header
    }

    /// Authoritative physical record count from the header.
    pub fn record_count(&self) -> u32 {
        self.header.record_count
    }

    /// Decode the next visible record, transparently skipping deleted
    /// rows. Ends at the end-of-stream marker or once the physical
    /// record count is exhausted, whichever comes first.
    pub fn next_record(&mut self) -> Result<Option<AttributeRecord>, DecodeError> {
        loop {
            if self.finished || self.physical_read >= self.header.record_count {
                return Ok(None);
            }

            let mut marker = [0u8; 1];
            if read_full(&mut self.reader, &mut marker)? == 0 {
                self.finished = true;
                return Ok(None);
            }
            self.offset += 1;

            match marker[0] {
                MARKER_EOF => {
                    self.finished = true;
                    return Ok(None);
                }
                MARKER_DELETED => {
                    self.physical_read += 1;
                    self.discard_record_body()?;
                }
                _ => {
                    self.physical_read += 1;
                    return self.read_record_body().map(Some);
                }
            }
        }
    }

    /// Consume and drop the field bytes of a deleted row.
    fn discard_record_body(&mut self) -> Result<(), DecodeError> {
        let body = self.header.record_length() - 1;
        let mut buf = vec![0u8; body];
        let got = read_full(&mut self.reader, &mut buf)?;
        if got < body {
            return Err(DecodeError::Truncated {
                offset: self.offset + got as u64,
                needed: body,
                got,
            });
        }
        self.offset += body as u64;
        Ok(())
    }

    fn read_record_body(&mut self) -> Result<AttributeRecord, DecodeError> {
        let mut record = AttributeRecord::new();
        for field in &self.header.fields {
            let width = field.length as usize;
            let mut raw = vec![0u8; width];
            let got = read_full(&mut self.reader, &mut raw)?;
            if got < width {
                return Err(DecodeError::Truncated {
                    offset: self.offset + got as u64,
                    needed: width,
                    got,
                });
            }
            self.offset += width as u64;
            record.insert(field.name.clone(), coerce(field.kind, &raw));
        }
        Ok(record)
    }
}

/// Trim and coerce one field's raw bytes per its declared type.
fn coerce(kind: FieldKind, raw: &[u8]) -> AttributeValue {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');

    match kind {
        FieldKind::Numeric | FieldKind::Float => {
            if trimmed.is_empty() {
                AttributeValue::Null
            } else {
                trimmed
                    .parse::<f64>()
                    .map(AttributeValue::Number)
                    .unwrap_or(AttributeValue::Null)
            }
        }
        FieldKind::Logical => AttributeValue::Logical(matches!(
            trimmed.to_ascii_uppercase().as_str(),
            "T" | "Y" | "1"
        )),
        FieldKind::Date => {
            if trimmed.len() == 8 && trimmed.is_ascii() {
                AttributeValue::Date(format!(
                    "{}-{}-{}",
                    &trimmed[0..4],
                    &trimmed[4..6],
                    &trimmed[6..8]
                ))
            } else {
                AttributeValue::Text(trimmed.to_string())
            }
        }
        FieldKind::Character => AttributeValue::Text(trimmed.to_string()),
    }
}
