//! Lock-step pairing of the geometry and attribute streams.
//!
//! One logical entry is one geometry record plus one attribute record at
//! the same sequence position. The cursor is the only way to advance:
//! both decoders move together, never independently.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zonecodec_core::{DecodeError, Entry};

use crate::{DbfReader, ShpReader};

/// Paired forward-only cursor over a two-file dataset.
pub struct EntryCursor<G, A> {
    shp: ShpReader<G>,
    dbf: DbfReader<A>,
    index: u64,
}

impl EntryCursor<BufReader<File>, BufReader<File>> {
    /// Open both files from a base path. Accepts the base name with or
    /// without the `.shp` extension; the attribute file is the sibling
    /// `.dbf`.
    pub fn open(base: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let base = base.as_ref();
        let shp = ShpReader::open(base.with_extension("shp"))?;
        let dbf = DbfReader::open(base.with_extension("dbf"))?;
        Ok(Self::new(shp, dbf))
    }
}

impl<G: Read, A: Read> EntryCursor<G, A> {
    pub fn new(shp: ShpReader<G>, dbf: DbfReader<A>) -> Self {
        Self { shp, dbf, index: 0 }
    }

    pub fn shp_header(&self) -> &crate::ShpHeader {
        self.shp.header()
    }

    pub fn dbf_header(&self) -> &crate::DbfHeader {
        self.dbf.header()
    }

    /// Zero-based position of the next entry to be produced.
    pub fn position(&self) -> u64 {
        self.index
    }

    /// Produce the next paired entry, or `None` when either stream ends.
    ///
    /// A length mismatch between the two streams is tolerated by
    /// truncating to the shorter one — real-world datasets diverge
    /// slightly when malformed, and that is not worth aborting over.
    pub fn next_entry(&mut self) -> Result<Option<Entry>, DecodeError> {
        let geometry = match self.shp.next_record()? {
            Some(g) => g,
            None => return Ok(None),
        };
        let attributes = match self.dbf.next_record()? {
            Some(a) => a,
            None => return Ok(None),
        };

        let entry = Entry {
            index: self.index,
            geometry,
            attributes,
        };
        self.index += 1;
        Ok(Some(entry))
    }
}

impl<G: Read, A: Read> Iterator for EntryCursor<G, A> {
    type Item = Result<Entry, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbf::tests::dbf_bytes;
    use crate::shp::tests::{header_bytes, point_content, poly_content, record_bytes};
    use std::io::Cursor;
    use zonecodec_core::Geometry;

    const FIELDS: &[(&str, u8, u8)] = &[("STATE_ZONE", b'C', 6), ("NAME", b'C', 12)];

    fn shp_with_points(coords: &[(f64, f64)]) -> Vec<u8> {
        let mut bytes = header_bytes(1);
        for (i, &(x, y)) in coords.iter().enumerate() {
            bytes.extend(record_bytes(i as i32 + 1, &point_content(x, y)));
        }
        bytes
    }

    fn cursor_over(shp: Vec<u8>, dbf: Vec<u8>) -> EntryCursor<Cursor<Vec<u8>>, Cursor<Vec<u8>>> {
        EntryCursor::new(
            ShpReader::from_reader(Cursor::new(shp)).unwrap(),
            DbfReader::from_reader(Cursor::new(dbf)).unwrap(),
        )
    }

    #[test]
    fn pairs_records_in_file_order() {
        let shp = shp_with_points(&[(1.0, 1.0), (2.0, 2.0)]);
        let dbf = dbf_bytes(
            FIELDS,
            &[
                Some(vec!["FLZ201", "Alpha"]),
                Some(vec!["FLZ202", "Bravo"]),
            ],
            true,
        );
        let mut cursor = cursor_over(shp, dbf);

        let first = cursor.next_entry().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.geometry, Geometry::Point { x: 1.0, y: 1.0 });
        assert_eq!(first.attributes.text("STATE_ZONE"), Some("FLZ201"));

        let second = cursor.next_entry().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.attributes.text("NAME"), Some("Bravo"));

        assert!(cursor.next_entry().unwrap().is_none());
    }

    #[test]
    fn truncates_to_shorter_stream() {
        // Three geometries, two attribute rows: the third geometry is
        // silently dropped, not an error.
        let shp = shp_with_points(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let dbf = dbf_bytes(
            FIELDS,
            &[Some(vec!["FLZ201", "A"]), Some(vec!["FLZ202", "B"])],
            true,
        );
        let count = cursor_over(shp, dbf).map(Result::unwrap).count();
        assert_eq!(count, 2);

        // And the other way around
        let shp = shp_with_points(&[(1.0, 1.0)]);
        let dbf = dbf_bytes(
            FIELDS,
            &[Some(vec!["FLZ201", "A"]), Some(vec!["FLZ202", "B"])],
            true,
        );
        let count = cursor_over(shp, dbf).map(Result::unwrap).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn deleted_attribute_rows_do_not_shift_pairing() {
        let shp = shp_with_points(&[(1.0, 1.0), (2.0, 2.0)]);
        let dbf = dbf_bytes(
            FIELDS,
            &[
                Some(vec!["FLZ201", "A"]),
                None, // tombstone
                Some(vec!["FLZ202", "B"]),
            ],
            true,
        );
        let mut cursor = cursor_over(shp, dbf);
        let first = cursor.next_entry().unwrap().unwrap();
        let second = cursor.next_entry().unwrap().unwrap();
        assert_eq!(first.attributes.text("STATE_ZONE"), Some("FLZ201"));
        assert_eq!(second.attributes.text("STATE_ZONE"), Some("FLZ202"));
        assert_eq!(second.geometry, Geometry::Point { x: 2.0, y: 2.0 });
    }

    #[test]
    fn polygon_entries_carry_rings() {
        let mut shp = header_bytes(5);
        let diamond = [
            (-81.0, 27.0),
            (-80.5, 27.5),
            (-80.0, 27.0),
            (-80.5, 26.5),
            (-81.0, 27.0),
        ];
        shp.extend(record_bytes(1, &poly_content(5, &[0], &diamond)));
        let dbf = dbf_bytes(FIELDS, &[Some(vec!["FLZ201", "Diamond"])], true);

        let mut cursor = cursor_over(shp, dbf);
        let entry = cursor.next_entry().unwrap().unwrap();
        assert_eq!(entry.geometry.rings().len(), 1);
        assert_eq!(entry.geometry.rings()[0].len(), 5);
    }

    #[test]
    fn iterator_drains_like_next_entry() {
        let shp = shp_with_points(&[(1.0, 1.0), (2.0, 2.0)]);
        let dbf = dbf_bytes(
            FIELDS,
            &[Some(vec!["FLZ201", "A"]), Some(vec!["FLZ202", "B"])],
            true,
        );
        let entries: Vec<Entry> = cursor_over(shp, dbf).map(Result::unwrap).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 1);
    }
}
