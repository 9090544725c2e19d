//! `BatchEngine` — orchestrates resumable, offset-driven processing.

use crate::request::{BatchReport, BatchRequest, InitiateReport};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use zonecodec_core::{BatchError, GeometrySink, Ring, ZoneRegistry};
use zonecodec_shapefile::{DbfReader, EntryCursor, ShpReader};
use zonecodec_simplify::simplify;

/// The attribute field carrying the zone key unless overridden.
pub const DEFAULT_ZONE_FIELD: &str = "STATE_ZONE";

/// Rings at or below this point count are applied as-is even when
/// simplification is requested.
pub const SIMPLIFY_MIN_POINTS: usize = 100;

/// Batch processing engine over one two-file dataset.
///
/// Holds paths, not handles: each call opens both streams, works, and
/// closes them. No state survives between calls.
pub struct BatchEngine {
    base: PathBuf,
    registry: Arc<dyn ZoneRegistry>,
    sink: Arc<dyn GeometrySink>,
    zone_field: String,
}

impl BatchEngine {
    /// Build an engine over the dataset at `base` (with or without the
    /// `.shp` extension), resolving zones through `registry` and writing
    /// through `sink`.
    pub fn new(
        base: impl AsRef<Path>,
        registry: Arc<dyn ZoneRegistry>,
        sink: Arc<dyn GeometrySink>,
    ) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            registry,
            sink,
            zone_field: DEFAULT_ZONE_FIELD.to_string(),
        }
    }

    /// Override the attribute field the zone key is read from.
    pub fn zone_field(mut self, name: impl Into<String>) -> Self {
        self.zone_field = name.into();
        self
    }

    /// Open both streams, count every entry, close them again. The count
    /// is advisory progress information for the driver.
    pub fn initiate(&self) -> Result<InitiateReport, BatchError> {
        let total_entries = self.count_entries()?;
        info!(total_entries, "batch pipeline initiated");
        Ok(InitiateReport { total_entries })
    }

    /// Process one chunk: replay past `req.offset`, consume up to
    /// `req.batch_size` entries, resolve and apply each.
    ///
    /// On error the report is never produced and no offset arithmetic
    /// happens — the driver retries the same offset. Partial sink writes
    /// from the failed call are safe because the sink is idempotent.
    pub fn process_batch(&self, req: &BatchRequest) -> Result<BatchReport, BatchError> {
        let mut cursor = self.open_cursor()?;

        // The streams are forward-only: variable-length records rule out
        // seeking, so continuation replays from the start and discards.
        let mut discarded = 0u64;
        while discarded < req.offset {
            match cursor.next_entry()? {
                Some(_) => discarded += 1,
                None => break,
            }
        }

        let mut processed = 0u64;
        let mut updated = 0u64;
        let mut not_found = 0u64;

        while processed < u64::from(req.batch_size) {
            let Some(entry) = cursor.next_entry()? else {
                break;
            };
            processed += 1;

            let key = entry
                .attributes
                .text(&self.zone_field)
                .map(str::trim)
                .unwrap_or_default();
            if key.is_empty() {
                continue;
            }

            let Some(handle) = self.registry.find_record(key) else {
                debug!(key, index = entry.index, "zone key not registered");
                not_found += 1;
                continue;
            };

            let rings = extract_rings(entry.geometry.rings(), req);
            if rings.is_empty() {
                continue;
            }
            self.sink.apply_geometry(handle, rings);
            updated += 1;
        }

        let next_offset = req.offset + processed;
        // Independent recount for the completion check; the initiate()
        // total is advisory and may be stale by now.
        let total_entries = self.count_entries()?;
        let report = BatchReport {
            processed,
            updated,
            not_found,
            next_offset,
            is_complete: next_offset >= total_entries,
        };

        info!(
            offset = req.offset,
            processed = report.processed,
            updated = report.updated,
            not_found = report.not_found,
            is_complete = report.is_complete,
            "batch complete"
        );
        Ok(report)
    }

    fn open_cursor(
        &self,
    ) -> Result<EntryCursor<BufReader<File>, BufReader<File>>, BatchError> {
        let shp = ShpReader::open(self.base.with_extension("shp")).map_err(|e| {
            BatchError::Decode {
                stream: "geometry",
                source: e,
            }
        })?;
        let dbf = DbfReader::open(self.base.with_extension("dbf")).map_err(|e| {
            BatchError::Decode {
                stream: "attribute",
                source: e,
            }
        })?;
        Ok(EntryCursor::new(shp, dbf))
    }

    fn count_entries(&self) -> Result<u64, BatchError> {
        let mut cursor = self.open_cursor()?;
        let mut count = 0u64;
        while cursor.next_entry()?.is_some() {
            count += 1;
        }
        Ok(count)
    }
}

/// Project the geometry's rings into the sink's coordinate layout,
/// reducing oversized rings when the request asks for it. Ring order and
/// point order are preserved.
fn extract_rings(rings: &[Ring], req: &BatchRequest) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| {
            if req.simplify && ring.len() > SIMPLIFY_MIN_POINTS {
                simplify(ring, req.tolerance)
            } else {
                ring.clone()
            }
        })
        .collect()
}
