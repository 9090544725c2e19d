//! `import` — load a zone feed, then drive the batch protocol to
//! completion the way the production admin driver does: initiate once,
//! batch with the returned offset until `is_complete`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use zonecodec_batch::{BatchEngine, BatchRequest};
use zonecodec_registry::{feed, MemoryRegistry};

/// Final import summary, printed human-readable or as JSON.
#[derive(Debug, Serialize)]
struct ImportSummary {
    zones_registered: usize,
    total_entries: u64,
    processed: u64,
    updated: u64,
    not_found: u64,
    batches: u64,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    base: &Path,
    feed_path: &Path,
    batch_size: u32,
    simplify: bool,
    tolerance: f64,
    zone_field: &str,
    json: bool,
) -> Result<()> {
    let registry = Arc::new(MemoryRegistry::new());
    let stats = feed::load_feed_path(&registry, feed_path)
        .with_context(|| format!("loading feed {}", feed_path.display()))?;
    info!(
        registered = stats.registered,
        skipped = stats.skipped,
        duplicates = stats.duplicates,
        "zone feed loaded"
    );

    let engine = BatchEngine::new(base, registry.clone(), registry.clone())
        .zone_field(zone_field.to_string());

    let total_entries = engine.initiate()?.total_entries;
    info!(total_entries, "starting import");

    let mut summary = ImportSummary {
        zones_registered: registry.len(),
        total_entries,
        processed: 0,
        updated: 0,
        not_found: 0,
        batches: 0,
    };

    let mut offset = 0u64;
    loop {
        let request = BatchRequest::new(offset)
            .batch_size(batch_size)
            .simplify(simplify)
            .tolerance(tolerance);
        let report = engine.process_batch(&request)?;

        summary.processed += report.processed;
        summary.updated += report.updated;
        summary.not_found += report.not_found;
        summary.batches += 1;
        offset = report.next_offset;

        info!(
            offset,
            total_entries,
            updated = summary.updated,
            not_found = summary.not_found,
            "batch applied"
        );

        if report.is_complete {
            break;
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("zones registered:  {}", summary.zones_registered);
        println!("entries processed: {}", summary.processed);
        println!("zones updated:     {}", summary.updated);
        println!("zones not found:   {}", summary.not_found);
        println!("batches:           {}", summary.batches);
    }
    Ok(())
}
