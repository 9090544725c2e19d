//! End-to-end pipeline tests over synthetic two-file datasets written to
//! disk, driven the way the external driver drives production imports:
//! initiate once, then batch with the returned offset until complete.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zonecodec_batch::{BatchEngine, BatchRequest};
use zonecodec_core::{Coord, GeometrySink, Ring, ZoneHandle, ZoneRecord, ZoneRegistry};
use zonecodec_registry::MemoryRegistry;

// ─── Fixture builders ─────────────────────────────────────────────────────────

fn shp_header(shape_type: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(100);
    out.write_i32::<BigEndian>(9994).unwrap();
    for _ in 0..5 {
        out.write_i32::<BigEndian>(0).unwrap();
    }
    out.write_i32::<BigEndian>(50).unwrap();
    out.write_i32::<LittleEndian>(1000).unwrap();
    out.write_i32::<LittleEndian>(shape_type).unwrap();
    for _ in 0..8 {
        out.write_f64::<LittleEndian>(0.0).unwrap();
    }
    out
}

fn polygon_record(number: i32, rings: &[Vec<(f64, f64)>]) -> Vec<u8> {
    let mut content = Vec::new();
    content.write_i32::<LittleEndian>(5).unwrap();

    let all: Vec<(f64, f64)> = rings.iter().flatten().copied().collect();
    let (mut x_min, mut y_min, mut x_max, mut y_max) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for &(x, y) in &all {
        x_min = x_min.min(x);
        y_min = y_min.min(y);
        x_max = x_max.max(x);
        y_max = y_max.max(y);
    }
    for v in [x_min, y_min, x_max, y_max] {
        content.write_f64::<LittleEndian>(v).unwrap();
    }

    content.write_u32::<LittleEndian>(rings.len() as u32).unwrap();
    content.write_u32::<LittleEndian>(all.len() as u32).unwrap();
    let mut start = 0u32;
    for ring in rings {
        content.write_u32::<LittleEndian>(start).unwrap();
        start += ring.len() as u32;
    }
    for &(x, y) in &all {
        content.write_f64::<LittleEndian>(x).unwrap();
        content.write_f64::<LittleEndian>(y).unwrap();
    }

    let mut out = Vec::new();
    out.write_i32::<BigEndian>(number).unwrap();
    out.write_u32::<BigEndian>((content.len() / 2) as u32).unwrap();
    out.extend(content);
    out
}

/// Attribute stream with a single STATE_ZONE character field.
/// `None` rows are deleted tombstones.
fn dbf_stream(zone_keys: &[Option<&str>]) -> Vec<u8> {
    const FIELD_LEN: usize = 6;
    let mut out = Vec::new();
    out.write_u8(0x03).unwrap();
    out.write_all(&[24, 5, 1]).unwrap();
    out.write_u32::<LittleEndian>(zone_keys.len() as u32).unwrap();
    out.write_u16::<LittleEndian>((32 + 32 + 1) as u16).unwrap();
    out.write_u16::<LittleEndian>((1 + FIELD_LEN) as u16).unwrap();
    out.write_all(&[0u8; 20]).unwrap();

    let mut desc = [0u8; 32];
    desc[..10].copy_from_slice(b"STATE_ZONE");
    desc[11] = b'C';
    desc[16] = FIELD_LEN as u8;
    out.write_all(&desc).unwrap();
    out.write_u8(0x0D).unwrap();

    for key in zone_keys {
        match key {
            None => {
                out.write_u8(0x2A).unwrap();
                out.write_all(&[b' '; FIELD_LEN]).unwrap();
            }
            Some(key) => {
                out.write_u8(b' ').unwrap();
                let mut cell = [b' '; FIELD_LEN];
                cell[..key.len()].copy_from_slice(key.as_bytes());
                out.write_all(&cell).unwrap();
            }
        }
    }
    out.write_u8(0x1A).unwrap();
    out
}

fn diamond() -> Vec<(f64, f64)> {
    vec![
        (-81.0, 27.0),
        (-80.5, 27.5),
        (-80.0, 27.0),
        (-80.5, 26.5),
        (-81.0, 27.0),
    ]
}

/// Write a dataset pairing one polygon per zone key.
fn write_dataset(dir: &TempDir, zone_keys: &[Option<&str>]) -> PathBuf {
    let polygons: Vec<Vec<u8>> = zone_keys
        .iter()
        .filter(|k| k.is_some())
        .enumerate()
        .map(|(i, _)| polygon_record(i as i32 + 1, &[diamond()]))
        .collect();
    write_dataset_with(dir, zone_keys, &polygons)
}

fn write_dataset_with(
    dir: &TempDir,
    zone_keys: &[Option<&str>],
    polygons: &[Vec<u8>],
) -> PathBuf {
    let mut shp = shp_header(5);
    for record in polygons {
        shp.extend_from_slice(record);
    }
    let base = dir.path().join("zones");
    std::fs::write(base.with_extension("shp"), shp).unwrap();
    std::fs::write(base.with_extension("dbf"), dbf_stream(zone_keys)).unwrap();
    base
}

fn registry_with(keys: &[&str]) -> Arc<MemoryRegistry> {
    let registry = Arc::new(MemoryRegistry::new());
    for key in keys {
        registry.register(*key, ZoneRecord::default());
    }
    registry
}

/// Records every `apply_geometry` call for assertions about call counts.
#[derive(Default, Clone)]
struct RecordingSink {
    calls: Arc<Mutex<Vec<(ZoneHandle, Vec<Ring>)>>>,
}

impl RecordingSink {
    fn calls(&self) -> Vec<(ZoneHandle, Vec<Ring>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl GeometrySink for RecordingSink {
    fn apply_geometry(&self, handle: ZoneHandle, rings: Vec<Ring>) {
        self.calls.lock().unwrap().push((handle, rings));
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn initiate_counts_all_entries() {
    let dir = TempDir::new().unwrap();
    let base = write_dataset(&dir, &[Some("FLZ201"), Some("FLZ202"), Some("FLZ203")]);

    let registry = registry_with(&[]);
    let engine = BatchEngine::new(&base, registry.clone(), registry);
    assert_eq!(engine.initiate().unwrap().total_entries, 3);
}

#[test]
fn single_diamond_end_to_end() {
    let dir = TempDir::new().unwrap();
    let base = write_dataset(&dir, &[Some("FLZ201")]);

    let registry = registry_with(&["FLZ201"]);
    let sink = RecordingSink::default();
    let engine = BatchEngine::new(&base, registry.clone(), Arc::new(sink.clone()));

    let report = engine
        .process_batch(&BatchRequest::new(0).batch_size(1))
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.not_found, 0);
    assert_eq!(report.next_offset, 1);
    assert!(report.is_complete);

    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    let expected_handle = registry.find_record("FLZ201").unwrap();
    assert_eq!(calls[0].0, expected_handle);
    assert_eq!(calls[0].1.len(), 1);
    let ring: Vec<(f64, f64)> = calls[0].1[0].iter().map(|c| (c.x, c.y)).collect();
    assert_eq!(ring, diamond());
}

#[test]
fn empty_registry_counts_not_found_and_never_applies() {
    let dir = TempDir::new().unwrap();
    let base = write_dataset(&dir, &[Some("FLZ201")]);

    let registry = registry_with(&[]);
    let sink = RecordingSink::default();
    let engine = BatchEngine::new(&base, registry, Arc::new(sink.clone()));

    let report = engine
        .process_batch(&BatchRequest::new(0).batch_size(1))
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(report.not_found, 1);
    assert!(sink.calls().is_empty());
}

#[test]
fn process_batch_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let base = write_dataset(&dir, &[Some("FLZ201"), Some("FLZ202")]);

    // The registry doubles as the sink: its geometry store is keyed by
    // handle, so re-application cannot duplicate.
    let registry = registry_with(&["FLZ201", "FLZ202"]);
    let engine = BatchEngine::new(&base, registry.clone(), registry.clone());

    let req = BatchRequest::new(0).batch_size(10);
    let first = engine.process_batch(&req).unwrap();
    let second = engine.process_batch(&req).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.updated, 2);
    assert_eq!(registry.geometry_count(), 2);
}

#[test]
fn drives_to_completion_in_chunks() {
    let dir = TempDir::new().unwrap();
    let keys = [Some("FLZ201"), Some("FLZ202"), Some("FLZ203"), Some("FLZ204"), Some("FLZ205")];
    let base = write_dataset(&dir, &keys);

    let registry = registry_with(&["FLZ201", "FLZ202", "FLZ203", "FLZ204", "FLZ205"]);
    let engine = BatchEngine::new(&base, registry.clone(), registry.clone());

    let total = engine.initiate().unwrap().total_entries;
    assert_eq!(total, 5);

    // The driver loop: same shape the production admin driver uses.
    let mut offset = 0;
    let mut batches = 0;
    let mut updated = 0;
    loop {
        let report = engine
            .process_batch(&BatchRequest::new(offset).batch_size(2))
            .unwrap();
        assert_eq!(report.next_offset, offset + report.processed);
        offset = report.next_offset;
        updated += report.updated;
        batches += 1;
        if report.is_complete {
            break;
        }
    }

    assert_eq!(batches, 3); // 2 + 2 + 1
    assert_eq!(offset, 5);
    assert_eq!(updated, 5);
    assert_eq!(registry.geometry_count(), 5);
}

#[test]
fn blank_zone_key_is_processed_but_skipped() {
    let dir = TempDir::new().unwrap();
    let base = write_dataset(&dir, &[Some(""), Some("FLZ202")]);

    let registry = registry_with(&["FLZ202"]);
    let sink = RecordingSink::default();
    let engine = BatchEngine::new(&base, registry, Arc::new(sink.clone()));

    let report = engine.process_batch(&BatchRequest::new(0)).unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.updated, 1);
    assert_eq!(report.not_found, 0);
    assert_eq!(sink.calls().len(), 1);
}

#[test]
fn deleted_attribute_rows_never_surface() {
    let dir = TempDir::new().unwrap();
    // Two live rows around a tombstone; only two polygons exist.
    let base = write_dataset(&dir, &[Some("FLZ201"), None, Some("FLZ202")]);

    let registry = registry_with(&["FLZ201", "FLZ202"]);
    let engine = BatchEngine::new(&base, registry.clone(), registry.clone());

    let report = engine.process_batch(&BatchRequest::new(0)).unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.updated, 2);
    // The second live row keeps its position: both zones got geometry.
    assert!(registry.geometry(registry.find_record("FLZ202").unwrap()).is_some());
}

#[test]
fn simplify_reduces_only_oversized_rings() {
    let dir = TempDir::new().unwrap();

    // A noisy 200-point ring and a small diamond in separate entries.
    let big_ring: Vec<(f64, f64)> = (0..200)
        .map(|i| {
            let t = i as f64 / 199.0 * std::f64::consts::TAU;
            // Radius wobble far below tolerance, so the wobble collapses
            (t.cos() * (1.0 + 1e-6 * (i % 7) as f64), t.sin())
        })
        .collect();
    let polygons = vec![
        polygon_record(1, &[big_ring.clone()]),
        polygon_record(2, &[diamond()]),
    ];
    let base = write_dataset_with(&dir, &[Some("FLZ201"), Some("FLZ202")], &polygons);

    let registry = registry_with(&["FLZ201", "FLZ202"]);
    let engine = BatchEngine::new(&base, registry.clone(), registry.clone());

    let report = engine
        .process_batch(&BatchRequest::new(0).simplify(true).tolerance(0.01))
        .unwrap();
    assert_eq!(report.updated, 2);

    let big = registry
        .geometry(registry.find_record("FLZ201").unwrap())
        .unwrap();
    assert!(big[0].len() < 200, "oversized ring must shrink");
    assert_eq!(big[0].first(), Some(&Coord::new(big_ring[0].0, big_ring[0].1)));
    assert_eq!(
        big[0].last(),
        Some(&Coord::new(big_ring[199].0, big_ring[199].1))
    );

    let small = registry
        .geometry(registry.find_record("FLZ202").unwrap())
        .unwrap();
    assert_eq!(small[0].len(), 5, "small rings pass through untouched");
}

#[test]
fn offset_beyond_end_reports_complete_empty_batch() {
    let dir = TempDir::new().unwrap();
    let base = write_dataset(&dir, &[Some("FLZ201")]);

    let registry = registry_with(&["FLZ201"]);
    let engine = BatchEngine::new(&base, registry.clone(), registry);

    let report = engine.process_batch(&BatchRequest::new(10)).unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.next_offset, 10);
    assert!(report.is_complete);
}

#[test]
fn missing_files_fail_the_call() {
    let dir = TempDir::new().unwrap();
    let registry = registry_with(&[]);
    let engine = BatchEngine::new(dir.path().join("absent"), registry.clone(), registry);

    assert!(engine.initiate().is_err());
    assert!(engine.process_batch(&BatchRequest::new(0)).is_err());
}

#[test]
fn multi_ring_polygon_preserves_ring_order() {
    let dir = TempDir::new().unwrap();
    let outer = diamond();
    let inner = vec![
        (-80.7, 27.0),
        (-80.5, 27.2),
        (-80.3, 27.0),
        (-80.7, 27.0),
    ];
    let polygons = vec![polygon_record(1, &[outer.clone(), inner.clone()])];
    let base = write_dataset_with(&dir, &[Some("FLZ201")], &polygons);

    let registry = registry_with(&["FLZ201"]);
    let engine = BatchEngine::new(&base, registry.clone(), registry.clone());
    engine.process_batch(&BatchRequest::new(0)).unwrap();

    let rings = registry
        .geometry(registry.find_record("FLZ201").unwrap())
        .unwrap();
    assert_eq!(rings.len(), 2);
    assert_eq!(rings[0].len(), outer.len());
    assert_eq!(rings[1].len(), inner.len());
    assert_eq!(rings[1][0], Coord::new(-80.7, 27.0));
}
