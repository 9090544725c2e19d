//! `info`, `count`, and `dump` — the read-only inspection commands.

use anyhow::{Context, Result};
use std::path::Path;
use zonecodec_shapefile::{DbfReader, EntryCursor, ShpReader};

pub fn info(base: &Path) -> Result<()> {
    let shp = ShpReader::open(base.with_extension("shp"))
        .with_context(|| format!("opening {}", base.with_extension("shp").display()))?;
    let header = shp.header();
    println!("geometry stream");
    println!("  declared shape type: {}", header.shape_type);
    println!("  declared length:     {} words", header.file_length_words);
    println!(
        "  bbox:                ({}, {}) .. ({}, {})",
        header.bbox.x_min, header.bbox.y_min, header.bbox.x_max, header.bbox.y_max
    );

    let dbf = DbfReader::open(base.with_extension("dbf"))
        .with_context(|| format!("opening {}", base.with_extension("dbf").display()))?;
    let header = dbf.header();
    println!("attribute stream");
    println!("  physical records:    {}", header.record_count);
    println!("  record width:        {} bytes", header.record_length());
    println!("  fields:");
    for field in &header.fields {
        println!(
            "    {:<11} {:?} ({} bytes)",
            field.name, field.kind, field.length
        );
    }
    Ok(())
}

pub fn count(base: &Path) -> Result<()> {
    let mut cursor = EntryCursor::open(base)?;
    let mut entries = 0u64;
    while cursor.next_entry()?.is_some() {
        entries += 1;
    }
    println!("{entries}");
    Ok(())
}

pub fn dump(base: &Path, limit: u64, json: bool) -> Result<()> {
    let mut cursor = EntryCursor::open(base)?;
    let mut shown = 0u64;
    while shown < limit {
        let Some(entry) = cursor.next_entry()? else {
            break;
        };
        if json {
            println!("{}", serde_json::to_string(&entry)?);
        } else {
            print!("#{} {}", entry.index, entry.geometry);
            for (name, value) in entry.attributes.iter() {
                print!("  {name}={value:?}");
            }
            println!();
        }
        shown += 1;
    }
    Ok(())
}
