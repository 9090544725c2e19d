//! NWS county/zone feed parsing.
//!
//! The feed is pipe-delimited text, one zone per line:
//!
//! ```text
//! STATE|ZONE|CWA|NAME|STATE_ZONE|COUNTY|FIPS|TIME_ZONE|FE_AREA|LAT|LON
//! ```
//!
//! Two code systems derive from each row:
//! - **UGC**: `STATE + TYPE + last three FIPS digits` (type is the
//!   uppercased first character of FE_AREA, defaulting to `C` for
//!   county), e.g. `TXC121`
//! - **SAME**: `0 + state FIPS + county code`, e.g. `048121`
//!
//! Zones are registered under the row's STATE_ZONE value — the same key
//! the shapefile's attribute records embed, which is the authoritative
//! link between the two feeds. The derived codes are carried as display
//! metadata on the record.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use zonecodec_core::{RegistryError, ZoneRecord};

use crate::memory::MemoryRegistry;

/// Minimum field count for a usable feed line.
const MIN_FIELDS: usize = 11;

/// One parsed feed row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRow {
    pub state: String,
    pub zone: String,
    pub cwa: String,
    pub zone_name: String,
    pub state_zone: String,
    pub county: String,
    pub fips: String,
    pub time_zone: String,
    pub fe_area: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl FeedRow {
    /// Parse one line. Returns `None` for blank lines, short lines, and
    /// rows whose FIPS is not exactly five digits — the feed carries
    /// headers and marine rows this importer does not use, and those are
    /// skipped rather than rejected.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < MIN_FIELDS {
            return None;
        }

        let fips = fields[6].trim();
        if fips.len() != 5 || !fips.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            state: fields[0].trim().to_string(),
            zone: fields[1].trim().to_string(),
            cwa: fields[2].trim().to_string(),
            zone_name: fields[3].trim().to_string(),
            state_zone: fields[4].trim().to_string(),
            county: fields[5].trim().to_string(),
            fips: fips.to_string(),
            time_zone: fields[7].trim().to_string(),
            fe_area: fields[8].trim().to_string(),
            lat: fields[9].trim().parse().ok(),
            lon: fields[10].trim().parse().ok(),
        })
    }

    /// `C` for county zones unless FE_AREA names another type.
    pub fn ugc_type(&self) -> char {
        self.fe_area
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('C')
    }

    /// Universal Geographic Code: STATE + TYPE + last three FIPS digits.
    pub fn ugc_code(&self) -> String {
        format!("{}{}{}", self.state, self.ugc_type(), &self.fips[2..5])
    }

    /// SAME code: leading zero + state FIPS + county code.
    pub fn same_code(&self) -> String {
        format!("0{}", self.fips)
    }

    pub fn into_zone_record(self) -> ZoneRecord {
        let ugc_code = self.ugc_code();
        let same_code = self.same_code();
        ZoneRecord {
            ugc_code,
            same_code,
            ugc_type: self.ugc_type().to_string(),
            state: self.state,
            zone: self.zone,
            cwa: self.cwa,
            zone_name: self.zone_name,
            county: self.county,
            fips: self.fips,
            time_zone: self.time_zone,
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Outcome of a feed load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedStats {
    /// Lines seen, blank lines included.
    pub total_lines: usize,
    /// Zones newly registered.
    pub registered: usize,
    /// Lines skipped (blank, short, or bad FIPS).
    pub skipped: usize,
    /// Valid rows whose key was already registered.
    pub duplicates: usize,
}

/// Parse `text` and register every valid row in `registry`.
pub fn load_feed(registry: &MemoryRegistry, text: &str) -> FeedStats {
    let mut stats = FeedStats::default();

    for line in text.lines() {
        stats.total_lines += 1;
        let Some(row) = FeedRow::parse(line) else {
            stats.skipped += 1;
            continue;
        };

        let key = row.state_zone.clone();
        if registry.contains(&key) {
            stats.duplicates += 1;
            debug!(key = %key, "duplicate zone key in feed");
            continue;
        }
        registry.register(key, row.into_zone_record());
        stats.registered += 1;
    }

    info!(
        registered = stats.registered,
        skipped = stats.skipped,
        duplicates = stats.duplicates,
        "feed load complete"
    );
    stats
}

/// Load a feed file from disk into `registry`.
pub fn load_feed_path(
    registry: &MemoryRegistry,
    path: impl AsRef<Path>,
) -> Result<FeedStats, RegistryError> {
    let text = std::fs::read_to_string(path)?;
    Ok(load_feed(registry, &text))
}
