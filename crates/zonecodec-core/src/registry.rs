//! The external-collaborator boundary: zone lookup and geometry sink.
//!
//! The batch pipeline never owns zone storage. It resolves each entry's
//! zone key through a `ZoneRegistry` and hands decoded rings to a
//! `GeometrySink`; both live on the caller's side of the boundary.
//! Concrete implementations live in `zonecodec-registry`.

use crate::geometry::Ring;
use serde::{Deserialize, Serialize};

/// Opaque handle to a registered zone record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneHandle(pub u64);

impl std::fmt::Display for ZoneHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}

/// The typed metadata a registered zone carries.
///
/// This is a closed schema, not an open key/value bag: the fields are the
/// ones the NWS county/zone feed defines, validated when the feed is
/// parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Universal Geographic Code, e.g. `TXC121`.
    pub ugc_code: String,
    /// Specific Area Message Encoding code, e.g. `048121`.
    pub same_code: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Zone number within the state.
    pub zone: String,
    /// County Warning Area identifier.
    pub cwa: String,
    pub zone_name: String,
    pub county: String,
    /// Five-digit state+county FIPS code.
    pub fips: String,
    /// `C` for county zones, `Z` for forecast zones.
    pub ugc_type: String,
    pub time_zone: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Zone lookup by exact string key.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so one registry can back
/// concurrent pipelines over different datasets.
pub trait ZoneRegistry: Send + Sync {
    /// Look up a registered zone by its key. The key the pipeline passes
    /// is the shapefile's attribute-embedded zone code, trimmed.
    fn find_record(&self, key: &str) -> Option<ZoneHandle>;
}

/// Idempotent geometry write.
///
/// Re-applying the same rings for the same handle must be safe — the
/// batch protocol retries whole offsets after a failure, so the store is
/// a set keyed by handle, never an append log.
pub trait GeometrySink: Send + Sync {
    fn apply_geometry(&self, handle: ZoneHandle, rings: Vec<Ring>);
}
