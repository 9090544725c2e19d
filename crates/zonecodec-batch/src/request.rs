//! Batch request and report types.
//!
//! A request is the whole job state: the continuation offset, the chunk
//! size, and the simplification flags, passed by value into every call.
//! Nothing about a job lives inside the engine.

use serde::{Deserialize, Serialize};

/// Entries per call when the driver does not say otherwise.
pub const DEFAULT_BATCH_SIZE: u32 = 50;

/// Simplification tolerance in decimal degrees when the driver does not
/// say otherwise. Small relative to zone feature size, so the planar
/// approximation holds.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// One batch invocation's parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Entries already consumed by prior calls. Owned and persisted by
    /// the external driver, never by the engine.
    pub offset: u64,
    /// Maximum entries to consume in this call.
    pub batch_size: u32,
    /// Whether to reduce large rings before applying them.
    pub simplify: bool,
    /// Douglas–Peucker tolerance used when `simplify` is set.
    pub tolerance: f64,
}

impl BatchRequest {
    pub fn new(offset: u64) -> Self {
        Self {
            offset,
            batch_size: DEFAULT_BATCH_SIZE,
            simplify: false,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn batch_size(mut self, n: u32) -> Self {
        self.batch_size = n;
        self
    }

    pub fn simplify(mut self, on: bool) -> Self {
        self.simplify = on;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Advisory total reported by `initiate`. Progress information for the
/// driver, not used for correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiateReport {
    pub total_entries: u64,
}

/// Outcome of one `process_batch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Entries consumed by this call (zone key present or not).
    pub processed: u64,
    /// Entries whose zone was found and geometry applied.
    pub updated: u64,
    /// Entries whose zone key had no registered record.
    pub not_found: u64,
    /// The offset the driver should pass next.
    pub next_offset: u64,
    /// Whether the dataset is exhausted at `next_offset`.
    pub is_complete: bool,
}
