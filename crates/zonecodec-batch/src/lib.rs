//! # zonecodec-batch
//!
//! Resumable batch pipeline over a paired shapefile dataset.
//!
//! The whole dataset cannot be processed inside one bounded execution
//! window, so an external driver pulls it through in chunks: call
//! `initiate` once for an advisory total, then `process_batch` repeatedly
//! with the returned `next_offset` until `is_complete`. The offset is the
//! only state between calls and it lives on the driver's side — every
//! invocation reopens the streams, replays past the offset, and closes
//! them again.
//!
//! ## Usage
//! ```no_run
//! use std::sync::Arc;
//! use zonecodec_batch::{BatchEngine, BatchRequest};
//! use zonecodec_registry::MemoryRegistry;
//!
//! let registry = Arc::new(MemoryRegistry::new());
//! let engine = BatchEngine::new("zones/z_05mr24", registry.clone(), registry.clone());
//! let mut offset = 0;
//! loop {
//!     let report = engine.process_batch(&BatchRequest::new(offset))?;
//!     offset = report.next_offset;
//!     if report.is_complete {
//!         break;
//!     }
//! }
//! # Ok::<(), zonecodec_core::BatchError>(())
//! ```

pub mod engine;
pub mod request;

pub use engine::BatchEngine;
pub use request::{BatchReport, BatchRequest, InitiateReport};
