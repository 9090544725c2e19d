//! # zonecodec-registry
//!
//! Zone registry for ZoneCodec.
//!
//! ## Pieces
//! 1. **In-Memory Registry** — thread-safe store implementing both
//!    collaborator traits: `ZoneRegistry` lookup and the idempotent
//!    `GeometrySink`
//! 2. **Feed loader** — parses the NWS pipe-delimited county/zone feed,
//!    derives UGC and SAME codes, and registers each zone under its
//!    state-zone key
//!
//! The public-facing API is the trait pair from `zonecodec-core`.

pub mod feed;
pub mod memory;

pub use feed::{FeedRow, FeedStats};
pub use memory::MemoryRegistry;
