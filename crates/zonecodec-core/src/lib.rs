//! # zonecodec-core
//!
//! Core types and primitives shared across all ZoneCodec crates.
//! The shapefile decoders, the batch engine, and the zone registry are
//! all built on top of the interfaces defined here.

pub mod error;
pub mod geometry;
pub mod record;
pub mod registry;

pub use error::{BatchError, DecodeError, RegistryError};
pub use geometry::{BoundingBox, Coord, Geometry, Ring};
pub use record::{AttributeRecord, AttributeValue, Entry, FieldDescriptor, FieldKind};
pub use registry::{GeometrySink, ZoneHandle, ZoneRecord, ZoneRegistry};
