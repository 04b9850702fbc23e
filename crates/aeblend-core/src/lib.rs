//! # aeblend-core
//!
//! Core types and primitives for the aeblend exporter.
//! This crate contains foundational types shared across all aeblend crates:
//! frame ranges, time-range policies, affine math, and error types.

pub mod error;
pub mod math;
pub mod time;

pub use error::{ExportError, ExportResult};
pub use math::{Matrix3x4, Vec3};
pub use time::{resolve_frame_range, FrameRange, TimeRangePolicy};
