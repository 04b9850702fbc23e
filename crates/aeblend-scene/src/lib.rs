//! # aeblend-scene
//!
//! The realized scene snapshot consumed by the aeblend export core: a
//! queryable, fully-materialized description of one composition, covering
//! layers, animatable properties, media sources, and world-transform
//! evaluation.
//!
//! The snapshot replaces the original host's ambient globals with explicit
//! data threaded through pure functions; the export core never talks to a
//! live application.

pub mod composition;
pub mod layer;
pub mod property;
pub mod source;
pub mod transform;
pub mod validate;

pub use composition::Composition;
pub use layer::{Layer, LayerKind, TransformProperties};
pub use property::{
    Expression, InterpolationType, Keyframe, Property, Separation, TemporalEase, ValueType,
};
pub use source::{Source, SourceId, SourceKind};
pub use transform::{world_point, world_transform};
pub use validate::validate_composition;
