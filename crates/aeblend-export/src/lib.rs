//! # aeblend-export
//!
//! The export engine: turns a composition snapshot plus export settings into
//! the portable JSON interchange document the Blender importer consumes.
//!
//! The engine is a one-shot batch transform: the document is assembled in
//! memory in a single synchronous pass and serialized once at the end, so a
//! failure partway through a walk never leaves a partial document behind.

pub mod baked;
pub mod document;
pub mod sampler;
pub mod settings;
pub mod walker;

pub use baked::export_baked_transform;
pub use document::{
    BakedTransform, BezierChannel, BezierKeyframe, CalculatedChannel, CompRecord, EasePoint,
    ExportDocument, ExportedProperty, FovBaked, FovRecord, InterpolationKind, KeyframesFormat,
    LayerRecord, LayerTypeTag, PropertyChannel, SourceRecord, SourceRecordKind, StaticChannel,
    FILE_VERSION,
};
pub use sampler::{sample_property, unenum_interpolation};
pub use settings::{read_settings_file, write_settings_file, ExportSettings, SETTINGS_VERSION};
pub use walker::{export_composition, zoom_to_angle};
