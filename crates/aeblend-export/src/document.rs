//! The JSON interchange document. Field names here are the wire format the
//! Blender importer reads, so every struct pins its casing explicitly.

use aeblend_core::Matrix3x4;
use serde::{Deserialize, Serialize};

/// Interchange format version. Importers refuse documents with a different
/// version, so this only moves on breaking wire changes.
pub const FILE_VERSION: u32 = 3;

/// The root of an export: the flattened layer records, the deduplicated
/// media sources they reference, and the composition metadata needed to
/// interpret both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub layers: Vec<LayerRecord>,
    pub sources: Vec<SourceRecord>,
    pub comp: CompRecord,
    /// Whether layer transforms were flattened to world-space matrices.
    pub transforms_baked: bool,
    pub version: u32,
}

/// Composition metadata carried alongside the layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompRecord {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixel_aspect: f64,
    pub frame_rate: f64,
    /// Work area as `[start, end]` in seconds.
    pub work_area: [f64; 2],
}

/// A deduplicated media source. Layers reference sources by position in the
/// document's `sources` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(flatten)]
    pub kind: SourceRecordKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceRecordKind {
    Solid { color: [f64; 3] },
    File { file: String },
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerTypeTag {
    Camera,
    Av,
}

/// One exported layer. Which optional fields are present depends on the
/// layer type and on whether transforms were baked; absent fields are
/// omitted from the document entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: LayerTypeTag,
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<u32>,
    pub in_frame: f64,
    pub out_frame: f64,
    pub enabled: bool,

    /// World-space matrix samples; present when transforms are baked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<BakedTransform>,

    // Per-channel transform properties; present when transforms are kept
    // native.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<ExportedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_x: Option<ExportedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_y: Option<ExportedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_z: Option<ExportedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<ExportedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_point: Option<ExportedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ExportedProperty>,

    // Camera-only fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ExportedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fov: Option<FovRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_of_interest: Option<ExportedProperty>,

    // Audio/visual-only fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<ExportedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_layer: Option<bool>,
}

impl LayerRecord {
    /// A record with only the fields every layer carries; the walker fills
    /// in the type-specific rest.
    pub fn new(
        name: impl Into<String>,
        layer_type: LayerTypeTag,
        index: u32,
        parent_index: Option<u32>,
        in_frame: f64,
        out_frame: f64,
        enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            layer_type,
            index,
            parent_index,
            in_frame,
            out_frame,
            enabled,
            transform: None,
            position: None,
            rotation_x: None,
            rotation_y: None,
            rotation_z: None,
            orientation: None,
            anchor_point: None,
            scale: None,
            zoom: None,
            fov: None,
            point_of_interest: None,
            source: None,
            opacity: None,
            null_layer: None,
        }
    }
}

/// An exported property: one channel record per scalar dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedProperty {
    pub num_dimensions: usize,
    pub channels: Vec<PropertyChannel>,
}

/// One scalar channel of an exported property, in one of the three forms
/// the sampler can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyChannel {
    Bezier(BezierChannel),
    Calculated(CalculatedChannel),
    Static(StaticChannel),
}

impl PropertyChannel {
    pub fn fixed(value: f64) -> Self {
        PropertyChannel::Static(StaticChannel {
            is_keyframed: false,
            value,
        })
    }

    pub fn bezier(keyframes: Vec<BezierKeyframe>) -> Self {
        PropertyChannel::Bezier(BezierChannel {
            is_keyframed: true,
            keyframes_format: KeyframesFormat::Bezier,
            keyframes,
        })
    }

    pub fn calculated(start_frame: i64, supersampling: u32, keyframes: Vec<f64>) -> Self {
        PropertyChannel::Calculated(CalculatedChannel {
            is_keyframed: true,
            keyframes_format: KeyframesFormat::Calculated,
            start_frame,
            supersampling,
            keyframes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyframesFormat {
    Bezier,
    Calculated,
}

/// A channel whose value never changes over the export range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticChannel {
    pub is_keyframed: bool,
    pub value: f64,
}

/// A channel exported as native bezier keyframes, curve shape intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BezierChannel {
    pub is_keyframed: bool,
    pub keyframes_format: KeyframesFormat,
    pub keyframes: Vec<BezierKeyframe>,
}

/// A channel flattened to dense per-sample values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedChannel {
    pub is_keyframed: bool,
    pub keyframes_format: KeyframesFormat,
    pub start_frame: i64,
    pub supersampling: u32,
    pub keyframes: Vec<f64>,
}

/// The interpolation of one side of a keyframe, as the importer names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationKind {
    Linear,
    Bezier,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EasePoint {
    pub speed: f64,
    pub influence: f64,
}

/// One native keyframe on one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BezierKeyframe {
    /// Time in seconds.
    pub time: f64,
    pub value: f64,
    pub ease_in: EasePoint,
    pub ease_out: EasePoint,
    pub interpolation_in: InterpolationKind,
    pub interpolation_out: InterpolationKind,
}

/// A baked layer transform: one world-space matrix per supersampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakedTransform {
    pub start_frame: i64,
    pub supersampling: u32,
    pub keyframes: Vec<Matrix3x4>,
}

/// A camera's angle of view, static when zoom is static, otherwise baked
/// per supersampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FovRecord {
    Static(f64),
    Baked(FovBaked),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FovBaked {
    pub start_frame: i64,
    pub supersampling: u32,
    pub keyframes: Vec<f64>,
}
