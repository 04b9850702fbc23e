use serde::{Deserialize, Serialize};

use crate::property::{Property, ValueType};
use crate::source::SourceId;

/// The animatable transform stack every layer carries. Rotations and
/// orientation are in degrees, scale in percent, position/anchor in
/// composition pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformProperties {
    pub position: Property,
    pub rotation_x: Property,
    pub rotation_y: Property,
    pub rotation_z: Property,
    pub orientation: Property,
    pub anchor_point: Property,
    pub scale: Property,
    pub opacity: Property,
}

impl Default for TransformProperties {
    fn default() -> Self {
        Self {
            position: Property::constant(ValueType::ThreeDSpatial, vec![0.0, 0.0, 0.0]),
            rotation_x: Property::scalar(0.0),
            rotation_y: Property::scalar(0.0),
            rotation_z: Property::scalar(0.0),
            orientation: Property::constant(ValueType::ThreeD, vec![0.0, 0.0, 0.0]),
            anchor_point: Property::constant(ValueType::ThreeDSpatial, vec![0.0, 0.0, 0.0]),
            scale: Property::constant(ValueType::ThreeD, vec![100.0, 100.0, 100.0]),
            opacity: Property::scalar(100.0),
        }
    }
}

/// What kind of layer this is, decided once during the snapshot instead of
/// being re-probed per property the way the original host scripting did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    /// A camera, with its zoom (focal distance in pixels) and, when the
    /// property is active, its point of interest.
    Camera {
        zoom: Property,
        point_of_interest: Option<Property>,
    },
    /// An audio/visual layer referencing a media source.
    AudioVisual {
        source: SourceId,
        null_layer: bool,
    },
    /// Anything else (lights without point of interest, shape layers the
    /// snapshot does not model, ...). Exporting one is a fatal error.
    Other,
}

/// A layer in the composition's scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    /// 1-based index, the stable scene identifier.
    pub index: u32,
    /// Index of the parent layer, if any.
    pub parent: Option<u32>,
    /// In point in seconds.
    pub in_point: f64,
    /// Out point in seconds.
    pub out_point: f64,
    pub enabled: bool,
    /// Whether the layer is part of the host's current selection, frozen
    /// into the snapshot.
    #[serde(default)]
    pub selected: bool,
    pub transform: TransformProperties,
    pub kind: LayerKind,
}

impl Layer {
    /// Create a layer with a default (identity) transform.
    pub fn new(name: impl Into<String>, index: u32, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            index,
            parent: None,
            in_point: 0.0,
            out_point: 0.0,
            enabled: true,
            selected: false,
            transform: TransformProperties::default(),
            kind,
        }
    }

    /// Create a camera layer with a static zoom.
    pub fn camera(name: impl Into<String>, index: u32, zoom: f64) -> Self {
        Self::new(
            name,
            index,
            LayerKind::Camera {
                zoom: Property::scalar(zoom),
                point_of_interest: None,
            },
        )
    }

    /// Create a visual layer referencing a source.
    pub fn av(name: impl Into<String>, index: u32, source: SourceId) -> Self {
        Self::new(
            name,
            index,
            LayerKind::AudioVisual {
                source,
                null_layer: false,
            },
        )
    }

    /// Builder: set the parent layer index.
    pub fn with_parent(mut self, parent: u32) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder: set the in/out span in seconds.
    pub fn with_span(mut self, in_point: f64, out_point: f64) -> Self {
        self.in_point = in_point;
        self.out_point = out_point;
        self
    }

    /// Builder: mark the layer as selected.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Builder: set the position property.
    pub fn with_position(mut self, position: Property) -> Self {
        self.transform.position = position;
        self
    }

    pub fn is_camera(&self) -> bool {
        matches!(self.kind, LayerKind::Camera { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_creation() {
        let layer = Layer::av("bg", 1, SourceId::new("solid-1"));
        assert_eq!(layer.index, 1);
        assert!(layer.parent.is_none());
        assert!(layer.enabled);
        assert!(!layer.selected);
        assert!(!layer.is_camera());
    }

    #[test]
    fn test_camera_builder() {
        let cam = Layer::camera("Camera 1", 2, 1777.7).with_parent(1);
        assert!(cam.is_camera());
        assert_eq!(cam.parent, Some(1));
        match cam.kind {
            LayerKind::Camera { ref zoom, .. } => {
                assert_eq!(zoom.value, vec![1777.7]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_default_transform_is_identity_like() {
        let t = TransformProperties::default();
        assert_eq!(t.scale.value, vec![100.0, 100.0, 100.0]);
        assert_eq!(t.opacity.value, vec![100.0]);
        assert_eq!(t.position.value, vec![0.0, 0.0, 0.0]);
    }
}
