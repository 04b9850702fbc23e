use serde::{Deserialize, Serialize};

use crate::layer::Layer;
use crate::source::{Source, SourceId};

/// A fully-materialized composition snapshot: metadata, media sources, and
/// the layer stack. This is the whole world the export core sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixel_aspect: f64,
    pub frame_rate: f64,
    /// Total duration in seconds.
    pub duration: f64,
    /// Work area start in seconds.
    pub work_area_start: f64,
    /// Work area duration in seconds.
    pub work_area_duration: f64,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Composition {
    /// Create an empty composition covering its whole duration as work area.
    pub fn new(name: impl Into<String>, width: u32, height: u32, frame_rate: f64, duration: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixel_aspect: 1.0,
            frame_rate,
            duration,
            work_area_start: 0.0,
            work_area_duration: duration,
            sources: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Add a layer. Layers keep the order they were added in; indices are
    /// the layers' own 1-based scene identifiers, not positions.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Register a media source.
    pub fn add_source(&mut self, source: Source) {
        self.sources.push(source);
    }

    /// Look up a layer by its 1-based scene index.
    pub fn layer_by_index(&self, index: u32) -> Option<&Layer> {
        self.layers.iter().find(|l| l.index == index)
    }

    /// Look up a source by identity.
    pub fn source_by_id(&self, id: &SourceId) -> Option<&Source> {
        self.sources.iter().find(|s| &s.id == id)
    }

    /// The layers currently selected, in stack order.
    pub fn selected_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.selected)
    }

    /// Work area as `[start, end]` in seconds.
    pub fn work_area(&self) -> [f64; 2] {
        [
            self.work_area_start,
            self.work_area_start + self.work_area_duration,
        ]
    }
}
