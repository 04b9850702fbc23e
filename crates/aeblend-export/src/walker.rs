//! The layer graph walker: decides which layers an export covers, walks them
//! in order, and assembles the final document.

use std::collections::HashSet;
use std::f64::consts::PI;

use aeblend_core::{ExportError, ExportResult};
use aeblend_scene::{Composition, Layer, LayerKind, Source, SourceId, SourceKind};

use crate::baked::export_baked_transform;
use crate::document::{
    CompRecord, ExportDocument, FovBaked, FovRecord, LayerRecord, LayerTypeTag, SourceRecord,
    SourceRecordKind, FILE_VERSION,
};
use crate::sampler::{resolve_range, sample_property};
use crate::settings::ExportSettings;

/// Export a composition to an interchange document.
///
/// Layer selection: all layers in ascending index order, or, with
/// `selected_only`, the selected layers plus every ancestor they transform
/// through. If transforms are baked instead, the parents are
/// already flattened into the selected layers' matrices and stay out of the
/// document.
pub fn export_composition(
    comp: &Composition,
    settings: &ExportSettings,
) -> ExportResult<ExportDocument> {
    let layers = collect_layers(comp, settings)?;
    tracing::info!(
        comp = %comp.name,
        layers = layers.len(),
        baked = settings.bake_transforms,
        range = %settings.time_range,
        "exporting composition"
    );

    let mut document = ExportDocument {
        layers: Vec::with_capacity(layers.len()),
        sources: Vec::new(),
        comp: CompRecord {
            name: comp.name.clone(),
            width: comp.width,
            height: comp.height,
            pixel_aspect: comp.pixel_aspect,
            frame_rate: comp.frame_rate,
            work_area: comp.work_area(),
        },
        transforms_baked: settings.bake_transforms,
        version: FILE_VERSION,
    };

    let mut exported_source_ids: Vec<SourceId> = Vec::new();
    for layer in layers {
        tracing::debug!(layer = %layer.name, index = layer.index, "exporting layer");
        let record = export_layer(
            comp,
            layer,
            settings,
            &mut exported_source_ids,
            &mut document.sources,
        )
        .map_err(|e| ExportError::for_layer(&layer.name, e))?;
        document.layers.push(record);
    }

    Ok(document)
}

/// The layers this export covers, in the order they are exported.
fn collect_layers<'a>(
    comp: &'a Composition,
    settings: &ExportSettings,
) -> ExportResult<Vec<&'a Layer>> {
    if !settings.selected_only {
        let mut all: Vec<&Layer> = comp.layers.iter().collect();
        all.sort_by_key(|l| l.index);
        return Ok(all);
    }

    let mut included: HashSet<u32> = HashSet::new();
    let mut out: Vec<&Layer> = Vec::new();
    for layer in comp.selected_layers() {
        if included.insert(layer.index) {
            out.push(layer);
        }
        if settings.bake_transforms {
            continue;
        }
        // Pull in the ancestors the native transform channels reference.
        // A layer already included brought its own ancestors with it.
        let mut current = layer;
        while let Some(parent_index) = current.parent {
            let ancestor = comp.layer_by_index(parent_index).ok_or_else(|| {
                ExportError::SceneValidation(format!(
                    "layer \"{}\" references missing parent index {parent_index}",
                    current.name
                ))
            })?;
            if !included.insert(parent_index) {
                break;
            }
            out.push(ancestor);
            current = ancestor;
        }
    }
    Ok(out)
}

fn export_layer(
    comp: &Composition,
    layer: &Layer,
    settings: &ExportSettings,
    exported_source_ids: &mut Vec<SourceId>,
    sources: &mut Vec<SourceRecord>,
) -> ExportResult<LayerRecord> {
    let layer_type = match &layer.kind {
        LayerKind::Camera { .. } => LayerTypeTag::Camera,
        LayerKind::AudioVisual { .. } => LayerTypeTag::Av,
        LayerKind::Other => return Err(ExportError::UnsupportedLayer(layer.name.clone())),
    };

    let mut record = LayerRecord::new(
        &layer.name,
        layer_type,
        layer.index,
        layer.parent,
        layer.in_point * comp.frame_rate,
        layer.out_point * comp.frame_rate,
        layer.enabled,
    );

    let tp = &layer.transform;
    if settings.bake_transforms {
        record.transform = Some(export_baked_transform(comp, layer, settings)?);
    } else {
        record.position = Some(sample_property(&tp.position, comp, layer, settings)?);
        record.rotation_x = Some(sample_property(&tp.rotation_x, comp, layer, settings)?);
        record.rotation_y = Some(sample_property(&tp.rotation_y, comp, layer, settings)?);
        record.rotation_z = Some(sample_property(&tp.rotation_z, comp, layer, settings)?);
        record.orientation = Some(sample_property(&tp.orientation, comp, layer, settings)?);
    }

    match &layer.kind {
        LayerKind::Camera {
            zoom,
            point_of_interest,
        } => {
            record.zoom = Some(sample_property(zoom, comp, layer, settings)?);
            record.fov = Some(export_fov(comp, layer, zoom, settings));
            if !settings.bake_transforms {
                if let Some(poi) = point_of_interest {
                    record.point_of_interest = Some(sample_property(poi, comp, layer, settings)?);
                }
            }
        }
        LayerKind::AudioVisual { source, null_layer } => {
            let source = comp.source_by_id(source).ok_or_else(|| {
                ExportError::SceneValidation(format!("missing source \"{source}\""))
            })?;
            record.source = Some(intern_source(source, exported_source_ids, sources));
            if !settings.bake_transforms {
                record.anchor_point = Some(sample_property(&tp.anchor_point, comp, layer, settings)?);
                record.scale = Some(sample_property(&tp.scale, comp, layer, settings)?);
            }
            record.opacity = Some(sample_property(&tp.opacity, comp, layer, settings)?);
            record.null_layer = Some(*null_layer);
        }
        LayerKind::Other => {}
    }

    Ok(record)
}

/// Deduplicate sources by identity: a source already in the document gets
/// its existing position, a new one is appended.
fn intern_source(
    source: &Source,
    exported_source_ids: &mut Vec<SourceId>,
    sources: &mut Vec<SourceRecord>,
) -> usize {
    if let Some(position) = exported_source_ids.iter().position(|id| id == &source.id) {
        return position;
    }
    exported_source_ids.push(source.id.clone());
    sources.push(SourceRecord {
        name: source.name.clone(),
        width: source.width,
        height: source.height,
        kind: match &source.kind {
            SourceKind::Solid { color } => SourceRecordKind::Solid { color: *color },
            SourceKind::File { path } => SourceRecordKind::File {
                file: path.to_string_lossy().into_owned(),
            },
            SourceKind::Unknown => SourceRecordKind::Unknown,
        },
    });
    exported_source_ids.len() - 1
}

/// Convert a camera zoom (focal distance in pixels) to a horizontal angle of
/// view in degrees.
pub fn zoom_to_angle(comp_width: u32, zoom: f64) -> f64 {
    ((comp_width as f64 / zoom) / 2.0).atan() * (360.0 / PI)
}

/// A camera's angle of view: a single number for a static zoom, per-sample
/// values otherwise.
fn export_fov(
    comp: &Composition,
    layer: &Layer,
    zoom: &aeblend_scene::Property,
    settings: &ExportSettings,
) -> FovRecord {
    if !zoom.is_time_varying() {
        let z = zoom.value.first().copied().unwrap_or(0.0);
        return FovRecord::Static(zoom_to_angle(comp.width, z));
    }
    let range = resolve_range(comp, layer, settings);
    let supersampling = settings.effective_supersampling();
    let keyframes = range
        .sample_frames(supersampling)
        .map(|frame| {
            let z = zoom
                .value_at_time(frame / comp.frame_rate)
                .first()
                .copied()
                .unwrap_or(0.0);
            zoom_to_angle(comp.width, z)
        })
        .collect();
    FovRecord::Baked(FovBaked {
        start_frame: range.start,
        supersampling,
        keyframes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeblend_scene::{Keyframe, Property, ValueType};

    fn comp_with_sources() -> Composition {
        let mut comp = Composition::new("Main", 1920, 1080, 24.0, 1.0);
        comp.add_source(Source::solid(
            SourceId::new("solid-1"),
            "Red Solid",
            1920,
            1080,
            [1.0, 0.0, 0.0],
        ));
        comp.add_source(Source::file(
            SourceId::new("clip-1"),
            "clip.mov",
            1280,
            720,
            "/footage/clip.mov",
        ));
        comp
    }

    #[test]
    fn test_all_layers_exported_in_index_order() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::av("b", 2, SourceId::new("solid-1")));
        comp.add_layer(Layer::av("a", 1, SourceId::new("clip-1")));
        let document = export_composition(&comp, &ExportSettings::default()).unwrap();
        let names: Vec<_> = document.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(document.version, FILE_VERSION);
        assert!(!document.transforms_baked);
    }

    #[test]
    fn test_sources_deduplicated_by_identity() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::av("a", 1, SourceId::new("solid-1")));
        comp.add_layer(Layer::av("b", 2, SourceId::new("solid-1")));
        comp.add_layer(Layer::av("c", 3, SourceId::new("clip-1")));
        let document = export_composition(&comp, &ExportSettings::default()).unwrap();
        assert_eq!(document.sources.len(), 2);
        assert_eq!(document.layers[0].source, Some(0));
        assert_eq!(document.layers[1].source, Some(0));
        assert_eq!(document.layers[2].source, Some(1));
        // Every referenced index is in bounds.
        for layer in &document.layers {
            assert!(layer.source.unwrap() < document.sources.len());
        }
    }

    #[test]
    fn test_selected_only_pulls_in_ancestors() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::av("grandparent", 1, SourceId::new("solid-1")));
        comp.add_layer(Layer::av("parent", 2, SourceId::new("solid-1")).with_parent(1));
        comp.add_layer(
            Layer::av("child", 3, SourceId::new("solid-1"))
                .with_parent(2)
                .with_selected(true),
        );
        comp.add_layer(Layer::av("unrelated", 4, SourceId::new("solid-1")));
        let settings = ExportSettings {
            selected_only: true,
            ..ExportSettings::default()
        };
        let document = export_composition(&comp, &settings).unwrap();
        let mut names: Vec<_> = document.layers.iter().map(|l| l.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["child", "grandparent", "parent"]);
    }

    #[test]
    fn test_selected_only_baked_skips_ancestors() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::av("parent", 1, SourceId::new("solid-1")));
        comp.add_layer(
            Layer::av("child", 2, SourceId::new("solid-1"))
                .with_parent(1)
                .with_selected(true),
        );
        let settings = ExportSettings {
            selected_only: true,
            bake_transforms: true,
            ..ExportSettings::default()
        };
        let document = export_composition(&comp, &settings).unwrap();
        assert_eq!(document.layers.len(), 1);
        assert_eq!(document.layers[0].name, "child");
        assert!(document.layers[0].transform.is_some());
        assert!(document.layers[0].position.is_none());
    }

    #[test]
    fn test_shared_ancestor_appears_once() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::av("parent", 1, SourceId::new("solid-1")));
        comp.add_layer(
            Layer::av("a", 2, SourceId::new("solid-1"))
                .with_parent(1)
                .with_selected(true),
        );
        comp.add_layer(
            Layer::av("b", 3, SourceId::new("solid-1"))
                .with_parent(1)
                .with_selected(true),
        );
        let settings = ExportSettings {
            selected_only: true,
            ..ExportSettings::default()
        };
        let document = export_composition(&comp, &settings).unwrap();
        let parents = document
            .layers
            .iter()
            .filter(|l| l.name == "parent")
            .count();
        assert_eq!(parents, 1);
        assert_eq!(document.layers.len(), 3);
    }

    #[test]
    fn test_selected_layer_with_missing_parent_is_an_error() {
        let mut comp = comp_with_sources();
        comp.add_layer(
            Layer::av("orphan", 1, SourceId::new("solid-1"))
                .with_parent(42)
                .with_selected(true),
        );
        let settings = ExportSettings {
            selected_only: true,
            ..ExportSettings::default()
        };
        let err = export_composition(&comp, &settings).unwrap_err();
        assert!(matches!(err, ExportError::SceneValidation(_)));
        assert!(err.to_string().contains("missing parent index 42"));
    }

    #[test]
    fn test_unknown_layer_type_is_fatal_and_named() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::new("mystery", 1, LayerKind::Other));
        let err = export_composition(&comp, &ExportSettings::default()).unwrap_err();
        match err {
            ExportError::Layer { name, source } => {
                assert_eq!(name, "mystery");
                assert!(matches!(*source, ExportError::UnsupportedLayer(_)));
            }
            other => panic!("expected layer error, got {other:?}"),
        }
    }

    #[test]
    fn test_camera_record_fields() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::camera("cam", 1, 960.0));
        let document = export_composition(&comp, &ExportSettings::default()).unwrap();
        let cam = &document.layers[0];
        assert_eq!(cam.layer_type, LayerTypeTag::Camera);
        assert!(cam.zoom.is_some());
        assert!(cam.source.is_none());
        assert!(cam.opacity.is_none());
        // zoom == width/2 means the half-angle is atan(1) = 45 degrees.
        match cam.fov {
            Some(FovRecord::Static(fov)) => assert!((fov - 90.0).abs() < 1e-9),
            ref other => panic!("expected static fov, got {other:?}"),
        }
    }

    #[test]
    fn test_animated_zoom_bakes_fov() {
        let mut comp = comp_with_sources();
        let mut cam = Layer::camera("cam", 1, 960.0);
        if let LayerKind::Camera { zoom, .. } = &mut cam.kind {
            *zoom = Property::scalar(960.0).with_keyframes(vec![
                Keyframe::new(0.0, vec![960.0]),
                Keyframe::new(1.0, vec![1920.0]),
            ]);
        }
        comp.add_layer(cam);
        let document = export_composition(&comp, &ExportSettings::default()).unwrap();
        match &document.layers[0].fov {
            Some(FovRecord::Baked(baked)) => {
                assert_eq!(baked.keyframes.len(), 24);
                assert!((baked.keyframes[0] - 90.0).abs() < 1e-9);
                // Zoom is increasing, so the angle of view narrows.
                assert!(baked.keyframes[23] < baked.keyframes[0]);
            }
            other => panic!("expected baked fov, got {other:?}"),
        }
    }

    #[test]
    fn test_native_export_keeps_anchor_and_scale_for_av_only() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::av("a", 1, SourceId::new("solid-1")));
        comp.add_layer(Layer::camera("cam", 2, 960.0));
        let document = export_composition(&comp, &ExportSettings::default()).unwrap();
        let av = &document.layers[0];
        assert!(av.anchor_point.is_some());
        assert!(av.scale.is_some());
        assert!(av.null_layer == Some(false));
        let cam = &document.layers[1];
        assert!(cam.anchor_point.is_none());
        assert!(cam.scale.is_none());
        assert!(cam.null_layer.is_none());
    }

    #[test]
    fn test_export_is_deterministic() {
        let mut comp = comp_with_sources();
        comp.add_layer(Layer::av("a", 1, SourceId::new("solid-1")).with_position(
            Property::constant(ValueType::ThreeDSpatial, vec![1.0, 2.0, 3.0]).with_keyframes(
                vec![
                    Keyframe::new(0.0, vec![0.0, 0.0, 0.0]),
                    Keyframe::new(1.0, vec![5.0, 5.0, 5.0]),
                ],
            ),
        ));
        comp.add_layer(Layer::camera("cam", 2, 1234.5));
        let settings = ExportSettings {
            bake_transforms: true,
            supersampling: 2,
            ..ExportSettings::default()
        };
        let a = serde_json::to_string(&export_composition(&comp, &settings).unwrap()).unwrap();
        let b = serde_json::to_string(&export_composition(&comp, &settings).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
