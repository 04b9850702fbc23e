use std::collections::HashSet;

use aeblend_core::ExportError;

use crate::composition::Composition;
use crate::layer::LayerKind;
use crate::property::Property;

/// Validate a composition snapshot for structural correctness before any
/// export work starts. A host scene graph cannot express most of these
/// defects, but a hand-written snapshot file can.
pub fn validate_composition(comp: &Composition) -> Result<(), Vec<ExportError>> {
    let mut errors = Vec::new();

    if comp.width == 0 || comp.height == 0 {
        errors.push(ExportError::SceneValidation(
            "composition resolution must be non-zero".into(),
        ));
    }
    if comp.frame_rate <= 0.0 {
        errors.push(ExportError::SceneValidation(
            "composition frame rate must be positive".into(),
        ));
    }
    if comp.duration < 0.0 || comp.work_area_duration < 0.0 {
        errors.push(ExportError::SceneValidation(
            "composition durations must be non-negative".into(),
        ));
    }

    let mut indices = HashSet::new();
    for layer in &comp.layers {
        if layer.index == 0 {
            errors.push(ExportError::SceneValidation(format!(
                "layer \"{}\" has index 0; scene indices are 1-based",
                layer.name
            )));
        }
        if !indices.insert(layer.index) {
            errors.push(ExportError::SceneValidation(format!(
                "duplicate layer index {}",
                layer.index
            )));
        }
    }

    for layer in &comp.layers {
        // Parent chain must resolve and terminate.
        let mut visited = HashSet::new();
        visited.insert(layer.index);
        let mut current = layer;
        while let Some(parent_index) = current.parent {
            if !visited.insert(parent_index) {
                errors.push(ExportError::SceneValidation(format!(
                    "parent cycle through layer \"{}\"",
                    layer.name
                )));
                break;
            }
            match comp.layer_by_index(parent_index) {
                Some(parent) => current = parent,
                None => {
                    errors.push(ExportError::SceneValidation(format!(
                        "layer \"{}\" references missing parent index {}",
                        current.name, parent_index
                    )));
                    break;
                }
            }
        }

        if let LayerKind::AudioVisual { source, .. } = &layer.kind {
            if comp.source_by_id(source).is_none() {
                errors.push(ExportError::SceneValidation(format!(
                    "layer \"{}\" references missing source \"{}\"",
                    layer.name, source
                )));
            }
        }

        let tp = &layer.transform;
        let mut properties: Vec<&Property> = vec![
            &tp.position,
            &tp.rotation_x,
            &tp.rotation_y,
            &tp.rotation_z,
            &tp.orientation,
            &tp.anchor_point,
            &tp.scale,
            &tp.opacity,
        ];
        if let LayerKind::Camera {
            zoom,
            point_of_interest,
        } = &layer.kind
        {
            properties.push(zoom);
            if let Some(poi) = point_of_interest {
                properties.push(poi);
            }
        }
        for property in properties {
            validate_property(property, &layer.name, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_property(property: &Property, layer_name: &str, errors: &mut Vec<ExportError>) {
    let mut last = f64::NEG_INFINITY;
    for key in &property.keyframes {
        if !key.time.is_finite() {
            errors.push(ExportError::SceneValidation(format!(
                "non-finite keyframe time on layer \"{layer_name}\""
            )));
            break;
        }
        if key.time < last {
            errors.push(ExportError::SceneValidation(format!(
                "keyframe times must be non-decreasing on layer \"{layer_name}\""
            )));
            break;
        }
        last = key.time;
    }

    for follower in property.followers() {
        if follower.dimensions() > 1 {
            errors.push(ExportError::SeparationFollower(follower.dimensions()));
        }
        validate_property(follower, layer_name, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;
    use crate::property::{Property, ValueType};
    use crate::source::{Source, SourceId};

    fn valid_comp() -> Composition {
        let mut comp = Composition::new("Main", 1920, 1080, 24.0, 10.0);
        comp.add_source(Source::solid(
            SourceId::new("s1"),
            "Solid",
            1920,
            1080,
            [1.0, 0.0, 0.0],
        ));
        comp.add_layer(Layer::av("bg", 1, SourceId::new("s1")));
        comp
    }

    #[test]
    fn test_valid_composition_passes() {
        assert!(validate_composition(&valid_comp()).is_ok());
    }

    #[test]
    fn test_zero_resolution_fails() {
        let mut comp = valid_comp();
        comp.width = 0;
        assert!(validate_composition(&comp).is_err());
    }

    #[test]
    fn test_duplicate_index_fails() {
        let mut comp = valid_comp();
        comp.add_layer(Layer::av("dup", 1, SourceId::new("s1")));
        assert!(validate_composition(&comp).is_err());
    }

    #[test]
    fn test_missing_parent_fails() {
        let mut comp = valid_comp();
        comp.add_layer(Layer::av("child", 2, SourceId::new("s1")).with_parent(42));
        assert!(validate_composition(&comp).is_err());
    }

    #[test]
    fn test_parent_cycle_fails() {
        let mut comp = valid_comp();
        comp.add_layer(Layer::av("a", 2, SourceId::new("s1")).with_parent(3));
        comp.add_layer(Layer::av("b", 3, SourceId::new("s1")).with_parent(2));
        assert!(validate_composition(&comp).is_err());
    }

    #[test]
    fn test_missing_source_fails() {
        let mut comp = valid_comp();
        comp.add_layer(Layer::av("orphan", 2, SourceId::new("nope")));
        assert!(validate_composition(&comp).is_err());
    }

    #[test]
    fn test_wide_separation_follower_fails() {
        let mut comp = valid_comp();
        let bad_follower = Property::constant(ValueType::TwoD, vec![0.0, 0.0]);
        let mut layer = Layer::av("sep", 2, SourceId::new("s1"));
        layer.transform.position = Property::constant(
            ValueType::TwoDSpatial,
            vec![0.0, 0.0],
        )
        .separated_into(vec![Property::scalar(0.0), bad_follower]);
        comp.add_layer(layer);
        let errors = validate_composition(&comp).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ExportError::SeparationFollower(2))));
    }
}
