//! World-transform evaluation: the snapshot's version of the host's
//! world-space point projection capability.

use std::collections::HashSet;

use aeblend_core::{ExportError, ExportResult, Matrix3x4, Vec3};

use crate::composition::Composition;
use crate::layer::Layer;

fn vec3_padded(values: &[f64], fill: f64) -> Vec3 {
    Vec3::new(
        values.first().copied().unwrap_or(fill),
        values.get(1).copied().unwrap_or(fill),
        values.get(2).copied().unwrap_or(fill),
    )
}

/// The layer's own transform at time `t` (seconds), parents excluded.
///
/// Composition order, innermost first: anchor offset, scale, rotation
/// (X, then Y, then Z), orientation (likewise X/Y/Z), position.
pub fn layer_transform(layer: &Layer, t: f64) -> Matrix3x4 {
    let tp = &layer.transform;

    let position = vec3_padded(&tp.position.value_at_time(t), 0.0);
    let anchor = vec3_padded(&tp.anchor_point.value_at_time(t), 0.0);
    let scale_pct = vec3_padded(&tp.scale.value_at_time(t), 100.0);
    let orientation = vec3_padded(&tp.orientation.value_at_time(t), 0.0);
    let rx = tp.rotation_x.value_at_time(t).first().copied().unwrap_or(0.0);
    let ry = tp.rotation_y.value_at_time(t).first().copied().unwrap_or(0.0);
    let rz = tp.rotation_z.value_at_time(t).first().copied().unwrap_or(0.0);

    let scale = Vec3::new(scale_pct.x / 100.0, scale_pct.y / 100.0, scale_pct.z / 100.0);
    let neg_anchor = Vec3::new(-anchor.x, -anchor.y, -anchor.z);

    Matrix3x4::translation(position)
        .compose(&Matrix3x4::rotation_z(orientation.z))
        .compose(&Matrix3x4::rotation_y(orientation.y))
        .compose(&Matrix3x4::rotation_x(orientation.x))
        .compose(&Matrix3x4::rotation_z(rz))
        .compose(&Matrix3x4::rotation_y(ry))
        .compose(&Matrix3x4::rotation_x(rx))
        .compose(&Matrix3x4::scale(scale))
        .compose(&Matrix3x4::translation(neg_anchor))
}

/// The layer's full transform at time `t`, parent chain included.
pub fn world_transform(comp: &Composition, layer: &Layer, t: f64) -> ExportResult<Matrix3x4> {
    let mut matrix = layer_transform(layer, t);
    let mut visited: HashSet<u32> = HashSet::new();
    visited.insert(layer.index);

    let mut current = layer;
    while let Some(parent_index) = current.parent {
        if !visited.insert(parent_index) {
            return Err(ExportError::SceneValidation(format!(
                "parent cycle through layer index {parent_index}"
            )));
        }
        let parent = comp.layer_by_index(parent_index).ok_or_else(|| {
            ExportError::SceneValidation(format!(
                "layer \"{}\" references missing parent index {parent_index}",
                current.name
            ))
        })?;
        matrix = layer_transform(parent, t).compose(&matrix);
        current = parent;
    }
    Ok(matrix)
}

/// Evaluate the world-space image of a point in the layer's local space;
/// `offset` is a basis offset vector such as `(1, 0, 0)`.
pub fn world_point(comp: &Composition, layer: &Layer, offset: Vec3, t: f64) -> ExportResult<Vec3> {
    Ok(world_transform(comp, layer, t)?.apply(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;
    use crate::property::{Keyframe, Property, ValueType};
    use crate::source::SourceId;

    fn comp_with(layers: Vec<Layer>) -> Composition {
        let mut comp = Composition::new("Test", 1920, 1080, 24.0, 10.0);
        for layer in layers {
            comp.add_layer(layer);
        }
        comp
    }

    fn positioned(name: &str, index: u32, pos: [f64; 3]) -> Layer {
        Layer::av(name, index, SourceId::new("s"))
            .with_position(Property::constant(ValueType::ThreeDSpatial, pos.to_vec()))
    }

    #[test]
    fn test_identity_layer_world_point() {
        let comp = comp_with(vec![positioned("a", 1, [0.0, 0.0, 0.0])]);
        let layer = comp.layer_by_index(1).unwrap();
        let p = world_point(&comp, layer, Vec3::new(1.0, 0.0, 0.0), 0.0).unwrap();
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!((p.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_parent_translation_composes() {
        let parent = positioned("parent", 1, [100.0, 0.0, 0.0]);
        let child = positioned("child", 2, [10.0, 20.0, 0.0]).with_parent(1);
        let comp = comp_with(vec![parent, child]);
        let child = comp.layer_by_index(2).unwrap();
        let p = world_point(&comp, child, Vec3::zero(), 0.0).unwrap();
        assert!((p.x - 110.0).abs() < 1e-9);
        assert!((p.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_parent_rotation_rotates_child_position() {
        let mut parent = positioned("parent", 1, [0.0, 0.0, 0.0]);
        parent.transform.rotation_z = Property::scalar(90.0);
        let child = positioned("child", 2, [1.0, 0.0, 0.0]).with_parent(1);
        let comp = comp_with(vec![parent, child]);
        let child = comp.layer_by_index(2).unwrap();
        let p = world_point(&comp, child, Vec3::zero(), 0.0).unwrap();
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_is_percent() {
        let mut layer = positioned("a", 1, [0.0, 0.0, 0.0]);
        layer.transform.scale = Property::constant(ValueType::ThreeD, vec![200.0, 50.0, 100.0]);
        let comp = comp_with(vec![layer]);
        let layer = comp.layer_by_index(1).unwrap();
        let p = world_point(&comp, layer, Vec3::new(1.0, 1.0, 1.0), 0.0).unwrap();
        assert!((p.x - 2.0).abs() < 1e-9);
        assert!((p.y - 0.5).abs() < 1e-9);
        assert!((p.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_animated_position_changes_world_point() {
        let layer = Layer::av("a", 1, SourceId::new("s")).with_position(
            Property::constant(ValueType::ThreeDSpatial, vec![0.0, 0.0, 0.0]).with_keyframes(
                vec![
                    Keyframe::new(0.0, vec![0.0, 0.0, 0.0]),
                    Keyframe::new(1.0, vec![10.0, 0.0, 0.0]),
                ],
            ),
        );
        let comp = comp_with(vec![layer]);
        let layer = comp.layer_by_index(1).unwrap();
        let at_half = world_point(&comp, layer, Vec3::zero(), 0.5).unwrap();
        assert!((at_half.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_parent_is_an_error() {
        let child = positioned("child", 1, [0.0, 0.0, 0.0]).with_parent(99);
        let comp = comp_with(vec![child]);
        let child = comp.layer_by_index(1).unwrap();
        assert!(world_point(&comp, child, Vec3::zero(), 0.0).is_err());
    }

    #[test]
    fn test_parent_cycle_is_an_error() {
        let a = positioned("a", 1, [0.0, 0.0, 0.0]).with_parent(2);
        let b = positioned("b", 2, [0.0, 0.0, 0.0]).with_parent(1);
        let comp = comp_with(vec![a, b]);
        let a = comp.layer_by_index(1).unwrap();
        assert!(world_transform(&comp, a, 0.0).is_err());
    }
}
