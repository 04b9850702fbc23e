//! Baked transform export: flatten a layer's full transform chain (parents
//! included) into one world-space affine matrix per supersampled frame.

use aeblend_core::{ExportResult, Matrix3x4, Vec3};
use aeblend_scene::{world_point, Composition, Layer};

use crate::document::BakedTransform;
use crate::sampler::resolve_range;
use crate::settings::ExportSettings;

/// Export a layer's transform as dense world-space matrix samples.
///
/// Each sample recovers the affine matrix from the world-space images of the
/// four standard basis points `(0,0,0), (1,0,0), (0,1,0), (0,0,1)`, the
/// only transform query the original host exposed. With `centered_camera`
/// set, camera translations are re-origined from the composition's top-left
/// corner to its center.
pub fn export_baked_transform(
    comp: &Composition,
    layer: &Layer,
    settings: &ExportSettings,
) -> ExportResult<BakedTransform> {
    let range = resolve_range(comp, layer, settings);
    let supersampling = settings.effective_supersampling();
    let recenter = settings.centered_camera && layer.is_camera();

    let mut keyframes = Vec::with_capacity(range.sample_count(supersampling));
    for frame in range.sample_frames(supersampling) {
        let t = frame / comp.frame_rate;
        let p0 = world_point(comp, layer, Vec3::zero(), t)?;
        let p1 = world_point(comp, layer, Vec3::new(1.0, 0.0, 0.0), t)?;
        let p2 = world_point(comp, layer, Vec3::new(0.0, 1.0, 0.0), t)?;
        let p3 = world_point(comp, layer, Vec3::new(0.0, 0.0, 1.0), t)?;
        let mut matrix = Matrix3x4::from_basis_points(p0, p1, p2, p3);
        if recenter {
            matrix.0[3] -= comp.width as f64 / 2.0;
            matrix.0[7] -= comp.height as f64 / 2.0;
        }
        keyframes.push(matrix);
    }

    Ok(BakedTransform {
        start_frame: range.start,
        supersampling,
        keyframes,
    })
}
