//! The property sampler: decides, per property, between copying native
//! keyframes verbatim, flattening to dense samples, and emitting a static
//! value, then fills the per-channel records.

use aeblend_core::{resolve_frame_range, ExportError, ExportResult, FrameRange};
use aeblend_scene::{Composition, InterpolationType, Layer, Property, TemporalEase, ValueType};

use crate::document::{
    BezierKeyframe, EasePoint, ExportedProperty, InterpolationKind, PropertyChannel,
};
use crate::settings::ExportSettings;

/// The frame range this layer's sampled channels cover under the settings'
/// time-range policy.
pub(crate) fn resolve_range(
    comp: &Composition,
    layer: &Layer,
    settings: &ExportSettings,
) -> FrameRange {
    resolve_frame_range(
        settings.time_range,
        comp.duration,
        (comp.work_area_start, comp.work_area_duration),
        (layer.in_point, layer.out_point),
        comp.frame_rate,
    )
}

/// Map a host interpolation code to the importer's name for it.
pub fn unenum_interpolation(code: InterpolationType) -> ExportResult<InterpolationKind> {
    if code == InterpolationType::LINEAR {
        Ok(InterpolationKind::Linear)
    } else if code == InterpolationType::BEZIER {
        Ok(InterpolationKind::Bezier)
    } else if code == InterpolationType::HOLD {
        Ok(InterpolationKind::Hold)
    } else {
        Err(ExportError::CouldNotUnenum(code.0))
    }
}

/// Export one property into its per-channel document form.
///
/// Channel choice, most specific first:
/// 1. a separated leader recurses into its 1-D followers, one per axis;
/// 2. a time-varying property with plain (non-spatial) dimensions, native
///    keyframes and no expression keeps its bezier curve data;
/// 3. any other time-varying property is flattened to per-sample values;
/// 4. everything else is a static value per channel.
pub fn sample_property(
    property: &Property,
    comp: &Composition,
    layer: &Layer,
    settings: &ExportSettings,
) -> ExportResult<ExportedProperty> {
    let num_dimensions = property.dimensions();
    let mut channels: Vec<Option<PropertyChannel>> = vec![None; num_dimensions];
    sample_into(property, comp, layer, settings, &mut channels, 0)?;
    let channels = channels
        .into_iter()
        .enumerate()
        .map(|(i, channel)| {
            channel.ok_or_else(|| {
                ExportError::InvalidArgument(format!("property channel {i} was never filled"))
            })
        })
        .collect::<ExportResult<Vec<_>>>()?;
    Ok(ExportedProperty {
        num_dimensions,
        channels,
    })
}

fn sample_into(
    property: &Property,
    comp: &Composition,
    layer: &Layer,
    settings: &ExportSettings,
    channels: &mut [Option<PropertyChannel>],
    offset: usize,
) -> ExportResult<()> {
    let dims = property.dimensions();
    if property.is_separation_follower() && dims > 1 {
        return Err(ExportError::SeparationFollower(dims));
    }

    if property.dimensions_separated() {
        for (axis, follower) in property.followers().iter().enumerate() {
            sample_into(follower, comp, layer, settings, channels, offset + axis)?;
        }
        return Ok(());
    }

    if property.is_time_varying() {
        let plain = matches!(
            property.value_type,
            ValueType::OneD | ValueType::TwoD | ValueType::ThreeD
        );
        if plain && !property.expression_enabled() && !property.keyframes.is_empty() {
            sample_native(property, channels, offset)?;
        } else {
            sample_calculated(property, comp, layer, settings, channels, offset);
        }
    } else {
        for axis in 0..dims {
            let value = property.value.get(axis).copied().unwrap_or(0.0);
            channels[offset + axis] = Some(PropertyChannel::fixed(value));
        }
    }
    Ok(())
}

/// Copy native keyframes verbatim, splitting the per-axis values and eases
/// into one bezier channel per dimension.
fn sample_native(
    property: &Property,
    channels: &mut [Option<PropertyChannel>],
    offset: usize,
) -> ExportResult<()> {
    let dims = property.dimensions();
    let mut per_channel: Vec<Vec<BezierKeyframe>> =
        vec![Vec::with_capacity(property.keyframes.len()); dims];

    for key in &property.keyframes {
        let interpolation_in = unenum_interpolation(key.interpolation_in)?;
        let interpolation_out = unenum_interpolation(key.interpolation_out)?;
        for (axis, keys) in per_channel.iter_mut().enumerate() {
            keys.push(BezierKeyframe {
                time: key.time,
                value: key.value.get(axis).copied().unwrap_or(0.0),
                ease_in: ease_point(key.ease_in.get(axis)),
                ease_out: ease_point(key.ease_out.get(axis)),
                interpolation_in,
                interpolation_out,
            });
        }
    }

    for (axis, keys) in per_channel.into_iter().enumerate() {
        channels[offset + axis] = Some(PropertyChannel::bezier(keys));
    }
    Ok(())
}

/// Flatten a property to dense per-sample values over the layer's range.
fn sample_calculated(
    property: &Property,
    comp: &Composition,
    layer: &Layer,
    settings: &ExportSettings,
    channels: &mut [Option<PropertyChannel>],
    offset: usize,
) {
    let dims = property.dimensions();
    let range = resolve_range(comp, layer, settings);
    let supersampling = settings.effective_supersampling();

    let mut per_channel: Vec<Vec<f64>> =
        vec![Vec::with_capacity(range.sample_count(supersampling)); dims];
    for frame in range.sample_frames(supersampling) {
        let value = property.value_at_time(frame / comp.frame_rate);
        for (axis, samples) in per_channel.iter_mut().enumerate() {
            samples.push(value.get(axis).copied().unwrap_or(0.0));
        }
    }

    for (axis, samples) in per_channel.into_iter().enumerate() {
        channels[offset + axis] =
            Some(PropertyChannel::calculated(range.start, supersampling, samples));
    }
}

fn ease_point(ease: Option<&TemporalEase>) -> EasePoint {
    let ease = ease.copied().unwrap_or_default();
    EasePoint {
        speed: ease.speed,
        influence: ease.influence,
    }
}
