use serde::{Deserialize, Serialize};

/// The host's classification of a property's value dimensionality.
/// Spatial variants carry motion-path data the native keyframe form cannot
/// represent, so they are always baked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    OneD,
    TwoD,
    TwoDSpatial,
    ThreeD,
    ThreeDSpatial,
}

impl ValueType {
    /// Number of scalar channels this value type carries.
    pub fn dimensions(&self) -> usize {
        match self {
            ValueType::OneD => 1,
            ValueType::TwoD | ValueType::TwoDSpatial => 2,
            ValueType::ThreeD | ValueType::ThreeDSpatial => 3,
        }
    }

    /// Whether this is a spatial subtype (motion-path carrying).
    pub fn is_spatial(&self) -> bool {
        matches!(self, ValueType::TwoDSpatial | ValueType::ThreeDSpatial)
    }
}

/// A keyframe interpolation code as reported by the host.
///
/// The known codes are the host's `KeyframeInterpolationType` enum values;
/// anything else fails the export with a "could not un-enum" error when the
/// native keyframe path tries to map it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationType(pub u32);

impl InterpolationType {
    pub const LINEAR: InterpolationType = InterpolationType(6612);
    pub const BEZIER: InterpolationType = InterpolationType(6613);
    pub const HOLD: InterpolationType = InterpolationType(6614);
}

impl Default for InterpolationType {
    fn default() -> Self {
        InterpolationType::LINEAR
    }
}

/// Temporal ease for one side of one keyframe channel: the curve's speed in
/// value units per second and its influence as a percentage of the segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalEase {
    pub speed: f64,
    pub influence: f64,
}

impl Default for TemporalEase {
    fn default() -> Self {
        // The host's default ease: zero speed, 16.67% influence.
        Self {
            speed: 0.0,
            influence: 16.666667,
        }
    }
}

/// A native keyframe: a timed value with per-axis temporal ease and
/// interpolation codes for the incoming and outgoing curve segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time in seconds.
    pub time: f64,
    /// One entry per dimension of the owning property.
    pub value: Vec<f64>,
    #[serde(default)]
    pub ease_in: Vec<TemporalEase>,
    #[serde(default)]
    pub ease_out: Vec<TemporalEase>,
    #[serde(default)]
    pub interpolation_in: InterpolationType,
    #[serde(default)]
    pub interpolation_out: InterpolationType,
}

impl Keyframe {
    /// Create a keyframe with default (linear) interpolation and default ease.
    pub fn new(time: f64, value: Vec<f64>) -> Self {
        let dims = value.len();
        Self {
            time,
            value,
            ease_in: vec![TemporalEase::default(); dims],
            ease_out: vec![TemporalEase::default(); dims],
            interpolation_in: InterpolationType::LINEAR,
            interpolation_out: InterpolationType::LINEAR,
        }
    }

    /// Builder: set the interpolation codes.
    pub fn with_interpolation(
        mut self,
        interpolation_in: InterpolationType,
        interpolation_out: InterpolationType,
    ) -> Self {
        self.interpolation_in = interpolation_in;
        self.interpolation_out = interpolation_out;
        self
    }

    /// Builder: set the same ease on every axis of both sides.
    pub fn with_ease(mut self, ease_in: TemporalEase, ease_out: TemporalEase) -> Self {
        for e in &mut self.ease_in {
            *e = ease_in;
        }
        for e in &mut self.ease_out {
            *e = ease_out;
        }
        self
    }
}

/// A closed, real-valued stand-in for host expression scripting. Presence of
/// any expression forces the baked sampling path; the form only matters for
/// what the baked samples evaluate to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Expression {
    /// Add a constant per-axis offset to the evaluated value.
    Offset(Vec<f64>),
    /// Add a per-axis sinusoid: `amplitude * sin(2π * frequency * t + phase)`.
    Sine {
        amplitude: Vec<f64>,
        frequency: f64,
        #[serde(default)]
        phase: f64,
    },
}

impl Expression {
    /// Apply the expression on top of an evaluated value, in place.
    pub fn apply(&self, t: f64, value: &mut [f64]) {
        match self {
            Expression::Offset(offset) => {
                for (v, o) in value.iter_mut().zip(offset) {
                    *v += o;
                }
            }
            Expression::Sine {
                amplitude,
                frequency,
                phase,
            } => {
                let s = (std::f64::consts::TAU * frequency * t + phase).sin();
                for (v, a) in value.iter_mut().zip(amplitude) {
                    *v += a * s;
                }
            }
        }
    }
}

/// Dimension-separation linkage. A leader with `separated: true` delegates
/// each axis to a 1-D follower property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Separation {
    Leader {
        separated: bool,
        followers: Vec<Property>,
    },
    Follower,
}

/// One animatable property of a layer: a static value, native keyframes,
/// an expression on top, or per-axis separated followers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub value_type: ValueType,
    /// The static (non-animated) value, one entry per dimension.
    pub value: Vec<f64>,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub expression: Option<Expression>,
    #[serde(default)]
    pub separation: Option<Separation>,
}

impl Property {
    /// Create a static property.
    pub fn constant(value_type: ValueType, value: Vec<f64>) -> Self {
        Self {
            value_type,
            value,
            keyframes: Vec::new(),
            expression: None,
            separation: None,
        }
    }

    /// Create a static scalar (1-D) property.
    pub fn scalar(value: f64) -> Self {
        Self::constant(ValueType::OneD, vec![value])
    }

    /// Builder: set native keyframes.
    pub fn with_keyframes(mut self, keyframes: Vec<Keyframe>) -> Self {
        self.keyframes = keyframes;
        self
    }

    /// Builder: set an expression.
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = Some(expression);
        self
    }

    /// Builder: turn this property into a separated leader with the given
    /// per-axis followers (each follower is marked as such).
    pub fn separated_into(mut self, followers: Vec<Property>) -> Self {
        let followers = followers
            .into_iter()
            .map(|mut f| {
                f.separation = Some(Separation::Follower);
                f
            })
            .collect();
        self.separation = Some(Separation::Leader {
            separated: true,
            followers,
        });
        self
    }

    /// Number of scalar channels.
    pub fn dimensions(&self) -> usize {
        self.value_type.dimensions()
    }

    pub fn is_separation_leader(&self) -> bool {
        matches!(self.separation, Some(Separation::Leader { .. }))
    }

    pub fn is_separation_follower(&self) -> bool {
        matches!(self.separation, Some(Separation::Follower))
    }

    /// Whether the leader's dimensions are currently separated.
    pub fn dimensions_separated(&self) -> bool {
        matches!(
            self.separation,
            Some(Separation::Leader {
                separated: true,
                ..
            })
        )
    }

    /// The per-axis follower properties of a separated leader.
    pub fn followers(&self) -> &[Property] {
        match &self.separation {
            Some(Separation::Leader { followers, .. }) => followers,
            _ => &[],
        }
    }

    pub fn expression_enabled(&self) -> bool {
        self.expression.is_some()
    }

    /// Whether the evaluated value changes over time.
    pub fn is_time_varying(&self) -> bool {
        if self.dimensions_separated() {
            return self.followers().iter().any(|f| f.is_time_varying());
        }
        !self.keyframes.is_empty() || self.expression.is_some()
    }

    /// Evaluate the property at a time in seconds, post-expression.
    pub fn value_at_time(&self, t: f64) -> Vec<f64> {
        if self.dimensions_separated() {
            let mut out = vec![0.0; self.dimensions()];
            for (slot, follower) in out.iter_mut().zip(self.followers()) {
                *slot = follower.value_at_time(t).first().copied().unwrap_or(0.0);
            }
            return out;
        }

        let mut value = if self.keyframes.is_empty() {
            self.value.clone()
        } else {
            self.interpolate(t)
        };
        if let Some(expression) = &self.expression {
            expression.apply(t, &mut value);
        }
        value
    }

    /// Interpolate the native keyframe curve at a time in seconds.
    fn interpolate(&self, t: f64) -> Vec<f64> {
        let keys = &self.keyframes;
        let first = &keys[0];
        if t <= first.time {
            return first.value.clone();
        }
        let last = &keys[keys.len() - 1];
        if t >= last.time {
            return last.value.clone();
        }

        // Segments are half-open: a sample exactly on an interior keyframe
        // belongs to the segment that starts there, never the one ending
        // there (a held first segment must not swallow the second key).
        for pair in keys.windows(2) {
            let (k0, k1) = (&pair[0], &pair[1]);
            if t < k0.time || t >= k1.time {
                continue;
            }
            if k0.interpolation_out == InterpolationType::HOLD {
                return k0.value.clone();
            }
            let dt = k1.time - k0.time;
            if dt <= 0.0 {
                return k1.value.clone();
            }
            let u = (t - k0.time) / dt;
            let dims = self.dimensions();
            let mut out = vec![0.0; dims];
            for (i, slot) in out.iter_mut().enumerate() {
                let v0 = k0.value.get(i).copied().unwrap_or(0.0);
                let v1 = k1.value.get(i).copied().unwrap_or(0.0);
                *slot = interpolate_segment(k0, k1, i, v0, v1, dt, u);
            }
            return out;
        }

        last.value.clone()
    }
}

/// Interpolate one axis of one segment. Linear segments lerp; bezier
/// segments map the outgoing/incoming temporal ease to a cubic-bezier
/// timing curve (influence → control x, speed → control y).
fn interpolate_segment(k0: &Keyframe, k1: &Keyframe, axis: usize, v0: f64, v1: f64, dt: f64, u: f64) -> f64 {
    let dv = v1 - v0;
    if dv == 0.0 {
        return v0;
    }
    let linear = k0.interpolation_out == InterpolationType::LINEAR
        && k1.interpolation_in == InterpolationType::LINEAR;
    if linear {
        return v0 + dv * u;
    }

    let ease_out = k0.ease_out.get(axis).copied().unwrap_or_default();
    let ease_in = k1.ease_in.get(axis).copied().unwrap_or_default();
    let x1 = (ease_out.influence / 100.0).clamp(1e-6, 1.0);
    let x2 = 1.0 - (ease_in.influence / 100.0).clamp(1e-6, 1.0);
    let y1 = x1 * ease_out.speed * dt / dv;
    let y2 = 1.0 - (1.0 - x2) * ease_in.speed * dt / dv;
    v0 + dv * cubic_bezier_timing(x1, y1, x2, y2, u)
}

/// Evaluate a unit cubic-bezier timing curve with control points
/// `(x1, y1), (x2, y2)` at progress `x`, solving for the curve parameter by
/// bisection (the x polynomial is monotonic for control x in [0, 1]).
fn cubic_bezier_timing(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    let bezier = |p1: f64, p2: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    };

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    let mut s = x;
    for _ in 0..48 {
        let xs = bezier(x1, x2, s);
        if (xs - x).abs() < 1e-12 {
            break;
        }
        if xs < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier(y1, y2, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_value_at_time() {
        let prop = Property::constant(ValueType::ThreeD, vec![1.0, 2.0, 3.0]);
        assert_eq!(prop.value_at_time(0.0), vec![1.0, 2.0, 3.0]);
        assert_eq!(prop.value_at_time(10.0), vec![1.0, 2.0, 3.0]);
        assert!(!prop.is_time_varying());
    }

    #[test]
    fn test_linear_interpolation() {
        let prop = Property::scalar(0.0).with_keyframes(vec![
            Keyframe::new(0.0, vec![0.0]),
            Keyframe::new(2.0, vec![10.0]),
        ]);
        assert!(prop.is_time_varying());
        let v = prop.value_at_time(1.0);
        assert!((v[0] - 5.0).abs() < 1e-9);
        // Clamped outside the keyframe span.
        assert_eq!(prop.value_at_time(-1.0), vec![0.0]);
        assert_eq!(prop.value_at_time(5.0), vec![10.0]);
    }

    #[test]
    fn test_hold_interpolation() {
        let prop = Property::scalar(0.0).with_keyframes(vec![
            Keyframe::new(0.0, vec![0.0])
                .with_interpolation(InterpolationType::HOLD, InterpolationType::HOLD),
            Keyframe::new(2.0, vec![10.0]),
        ]);
        assert_eq!(prop.value_at_time(1.999), vec![0.0]);
        assert_eq!(prop.value_at_time(2.0), vec![10.0]);
    }

    #[test]
    fn test_hold_releases_exactly_on_the_next_key() {
        // A sample landing exactly on an interior keyframe takes that key's
        // value, even when the preceding segment holds.
        let prop = Property::scalar(0.0).with_keyframes(vec![
            Keyframe::new(0.0, vec![0.0])
                .with_interpolation(InterpolationType::HOLD, InterpolationType::HOLD),
            Keyframe::new(1.0, vec![10.0]),
            Keyframe::new(2.0, vec![20.0]),
        ]);
        assert_eq!(prop.value_at_time(0.5), vec![0.0]);
        assert_eq!(prop.value_at_time(1.0), vec![10.0]);
        let v = prop.value_at_time(1.5);
        assert!((v[0] - 15.0).abs() < 1e-9);
        assert_eq!(prop.value_at_time(2.0), vec![20.0]);
    }

    #[test]
    fn test_bezier_interpolation_endpoints() {
        let prop = Property::scalar(0.0).with_keyframes(vec![
            Keyframe::new(0.0, vec![0.0])
                .with_interpolation(InterpolationType::BEZIER, InterpolationType::BEZIER)
                .with_ease(
                    TemporalEase::default(),
                    TemporalEase {
                        speed: 0.0,
                        influence: 33.0,
                    },
                ),
            Keyframe::new(1.0, vec![10.0])
                .with_interpolation(InterpolationType::BEZIER, InterpolationType::BEZIER),
        ]);
        // Eased curves still hit the keyframed values exactly.
        assert!((prop.value_at_time(0.0)[0] - 0.0).abs() < 1e-9);
        assert!((prop.value_at_time(1.0)[0] - 10.0).abs() < 1e-9);
        // Zero outgoing speed means a slow start.
        assert!(prop.value_at_time(0.25)[0] < 2.5);
        // Monotonic within the segment for these eases.
        let a = prop.value_at_time(0.3)[0];
        let b = prop.value_at_time(0.6)[0];
        assert!(a < b);
    }

    #[test]
    fn test_expression_offset() {
        let prop = Property::constant(ValueType::TwoD, vec![1.0, 2.0])
            .with_expression(Expression::Offset(vec![10.0, 20.0]));
        assert!(prop.is_time_varying());
        assert!(prop.expression_enabled());
        assert_eq!(prop.value_at_time(0.0), vec![11.0, 22.0]);
    }

    #[test]
    fn test_expression_sine_on_keyframes() {
        let prop = Property::scalar(0.0)
            .with_keyframes(vec![
                Keyframe::new(0.0, vec![0.0]),
                Keyframe::new(1.0, vec![4.0]),
            ])
            .with_expression(Expression::Sine {
                amplitude: vec![1.0],
                frequency: 1.0,
                phase: 0.0,
            });
        // sin(2π * 0.25) = 1, so value is 1.0 (lerp) + 1.0 (sine).
        let v = prop.value_at_time(0.25);
        assert!((v[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_separated_leader_evaluates_followers() {
        let x = Property::scalar(0.0).with_keyframes(vec![
            Keyframe::new(0.0, vec![0.0]),
            Keyframe::new(1.0, vec![100.0]),
        ]);
        let y = Property::scalar(50.0);
        let z = Property::scalar(-3.0);
        let leader =
            Property::constant(ValueType::ThreeDSpatial, vec![0.0, 0.0, 0.0])
                .separated_into(vec![x, y, z]);
        assert!(leader.is_separation_leader());
        assert!(leader.dimensions_separated());
        assert!(leader.is_time_varying());
        let v = leader.value_at_time(0.5);
        assert!((v[0] - 50.0).abs() < 1e-9);
        assert!((v[1] - 50.0).abs() < 1e-9);
        assert!((v[2] + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_follower_flagged() {
        let leader = Property::constant(ValueType::TwoD, vec![0.0, 0.0])
            .separated_into(vec![Property::scalar(1.0), Property::scalar(2.0)]);
        assert!(leader.followers().iter().all(|f| f.is_separation_follower()));
    }
}
