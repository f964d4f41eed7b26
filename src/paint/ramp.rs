use crate::foundation::error::{DialError, DialResult};
use crate::paint::color::{Rgba, color_interpolate, hex_to_rgba};

/// Payloads that can be blended between two keyframes.
pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for Rgba {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        color_interpolate(t, *a, *b)
    }
}

/// Element-wise, index-for-index.
impl Lerp for Vec<Rgba> {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.iter()
            .zip(b)
            .map(|(a, b)| color_interpolate(t, *a, *b))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe<P> {
    pub position: f64,
    pub value: P,
}

/// Immutable keyframe ramp mapping a scalar position to an interpolated payload.
///
/// Sampling clamps to the first/last keyframe outside the covered range and never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp<P> {
    keys: Vec<Keyframe<P>>, // sorted by position
}

pub type ColorRamp = Ramp<Rgba>;
pub type GradientRamp = Ramp<Vec<Rgba>>;

impl<P> Ramp<P>
where
    P: Lerp + Clone,
{
    pub fn new(keys: Vec<Keyframe<P>>) -> DialResult<Self> {
        if keys.is_empty() {
            return Err(DialError::validation("ramp needs at least one keyframe"));
        }
        if keys.iter().any(|k| k.position.is_nan()) {
            return Err(DialError::validation("ramp keyframe positions must not be NaN"));
        }
        if !keys.windows(2).all(|w| w[0].position <= w[1].position) {
            return Err(DialError::validation(
                "ramp keyframes must be sorted by position",
            ));
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[Keyframe<P>] {
        &self.keys
    }

    pub fn sample(&self, value: f64) -> P {
        // First key with position >= value; duplicates resolve to the first match.
        let hi = self.keys.partition_point(|k| k.position < value);

        if hi >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value.clone();
        }
        if hi == 0 {
            return self.keys[0].value.clone();
        }

        let a = &self.keys[hi - 1];
        let b = &self.keys[hi];
        let t = (value - a.position) / (b.position - a.position);
        if !t.is_finite() {
            return b.value.clone();
        }
        P::lerp(&a.value, &b.value, t)
    }
}

/// Build a single-color ramp from `(position, hex)` pairs.
pub fn build_color_ramp(keyframes: &[(f64, &str)]) -> DialResult<ColorRamp> {
    let keys = keyframes
        .iter()
        .map(|&(position, hex)| {
            Ok(Keyframe {
                position,
                value: hex_to_rgba(hex)?,
            })
        })
        .collect::<DialResult<Vec<_>>>()?;
    Ramp::new(keys)
}

/// Build a ramp of parallel colors. Every keyframe must carry the same number of colors.
pub fn build_gradient_ramp(keyframes: &[(f64, &[&str])]) -> DialResult<GradientRamp> {
    let keys = keyframes
        .iter()
        .map(|&(position, colors)| {
            let value = colors
                .iter()
                .map(|hex| hex_to_rgba(hex))
                .collect::<DialResult<Vec<_>>>()?;
            Ok(Keyframe { position, value })
        })
        .collect::<DialResult<Vec<_>>>()?;

    if let Some(first) = keys.first() {
        let arity = first.value.len();
        if keys.iter().any(|k| k.value.len() != arity) {
            return Err(DialError::validation(
                "gradient ramp keyframes must all carry the same number of colors",
            ));
        }
    }
    Ramp::new(keys)
}
