use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{DialError, DialResult};

/// Straight-alpha color with channels nominally in `0.0..=255.0`.
///
/// Channels are never clamped here: interpolation may produce fractional values, and the surface
/// clamps when converting to device pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Self = Self::rgba(255.0, 255.0, 255.0, 255.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 255.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f64, g as f64, b as f64, 255.0)
    }

    /// Parse `#rrggbb` / `#rrggbbaa` (leading `#` optional). See [`hex_to_rgba`].
    pub fn from_hex(hex: &str) -> DialResult<Self> {
        hex_to_rgba(hex)
    }

    pub fn channels(self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Quantize to straight RGBA8. Out-of-range channels saturate, NaN becomes 0.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(c: f64) -> u8 {
            c.round().clamp(0.0, 255.0) as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::Color {
        let [r, g, b, a] = self.to_rgba8();
        vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
    }
}

/// Parse a 6- or 8-digit hex color. Missing alpha digits mean fully opaque.
///
/// Colors are build-time constants, so malformed input is rejected instead of degrading to
/// invalid channels.
pub fn hex_to_rgba(hex: &str) -> DialResult<Rgba> {
    let s = hex.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> DialResult<f64> {
        // `from_str_radix` alone would accept a sign, as in "+f".
        if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DialError::color(format!("invalid hex byte \"{pair}\"")));
        }
        u8::from_str_radix(pair, 16)
            .map(f64::from)
            .map_err(|_| DialError::color(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(DialError::color(format!("invalid hex color \"{hex}\"")));
    }

    match s.len() {
        6 => Ok(Rgba::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255.0,
        )),
        8 => Ok(Rgba::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err(DialError::color(format!(
            "hex color must be #RRGGBB or #RRGGBBAA, got \"{hex}\""
        ))),
    }
}

pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Per-channel linear interpolation `c1*(1-t) + c2*t`, no rounding or clamping.
pub fn color_interpolate(t: f64, c1: Rgba, c2: Rgba) -> Rgba {
    Rgba::rgba(
        lerp(t, c1.r, c2.r),
        lerp(t, c1.g, c2.g),
        lerp(t, c1.b, c2.b),
        lerp(t, c1.a, c2.a),
    )
}

impl fmt::Display for Rgba {
    /// CSS form: `rgba(r,g,b,a)` with alpha normalized to `0..=1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a / 255.0)
    }
}

impl FromStr for Rgba {
    type Err = DialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            return hex_to_rgba(s);
        }

        match s.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => {}
        }

        let (args, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return hex_to_rgba(s);
        };
        let args = args
            .strip_suffix(')')
            .ok_or_else(|| DialError::color(format!("unterminated color function \"{s}\"")))?;

        let parts = args
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|_| DialError::color(format!("invalid color component \"{p}\"")))
            })
            .collect::<DialResult<Vec<f64>>>()?;

        match (parts.as_slice(), has_alpha) {
            ([r, g, b], false) => Ok(Self::rgba(*r, *g, *b, 255.0)),
            ([r, g, b, a], true) => Ok(Self::rgba(*r, *g, *b, a * 255.0)),
            _ => Err(DialError::color(format!("wrong component count in \"{s}\""))),
        }
    }
}
