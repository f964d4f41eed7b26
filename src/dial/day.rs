use std::f64::consts::{PI, TAU};

use crate::dial::face::DialFrame;
use crate::foundation::error::DialResult;
use crate::paint::color::{Rgba, lerp};
use crate::paint::gradient::{LinearGradient, RadialGradient};
use crate::paint::ramp::{GradientRamp, build_gradient_ramp};
use crate::scene::context::{DrawContext, Paintable, PathHandle};

/// Direction of the sky gradient axis.
const SKY_ANGLE: f64 = 1.5 / 24.0 * TAU;
const SKY_STOPS: [f32; 4] = [0.43, 0.55, 0.8, 1.0];

const SKY_KEYFRAMES: &[(f64, &[&str])] = &[
    (0.0, &["#222146", "#17162e", "#131324", "#0d0e1c"]),
    (3.0, &["#222146", "#17162e", "#131324", "#0d0e1c"]),
    (5.5, &["#402c77", "#212f82", "#162552", "#17162e"]),
    (6.0, &["#c17b4c", "#9a84b8ff", "#483f99ff", "#162552"]),
    (6.7, &["#fbb94cff", "#c18fc6ff", "#4d7cbcff", "#4d7cbcff"]),
    (9.0, &["#c9ffffff", "#5db0e8ff", "#2b75a0ff", "#0f73b7ff"]),
    (13.0, &["#14a1ff", "#38b4fc", "#75d6ff", "#c9ffff"]),
    (19.0, &["#c9ffffff", "#5db0e8ff", "#2b75a0ff", "#0f73b7ff"]),
    (19.5, &["#fbb94cff", "#c18fc6ff", "#4d7cbcff", "#4d7cbcff"]),
    (20.0, &["#c17b4c", "#9a84b8ff", "#483f99ff", "#162552"]),
    (21.0, &["#402c77", "#212f82", "#162552", "#17162e"]),
    (24.0, &["#222146", "#17162e", "#131324", "#0d0e1c"]),
];

const GLOW_CORE: Rgba = Rgba::rgba(255.0, 252.0, 153.0, 255.0);
const GLOW_HALO: Rgba = Rgba::rgba(255.0, 252.0, 153.0, 119.0);
const GLOW_EDGE: Rgba = Rgba::rgba(255.0, 252.0, 153.0, 0.0);
const SUN_EDGE: Rgba = Rgba::rgba(255.0, 252.0, 0.0, 0.0);

/// Four sky colors, horizon to zenith, by hour of day.
pub(crate) fn sky_ramp() -> DialResult<GradientRamp> {
    build_gradient_ramp(SKY_KEYFRAMES)
}

fn day_sector<'q, 'a>(draw: &'q mut DrawContext<'a>, frame: &DialFrame) -> PathHandle<'q, 'a> {
    let c = frame.layout.center;
    draw.sector(
        c.x,
        c.y,
        c.x,
        frame.state.angles.sunrise,
        frame.state.angles.sunset,
        false,
    )
}

/// Sky gradient flooding the sunrise-to-sunset wedge.
pub(crate) fn draw_day<'a>(draw: &mut DrawContext<'a>, frame: &'a DialFrame) {
    let l = &frame.layout;
    let sky = SKY_STOPS.iter().zip(&frame.sky).fold(
        LinearGradient::new(l.polar(SKY_ANGLE, l.r), l.polar(SKY_ANGLE + PI, l.r)),
        |grad, (&offset, &color)| grad.stop(offset, color),
    );
    day_sector(draw, frame).clip(move |mask| {
        mask.fill(sky);
    });
}

/// Sun glow and disc, visible only inside the day wedge.
pub(crate) fn draw_day_sun<'a>(draw: &mut DrawContext<'a>, frame: &'a DialFrame) {
    let l = &frame.layout;
    let sun = frame.state.points.sun;
    let intensity = 1.0 - (12.0 - frame.state.sun).abs() / 12.0;
    let glow_radius = lerp(intensity, 0.5, 1.0) * l.sun_glow;
    let disc_radius = l.sun_main * 1.2;

    let glow = RadialGradient::new(sun, 0.0, sun, glow_radius as f32)
        .stop(0.1, Rgba::WHITE)
        .stop(0.11, GLOW_CORE)
        .stop(0.14, GLOW_HALO)
        .stop(1.0, GLOW_EDGE);
    let disc = RadialGradient::new(sun, 0.0, sun, disc_radius as f32)
        .stop(0.8, Rgba::WHITE)
        .stop(1.0, SUN_EDGE);

    day_sector(draw, frame).clip(move |mask| {
        mask.circle(sun.x, sun.y, glow_radius).fill_with(glow);
        mask.circle(sun.x, sun.y, disc_radius).fill_with(disc);
    });
}
