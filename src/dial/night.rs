use crate::dial::face::DialFrame;
use crate::foundation::error::DialResult;
use crate::paint::color::Rgba;
use crate::paint::ramp::{ColorRamp, build_color_ramp};
use crate::scene::context::{DrawContext, Paintable, PathHandle};

const NIGHT_KEYFRAMES: &[(f64, &str)] = &[
    (0.0, "#17162e"),
    (3.0, "#17162e"),
    (6.0, "#112140"),
    (13.0, "#0d243b"),
    (17.0, "#112140"),
    (24.0, "#17162e"),
];

pub(crate) fn night_ramp() -> DialResult<ColorRamp> {
    build_color_ramp(NIGHT_KEYFRAMES)
}

fn night_sector<'q, 'a>(draw: &'q mut DrawContext<'a>, frame: &DialFrame) -> PathHandle<'q, 'a> {
    let c = frame.layout.center;
    draw.sector(
        c.x,
        c.y,
        c.x,
        frame.state.angles.sunset,
        frame.state.angles.sunrise,
        false,
    )
}

pub(crate) fn draw_night(draw: &mut DrawContext<'_>, frame: &DialFrame) {
    let color = frame.night;
    night_sector(draw, frame).clip(move |mask| {
        mask.fill(color);
    });
}

/// Outlined sun disc, visible only inside the night wedge.
pub(crate) fn draw_night_sun(draw: &mut DrawContext<'_>, frame: &DialFrame) {
    let color = frame.night;
    let sun = frame.state.points.sun;
    let radius = frame.layout.sun_main;
    night_sector(draw, frame).clip(move |mask| {
        mask.circle(sun.x, sun.y, radius)
            .fill_with(color)
            .stroke_with(Rgba::WHITE, 3.0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_ramp_blends_between_keyframes() {
        let ramp = night_ramp().unwrap();
        assert_eq!(ramp.sample(3.0), Rgba::rgb8(0x17, 0x16, 0x2e));
        assert_eq!(ramp.sample(-1.0), Rgba::rgb8(0x17, 0x16, 0x2e));
        let mid = ramp.sample(15.0);
        assert_eq!(mid.r, (f64::from(0x0d_u8) + f64::from(0x11_u8)) / 2.0);
        assert_eq!(mid.a, 255.0);
    }
}
