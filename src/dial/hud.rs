use crate::dial::clock::{DialLayout, combined_to_angle};
use crate::dial::face::{DialFrame, LABEL_FAMILY};
use crate::dial::{day, night};
use crate::paint::color::Rgba;
use crate::paint::gradient::LinearGradient;
use crate::raster::state::{FontSpec, LineCap};
use crate::scene::context::{DrawContext, Paintable, Styled};
use crate::scene::style::Style;

const TICKS_PER_HOUR: u32 = 6;
const HOUR_TICK_LEN: f64 = 18.0;
const MINOR_TICK_LEN: f64 = 12.0;
const LABEL_GAP: f64 = 14.0;
const LABEL_SIZE_PX: f32 = 14.0;

/// Everything drawn over the sky: ticks, sun path, sun hand, and both suns.
pub(crate) fn draw_hud<'a>(draw: &mut DrawContext<'a>, frame: &'a DialFrame) {
    draw_hour_intervals(draw, frame.layout);
    draw_sun_path(draw, frame);

    day::draw_day_sun(draw, frame);
    night::draw_night_sun(draw, frame);
}

fn draw_hour_intervals(draw: &mut DrawContext<'_>, l: DialLayout) {
    draw.layer(move |layer| {
        for hour in 0..24u32 {
            for tick in 0..TICKS_PER_HOUR {
                let angle = combined_to_angle(
                    f64::from(hour) + f64::from(tick) / f64::from(TICKS_PER_HOUR),
                );
                let is_hour = tick == 0;
                let labeled = is_hour && hour % 2 == 0;
                let length = if is_hour { HOUR_TICK_LEN } else { MINOR_TICK_LEN };

                let outer = l.polar(angle, l.r - 4.0);
                let inner = l.polar(angle, l.r - length);
                layer
                    .line(outer.x, outer.y, inner.x, inner.y)
                    .stroke_with(Rgba::WHITE, if labeled { 3.0 } else { 2.0 })
                    .style(Style::new().line_cap(LineCap::Round))
                    .opacity(if is_hour { 1.0 } else { 0.5 });

                if labeled {
                    let at = l.polar(angle, l.r - length - LABEL_GAP);
                    let label = format!("{:02}", if hour == 0 { 24 } else { hour });
                    layer
                        .text(
                            label,
                            at.x,
                            at.y,
                            Some(FontSpec::new(LABEL_SIZE_PX, LABEL_FAMILY)),
                        )
                        .fill_with(Rgba::WHITE);
                }
            }
        }
    })
    .opacity(0.5);
}

fn draw_sun_path(draw: &mut DrawContext<'_>, frame: &DialFrame) {
    let l = frame.layout;
    let points = frame.state.points;
    draw.layer(move |layer| {
        layer
            .circle(l.center.x, l.center.y, l.sun_path)
            .stroke_with(Rgba::WHITE, 2.0);
        for p in [points.sunrise, points.sunset] {
            layer
                .circle(p.x, p.y, l.keypoint)
                .fill_with(Rgba::WHITE)
                .z(1);
        }
    })
    .opacity(0.5);

    let tip = l.polar(frame.state.angles.sun, l.r - 8.0);
    let hand = LinearGradient::new(l.center, tip)
        .stop(0.2, Rgba::rgba(255.0, 255.0, 255.0, 51.0))
        .stop(0.7, Rgba::WHITE)
        .stop(1.0, Rgba::rgba(255.0, 255.0, 255.0, 0.0));
    draw.line(l.center.x, l.center.y, tip.x, tip.y)
        .stroke_with(hand, 2.0);
}
