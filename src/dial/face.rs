use std::f64::consts::FRAC_PI_2;

use crate::dial::clock::{ClockTime, DialLayout, DialState, format_time};
use crate::dial::config::DialConfig;
use crate::dial::{day, hud, night};
use crate::foundation::error::DialResult;
use crate::paint::color::Rgba;
use crate::paint::ramp::{ColorRamp, GradientRamp};
use crate::raster::state::FontSpec;
use crate::raster::surface::Surface;
use crate::scene::context::{DrawContext, Paintable, Styled};
use crate::scene::renderer::Renderer;
use crate::scene::style::{Filter, Style};

pub(crate) const LABEL_FAMILY: &str = "Nunito";

/// Translucent white over the frosted backdrop of the time readout.
const FROST: Rgba = Rgba::rgba(255.0, 255.0, 255.0, 10.0);
const FROST_BLUR_PX: f32 = 20.0;

/// Everything one frame's scene is built from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DialFrame {
    pub(crate) layout: DialLayout,
    pub(crate) state: DialState,
    pub(crate) sky: Vec<Rgba>,
    pub(crate) night: Rgba,
}

/// The day/night dial: layout, sky ramps and daylight hours. Build once, render many frames.
#[derive(Clone, Debug)]
pub struct Dial {
    layout: DialLayout,
    sky: GradientRamp,
    night: ColorRamp,
    sunrise: ClockTime,
    sunset: ClockTime,
    background: Option<Rgba>,
}

impl Dial {
    pub fn new(config: &DialConfig) -> DialResult<Self> {
        config.validate()?;
        Ok(Self {
            layout: DialLayout::new(config.size),
            sky: day::sky_ramp()?,
            night: night::night_ramp()?,
            sunrise: config.sunrise,
            sunset: config.sunset,
            background: config.background_color()?,
        })
    }

    pub fn layout(&self) -> &DialLayout {
        &self.layout
    }

    pub fn state_at(&self, now: ClockTime) -> DialState {
        DialState::compute(&self.layout, now, self.sunrise, self.sunset)
    }

    fn frame_at(&self, now: ClockTime) -> DialFrame {
        let state = self.state_at(now);
        DialFrame {
            layout: self.layout,
            state,
            sky: self.sky.sample(state.sun),
            night: self.night.sample(state.sun),
        }
    }

    /// Clear `surface` and paint the dial as it looks at `now`.
    #[tracing::instrument(skip_all, fields(now = %now))]
    pub fn render_frame(
        &self,
        renderer: &mut Renderer,
        surface: &mut Surface,
        now: ClockTime,
    ) -> DialResult<()> {
        let frame = self.frame_at(now);
        match self.background {
            Some(color) => surface.clear_to(color),
            None => surface.clear(),
        }

        surface.with_saved(|surface| {
            // Quarter turn so that midnight points down.
            surface.rotate_about(FRAC_PI_2, frame.layout.center);
            renderer.render(build_scene(&frame), surface)
        })
    }
}

pub(crate) fn build_scene(frame: &DialFrame) -> DrawContext<'_> {
    let mut draw = DrawContext::new();
    let l = frame.layout;

    draw.circle(l.center.x, l.center.y, l.r).clip(move |mask| {
        day::draw_day(mask, frame);
        night::draw_night(mask, frame);
        mask.layer(move |layer| hud::draw_hud(layer, frame));
    });
    draw_readout(&mut draw, frame);
    draw
}

/// Frosted disc opposite the sun, with the current time on top.
fn draw_readout<'a>(draw: &mut DrawContext<'a>, frame: &'a DialFrame) {
    let l = frame.layout;
    let dial = frame.state.points.dial;

    draw.circle(dial.x, dial.y, l.inner).clip(move |mask| {
        mask.custom(move |surface| {
            let backdrop = surface.backdrop()?;
            surface.rotate_about(-FRAC_PI_2, l.center);
            surface.draw_snapshot(&backdrop)
        })
        .style(Style::new().filter(Filter::Blur {
            std_dev_px: FROST_BLUR_PX,
        }));
        mask.fill(FROST);
    });

    draw.text(
        format_time(frame.state.now),
        dial.x + l.r * 0.025,
        dial.y,
        Some(FontSpec::new((l.r * 0.23) as f32, LABEL_FAMILY)),
    )
    .fill_with(Rgba::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_samples_ramps_at_sun_time() {
        let dial = Dial::new(&DialConfig::default()).unwrap();
        let frame = dial.frame_at("13:00".parse().unwrap());
        assert_eq!(frame.state.sun, 13.0);
        assert_eq!(frame.night, Rgba::rgb8(0x0d, 0x24, 0x3b));
        assert_eq!(frame.sky.len(), 4);
    }

    #[test]
    fn scene_has_face_readout_disc_and_time() {
        let dial = Dial::new(&DialConfig::default()).unwrap();
        let frame = dial.frame_at("09:30".parse().unwrap());
        assert_eq!(build_scene(&frame).len(), 3);
    }

    #[test]
    fn render_leaves_surface_state_balanced() {
        let config = DialConfig {
            size: 96,
            ..DialConfig::default()
        };
        let dial = Dial::new(&config).unwrap();
        let mut renderer = Renderer::default();
        let mut surface = Surface::new(96, 96).unwrap();
        dial.render_frame(&mut renderer, &mut surface, "12:00".parse().unwrap())
            .unwrap();
        assert_eq!(surface.save_depth(), 0);
        assert_eq!(surface.transform(), crate::foundation::core::Affine::IDENTITY);
    }
}
