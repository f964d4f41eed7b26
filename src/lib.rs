#![forbid(unsafe_code)]
//! Retained-mode 2D drawing on a CPU raster, and the day/night dial built with it.
//!
//! Scenes are described as a [`DrawContext`] queue of shapes (arcs, sectors, circles,
//! rectangles, lines, text, custom programs and layers) and rendered by a [`Renderer`] onto a
//! [`Surface`]. Time-of-day colors come from keyframe ramps ([`ColorRamp`], [`GradientRamp`]).

mod dial;
mod foundation;
mod paint;
mod raster;
mod scene;

pub use dial::clock::{
    ClockTime, DialAngles, DialLayout, DialPoints, DialState, combined_to_angle, format_time,
    polar_to_cartesian,
};
pub use dial::config::DialConfig;
pub use dial::face::Dial;
pub use foundation::core::{Affine, BezPath, FrameRGBA, Point, Rect, Vec2};
pub use foundation::error::{DialError, DialResult};
pub use paint::color::{Rgba, color_interpolate, hex_to_rgba, lerp};
pub use paint::gradient::{ColorStop, LinearGradient, Paint, RadialGradient};
pub use paint::ramp::{
    ColorRamp, GradientRamp, Keyframe, Lerp, Ramp, build_color_ramp, build_gradient_ramp,
};
pub use raster::state::{FontSpec, LineCap, LineJoin, TextAlign, TextBaseline};
pub use raster::surface::{Snapshot, Surface};
pub use raster::text::PreparedText;
pub use scene::context::{DrawContext, Paintable, PathHandle, ShapeHandle, Styled, TextHandle};
pub use scene::pool::{LayerPoolOpts, LayerPoolStats};
pub use scene::renderer::{Renderer, RendererOpts};
pub use scene::shape::{CustomProgram, Program};
pub use scene::style::{Filter, Style};
