use crate::foundation::core::Point;
use crate::paint::color::Rgba;

/// A gradient color stop; `offset` is in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Linear gradient between two points in user space (the space active when it is painted).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn new(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f32, color: impl Into<Rgba>) -> Self {
        self.stops.push(ColorStop {
            offset,
            color: color.into(),
        });
        self
    }
}

/// Two-point conical gradient between circle `(start_center, start_radius)` and
/// `(end_center, end_radius)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub start_center: Point,
    pub start_radius: f32,
    pub end_center: Point,
    pub end_radius: f32,
    pub stops: Vec<ColorStop>,
}

impl RadialGradient {
    pub fn new(
        start_center: impl Into<Point>,
        start_radius: f32,
        end_center: impl Into<Point>,
        end_radius: f32,
    ) -> Self {
        Self {
            start_center: start_center.into(),
            start_radius,
            end_center: end_center.into(),
            end_radius,
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f32, color: impl Into<Rgba>) -> Self {
        self.stops.push(ColorStop {
            offset,
            color: color.into(),
        });
        self
    }
}

/// Anything usable as a fill or stroke style.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Linear(LinearGradient),
    Radial(RadialGradient),
}

impl Default for Paint {
    fn default() -> Self {
        Self::Solid(Rgba::BLACK)
    }
}

impl From<Rgba> for Paint {
    fn from(c: Rgba) -> Self {
        Self::Solid(c)
    }
}

impl From<LinearGradient> for Paint {
    fn from(g: LinearGradient) -> Self {
        Self::Linear(g)
    }
}

impl From<RadialGradient> for Paint {
    fn from(g: RadialGradient) -> Self {
        Self::Radial(g)
    }
}

impl Paint {
    pub(crate) fn to_cpu(&self) -> vello_cpu::PaintType {
        use vello_cpu::kurbo::Point as CpuPoint;
        use vello_cpu::peniko::{Color, Gradient};

        fn stops(stops: &[ColorStop]) -> Vec<(f32, Color)> {
            stops
                .iter()
                .map(|s| (s.offset.clamp(0.0, 1.0), s.color.to_cpu()))
                .collect()
        }

        match self {
            Self::Solid(c) => c.to_cpu().into(),
            Self::Linear(g) => Gradient::new_linear(
                CpuPoint::new(g.start.x, g.start.y),
                CpuPoint::new(g.end.x, g.end.y),
            )
            .with_stops(stops(&g.stops).as_slice())
            .into(),
            Self::Radial(g) => Gradient::new_two_point_radial(
                CpuPoint::new(g.start_center.x, g.start_center.y),
                g.start_radius,
                CpuPoint::new(g.end_center.x, g.end_center.y),
                g.end_radius,
            )
            .with_stops(stops(&g.stops).as_slice())
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_keep_stop_order() {
        let g = LinearGradient::new((0.0, 0.0), (10.0, 0.0))
            .stop(0.2, Rgba::WHITE)
            .stop(1.0, Rgba::TRANSPARENT);
        assert_eq!(g.stops.len(), 2);
        assert_eq!(g.stops[0].offset, 0.2);
        assert_eq!(g.stops[1].color, Rgba::TRANSPARENT);
    }

    #[test]
    fn colors_convert_into_paints() {
        assert_eq!(Paint::from(Rgba::WHITE), Paint::Solid(Rgba::WHITE));
        assert_eq!(Paint::default(), Paint::Solid(Rgba::BLACK));
    }
}
