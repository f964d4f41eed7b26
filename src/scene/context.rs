use crate::foundation::core::{Point, Rect};
use crate::foundation::error::DialResult;
use crate::paint::gradient::Paint;
use crate::raster::state::{FontSpec, TextAlign, TextBaseline};
use crate::raster::surface::Surface;
use crate::scene::renderer::Resources;
use crate::scene::shape::{Geometry, Shape, ShapeKind};
use crate::scene::style::Style;

/// An ordered queue of shapes, built once and consumed by a single render pass.
///
/// Shapes paint in ascending z order; equal z values keep insertion order.
#[derive(Default)]
pub struct DrawContext<'a> {
    shapes: Vec<Shape<'a>>,
}

impl std::fmt::Debug for DrawContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawContext")
            .field("shapes", &self.shapes.len())
            .finish()
    }
}

impl<'a> DrawContext<'a> {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn push(&mut self, shape: Shape<'a>) -> &mut Shape<'a> {
        self.shapes.push(shape);
        let last = self.shapes.len() - 1;
        &mut self.shapes[last]
    }

    fn push_path(&mut self, geometry: Geometry) -> PathHandle<'_, 'a> {
        PathHandle {
            shape: self.push(Shape::new(ShapeKind::Path {
                geometry,
                clip: None,
            })),
        }
    }

    /// Clockwise arc from `start` to `end` radians unless `ccw`.
    pub fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start: f64,
        end: f64,
        ccw: bool,
    ) -> PathHandle<'_, 'a> {
        self.push_path(Geometry::Arc {
            center: Point::new(x, y),
            radius,
            start,
            end,
            ccw,
        })
    }

    /// Pie wedge: center, arc, back to center.
    pub fn sector(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start: f64,
        end: f64,
        ccw: bool,
    ) -> PathHandle<'_, 'a> {
        self.push_path(Geometry::Sector {
            center: Point::new(x, y),
            radius,
            start,
            end,
            ccw,
        })
    }

    pub fn circle(&mut self, x: f64, y: f64, radius: f64) -> PathHandle<'_, 'a> {
        self.push_path(Geometry::Circle {
            center: Point::new(x, y),
            radius,
        })
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> PathHandle<'_, 'a> {
        self.push_path(Geometry::Rect(Rect::new(x, y, x + w, y + h)))
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> PathHandle<'_, 'a> {
        self.push_path(Geometry::Line {
            from: Point::new(x1, y1),
            to: Point::new(x2, y2),
        })
    }

    /// Text centered on `(x, y)`, drawn upright under the dial's quarter-turn frame.
    pub fn text(
        &mut self,
        text: impl Into<String>,
        x: f64,
        y: f64,
        font: Option<FontSpec>,
    ) -> TextHandle<'_, 'a> {
        let mut shape = Shape::new(ShapeKind::Text {
            text: text.into(),
            at: Point::new(x, y),
        });
        shape.style = Style::new()
            .text_align(TextAlign::Center)
            .text_baseline(TextBaseline::Middle);
        shape.style.font = font;
        TextHandle {
            shape: self.push(shape),
        }
    }

    pub fn custom(
        &mut self,
        program: impl FnOnce(&mut Surface) -> DialResult<()> + 'a,
    ) -> ShapeHandle<'_, 'a> {
        ShapeHandle {
            shape: self.push(Shape::new(ShapeKind::Custom(Box::new(program)))),
        }
    }

    /// Group whose children render into an offscreen buffer before compositing, so the
    /// layer's own style (opacity, filter) applies to the group as a whole.
    pub fn layer(
        &mut self,
        program: impl FnOnce(&mut DrawContext<'a>) + 'a,
    ) -> ShapeHandle<'_, 'a> {
        ShapeHandle {
            shape: self.push(Shape::new(ShapeKind::Layer(Box::new(program)))),
        }
    }

    /// Flood the whole surface (within any active clip) with `paint`.
    pub fn fill(&mut self, paint: impl Into<Paint>) -> PathHandle<'_, 'a> {
        self.push_path(Geometry::Cover).fill_with(paint)
    }

    pub(crate) fn render_at(
        mut self,
        surface: &mut Surface,
        res: &mut Resources<'_>,
        depth: usize,
    ) -> DialResult<()> {
        self.shapes.sort_by_key(|s| s.z);
        for shape in self.shapes {
            shape.render(surface, res, depth)?;
        }
        Ok(())
    }
}

/// Style and ordering shared by every shape handle.
pub trait Styled: Sized {
    /// Overlay `style` onto the shape's style.
    fn style(self, style: Style) -> Self;

    fn z(self, z: i32) -> Self;

    fn opacity(self, opacity: f32) -> Self {
        self.style(Style::new().opacity(opacity))
    }
}

/// Fill and stroke intents.
pub trait Paintable: Styled {
    fn fill(self) -> Self;

    fn stroke(self) -> Self;

    fn fill_with(self, paint: impl Into<Paint>) -> Self {
        self.fill().style(Style::new().fill(paint))
    }

    fn stroke_with(self, paint: impl Into<Paint>, width: f64) -> Self {
        self.stroke()
            .style(Style::new().stroke(paint).line_width(width))
    }
}

/// Handle to a path shape (arc, sector, circle, rect, line).
pub struct PathHandle<'q, 'a> {
    shape: &'q mut Shape<'a>,
}

impl<'a> PathHandle<'_, 'a> {
    /// Use the shape as a clip region for the queue `program` builds. A clipped shape is
    /// never filled or stroked itself.
    pub fn clip(self, program: impl FnOnce(&mut DrawContext<'a>) + 'a) -> Self {
        if let ShapeKind::Path { clip, .. } = &mut self.shape.kind {
            *clip = Some(Box::new(program));
        }
        self
    }
}

/// Handle to a text shape.
pub struct TextHandle<'q, 'a> {
    shape: &'q mut Shape<'a>,
}

/// Handle to a custom or layer shape.
pub struct ShapeHandle<'q, 'a> {
    shape: &'q mut Shape<'a>,
}

macro_rules! impl_styled {
    ($($handle:ident),+) => {$(
        impl Styled for $handle<'_, '_> {
            fn style(self, style: Style) -> Self {
                self.shape.style.merge(style);
                self
            }

            fn z(self, z: i32) -> Self {
                self.shape.z = z;
                self
            }
        }
    )+};
}

macro_rules! impl_paintable {
    ($($handle:ident),+) => {$(
        impl Paintable for $handle<'_, '_> {
            fn fill(self) -> Self {
                self.shape.fill = true;
                self
            }

            fn stroke(self) -> Self {
                self.shape.stroke = true;
                self
            }
        }
    )+};
}

impl_styled!(PathHandle, TextHandle, ShapeHandle);
impl_paintable!(PathHandle, TextHandle);
