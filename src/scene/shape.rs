use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::Shape as _;

use crate::foundation::core::{BezPath, Point, Rect, Vec2};
use crate::foundation::error::DialResult;
use crate::raster::surface::Surface;
use crate::scene::context::DrawContext;
use crate::scene::renderer::Resources;
use crate::scene::style::{Filter, Style};

/// Builds the child queue of a clip region or layer.
pub type Program<'a> = Box<dyn FnOnce(&mut DrawContext<'a>) + 'a>;

/// Paints directly onto the surface, bypassing the shape abstraction.
pub type CustomProgram<'a> = Box<dyn FnOnce(&mut Surface) -> DialResult<()> + 'a>;

const ARC_TOLERANCE: f64 = 0.1;
const TEXT_NUDGE_PX: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Geometry {
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        ccw: bool,
    },
    Sector {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        ccw: bool,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Rect(Rect),
    Line {
        from: Point,
        to: Point,
    },
    /// The whole surface, whatever the current transform.
    Cover,
}

impl Geometry {
    pub(crate) fn to_path(self, surface: &Surface) -> BezPath {
        let mut path = BezPath::new();
        match self {
            Self::Arc {
                center,
                radius,
                start,
                end,
                ccw,
            } => append_arc(&mut path, center, radius, start, end, ccw),
            Self::Sector {
                center,
                radius,
                start,
                end,
                ccw,
            } => {
                path.move_to(center);
                append_arc(&mut path, center, radius, start, end, ccw);
                path.line_to(center);
            }
            Self::Circle { center, radius } => {
                append_arc(&mut path, center, radius, 0.0, TAU, false);
            }
            Self::Rect(rect) => {
                path.move_to((rect.x0, rect.y0));
                path.line_to((rect.x1, rect.y0));
                path.line_to((rect.x1, rect.y1));
                path.line_to((rect.x0, rect.y1));
                path.close_path();
            }
            Self::Line { from, to } => {
                path.move_to(from);
                path.line_to(to);
            }
            Self::Cover => {
                let device = Rect::new(
                    0.0,
                    0.0,
                    f64::from(surface.width()),
                    f64::from(surface.height()),
                );
                path = surface.transform().inverse() * device.to_path(ARC_TOLERANCE);
            }
        }
        path
    }
}

/// Sweep of a canvas-style arc from `start` to `end`, signed by direction.
pub(crate) fn arc_sweep(start: f64, end: f64, ccw: bool) -> f64 {
    let delta = if ccw { start - end } else { end - start };
    let sweep = if delta >= TAU {
        TAU
    } else {
        delta.rem_euclid(TAU)
    };
    if ccw { -sweep } else { sweep }
}

/// Append a circular arc; the current point (if any) is joined to the arc start by a line.
fn append_arc(path: &mut BezPath, center: Point, radius: f64, start: f64, end: f64, ccw: bool) {
    let first = center + Vec2::from_angle(start) * radius;
    if path.elements().is_empty() {
        path.move_to(first);
    } else {
        path.line_to(first);
    }

    let arc = kurbo::Arc {
        center,
        radii: Vec2::new(radius, radius),
        start_angle: start,
        sweep_angle: arc_sweep(start, end, ccw),
        x_rotation: 0.0,
    };
    for el in arc.append_iter(ARC_TOLERANCE) {
        path.push(el);
    }
}

pub(crate) enum ShapeKind<'a> {
    Path {
        geometry: Geometry,
        clip: Option<Program<'a>>,
    },
    Text {
        text: String,
        at: Point,
    },
    Custom(CustomProgram<'a>),
    Layer(Program<'a>),
}

/// One drawable entry of a [`DrawContext`].
pub(crate) struct Shape<'a> {
    pub(crate) kind: ShapeKind<'a>,
    pub(crate) style: Style,
    pub(crate) z: i32,
    pub(crate) fill: bool,
    pub(crate) stroke: bool,
}

impl<'a> Shape<'a> {
    pub(crate) fn new(kind: ShapeKind<'a>) -> Self {
        Self {
            kind,
            style: Style::default(),
            z: 0,
            fill: false,
            stroke: false,
        }
    }

    pub(crate) fn render(
        self,
        surface: &mut Surface,
        res: &mut Resources<'_>,
        depth: usize,
    ) -> DialResult<()> {
        // Layers filter their own buffer; every other filtered shape needs one.
        let isolate = match self.kind {
            ShapeKind::Layer(_) => None,
            _ => self.style.filter,
        };
        match isolate {
            Some(filter) => {
                let mut buffer = res.pool.acquire(depth, surface.width(), surface.height())?;
                let out = self.paint_isolated(filter, &mut buffer, surface, res, depth);
                res.pool.release(depth, buffer);
                out
            }
            None => self.paint(surface, res, depth),
        }
    }

    /// Paint between save and restore; the state is restored even when painting fails.
    fn paint(self, surface: &mut Surface, res: &mut Resources<'_>, depth: usize) -> DialResult<()> {
        let Shape {
            kind,
            style,
            fill,
            stroke,
            ..
        } = self;

        surface.with_saved(|surface| {
            surface.apply_style(&style);
            match kind {
                ShapeKind::Path { geometry, clip } => {
                    let path = geometry.to_path(surface);
                    match clip {
                        Some(program) => {
                            surface.clip(&path);
                            let mut queue = DrawContext::new();
                            program(&mut queue);
                            queue.render_at(surface, res, depth)
                        }
                        None => {
                            if fill {
                                surface.fill_path(&path);
                            }
                            if stroke {
                                surface.stroke_path(&path);
                            }
                            Ok(())
                        }
                    }
                }
                ShapeKind::Text { text, at } => {
                    if !(fill || stroke) {
                        return Ok(());
                    }
                    let Some(prepared) = res.text.layout(&text, surface.font()) else {
                        return Ok(());
                    };
                    enter_text_frame(surface, at);
                    surface.draw_text(&prepared, fill, stroke);
                    Ok(())
                }
                ShapeKind::Custom(program) => program(surface),
                ShapeKind::Layer(program) => {
                    paint_layer(program, style.filter, surface, res, depth)
                }
            }
        })
    }

    /// Paint into `buffer` with this surface's paint state, filter the result, then composite
    /// it pixel-aligned under the active clip.
    fn paint_isolated(
        self,
        filter: Filter,
        buffer: &mut Surface,
        surface: &mut Surface,
        res: &mut Resources<'_>,
        depth: usize,
    ) -> DialResult<()> {
        buffer.adopt_state(surface);
        buffer.set_backdrop(Some(surface.backdrop()?));
        self.paint(buffer, res, depth + 1)?;
        apply_filter(buffer, filter)?;
        surface.with_saved(|surface| {
            surface.set_global_alpha(1.0);
            surface.draw_surface_device(buffer)
        })
    }
}

/// Local frame for glyphs: nudged off the anchor and turned a quarter back, so text reads
/// upright under the dial's outer quarter turn.
fn enter_text_frame(surface: &mut Surface, at: Point) {
    surface.translate(at.x + TEXT_NUDGE_PX, at.y);
    surface.rotate(-FRAC_PI_2);
}

fn paint_layer(
    program: Program<'_>,
    filter: Option<Filter>,
    surface: &mut Surface,
    res: &mut Resources<'_>,
    depth: usize,
) -> DialResult<()> {
    let mut queue = DrawContext::new();
    program(&mut queue);

    let mut buffer = res.pool.acquire(depth, surface.width(), surface.height())?;
    let out = composite_layer(queue, filter, &mut buffer, surface, res, depth);
    res.pool.release(depth, buffer);
    out
}

fn composite_layer(
    queue: DrawContext<'_>,
    filter: Option<Filter>,
    buffer: &mut Surface,
    surface: &mut Surface,
    res: &mut Resources<'_>,
    depth: usize,
) -> DialResult<()> {
    buffer.set_backdrop(Some(surface.backdrop()?));
    queue.render_at(buffer, res, depth + 1)?;
    if let Some(filter) = filter {
        apply_filter(buffer, filter)?;
    }
    surface.draw_surface(buffer)
}

fn apply_filter(surface: &mut Surface, filter: Filter) -> DialResult<()> {
    match filter {
        Filter::Blur { std_dev_px } => surface.blur(std_dev_px),
    }
}
