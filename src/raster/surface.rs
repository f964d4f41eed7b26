use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, FrameRGBA, Point};
use crate::foundation::error::{DialError, DialResult};
use crate::paint::color::Rgba;
use crate::paint::gradient::Paint;
use crate::raster::blur::Blur;
use crate::raster::composite::{mul_div255, over_in_place};
use crate::raster::state::{FontSpec, LineCap, LineJoin, PaintState, TextAlign, TextBaseline};
use crate::raster::text::PreparedText;

/// Read-only copy of a surface's pixels, drawable onto any surface.
#[derive(Clone, Debug)]
pub struct Snapshot(Arc<vello_cpu::Pixmap>);

impl Snapshot {
    pub fn width(&self) -> u32 {
        u32::from(self.0.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.0.height())
    }
}

/// Immediate-mode raster target with a canvas-like save/restore state stack.
///
/// Draw calls are recorded into a `vello_cpu` context and committed into the pixel
/// buffer lazily: on `flush`, `frame`, and before any operation that reads pixels back.
pub struct Surface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    committed: Arc<vello_cpu::Pixmap>,
    scratch: vello_cpu::Pixmap,
    state: PaintState,
    saved: Vec<PaintState>,
    pending: bool,
    backdrop: Option<Snapshot>,
    blur: Blur,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("save_depth", &self.saved.len())
            .field("clips", &self.state.clips.len())
            .field("pending", &self.pending)
            .finish()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> DialResult<Self> {
        let width: u16 = width
            .try_into()
            .map_err(|_| DialError::validation("surface width exceeds u16"))?;
        let height: u16 = height
            .try_into()
            .map_err(|_| DialError::validation("surface height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(DialError::validation("surface width/height must be > 0"));
        }

        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            committed: Arc::new(vello_cpu::Pixmap::new(width, height)),
            scratch: vello_cpu::Pixmap::new(width, height),
            state: PaintState::default(),
            saved: Vec::new(),
            pending: false,
            backdrop: None,
            blur: Blur::default(),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Number of `save` calls not yet matched by `restore`.
    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    /// Pop the state stack. A restore without a matching save is ignored.
    pub fn restore(&mut self) {
        let Some(prev) = self.saved.pop() else {
            return;
        };
        let extra = self.state.clips.len().saturating_sub(prev.clips.len());
        for _ in 0..extra {
            self.ctx.pop_layer();
        }
        self.state = prev;
    }

    /// Run `f` between `save` and `restore`; the restore happens even when `f` fails.
    pub fn with_saved<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> DialResult<T>,
    ) -> DialResult<T> {
        self.save();
        let out = f(self);
        self.restore();
        out
    }

    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform *= Affine::translate((dx, dy));
    }

    pub fn rotate(&mut self, radians: f64) {
        self.state.transform *= Affine::rotate(radians);
    }

    /// Rotate by `radians` around `center` in the current user space.
    pub fn rotate_about(&mut self, radians: f64, center: Point) {
        self.translate(center.x, center.y);
        self.rotate(radians);
        self.translate(-center.x, -center.y);
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.global_alpha
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    pub fn set_fill(&mut self, paint: impl Into<Paint>) {
        self.state.fill = paint.into();
    }

    pub fn set_stroke(&mut self, paint: impl Into<Paint>) {
        self.state.stroke = paint.into();
    }

    /// Non-finite and non-positive widths are ignored.
    pub fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    pub fn font(&self) -> &FontSpec {
        &self.state.font
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.state.font = font;
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    pub fn fill_path(&mut self, path: &BezPath) {
        let paint = self.state.fill.to_cpu();
        let path = bezpath_to_cpu(path);
        self.draw(paint, |ctx| ctx.fill_path(&path));
    }

    pub fn stroke_path(&mut self, path: &BezPath) {
        let paint = self.state.stroke.to_cpu();
        let stroke = self.state.cpu_stroke();
        let path = bezpath_to_cpu(path);
        self.draw(paint, |ctx| {
            ctx.set_stroke(stroke);
            ctx.stroke_path(&path);
        });
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let paint = self.state.fill.to_cpu();
        let rect = vello_cpu::kurbo::Rect::new(x, y, x + w, y + h);
        self.draw(paint, |ctx| ctx.fill_rect(&rect));
    }

    /// Intersect the clip region with `path` mapped through the current transform.
    pub fn clip(&mut self, path: &BezPath) {
        let device = bezpath_to_cpu(&(self.state.transform * path.clone()));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.push_clip_layer(&device);
        self.state.clips.push(device);
    }

    /// Draw shaped text at the user-space origin, honoring text align and baseline.
    pub fn draw_text(&mut self, text: &PreparedText, fill: bool, stroke: bool) {
        if text.glyphs.is_empty() || self.state.global_alpha <= 0.0 {
            return;
        }
        let (dx, dy) = text.anchor_offset(self.state.text_align, self.state.text_baseline);
        let transform = affine_to_cpu(self.state.transform * Affine::translate((dx, dy)));
        let glyphs = || {
            text.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            })
        };

        if fill {
            let paint = self.state.fill.to_cpu();
            self.draw(paint, |ctx| {
                ctx.set_transform(transform);
                ctx.glyph_run(&text.font)
                    .font_size(text.font_size)
                    .fill_glyphs(glyphs());
            });
        }
        if stroke {
            let paint = self.state.stroke.to_cpu();
            let line = self.state.cpu_stroke();
            self.draw(paint, |ctx| {
                ctx.set_transform(transform);
                ctx.set_stroke(line);
                ctx.glyph_run(&text.font)
                    .font_size(text.font_size)
                    .stroke_glyphs(glyphs());
            });
        }
    }

    /// Draw a snapshot with its top-left corner at the user-space origin.
    pub fn draw_snapshot(&mut self, snapshot: &Snapshot) -> DialResult<()> {
        self.composite_pixmap(&snapshot.0, self.state.transform)
    }

    /// Draw another surface's pixels at the current transform and global alpha.
    pub fn draw_surface(&mut self, other: &mut Surface) -> DialResult<()> {
        other.flush()?;
        let pixmap = other.committed.clone();
        self.composite_pixmap(&pixmap, self.state.transform)
    }

    /// Draw another surface's pixels pixel-aligned, ignoring the current transform.
    pub(crate) fn draw_surface_device(&mut self, other: &mut Surface) -> DialResult<()> {
        other.flush()?;
        let pixmap = other.committed.clone();
        self.composite_pixmap(&pixmap, Affine::IDENTITY)
    }

    fn composite_pixmap(
        &mut self,
        pixmap: &Arc<vello_cpu::Pixmap>,
        transform: Affine,
    ) -> DialResult<()> {
        let (w, h) = (f64::from(pixmap.width()), f64::from(pixmap.height()));
        let image = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(pixmap.clone()),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let transform = affine_to_cpu(transform);
        self.draw(image, |ctx| {
            ctx.set_transform(transform);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        });
        // Release the recorded image paint so `pixmap` is uniquely owned again.
        self.ctx.set_paint(Rgba::TRANSPARENT.to_cpu());
        self.flush()
    }

    fn draw(
        &mut self,
        paint: impl Into<vello_cpu::PaintType>,
        f: impl FnOnce(&mut vello_cpu::RenderContext),
    ) {
        let opacity = self.state.global_alpha;
        if opacity <= 0.0 {
            return;
        }
        self.ctx.set_transform(affine_to_cpu(self.state.transform));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        f(&mut self.ctx);
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        self.pending = true;
    }

    /// Gaussian-blur everything drawn so far.
    pub fn blur(&mut self, std_dev_px: f32) -> DialResult<()> {
        self.flush()?;
        let (w, h) = (self.width(), self.height());
        let pixmap = Arc::make_mut(&mut self.committed);
        self.blur
            .apply(pixmap.data_as_u8_slice_mut(), w, h, std_dev_px)
    }

    /// Pixels this surface sits on top of: an inherited backdrop for detached buffers,
    /// otherwise its own current contents.
    pub fn backdrop(&mut self) -> DialResult<Snapshot> {
        if let Some(b) = &self.backdrop {
            return Ok(b.clone());
        }
        self.snapshot()
    }

    pub fn snapshot(&mut self) -> DialResult<Snapshot> {
        self.flush()?;
        Ok(Snapshot(self.committed.clone()))
    }

    pub(crate) fn set_backdrop(&mut self, backdrop: Option<Snapshot>) {
        self.backdrop = backdrop;
    }

    /// Copy `state` (minus clips) into this surface, for painting on its behalf.
    pub(crate) fn adopt_state(&mut self, other: &Surface) {
        self.pop_clip_layers();
        self.state = other.state.unclipped();
    }

    /// Erase all pixels. The state stack is left untouched.
    pub fn clear(&mut self) {
        self.pop_clip_layers();
        self.ctx.reset();
        self.pending = false;
        match Arc::get_mut(&mut self.committed) {
            Some(pixmap) => pixmap.data_as_u8_slice_mut().fill(0),
            None => {
                self.committed = Arc::new(vello_cpu::Pixmap::new(self.width, self.height));
            }
        }
        self.push_clip_layers();
    }

    /// Fill every pixel with `color`, ignoring clips, transform and alpha.
    pub fn clear_to(&mut self, color: Rgba) {
        self.clear();
        let px = premultiply(color.to_rgba8());
        if px == [0; 4] {
            return;
        }
        let pixmap = Arc::make_mut(&mut self.committed);
        for chunk in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Return to a freshly allocated state: no pixels, no saved states, no backdrop.
    pub(crate) fn reset(&mut self) {
        self.clear();
        self.pop_clip_layers();
        self.state = PaintState::default();
        self.saved.clear();
        self.backdrop = None;
    }

    /// Commit recorded draw calls into the pixel buffer.
    pub fn flush(&mut self) -> DialResult<()> {
        if !self.pending {
            return Ok(());
        }
        self.pop_clip_layers();
        self.ctx.flush();
        self.scratch.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.scratch);
        self.ctx.reset();
        self.pending = false;

        let committed = Arc::make_mut(&mut self.committed);
        over_in_place(
            committed.data_as_u8_slice_mut(),
            self.scratch.data_as_u8_slice(),
            1.0,
        )?;
        self.push_clip_layers();
        Ok(())
    }

    pub fn frame(&mut self) -> DialResult<FrameRGBA> {
        self.flush()?;
        Ok(FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.committed.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn pop_clip_layers(&mut self) {
        for _ in 0..self.state.clips.len() {
            self.ctx.pop_layer();
        }
    }

    fn push_clip_layers(&mut self) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for clip in &self.state.clips {
            self.ctx.push_clip_layer(clip);
        }
    }
}

fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let premul = |c: u8| mul_div255(u16::from(c), u16::from(a));
    [premul(r), premul(g), premul(b), a]
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;

    fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        kurbo::Rect::new(x0, y0, x1, y1).to_path(0.1)
    }

    #[test]
    fn rejects_oversized_and_empty_surfaces() {
        assert!(Surface::new(70_000, 10).is_err());
        assert!(Surface::new(0, 10).is_err());
    }

    #[test]
    fn fill_path_paints_inside_only() {
        let mut s = Surface::new(16, 16).unwrap();
        s.set_fill(Rgba::rgb8(255, 0, 0));
        s.fill_path(&rect_path(0.0, 0.0, 8.0, 16.0));
        let f = s.frame().unwrap();
        assert_eq!(f.pixel(2, 8), Some([255, 0, 0, 255]));
        assert_eq!(f.pixel(12, 8), Some([0, 0, 0, 0]));
    }

    #[test]
    fn clip_limits_later_draws_until_restore() {
        let mut s = Surface::new(16, 16).unwrap();
        s.save();
        s.clip(&rect_path(0.0, 0.0, 8.0, 16.0));
        s.set_fill(Rgba::WHITE);
        s.fill_rect(0.0, 0.0, 16.0, 8.0);
        s.restore();
        s.set_fill(Rgba::rgb8(0, 0, 255));
        s.fill_rect(0.0, 8.0, 16.0, 8.0);

        let f = s.frame().unwrap();
        assert_eq!(f.pixel(2, 2), Some([255, 255, 255, 255]));
        assert_eq!(f.pixel(12, 2), Some([0, 0, 0, 0]));
        assert_eq!(f.pixel(12, 12), Some([0, 0, 255, 255]));
    }

    #[test]
    fn clip_survives_intermediate_flush() {
        let mut s = Surface::new(16, 16).unwrap();
        s.clip(&rect_path(0.0, 0.0, 8.0, 16.0));
        s.set_fill(Rgba::WHITE);
        s.fill_rect(0.0, 0.0, 16.0, 16.0);
        s.flush().unwrap();
        s.set_fill(Rgba::rgb8(255, 0, 0));
        s.fill_rect(0.0, 0.0, 16.0, 16.0);
        let f = s.frame().unwrap();
        assert_eq!(f.pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(f.pixel(12, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn save_restore_round_trips_state() {
        let mut s = Surface::new(4, 4).unwrap();
        s.save();
        s.translate(10.0, 0.0);
        s.set_global_alpha(0.25);
        s.restore();
        assert_eq!(s.transform(), Affine::IDENTITY);
        assert_eq!(s.global_alpha(), 1.0);
        s.restore();
        assert_eq!(s.save_depth(), 0);
    }

    #[test]
    fn with_saved_restores_on_error() {
        let mut s = Surface::new(4, 4).unwrap();
        let res: DialResult<()> = s.with_saved(|s| {
            s.translate(1.0, 1.0);
            Err(DialError::render("boom"))
        });
        assert!(res.is_err());
        assert_eq!(s.save_depth(), 0);
        assert_eq!(s.transform(), Affine::IDENTITY);
    }

    #[test]
    fn global_alpha_scales_fills() {
        let mut s = Surface::new(4, 4).unwrap();
        s.set_global_alpha(0.5);
        s.set_fill(Rgba::WHITE);
        s.fill_rect(0.0, 0.0, 4.0, 4.0);
        let a = s.frame().unwrap().pixel(1, 1).unwrap()[3];
        assert!((i32::from(a) - 128).abs() <= 2, "alpha {a}");
    }

    #[test]
    fn draw_surface_composites_at_transform() {
        let mut src = Surface::new(4, 4).unwrap();
        src.set_fill(Rgba::WHITE);
        src.fill_rect(0.0, 0.0, 2.0, 2.0);

        let mut dst = Surface::new(4, 4).unwrap();
        dst.translate(2.0, 2.0);
        dst.draw_surface(&mut src).unwrap();
        let f = dst.frame().unwrap();
        assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(f.pixel(3, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn snapshot_is_isolated_from_later_draws() {
        let mut s = Surface::new(4, 4).unwrap();
        let before = s.snapshot().unwrap();
        s.clear_to(Rgba::WHITE);
        assert_eq!(before.0.data_as_u8_slice()[3], 0);
        assert_eq!(s.frame().unwrap().pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn clear_to_premultiplies_with_rounding() {
        let mut s = Surface::new(2, 2).unwrap();
        s.clear_to(Rgba::rgba(1.0, 255.0, 128.0, 128.0));
        assert_eq!(s.frame().unwrap().pixel(1, 1), Some([1, 128, 64, 128]));
        assert_eq!(premultiply([255, 255, 255, 255]), [255, 255, 255, 255]);
    }

    #[test]
    fn blur_softens_hard_edges() {
        let mut s = Surface::new(16, 16).unwrap();
        s.set_fill(Rgba::WHITE);
        s.fill_rect(0.0, 0.0, 8.0, 16.0);
        s.blur(2.0).unwrap();
        let f = s.frame().unwrap();
        let edge = f.pixel(8, 8).unwrap()[3];
        assert!(edge > 0 && edge < 255, "edge alpha {edge}");
    }

    #[test]
    fn reset_forgets_state_and_pixels() {
        let mut s = Surface::new(4, 4).unwrap();
        s.save();
        s.clip(&rect_path(0.0, 0.0, 2.0, 2.0));
        s.clear_to(Rgba::WHITE);
        s.reset();
        assert_eq!(s.save_depth(), 0);
        assert!(s.state.clips.is_empty());
        assert_eq!(s.frame().unwrap().pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
