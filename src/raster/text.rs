use crate::foundation::error::{DialError, DialResult};
use crate::raster::state::{FontSpec, TextAlign, TextBaseline};

struct RegisteredFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Shaped glyphs ready to be drawn, positioned relative to the layout's top-left corner.
#[derive(Clone)]
pub struct PreparedText {
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) glyphs: Vec<vello_cpu::Glyph>,
    pub(crate) font_size: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) baseline: f32,
}

impl std::fmt::Debug for PreparedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedText")
            .field("glyphs", &self.glyphs.len())
            .field("font_size", &self.font_size)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl PreparedText {
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Offset from the draw point to the layout's top-left corner.
    pub(crate) fn anchor_offset(&self, align: TextAlign, baseline: TextBaseline) -> (f64, f64) {
        let dx = match align {
            TextAlign::Start | TextAlign::Left => 0.0,
            TextAlign::Center => -self.width / 2.0,
            TextAlign::End | TextAlign::Right => -self.width,
        };
        let dy = match baseline {
            TextBaseline::Top => 0.0,
            TextBaseline::Middle => -self.height / 2.0,
            TextBaseline::Alphabetic => -self.baseline,
            TextBaseline::Bottom => -self.height,
        };
        (f64::from(dx), f64::from(dy))
    }
}

/// Parley-backed shaper over an explicit set of registered fonts.
pub(crate) struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    fonts: Vec<RegisteredFont>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: Vec::new(),
        }
    }

    /// Register font bytes and return the family name they resolve under.
    pub(crate) fn register_font(&mut self, font_bytes: Vec<u8>) -> DialResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| DialError::text("no font families registered from font bytes"))?;

        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| DialError::text("registered font family has no name"))?
            .to_string();

        tracing::debug!(family = %family, "registered font");
        self.fonts.push(RegisteredFont {
            family: family.clone(),
            data: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font_bytes),
                0,
            ),
        });
        Ok(family)
    }

    pub(crate) fn has_fonts(&self) -> bool {
        !self.fonts.is_empty()
    }

    fn resolve(&self, family: &str) -> Option<&RegisteredFont> {
        self.fonts
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(family))
            .or_else(|| self.fonts.first())
    }

    /// Shape `text` with `font`. Returns `None` when no font is registered.
    pub(crate) fn layout(&mut self, text: &str, font: &FontSpec) -> Option<PreparedText> {
        let Some(resolved) = self.resolve(&font.family) else {
            tracing::warn!(family = %font.family, "no fonts registered, skipping text");
            return None;
        };
        let family = resolved.family.clone();
        let data = resolved.data.clone();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let mut baseline = None;
        for line in layout.lines() {
            baseline.get_or_insert(line.metrics().baseline);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }

        Some(PreparedText {
            font: data,
            glyphs,
            font_size: font.size_px,
            width: layout.width(),
            height: layout.height(),
            baseline: baseline.unwrap_or(0.0),
        })
    }
}
