use std::str::FromStr;

use crate::foundation::error::DialError;
use crate::paint::gradient::Paint;
use crate::raster::state::{FontSpec, LineCap, LineJoin, TextAlign, TextBaseline};
use crate::raster::surface::Surface;

/// Raster filter applied to a shape's pixels as a whole.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    Blur { std_dev_px: f32 },
}

impl FromStr for Filter {
    type Err = DialError;

    /// Parses CSS filter syntax, currently `blur(<n>px)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let arg = s
            .strip_prefix("blur(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| DialError::validation(format!("unsupported filter \"{s}\"")))?
            .trim();
        let arg = arg.strip_suffix("px").unwrap_or(arg);
        let std_dev_px: f32 = arg
            .trim()
            .parse()
            .map_err(|_| DialError::validation(format!("invalid blur radius in \"{s}\"")))?;
        if !std_dev_px.is_finite() || std_dev_px < 0.0 {
            return Err(DialError::validation("blur radius must be finite and >= 0"));
        }
        Ok(Self::Blur { std_dev_px })
    }
}

/// A partial set of paint properties. Merging overlays only the properties that are set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub line_width: Option<f64>,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub opacity: Option<f32>,
    pub font: Option<FontSpec>,
    pub text_align: Option<TextAlign>,
    pub text_baseline: Option<TextBaseline>,
    pub filter: Option<Filter>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(mut self, paint: impl Into<Paint>) -> Self {
        self.fill = Some(paint.into());
        self
    }

    pub fn stroke(mut self, paint: impl Into<Paint>) -> Self {
        self.stroke = Some(paint.into());
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = Some(cap);
        self
    }

    pub fn line_join(mut self, join: LineJoin) -> Self {
        self.line_join = Some(join);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn font(mut self, font: FontSpec) -> Self {
        self.font = Some(font);
        self
    }

    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn text_baseline(mut self, baseline: TextBaseline) -> Self {
        self.text_baseline = Some(baseline);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Overlay every property set in `other` onto `self`.
    pub fn merge(&mut self, other: Style) {
        self.fill = other.fill.or(self.fill.take());
        self.stroke = other.stroke.or(self.stroke.take());
        self.line_width = other.line_width.or(self.line_width);
        self.line_cap = other.line_cap.or(self.line_cap);
        self.line_join = other.line_join.or(self.line_join);
        self.opacity = other.opacity.or(self.opacity);
        self.font = other.font.or(self.font.take());
        self.text_align = other.text_align.or(self.text_align);
        self.text_baseline = other.text_baseline.or(self.text_baseline);
        self.filter = other.filter.or(self.filter);
    }
}

impl Surface {
    /// Assign every property set in `style` to the current paint state.
    ///
    /// `filter` is not a surface property; shapes carrying one are rendered in isolation.
    pub fn apply_style(&mut self, style: &Style) {
        if let Some(p) = &style.fill {
            self.set_fill(p.clone());
        }
        if let Some(p) = &style.stroke {
            self.set_stroke(p.clone());
        }
        if let Some(w) = style.line_width {
            self.set_line_width(w);
        }
        if let Some(cap) = style.line_cap {
            self.set_line_cap(cap);
        }
        if let Some(join) = style.line_join {
            self.set_line_join(join);
        }
        if let Some(a) = style.opacity {
            self.set_global_alpha(a);
        }
        if let Some(font) = &style.font {
            self.set_font(font.clone());
        }
        if let Some(align) = style.text_align {
            self.set_text_align(align);
        }
        if let Some(baseline) = style.text_baseline {
            self.set_text_baseline(baseline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::color::Rgba;

    #[test]
    fn merge_overlays_only_set_properties() {
        let mut base = Style::new().fill(Rgba::WHITE).line_width(3.0);
        base.merge(Style::new().line_width(2.0).opacity(0.5));
        assert_eq!(base.fill, Some(Paint::Solid(Rgba::WHITE)));
        assert_eq!(base.line_width, Some(2.0));
        assert_eq!(base.opacity, Some(0.5));
        assert_eq!(base.stroke, None);
    }

    #[test]
    fn parses_blur_filter() {
        assert_eq!(
            "blur(20px)".parse::<Filter>().unwrap(),
            Filter::Blur { std_dev_px: 20.0 }
        );
        assert_eq!(
            " blur( 1.5 ) ".parse::<Filter>().unwrap(),
            Filter::Blur { std_dev_px: 1.5 }
        );
        assert!("sepia(1)".parse::<Filter>().is_err());
        assert!("blur(-2px)".parse::<Filter>().is_err());
    }

    #[test]
    fn apply_style_sets_surface_state() {
        let mut s = Surface::new(4, 4).unwrap();
        s.apply_style(
            &Style::new()
                .opacity(0.25)
                .font("14px Nunito".parse().unwrap()),
        );
        assert_eq!(s.global_alpha(), 0.25);
        assert_eq!(s.font(), &FontSpec::new(14.0, "Nunito"));
    }
}
