use std::str::FromStr;

use crate::foundation::core::Affine;
use crate::foundation::error::DialError;
use crate::paint::gradient::Paint;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Horizontal text anchoring relative to the draw point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

/// Vertical text anchoring relative to the draw point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Alphabetic,
    Bottom,
}

/// Font request in CSS shorthand spirit: `"14px Nunito"`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    pub size_px: f32,
    pub family: String,
}

impl FontSpec {
    pub fn new(size_px: f32, family: impl Into<String>) -> Self {
        Self {
            size_px,
            family: family.into(),
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(10.0, "sans-serif")
    }
}

impl FromStr for FontSpec {
    type Err = DialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let size_px = tokens
            .by_ref()
            .find_map(|t| t.strip_suffix("px"))
            .ok_or_else(|| DialError::validation(format!("font \"{s}\" has no px size")))?
            .parse::<f32>()
            .map_err(|_| DialError::validation(format!("font \"{s}\" has an invalid size")))?;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(DialError::validation(format!(
                "font \"{s}\" size must be finite and > 0"
            )));
        }

        let family = tokens.collect::<Vec<_>>().join(" ");
        let family = family.trim_matches(|c| c == '"' || c == '\'');
        Ok(Self::new(
            size_px,
            if family.is_empty() {
                "sans-serif"
            } else {
                family
            },
        ))
    }
}

/// The saveable part of a surface: everything `save`/`restore` brackets.
#[derive(Clone, Debug)]
pub(crate) struct PaintState {
    pub(crate) transform: Affine,
    /// Clip paths already mapped to device space, outermost first.
    pub(crate) clips: Vec<vello_cpu::kurbo::BezPath>,
    pub(crate) global_alpha: f32,
    pub(crate) fill: Paint,
    pub(crate) stroke: Paint,
    pub(crate) line_width: f64,
    pub(crate) line_cap: LineCap,
    pub(crate) line_join: LineJoin,
    pub(crate) font: FontSpec,
    pub(crate) text_align: TextAlign,
    pub(crate) text_baseline: TextBaseline,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            clips: Vec::new(),
            global_alpha: 1.0,
            fill: Paint::default(),
            stroke: Paint::default(),
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            font: FontSpec::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
        }
    }
}

impl PaintState {
    /// Copy of this state without clips, for painting into a detached buffer.
    pub(crate) fn unclipped(&self) -> Self {
        Self {
            clips: Vec::new(),
            ..self.clone()
        }
    }

    pub(crate) fn cpu_stroke(&self) -> vello_cpu::kurbo::Stroke {
        use vello_cpu::kurbo::{Cap, Join};

        let cap = match self.line_cap {
            LineCap::Butt => Cap::Butt,
            LineCap::Round => Cap::Round,
            LineCap::Square => Cap::Square,
        };
        let mut stroke = vello_cpu::kurbo::Stroke::new(self.line_width);
        stroke.start_cap = cap;
        stroke.end_cap = cap;
        stroke.join = match self.line_join {
            LineJoin::Miter => Join::Miter,
            LineJoin::Round => Join::Round,
            LineJoin::Bevel => Join::Bevel,
        };
        stroke
    }
}
