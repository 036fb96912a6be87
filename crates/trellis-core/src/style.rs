//! Presentation styling for components.
//!
//! Style is semantically inert: validation never looks at it. Colors are
//! plain strings (hex or CSS color names) so the rendering layer decides
//! how to interpret them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Border rendering style for a component outline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    /// No border drawn.
    None,
    /// Single solid border (default).
    #[default]
    Single,
    /// Double border, used by start/end terminators.
    Double,
    Dashed,
    Dotted,
}

impl BorderStyle {
    /// Returns the discriminator string used in the portable form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Single => "single",
            Self::Double => "double",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

impl FromStr for BorderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            _ => Err(format!(
                "invalid border style `{s}`, valid values: none, single, double, dashed, dotted"
            )),
        }
    }
}

/// Fill and stroke styling of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub border_style: BorderStyle,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub shadow: bool,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for Style {
    fn default() -> Self {
        Style {
            fill_color: "#4a90e2".to_string(),
            stroke_color: "#2c5aa0".to_string(),
            stroke_width: 2.0,
            border_style: BorderStyle::Single,
            opacity: 1.0,
            shadow: false,
        }
    }
}

impl Style {
    /// Builds the default style with the given fill/stroke palette.
    pub fn with_palette(fill: &str, stroke: &str) -> Self {
        Style {
            fill_color: fill.to_string(),
            stroke_color: stroke.to_string(),
            ..Style::default()
        }
    }
}

/// A merge-patch over [`Style`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub border_style: Option<BorderStyle>,
    pub opacity: Option<f64>,
    pub shadow: Option<bool>,
}

impl StylePatch {
    /// Applies every present field onto `target`.
    pub fn apply(&self, target: &mut Style) {
        if let Some(fill_color) = &self.fill_color {
            target.fill_color = fill_color.clone();
        }
        if let Some(stroke_color) = &self.stroke_color {
            target.stroke_color = stroke_color.clone();
        }
        if let Some(stroke_width) = self.stroke_width {
            target.stroke_width = stroke_width;
        }
        if let Some(border_style) = self.border_style {
            target.border_style = border_style;
        }
        if let Some(opacity) = self.opacity {
            target.opacity = opacity;
        }
        if let Some(shadow) = self.shadow {
            target.shadow = shadow;
        }
    }
}
