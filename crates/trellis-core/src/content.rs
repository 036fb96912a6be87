//! Display content of a component: text, optional LaTeX equation, and
//! typography. Presentation only; the store's substring search is the one
//! consumer outside rendering.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Textual content and typography of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub text: String,
    /// Optional LaTeX equation rendered alongside (or instead of) the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equation: Option<String>,
    pub font_size: f64,
    pub font_family: String,
    pub text_color: String,
    pub text_align: TextAlign,
}

impl Default for Content {
    fn default() -> Self {
        Content {
            text: String::new(),
            equation: None,
            font_size: 14.0,
            font_family: "Arial, sans-serif".to_string(),
            text_color: "#000000".to_string(),
            text_align: TextAlign::Center,
        }
    }
}

impl Content {
    /// Builds the default content with the given display text.
    pub fn with_text(text: &str) -> Self {
        Content {
            text: text.to_string(),
            ..Content::default()
        }
    }
}

/// A merge-patch over [`Content`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPatch {
    pub text: Option<String>,
    pub equation: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub text_color: Option<String>,
    pub text_align: Option<TextAlign>,
}

impl ContentPatch {
    /// Applies every present field onto `target`.
    pub fn apply(&self, target: &mut Content) {
        if let Some(text) = &self.text {
            target.text = text.clone();
        }
        if let Some(equation) = &self.equation {
            target.equation = Some(equation.clone());
        }
        if let Some(font_size) = self.font_size {
            target.font_size = font_size;
        }
        if let Some(font_family) = &self.font_family {
            target.font_family = font_family.clone();
        }
        if let Some(text_color) = &self.text_color {
            target.text_color = text_color.clone();
        }
        if let Some(text_align) = self.text_align {
            target.text_align = text_align;
        }
    }

    /// Convenience patch that only replaces the display text.
    pub fn text(text: &str) -> Self {
        ContentPatch {
            text: Some(text.to_string()),
            ..ContentPatch::default()
        }
    }
}
