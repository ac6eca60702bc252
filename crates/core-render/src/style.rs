//! Highlight classes and hint styling.
//!
//! A highlighter labels each buffer byte with a class:
//! * `0` default (style reset),
//! * `1..=15` one of the eight legacy colours (`class & 7`), bold when `class & 8`,
//! * `16..=255` a 256-colour palette index.
//!
//! Class transitions are detected per grapheme cluster (the class of a
//! cluster's first byte wins) so escapes never split a cluster.

use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextStyle {
    pub color: Option<Color>,
    pub bold: bool,
}

const LEGACY: [Color; 8] = [
    Color::Black,
    Color::DarkRed,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkMagenta,
    Color::DarkCyan,
    Color::Grey,
];

/// Style for a highlight class; `None` means the default style.
pub fn class_style(class: u8) -> Option<TextStyle> {
    match class {
        0 => None,
        1..=15 => Some(TextStyle {
            color: Some(LEGACY[usize::from(class & 7)]),
            bold: class & 8 != 0,
        }),
        _ => Some(TextStyle {
            color: Some(Color::AnsiValue(class)),
            bold: false,
        }),
    }
}

/// Suggestion text drawn after the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hint {
    pub text: String,
    /// Colour using the same encoding as highlight classes.
    pub color: Option<u8>,
    pub bold: bool,
}

impl Hint {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: false,
        }
    }

    pub fn with_color(mut self, color: u8) -> Self {
        self.color = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Style to wrap the hint in, if any.
    pub fn style(&self) -> Option<TextStyle> {
        let base = self.color.and_then(class_style).unwrap_or_default();
        let style = TextStyle {
            color: base.color,
            bold: base.bold || self.bold,
        };
        (style != TextStyle::default()).then_some(style)
    }
}
