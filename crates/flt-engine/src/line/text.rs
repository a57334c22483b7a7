use crate::bitfield::{Bitfield, Field};
use crate::constants::{MASK_LINE_FORMAT, fields};

use super::{LineKind, typed_flags};

/// Independent text style flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Italic,
    Bold,
    Underline,
    Strikeout,
    Supertext,
    Subtext,
    Mono,
}

impl Style {
    /// All styles in ascending bit order.
    pub const ALL: [Style; 7] = [
        Style::Italic,
        Style::Bold,
        Style::Underline,
        Style::Strikeout,
        Style::Supertext,
        Style::Subtext,
        Style::Mono,
    ];

    pub fn field(self) -> Field {
        match self {
            Style::Italic => fields::ITALIC,
            Style::Bold => fields::BOLD,
            Style::Underline => fields::UNDERLINE,
            Style::Strikeout => fields::STRIKEOUT,
            Style::Supertext => fields::SUPERTEXT,
            Style::Subtext => fields::SUBTEXT,
            Style::Mono => fields::MONO,
        }
    }
}

/// A line of formatted text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    line_no: usize,
    flags: Bitfield,
    /// Text content; may contain embedded newlines.
    pub text: String,
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_flags(0, Bitfield::default(), text)
    }

    pub(crate) fn with_flags(line_no: usize, flags: Bitfield, text: impl Into<String>) -> Self {
        Self {
            line_no,
            flags: typed_flags(flags, LineKind::Text),
            text: text.into(),
        }
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn flags(&self) -> Bitfield {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Bitfield) {
        self.flags = typed_flags(flags, LineKind::Text);
    }

    /// Text length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn has_style(&self, style: Style) -> bool {
        self.flags.is_set(style.field())
    }

    pub fn set_style(&mut self, style: Style, on: bool) {
        self.flags.set_flag(style.field(), on);
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.set_style(style, true);
        self
    }

    pub fn styles(&self) -> impl Iterator<Item = Style> + '_ {
        Style::ALL.into_iter().filter(|s| self.has_style(*s))
    }

    /// Any style or reserved format bit is set.
    pub fn has_formatting(&self) -> bool {
        self.flags.value() & MASK_LINE_FORMAT != 0
    }
}
