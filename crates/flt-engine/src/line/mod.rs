//! # Line Model
//!
//! A parsed FLT document is a sequence of logical [`Line`]s. Every line carries
//! a flag [`Bitfield`] whose low two bits select the line kind:
//!
//! | type | kind        | payload                                   |
//! |------|-------------|-------------------------------------------|
//! | 1    | [`TextLine`]  | formatted text                            |
//! | 2    | [`TypedLine`] | `<line type>[ <content>]` (sections, links, blobs, ...) |
//! | 3    | [`MetaLine`]  | `<meta type>[ <content>]` (doctype, version, DC terms, ...) |
//!
//! Sub-kinds are closed enums ([`TypedContent`], [`MetaContent`]) so the codec
//! can dispatch exhaustively in both directions.
//!
//! The `Display` impls produce the *unescaped* rendering of a single logical
//! line; escaping and wrapping belong to [`crate::codec`].

pub mod meta;
pub mod text;
pub mod typed;

use std::fmt;

use crate::bitfield::Bitfield;
use crate::constants::fields;

pub use meta::{DcEntry, MetaContent, MetaLine, MetaType};
pub use text::{Style, TextLine};
pub use typed::{Align, Blob, Destination, LineType, TypedContent, TypedLine};

/// Value of the 2-bit `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Text = 1,
    Typed = 2,
    Meta = 3,
}

impl LineKind {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Text),
            2 => Some(Self::Typed),
            3 => Some(Self::Meta),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        self as u64
    }
}

/// A logical FLT line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Text(TextLine),
    Typed(TypedLine),
    Meta(MetaLine),
}

impl Line {
    pub fn kind(&self) -> LineKind {
        match self {
            Line::Text(_) => LineKind::Text,
            Line::Typed(_) => LineKind::Typed,
            Line::Meta(_) => LineKind::Meta,
        }
    }

    /// First physical source line, or 0 for synthesized lines.
    pub fn line_no(&self) -> usize {
        match self {
            Line::Text(l) => l.line_no(),
            Line::Typed(l) => l.line_no(),
            Line::Meta(l) => l.line_no(),
        }
    }

    pub fn flags(&self) -> Bitfield {
        match self {
            Line::Text(l) => l.flags(),
            Line::Typed(l) => l.flags(),
            Line::Meta(l) => l.flags(),
        }
    }

    /// Replace the flag bits. The `type` field is kept consistent with the variant.
    pub fn set_flags(&mut self, flags: Bitfield) {
        match self {
            Line::Text(l) => l.set_flags(flags),
            Line::Typed(l) => l.set_flags(flags),
            Line::Meta(l) => l.set_flags(flags),
        }
    }

    /// Clears formatting state carried over from previous lines.
    pub fn reset(&self) -> bool {
        self.flags().is_set(fields::RESET)
    }

    pub fn set_reset(&mut self, on: bool) {
        let mut flags = self.flags();
        flags.set_flag(fields::RESET, on);
        self.set_flags(flags);
    }

    pub fn as_text(&self) -> Option<&TextLine> {
        match self {
            Line::Text(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextLine> {
        match self {
            Line::Text(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_typed(&self) -> Option<&TypedLine> {
        match self {
            Line::Typed(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_meta(&self) -> Option<&MetaLine> {
        match self {
            Line::Meta(l) => Some(l),
            _ => None,
        }
    }

    /// Dublin Core entry, if this is a DC metadata line.
    pub fn as_dc(&self) -> Option<&DcEntry> {
        self.as_meta().and_then(MetaLine::dc_entry)
    }

    /// Unescaped payload following the flag field (may be empty).
    pub fn payload(&self) -> String {
        match self {
            Line::Text(l) => l.text.clone(),
            Line::Typed(l) => l.payload(),
            Line::Meta(l) => l.payload(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = self.payload();
        write!(f, "{:04x}", self.flags())?;
        if !payload.is_empty() {
            write!(f, " {payload}")?;
        }
        Ok(())
    }
}

impl From<TextLine> for Line {
    fn from(line: TextLine) -> Self {
        Line::Text(line)
    }
}

impl From<TypedLine> for Line {
    fn from(line: TypedLine) -> Self {
        Line::Typed(line)
    }
}

impl From<MetaLine> for Line {
    fn from(line: MetaLine) -> Self {
        Line::Meta(line)
    }
}

/// Flags with the `type` field forced to `kind`.
pub(crate) fn typed_flags(flags: Bitfield, kind: LineKind) -> Bitfield {
    flags.with(fields::TYPE, kind.code())
}
