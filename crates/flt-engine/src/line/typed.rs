use crate::bitfield::Bitfield;
use crate::constants::fields;

use super::{LineKind, typed_flags};

/// Typed line discriminant (first hex token of the payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineType {
    Noop = 0,
    Section = 1,
    Paragraph = 2,
    Hint = 3,
    Link = 4,
    Anchor = 5,
    Blob = 6,
    Image = 7,
    Table = 8,
    Destination = 9,
}

impl LineType {
    pub fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0 => Self::Noop,
            1 => Self::Section,
            2 => Self::Paragraph,
            3 => Self::Hint,
            4 => Self::Link,
            5 => Self::Anchor,
            6 => Self::Blob,
            7 => Self::Image,
            8 => Self::Table,
            9 => Self::Destination,
            _ => return None,
        })
    }

    pub fn code(self) -> u64 {
        self as u64
    }
}

/// Text alignment for sections and paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    #[default]
    Default = 0,
    Left = 1,
    Center = 2,
    Right = 3,
}

impl Align {
    fn from_code(code: u64) -> Self {
        match code & 0b11 {
            1 => Self::Left,
            2 => Self::Center,
            3 => Self::Right,
            _ => Self::Default,
        }
    }
}

/// Where the text following a destination line flows to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Body = 0,
    Note = 1,
    Cell = 2,
    Head = 3,
}

impl Destination {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Body),
            1 => Some(Self::Note),
            2 => Some(Self::Cell),
            3 => Some(Self::Head),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        self as u64
    }
}

/// Base64-encoded binary data with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// `type/subtype`
    pub media_type: String,
    pub data: String,
}

/// Payload of a typed line, one variant per [`LineType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedContent {
    Noop,
    Section,
    Paragraph,
    Hint(Option<String>),
    Link(Option<String>),
    Anchor(Option<String>),
    Blob(Blob),
    Image(Option<String>),
    Table(u64),
    Destination,
}

impl TypedContent {
    pub fn line_type(&self) -> LineType {
        match self {
            TypedContent::Noop => LineType::Noop,
            TypedContent::Section => LineType::Section,
            TypedContent::Paragraph => LineType::Paragraph,
            TypedContent::Hint(_) => LineType::Hint,
            TypedContent::Link(_) => LineType::Link,
            TypedContent::Anchor(_) => LineType::Anchor,
            TypedContent::Blob(_) => LineType::Blob,
            TypedContent::Image(_) => LineType::Image,
            TypedContent::Table(_) => LineType::Table,
            TypedContent::Destination => LineType::Destination,
        }
    }
}

/// A typed line that does something special: structure, links, media.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedLine {
    line_no: usize,
    flags: Bitfield,
    content: TypedContent,
}

impl TypedLine {
    pub fn new(content: TypedContent) -> Self {
        Self::with_flags(0, Bitfield::default(), content)
    }

    pub(crate) fn with_flags(line_no: usize, flags: Bitfield, content: TypedContent) -> Self {
        Self {
            line_no,
            flags: typed_flags(flags, LineKind::Typed),
            content,
        }
    }

    /// A destination line routing the following text to `destination`.
    pub fn new_destination(destination: Destination, header: bool) -> Self {
        let mut line = Self::new(TypedContent::Destination);
        line.flags.set(fields::DESTINATION, destination.code());
        line.flags.set_flag(fields::HEADER, header);
        line
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn flags(&self) -> Bitfield {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Bitfield) {
        self.flags = typed_flags(flags, LineKind::Typed);
    }

    pub fn line_type(&self) -> LineType {
        self.content.line_type()
    }

    pub fn content(&self) -> &TypedContent {
        &self.content
    }

    pub fn blob(&self) -> Option<&Blob> {
        match &self.content {
            TypedContent::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    fn has_align(&self) -> bool {
        matches!(self.line_type(), LineType::Section | LineType::Paragraph)
    }

    /// Alignment of a section or paragraph; `None` for other line types.
    pub fn align(&self) -> Option<Align> {
        self.has_align()
            .then(|| Align::from_code(self.flags.get(fields::ALIGN)))
    }

    /// Sets the alignment; ignored for line types without an alignment field.
    pub fn set_align(&mut self, align: Align) {
        if self.has_align() {
            self.flags.set(fields::ALIGN, align as u64);
        }
    }

    /// Section preceded by a visual break. Always false for other line types.
    pub fn visual_break(&self) -> bool {
        self.line_type() == LineType::Section && self.flags.is_set(fields::VISUAL_BREAK)
    }

    pub fn set_visual_break(&mut self, on: bool) {
        if self.line_type() == LineType::Section {
            self.flags.set_flag(fields::VISUAL_BREAK, on);
        }
    }

    /// Raw 4-bit destination code of a destination line.
    pub fn destination_code(&self) -> Option<u64> {
        (self.line_type() == LineType::Destination).then(|| self.flags.get(fields::DESTINATION))
    }

    /// Known destination of a destination line.
    pub fn destination(&self) -> Option<Destination> {
        self.destination_code().and_then(Destination::from_code)
    }

    /// Destination is a header (table cells).
    pub fn header(&self) -> bool {
        self.line_type() == LineType::Destination && self.flags.is_set(fields::HEADER)
    }

    pub(crate) fn payload(&self) -> String {
        let code = format!("{:x}", self.line_type().code());
        let rest = match &self.content {
            TypedContent::Noop
            | TypedContent::Section
            | TypedContent::Paragraph
            | TypedContent::Destination => None,
            TypedContent::Hint(s)
            | TypedContent::Link(s)
            | TypedContent::Anchor(s)
            | TypedContent::Image(s) => s.clone(),
            TypedContent::Blob(blob) => Some(format!("{} {}", blob.media_type, blob.data)),
            TypedContent::Table(n) => Some(format!("{n:x}")),
        };
        match rest {
            Some(rest) => format!("{code} {rest}"),
            None => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads() {
        let cases = [
            (TypedContent::Section, "1"),
            (TypedContent::Hint(None), "3"),
            (TypedContent::Link(Some("https://example.com".into())), "4 https://example.com"),
            (TypedContent::Table(255), "8 ff"),
            (
                TypedContent::Blob(Blob {
                    media_type: "image/png".into(),
                    data: "iVBORw0K".into(),
                }),
                "6 image/png iVBORw0K",
            ),
        ];
        for (content, expected) in cases {
            assert_eq!(TypedLine::new(content).payload(), expected);
        }
    }

    #[test]
    fn test_align_only_on_sections_and_paragraphs() {
        let mut para = TypedLine::new(TypedContent::Paragraph);
        para.set_align(Align::Right);
        assert_eq!(para.align(), Some(Align::Right));
        assert_eq!(para.flags().value(), 0x0032);

        let mut link = TypedLine::new(TypedContent::Link(None));
        link.set_align(Align::Right);
        assert_eq!(link.align(), None);
        assert_eq!(link.flags().value(), 0x0002);
    }

    #[test]
    fn test_visual_break() {
        let mut section = TypedLine::new(TypedContent::Section);
        section.set_visual_break(true);
        section.set_align(Align::Center);
        assert!(section.visual_break());
        assert_eq!(section.align(), Some(Align::Center));
        assert_eq!(section.flags().value(), 0x0062);
    }

    #[test]
    fn test_destination_fields() {
        let cell = TypedLine::new_destination(Destination::Cell, true);
        assert_eq!(cell.flags().value(), 0x0122);
        assert_eq!(cell.destination(), Some(Destination::Cell));
        assert!(cell.header());

        let note = TypedLine::new_destination(Destination::Note, false);
        assert_eq!(note.destination(), Some(Destination::Note));
        assert!(!note.header());

        let para = TypedLine::new(TypedContent::Paragraph);
        assert_eq!(para.destination(), None);
    }
}
