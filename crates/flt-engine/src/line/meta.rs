use crate::bitfield::Bitfield;
use crate::dublin_core;
use crate::error::{FltError, Result};
use crate::features::Features;

use super::{LineKind, typed_flags};

/// Metadata line discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaType {
    Doctype = 0,
    Version = 1,
    Features = 2,
    DcTerm = 3,
    Generator = 4,
}

impl MetaType {
    pub fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0 => Self::Doctype,
            1 => Self::Version,
            2 => Self::Features,
            3 => Self::DcTerm,
            4 => Self::Generator,
            _ => return None,
        })
    }

    pub fn code(self) -> u64 {
        self as u64
    }
}

/// A Dublin Core `term value` pair. The term is always in the vocabulary and
/// the value is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcEntry {
    term: String,
    pub value: String,
}

impl DcEntry {
    pub fn new(term: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let term = term.into();
        if !dublin_core::is_term(&term) {
            return Err(FltError::Vocabulary(term));
        }
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return Err(FltError::Format(format!(
                "Dublin core value for {term} is empty"
            )));
        }
        Ok(Self {
            term,
            value: value.to_string(),
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaContent {
    Doctype(String),
    Version(u64),
    Features(Features),
    DcTerm(DcEntry),
    Generator(String),
}

impl MetaContent {
    pub fn meta_type(&self) -> MetaType {
        match self {
            MetaContent::Doctype(_) => MetaType::Doctype,
            MetaContent::Version(_) => MetaType::Version,
            MetaContent::Features(_) => MetaType::Features,
            MetaContent::DcTerm(_) => MetaType::DcTerm,
            MetaContent::Generator(_) => MetaType::Generator,
        }
    }
}

/// A document metadata entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaLine {
    line_no: usize,
    flags: Bitfield,
    content: MetaContent,
}

impl MetaLine {
    pub fn new(content: MetaContent) -> Self {
        Self::with_flags(0, Bitfield::default(), content)
    }

    pub(crate) fn with_flags(line_no: usize, flags: Bitfield, content: MetaContent) -> Self {
        Self {
            line_no,
            flags: typed_flags(flags, LineKind::Meta),
            content,
        }
    }

    /// A synthesized Dublin Core line; fails for terms outside the vocabulary
    /// and for blank values.
    pub fn new_dc(term: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Ok(Self::new(MetaContent::DcTerm(DcEntry::new(term, value)?)))
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn flags(&self) -> Bitfield {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Bitfield) {
        self.flags = typed_flags(flags, LineKind::Meta);
    }

    pub fn meta_type(&self) -> MetaType {
        self.content.meta_type()
    }

    pub fn content(&self) -> &MetaContent {
        &self.content
    }

    pub fn dc_entry(&self) -> Option<&DcEntry> {
        match &self.content {
            MetaContent::DcTerm(entry) => Some(entry),
            _ => None,
        }
    }

    pub(crate) fn payload(&self) -> String {
        let code = self.meta_type().code();
        let rest = match &self.content {
            MetaContent::Doctype(s) | MetaContent::Generator(s) => s.clone(),
            MetaContent::Version(v) => format!("{v:x}"),
            MetaContent::Features(f) => f.to_string(),
            MetaContent::DcTerm(entry) => format!("{} {}", entry.term, entry.value),
        };
        if rest.is_empty() {
            format!("{code:x}")
        } else {
            format!("{code:x} {rest}")
        }
    }
}
