use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;

use crate::bitfield::Bitfield;
use crate::constants::fields;
use crate::error::{FltError, Result};
use crate::features::Features;
use crate::line::{
    Blob, DcEntry, Line, LineKind, LineType, MetaContent, MetaLine, MetaType, TextLine,
    TypedContent, TypedLine,
};

use super::escape::unescape;

static NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r*\n\r*").expect("newline pattern is valid"));
static IGNORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:#|//)[^\r\n]*)?$").expect("comment pattern is valid")
});
static STRUCTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9a-fA-F]+)(?: ([^\r\n]*))?$").expect("line structure pattern is valid")
});
static BLOB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+/.+?) (.+)$").expect("blob pattern is valid"));
static DC_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+) (?s:(.+))").expect("dc pattern is valid"));

/// A logical line before dispatch: flags from its first physical line and the
/// still-escaped content of all its physical lines.
struct Logical {
    line_no: usize,
    flags: Bitfield,
    content: String,
}

/// Failure inside one logical line; the caller adds the line context.
enum Fault {
    Syntax(String),
    Type(String),
    Other(FltError),
}

impl From<FltError> for Fault {
    fn from(err: FltError) -> Self {
        Fault::Other(err)
    }
}

/// Parse FLT source into logical lines.
///
/// Blank and comment lines are skipped, zero-flag physical lines are merged
/// into the preceding logical line, then each logical line is unescaped and
/// dispatched on its `type` field.
pub fn parse(source: &str) -> Result<Vec<Line>> {
    let logical = split_logical(source)?;
    debug!("parsed {} logical lines", logical.len());
    logical.into_iter().map(Logical::into_line).collect()
}

fn split_logical(source: &str) -> Result<Vec<Logical>> {
    let mut logical: Vec<Logical> = Vec::new();

    for (index, raw) in NEWLINE.split(source).enumerate() {
        let line_no = index + 1;
        if IGNORED.is_match(raw) {
            continue;
        }

        let malformed = || FltError::Syntax {
            line_no,
            content: raw.to_string(),
            message: "Malformed line structure".to_string(),
        };
        let caps = STRUCTURE.captures(raw).ok_or_else(malformed)?;
        let flags = Bitfield::from_hex(&caps[1]).map_err(|_| malformed())?;
        let content = caps.get(2).map_or("", |m| m.as_str());

        match logical.last_mut() {
            Some(previous) if flags.is_zero() => {
                trace!(
                    "line {line_no}: continuation of line {}",
                    previous.line_no
                );
                previous.content.push_str(content);
            }
            _ => logical.push(Logical {
                line_no,
                flags,
                content: content.to_string(),
            }),
        }
    }

    Ok(logical)
}

impl Logical {
    fn into_line(self) -> Result<Line> {
        let content = unescape(&self.content);
        dispatch(self.line_no, self.flags, &content).map_err(|fault| match fault {
            Fault::Syntax(message) => FltError::Syntax {
                line_no: self.line_no,
                content: self.content,
                message,
            },
            Fault::Type(message) => FltError::Type {
                line_no: self.line_no,
                content: self.content,
                message,
            },
            Fault::Other(source) => FltError::Line {
                line_no: self.line_no,
                content: self.content,
                source: Box::new(source),
            },
        })
    }
}

fn dispatch(line_no: usize, flags: Bitfield, content: &str) -> std::result::Result<Line, Fault> {
    let code = flags.get(fields::TYPE);
    match LineKind::from_code(code) {
        Some(LineKind::Text) => Ok(TextLine::with_flags(line_no, flags, content).into()),
        Some(LineKind::Typed) => parse_typed(line_no, flags, content).map(Line::from),
        Some(LineKind::Meta) => parse_meta(line_no, flags, content).map(Line::from),
        None => Err(Fault::Type(format!("Unknown line type: {code}"))),
    }
}

/// Split `<hex prefix>[ <rest>]`.
fn split_num_prefix(content: &str) -> std::result::Result<(u64, Option<&str>), Fault> {
    let (prefix, rest) = match content.split_once(' ') {
        Some((prefix, rest)) => (prefix, Some(rest)),
        None => (content, None),
    };
    let code = u64::from_str_radix(prefix, 16)
        .map_err(|_| Fault::Syntax(format!("Invalid numeric prefix: {prefix:?}")))?;
    Ok((code, rest))
}

fn parse_hex(rest: Option<&str>, what: &str) -> std::result::Result<u64, Fault> {
    rest.and_then(|s| u64::from_str_radix(s.trim(), 16).ok())
        .ok_or_else(|| Fault::Syntax(format!("Invalid {what}: {:?}", rest.unwrap_or(""))))
}

fn parse_typed(
    line_no: usize,
    flags: Bitfield,
    content: &str,
) -> std::result::Result<TypedLine, Fault> {
    let (code, rest) = split_num_prefix(content)?;
    let optional = || rest.filter(|s| !s.is_empty()).map(str::to_string);

    let typed = match LineType::from_code(code) {
        Some(LineType::Noop) => TypedContent::Noop,
        Some(LineType::Section) => TypedContent::Section,
        Some(LineType::Paragraph) => TypedContent::Paragraph,
        Some(LineType::Destination) => TypedContent::Destination,
        Some(LineType::Hint) => TypedContent::Hint(optional()),
        Some(LineType::Link) => TypedContent::Link(optional()),
        Some(LineType::Anchor) => TypedContent::Anchor(optional()),
        Some(LineType::Image) => TypedContent::Image(optional()),
        Some(LineType::Table) => TypedContent::Table(parse_hex(rest, "table definition")?),
        Some(LineType::Blob) => {
            let caps = BLOB
                .captures(rest.unwrap_or(""))
                .ok_or_else(|| Fault::Syntax("Invalid blob definition".to_string()))?;
            TypedContent::Blob(Blob {
                media_type: caps[1].to_string(),
                data: caps[2].to_string(),
            })
        }
        None => return Err(Fault::Type(format!("Unknown typed line: {code:x}"))),
    };

    Ok(TypedLine::with_flags(line_no, flags, typed))
}

fn parse_meta(
    line_no: usize,
    flags: Bitfield,
    content: &str,
) -> std::result::Result<MetaLine, Fault> {
    let (code, rest) = split_num_prefix(content)?;

    let meta = match MetaType::from_code(code) {
        Some(MetaType::Doctype) => MetaContent::Doctype(rest.unwrap_or("").to_string()),
        Some(MetaType::Generator) => MetaContent::Generator(rest.unwrap_or("").to_string()),
        Some(MetaType::Version) => MetaContent::Version(parse_hex(rest, "version")?),
        Some(MetaType::Features) => {
            MetaContent::Features(Features::new(parse_hex(rest, "feature set")?))
        }
        Some(MetaType::DcTerm) => {
            let caps = DC_TERM
                .captures(rest.unwrap_or(""))
                .filter(|caps| !caps[2].trim().is_empty())
                .ok_or_else(|| {
                    Fault::Syntax("Malformed dublin core metadata definition".to_string())
                })?;
            MetaContent::DcTerm(DcEntry::new(&caps[1], &caps[2])?)
        }
        None => {
            return Err(Fault::Other(FltError::NotImplemented(format!(
                "Unknown metadata type: {code:x}"
            ))));
        }
    };

    Ok(MetaLine::with_flags(line_no, flags, meta))
}
