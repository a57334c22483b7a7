use std::ops::Range;

use log::trace;
use regex::Regex;

use crate::document::Document;
use crate::error::{FltError, Result};

use super::PointKind;
use super::replace::expand_template;

pub(crate) fn check_revision(expected: u64, doc: &Document) -> Result<()> {
    let actual = doc.revision();
    if expected != actual {
        return Err(FltError::StaleMap { expected, actual });
    }
    Ok(())
}

/// One range of a [`Map`](super::Map).
///
/// `offset` and `length` describe the range as it was when the map was built.
/// Text and length queries read the live document lines backing the range,
/// so they reflect in-place edits made since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPoint {
    kind: PointKind,
    offset: usize,
    length: usize,
    lines: Range<usize>,
    revision: u64,
}

impl MapPoint {
    pub(crate) fn new(
        kind: PointKind,
        offset: usize,
        length: usize,
        lines: Range<usize>,
        revision: u64,
    ) -> Self {
        Self {
            kind,
            offset,
            length,
            lines,
            revision,
        }
    }

    pub fn kind(&self) -> PointKind {
        self.kind
    }

    /// Offset into the continuous text when the map was built.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length when the map was built; see [`MapPoint::len`] for the live value.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Indices of the document lines backing this range.
    pub fn lines(&self) -> Range<usize> {
        self.lines.clone()
    }

    /// Indices of the text lines backing this range.
    fn text_lines(&self, doc: &Document) -> Result<Vec<usize>> {
        check_revision(self.revision, doc)?;
        Ok(self
            .lines
            .clone()
            .filter(|&i| doc.lines().get(i).and_then(|l| l.as_text()).is_some())
            .collect())
    }

    fn line_text(doc: &Document, index: usize) -> &str {
        doc.lines()
            .get(index)
            .and_then(|l| l.as_text())
            .map_or("", |l| l.text.as_str())
    }

    /// Current text of the range.
    pub fn text(&self, doc: &Document) -> Result<String> {
        Ok(self
            .text_lines(doc)?
            .into_iter()
            .map(|i| Self::line_text(doc, i))
            .collect())
    }

    /// Current length of the range in bytes.
    pub fn len(&self, doc: &Document) -> Result<usize> {
        Ok(self
            .text_lines(doc)?
            .into_iter()
            .map(|i| Self::line_text(doc, i).len())
            .sum())
    }

    pub fn is_empty(&self, doc: &Document) -> Result<bool> {
        Ok(self.len(doc)? == 0)
    }

    /// Document line index and offset within that line for an offset into
    /// this range's text.
    pub fn locate(&self, doc: &Document, offset: usize) -> Result<(usize, usize)> {
        let mut start = 0;
        for index in self.text_lines(doc)? {
            let length = Self::line_text(doc, index).len();
            if offset < start + length {
                return Ok((index, offset - start));
            }
            start += length;
        }
        Err(FltError::OutOfRange {
            offset,
            length: start,
        })
    }

    /// Character at `offset` within this range's text.
    pub fn char_at(&self, doc: &Document, offset: usize) -> Result<char> {
        let (index, at) = self.locate(doc, offset)?;
        match Self::line_text(doc, index)
            .get(at..)
            .and_then(|rest| rest.chars().next())
        {
            Some(c) => Ok(c),
            None => Err(FltError::OutOfRange {
                offset,
                length: self.len(doc)?,
            }),
        }
    }

    /// Replace the character at `offset` with `replacement`, which must be a
    /// single character. Returns the character that was replaced.
    pub fn replace_char_at(
        &self,
        doc: &mut Document,
        offset: usize,
        replacement: &str,
    ) -> Result<char> {
        let mut chars = replacement.chars();
        if chars.next().is_none() || chars.next().is_some() {
            return Err(FltError::InvalidReplacement(replacement.to_string()));
        }

        let old = self.char_at(doc, offset)?;
        let (index, at) = self.locate(doc, offset)?;
        if let Some(line) = doc.text_line_mut(index) {
            line.text
                .replace_range(at..at + old.len_utf8(), replacement);
        }
        Ok(old)
    }

    /// Replace the first match of `pattern` in this range's text.
    ///
    /// See [`MapPoint::replace_all`]. Returns the number of replacements (0 or 1).
    pub fn replace(&self, doc: &mut Document, pattern: &Regex, template: &str) -> Result<usize> {
        self.replace_n(doc, pattern, template, Some(1))
    }

    /// Replace every match of `pattern` in this range's text.
    ///
    /// Matches are found in the text as it was before any replacement and
    /// applied left to right. A match inside one line is spliced in place. A
    /// match crossing line boundaries puts the whole replacement in the line
    /// where the match starts, empties the lines it covers completely and
    /// trims the covered prefix of the line where it ends.
    ///
    /// `template` may refer to capture groups as `$1` to `$99`, to the whole
    /// match as `$&`, and to a literal dollar as `$$`.
    pub fn replace_all(
        &self,
        doc: &mut Document,
        pattern: &Regex,
        template: &str,
    ) -> Result<usize> {
        self.replace_n(doc, pattern, template, None)
    }

    fn replace_n(
        &self,
        doc: &mut Document,
        pattern: &Regex,
        template: &str,
        limit: Option<usize>,
    ) -> Result<usize> {
        let indices = self.text_lines(doc)?;
        if indices.is_empty() {
            return Ok(0);
        }
        let original = self.text(doc)?;

        let mut skew: isize = 0;
        let mut count = 0;
        for caps in pattern.captures_iter(&original) {
            if limit.is_some_and(|limit| count >= limit) {
                break;
            }
            let Some(found) = caps.get(0) else {
                continue;
            };
            let replacement = expand_template(template, &caps);
            let start = found.start().saturating_add_signed(skew);
            trace!(
                "replacing {:?} at {} (skew {skew}) with {:?}",
                found.as_str(),
                start,
                replacement
            );
            splice(doc, &indices, start, found.len(), &replacement);

            skew += replacement.len() as isize - found.len() as isize;
            count += 1;
        }
        Ok(count)
    }
}

/// Write `replacement` over `length` bytes starting at `start` of the text
/// spread across the lines at `indices`.
fn splice(doc: &mut Document, indices: &[usize], start: usize, length: usize, replacement: &str) {
    let lengths: Vec<usize> = indices
        .iter()
        .map(|&i| MapPoint::line_text(doc, i).len())
        .collect();

    // Line containing `start`, or the end of the last line
    let mut line_start = 0;
    let mut found = None;
    for (k, &line_len) in lengths.iter().enumerate() {
        if start < line_start + line_len {
            found = Some((k, start - line_start));
            break;
        }
        line_start += line_len;
    }
    let (first, at) = found.unwrap_or((indices.len() - 1, lengths[indices.len() - 1]));

    let Some(line) = doc.text_line_mut(indices[first]) else {
        return;
    };
    if at + length <= lengths[first] {
        line.text.replace_range(at..at + length, replacement);
        return;
    }

    line.text.truncate(at);
    line.text.push_str(replacement);
    let mut remaining = length - (lengths[first] - at);

    for (k, &index) in indices.iter().enumerate().skip(first + 1) {
        if remaining == 0 {
            break;
        }
        let Some(line) = doc.text_line_mut(index) else {
            continue;
        };
        if remaining >= lengths[k] {
            line.text.clear();
            remaining -= lengths[k];
        } else {
            line.text.replace_range(..remaining, "");
            remaining = 0;
        }
    }
}
