use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::codec::{self, Header};
use crate::constants::{DEFAULT_GENERATOR, DEFAULT_VERSION, MAX_VERSION, MEDIA_TYPE, MIN_VERSION};
use crate::dublin_core;
use crate::error::{FltError, Result};
use crate::features::Features;
use crate::line::{Line, MetaContent, MetaLine, TextLine};

/// An FLT document: header values plus the body lines.
///
/// Doctype, version, features and generator lines are consumed while the
/// document is assembled; Dublin Core lines stay in the body.
///
/// ```rust
/// # use flt_engine::Document;
/// let mut doc: Document = "0003 3 title A Tale\n0001 Once upon a time".parse().unwrap();
/// doc.add_dc("creator", "Someone").unwrap();
/// assert_eq!(doc.get_dc("title").unwrap(), vec!["A Tale"]);
/// assert!(doc.to_string().contains("0003 3 creator Someone"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    version: u64,
    features: Features,
    generator: String,
    lines: Vec<Line>,
    /// Bumped on every change that may insert, remove or reorder lines.
    revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with default header values.
    pub fn new() -> Self {
        Self {
            version: DEFAULT_VERSION,
            features: Features::default(),
            generator: DEFAULT_GENERATOR.to_string(),
            lines: Vec::new(),
            revision: 0,
        }
    }

    /// Parse FLT source into a document.
    pub fn parse(source: &str) -> Result<Self> {
        Self::from_lines(codec::parse(source)?)
    }

    /// Assemble a document from logical lines, consuming header metadata.
    pub fn from_lines(lines: impl IntoIterator<Item = Line>) -> Result<Self> {
        let mut doc = Self::new();

        for line in lines {
            let Line::Meta(meta) = &line else {
                doc.lines.push(line);
                continue;
            };
            match meta.content() {
                MetaContent::Doctype(doctype) => {
                    if doctype != MEDIA_TYPE {
                        return Err(FltError::Format("Not an FLT document".to_string()));
                    }
                }
                MetaContent::Version(version) => doc.version = *version,
                MetaContent::Features(features) => doc.features = *features,
                MetaContent::Generator(generator) => doc.generator = generator.clone(),
                MetaContent::DcTerm(_) => {
                    if !doc.features.dcmeta() {
                        return Err(FltError::Format(
                            "Dublin core metadata is present, but not enabled for this document"
                                .to_string(),
                        ));
                    }
                    doc.lines.push(line);
                }
            }
        }

        debug!(
            "assembled document: version {}, features {}, {} body lines",
            doc.version,
            doc.features,
            doc.lines.len()
        );
        Ok(doc)
    }

    /// Render to FLT source.
    pub fn render(&self) -> String {
        codec::render(&self.header(), &self.lines)
    }

    pub fn header(&self) -> Header {
        Header {
            version: self.version,
            features: self.features,
        }
    }

    pub fn doctype(&self) -> &'static str {
        MEDIA_TYPE
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Version falls within the range this library understands.
    pub fn is_supported_version(&self) -> bool {
        (MIN_VERSION..=MAX_VERSION).contains(&self.version)
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    /// Generator read from the source. Rendering always writes the library's own.
    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Mutable access to the line sequence. Invalidates existing maps.
    pub fn lines_mut(&mut self) -> &mut Vec<Line> {
        self.revision += 1;
        &mut self.lines
    }

    /// Append a line. Invalidates existing maps.
    pub fn push_line(&mut self, line: impl Into<Line>) {
        self.revision += 1;
        self.lines.push(line.into());
    }

    /// Mutable access to the text line at `index`. Existing maps stay valid.
    pub fn text_line_mut(&mut self, index: usize) -> Option<&mut TextLine> {
        self.lines.get_mut(index).and_then(Line::as_text_mut)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn check_dc(&self, term: &str) -> Result<()> {
        if !self.features.dcmeta() {
            return Err(FltError::Format(
                "Dublin core metadata is not enabled for this document".to_string(),
            ));
        }
        if !dublin_core::is_term(term) {
            return Err(FltError::Vocabulary(term.to_string()));
        }
        Ok(())
    }

    /// Append a Dublin Core entry.
    pub fn add_dc(&mut self, term: &str, value: impl Into<String>) -> Result<()> {
        self.check_dc(term)?;
        self.push_line(MetaLine::new_dc(term, value)?);
        Ok(())
    }

    /// Replace every entry for `term` with `values`.
    ///
    /// Empty `values` only removes entries and never fails. Otherwise every
    /// value is validated before the document is touched.
    pub fn set_dc<I, S>(&mut self, term: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().peekable();
        let entries = if values.peek().is_some() {
            self.check_dc(term)?;
            values
                .map(|value| MetaLine::new_dc(term, value))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        let lines = self.lines_mut();
        lines.retain(|line| line.as_dc().is_none_or(|entry| entry.term() != term));
        lines.extend(entries.into_iter().map(Line::from));
        Ok(())
    }

    /// All values for `term` in document order.
    pub fn get_dc(&self, term: &str) -> Result<Vec<&str>> {
        self.check_dc(term)?;
        Ok(self
            .lines
            .iter()
            .filter_map(Line::as_dc)
            .filter(|entry| entry.term() == term)
            .map(|entry| entry.value.as_str())
            .collect())
    }
}

impl FromStr for Document {
    type Err = FltError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::{TypedContent, TypedLine};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_defaults() {
        let doc = Document::new();
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.features().value(), 1);
        assert!(doc.features().dcmeta());
        assert_eq!(doc.generator(), "https://github.com/ficlabapp/flt");
        assert_eq!(doc.doctype(), "text/vnd.ficlab.flt");
        assert!(doc.lines().is_empty());
        assert!(doc.is_supported_version());
    }

    #[test]
    fn test_header_lines_are_consumed() {
        let source = "0003 0 text/vnd.ficlab.flt\n0003 1 2\n0003 2 0\n0003 4 other tool\n0001 body";
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.version(), 2);
        assert_eq!(doc.features().value(), 0);
        assert_eq!(doc.generator(), "other tool");
        assert_eq!(doc.lines().len(), 1);
        assert!(!doc.is_supported_version());
    }

    #[test]
    fn test_wrong_doctype() {
        let err = Document::parse("0003 0 text/plain").unwrap_err();
        assert!(matches!(&err, FltError::Format(_)));
        assert_eq!(err.to_string(), "Not an FLT document");
    }

    #[test]
    fn test_dc_lines_require_dcmeta() {
        let err = Document::parse("0003 2 0\n0003 3 title X").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Dublin core metadata is present, but not enabled for this document"
        );

        // Features are applied in source order
        let doc = Document::parse("0003 3 title X\n0003 2 0").unwrap();
        assert_eq!(doc.lines().len(), 1);
    }

    #[test]
    fn test_dc_operations_require_dcmeta() {
        let mut doc = Document::new();
        doc.features_mut().set_dcmeta(false);

        for err in [
            doc.get_dc("title").unwrap_err(),
            doc.clone().add_dc("title", "X").unwrap_err(),
            doc.clone().set_dc("title", ["X"]).unwrap_err(),
        ] {
            assert_eq!(
                err.to_string(),
                "Dublin core metadata is not enabled for this document"
            );
        }
    }

    #[test]
    fn test_dc_vocabulary() {
        let mut doc = Document::new();
        let err = doc.add_dc("author", "X").unwrap_err();
        assert!(matches!(err, FltError::Vocabulary(term) if term == "author"));
        assert!(doc.get_dc("author").is_err());
    }

    #[test]
    fn test_set_dc_replaces_values() {
        let mut doc = Document::parse("0003 3 subject a\n0001 x\n0003 3 subject b\n0003 3 title T").unwrap();
        assert_eq!(doc.get_dc("subject").unwrap(), vec!["a", "b"]);

        doc.set_dc("subject", ["c", "d", "e"]).unwrap();
        assert_eq!(doc.get_dc("subject").unwrap(), vec!["c", "d", "e"]);
        assert_eq!(doc.get_dc("title").unwrap(), vec!["T"]);

        doc.set_dc("subject", Vec::<String>::new()).unwrap();
        assert!(doc.get_dc("subject").unwrap().is_empty());
    }

    #[test]
    fn test_set_dc_removal_never_fails() {
        let mut doc = Document::parse("0003 2 0\n0001 x").unwrap();
        doc.set_dc("title", Vec::<String>::new()).unwrap();
        doc.set_dc("author", Vec::<&str>::new()).unwrap();
        assert_eq!(doc.lines().len(), 1);

        assert!(matches!(
            doc.set_dc("title", ["T"]).unwrap_err(),
            FltError::Format(_)
        ));
    }

    #[test]
    fn test_set_dc_validates_before_removing() {
        let mut doc = Document::parse("0003 3 subject a\n0001 x").unwrap();
        let revision = doc.revision();

        let err = doc.set_dc("subject", ["b", " "]).unwrap_err();
        assert!(matches!(err, FltError::Format(_)));
        assert_eq!(doc.get_dc("subject").unwrap(), vec!["a"]);
        assert_eq!(doc.revision(), revision);
    }

    #[test]
    fn test_blank_dc_values_never_render() {
        let err = Document::parse("0003 3 title    \n0001 body").unwrap_err();
        assert!(matches!(err, FltError::Syntax { line_no: 1, .. }));

        let mut doc = Document::new();
        assert!(doc.add_dc("title", "").is_err());
        assert!(doc.set_dc("title", ["  "]).is_err());
        doc.add_dc("title", " Tides ").unwrap();

        let again = Document::parse(&doc.render()).unwrap();
        assert_eq!(again.get_dc("title").unwrap(), vec!["Tides"]);
    }

    #[test]
    fn test_revision_tracks_structural_changes() {
        let mut doc = Document::parse("0001 a").unwrap();
        assert_eq!(doc.revision(), 0);

        doc.text_line_mut(0).unwrap().text.push('b');
        assert_eq!(doc.revision(), 0);

        doc.push_line(TypedLine::new(TypedContent::Paragraph));
        assert_eq!(doc.revision(), 1);

        doc.add_dc("title", "T").unwrap();
        assert_eq!(doc.revision(), 2);

        assert!(doc.text_line_mut(1).is_none());
        assert!(doc.text_line_mut(99).is_none());
    }

    #[test]
    fn test_render_round_trip() {
        let source = "0003 3 title T\n0001 Hello\n0002 2\n0011 world";
        let doc: Document = source.parse().unwrap();
        let again = Document::parse(&doc.to_string()).unwrap();
        let rendered = |d: &Document| d.lines().iter().map(Line::to_string).collect::<Vec<_>>();
        assert_eq!(rendered(&again), rendered(&doc));
        assert_eq!(again.header(), doc.header());
        assert_eq!(again.to_string(), doc.to_string());
    }
}
