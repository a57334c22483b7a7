//! # Document Map
//!
//! A [`Map`] presents a document as one continuous string, the concatenated
//! text of its [`TextLine`](crate::line::TextLine)s, and partitions it into
//! ranges of six kinds:
//!
//! - **line**: one per non-empty text line
//! - **section**: opened by section lines
//! - **paragraph**: opened by section, paragraph and body destination lines
//! - **note**, **cell**, **heading**: opened by destination lines
//!
//! Offsets are byte offsets into the continuous text. Within one kind the
//! ranges are sorted, non-overlapping and never empty, so [`Map::at`] can
//! binary search each kind independently.
//!
//! A map describes one structural revision of its document. Each
//! [`MapPoint`] remembers that revision and refuses to operate once lines
//! have been inserted, removed or reordered.
//!
//! ```rust
//! # use flt_engine::{Document, Map, PointKind};
//! let doc = Document::parse("0001 Hello \n0002 2\n0001 world").unwrap();
//! let map = Map::new(&doc);
//! let here = map.at(7);
//! assert_eq!(here.line.unwrap().text(&doc).unwrap(), "world");
//! assert_eq!(map.points(PointKind::Paragraph).len(), 2);
//! ```

mod point;
mod replace;

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Result;
use crate::line::{Destination, Line, TypedContent};

pub use point::MapPoint;
pub use replace::expand_template;

/// Range kinds tracked by a [`Map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Line,
    Section,
    Paragraph,
    Note,
    Cell,
    Heading,
}

impl PointKind {
    pub const ALL: [PointKind; 6] = [
        PointKind::Line,
        PointKind::Section,
        PointKind::Paragraph,
        PointKind::Note,
        PointKind::Cell,
        PointKind::Heading,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PointKind::Line => "line",
            PointKind::Section => "section",
            PointKind::Paragraph => "paragraph",
            PointKind::Note => "note",
            PointKind::Cell => "cell",
            PointKind::Heading => "heading",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PointKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PointKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown point kind: {s}"))
    }
}

/// Every range containing one offset, one slot per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapLocation {
    pub line: Option<MapPoint>,
    pub section: Option<MapPoint>,
    pub paragraph: Option<MapPoint>,
    pub note: Option<MapPoint>,
    pub cell: Option<MapPoint>,
    pub heading: Option<MapPoint>,
}

impl MapLocation {
    pub fn get(&self, kind: PointKind) -> Option<&MapPoint> {
        match kind {
            PointKind::Line => self.line.as_ref(),
            PointKind::Section => self.section.as_ref(),
            PointKind::Paragraph => self.paragraph.as_ref(),
            PointKind::Note => self.note.as_ref(),
            PointKind::Cell => self.cell.as_ref(),
            PointKind::Heading => self.heading.as_ref(),
        }
    }

    fn set(&mut self, kind: PointKind, point: MapPoint) {
        let slot = match kind {
            PointKind::Line => &mut self.line,
            PointKind::Section => &mut self.section,
            PointKind::Paragraph => &mut self.paragraph,
            PointKind::Note => &mut self.note,
            PointKind::Cell => &mut self.cell,
            PointKind::Heading => &mut self.heading,
        };
        *slot = Some(point);
    }
}

/// Offset-indexed view of a document's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    revision: u64,
    length: usize,
    points: [Vec<MapPoint>; 6],
}

impl Map {
    /// Build the map for the current state of `doc`.
    pub fn new(doc: &Document) -> Self {
        let mut builder = Builder::new(doc.revision());
        for (index, line) in doc.lines().iter().enumerate() {
            builder.visit(index, line);
        }
        builder.finish()
    }

    /// Document revision this map was built against.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Length of the continuous text when the map was built.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Current continuous text of the mapped document.
    pub fn text(&self, doc: &Document) -> Result<String> {
        point::check_revision(self.revision, doc)?;
        Ok(doc
            .lines()
            .iter()
            .filter_map(Line::as_text)
            .map(|line| line.text.as_str())
            .collect())
    }

    /// All ranges of one kind, in offset order.
    pub fn points(&self, kind: PointKind) -> &[MapPoint] {
        &self.points[kind.index()]
    }

    /// Ranges of every kind containing `offset`.
    pub fn at(&self, offset: usize) -> MapLocation {
        let mut location = MapLocation::default();
        for kind in PointKind::ALL {
            if let Some(point) = find(self.points(kind), offset) {
                location.set(kind, point.clone());
            }
        }
        location
    }
}

fn find(points: &[MapPoint], offset: usize) -> Option<&MapPoint> {
    let index = points.partition_point(|p| p.offset() + p.length() <= offset);
    points.get(index).filter(|p| p.offset() <= offset)
}

/// A range still growing while the map is built.
struct Open {
    offset: usize,
    length: usize,
    lines: Range<usize>,
}

impl Open {
    fn at(offset: usize) -> Self {
        Self {
            offset,
            length: 0,
            lines: 0..0,
        }
    }

    fn extend(&mut self, index: usize, length: usize) {
        if self.lines.is_empty() {
            self.lines = index..index + 1;
        } else {
            self.lines.end = index + 1;
        }
        self.length += length;
    }
}

/// Single pass over the document lines.
struct Builder {
    revision: u64,
    offset: usize,
    ranges: [Vec<Open>; 6],
    active: [bool; 6],
}

impl Builder {
    fn new(revision: u64) -> Self {
        let mut builder = Self {
            revision,
            offset: 0,
            ranges: Default::default(),
            active: [false; 6],
        };
        builder.open(PointKind::Section);
        builder.open(PointKind::Paragraph);
        builder.active[PointKind::Paragraph.index()] = true;
        builder
    }

    fn open(&mut self, kind: PointKind) {
        self.ranges[kind.index()].push(Open::at(self.offset));
    }

    fn activate(&mut self, kind: PointKind) {
        self.open(kind);
        self.active[kind.index()] = true;
    }

    fn deactivate_flows(&mut self) {
        for kind in [
            PointKind::Paragraph,
            PointKind::Note,
            PointKind::Cell,
            PointKind::Heading,
        ] {
            self.active[kind.index()] = false;
        }
    }

    fn visit(&mut self, index: usize, line: &Line) {
        match line {
            Line::Text(text) => {
                let length = text.len();
                let mut own = Open::at(self.offset);
                own.extend(index, length);
                self.ranges[PointKind::Line.index()].push(own);

                for kind in PointKind::ALL.into_iter().skip(1) {
                    if kind == PointKind::Section || self.active[kind.index()] {
                        if let Some(open) = self.ranges[kind.index()].last_mut() {
                            open.extend(index, length);
                        }
                    }
                }
                self.offset += length;
            }
            Line::Typed(typed) => match typed.content() {
                TypedContent::Section => {
                    self.open(PointKind::Section);
                    self.deactivate_flows();
                    self.activate(PointKind::Paragraph);
                }
                TypedContent::Paragraph => self.activate(PointKind::Paragraph),
                TypedContent::Destination => {
                    self.deactivate_flows();
                    let kind = match typed.destination() {
                        Some(Destination::Body) => Some(PointKind::Paragraph),
                        Some(Destination::Note) => Some(PointKind::Note),
                        Some(Destination::Cell) if typed.header() => Some(PointKind::Heading),
                        Some(Destination::Cell) => Some(PointKind::Cell),
                        Some(Destination::Head) => Some(PointKind::Heading),
                        None => None,
                    };
                    if let Some(kind) = kind {
                        self.activate(kind);
                    }
                }
                _ => {}
            },
            Line::Meta(_) => {}
        }
    }

    fn finish(self) -> Map {
        let revision = self.revision;
        let points = PointKind::ALL.map(|kind| {
            self.ranges[kind.index()]
                .iter()
                .filter(|open| open.length > 0)
                .map(|open| MapPoint::new(kind, open.offset, open.length, open.lines.clone(), revision))
                .collect::<Vec<_>>()
        });
        debug!(
            "built map over {} bytes: {}",
            self.offset,
            PointKind::ALL
                .iter()
                .map(|kind| format!("{} {}", points[kind.index()].len(), kind))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Map {
            revision,
            length: self.offset,
            points,
        }
    }
}
