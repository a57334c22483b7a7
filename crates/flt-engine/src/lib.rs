//! Codec and document model for FLT, a line-oriented, flag-tagged format
//! for richly formatted text, plus a map exposing a document as continuous
//! text with structure-aware search and replace.

pub mod bitfield;
pub mod codec;
pub mod constants;
pub mod document;
pub mod dublin_core;
pub mod error;
pub mod features;
pub mod line;
pub mod map;
pub mod plugin;

// Re-export key types for easier usage
pub use bitfield::{Bitfield, Field};
pub use codec::{Header, escape, parse, render, unescape};
pub use document::Document;
pub use error::{FltError, Result};
pub use features::Features;
pub use line::{
    Align, Blob, DcEntry, Destination, Line, LineKind, LineType, MetaContent, MetaLine, MetaType,
    Style, TextLine, TypedContent, TypedLine,
};
pub use map::{Map, MapLocation, MapPoint, PointKind};
pub use plugin::{Plugin, PluginHost};
