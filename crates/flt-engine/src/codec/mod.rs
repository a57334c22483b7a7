//! Conversion between FLT source text and logical [`Line`](crate::line::Line)s.
//!
//! Source is line oriented: each physical line is `<hex flags>[ <content>]`.
//! Blank lines and `#` / `//` comments are ignored, a physical line with zero
//! flags continues the previous logical line, and `\\` / `\n` escapes let a
//! logical line carry backslashes and newlines.

mod escape;
mod parse;
mod render;

pub use escape::{escape, unescape};
pub use parse::parse;
pub use render::render;

use crate::constants::DEFAULT_VERSION;
use crate::features::Features;

/// Header values written ahead of the body lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u64,
    pub features: Features,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            features: Features::default(),
        }
    }
}
