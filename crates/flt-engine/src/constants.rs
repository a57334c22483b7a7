//! Format constants: media type, defaults, flag masks and the bit fields
//! derived from them.

use crate::bitfield::Field;

/// FLT media type, the only doctype this library accepts.
pub const MEDIA_TYPE: &str = "text/vnd.ficlab.flt";
/// Lowest format version understood by this library.
pub const MIN_VERSION: u64 = 1;
/// Highest format version understood by this library.
pub const MAX_VERSION: u64 = 1;
/// Format version for new documents.
pub const DEFAULT_VERSION: u64 = 1;
/// Feature bits for new documents (DCMETA on).
pub const DEFAULT_FEATURES: u64 = 0x0001;
/// Generator stamped on every rendered document.
pub const DEFAULT_GENERATOR: &str = "https://github.com/ficlabapp/flt";

/// Maximum rendered physical line length, excluding the newline.
pub const MAX_LINE_LENGTH: usize = 78;

// masks
pub const MASK_LINE_TYPE: u64 = 0x0003;
pub const MASK_LINE_FORMAT: u64 = 0x0ff0;
pub const MASK_ALIGN: u64 = 0x0030;
pub const MASK_DESTINATION: u64 = 0x00f0;

// line flags
pub const L_TEXT: u64 = 0x0001;
pub const L_TYPE: u64 = 0x0002;
pub const L_META: u64 = 0x0003;
pub const L_RESET: u64 = 0x0004;
//                     0x0008 reserved
pub const L_ITALIC: u64 = 0x0010;
pub const L_BOLD: u64 = 0x0020;
pub const L_UNDERLINE: u64 = 0x0040;
pub const L_STRIKEOUT: u64 = 0x0080;
pub const L_SUPERTEXT: u64 = 0x0100;
pub const L_SUBTEXT: u64 = 0x0200;
pub const L_MONO: u64 = 0x0400;
//                     0x0800 reserved

/// Section flag: visual break after the previous section.
pub const VISUAL_BREAK: u64 = 0x0040;
/// Destination flag: the destination is a header (table cells only).
pub const D_HEADER: u64 = 0x0100;
/// Feature flag: Dublin Core metadata.
pub const F_DCMETA: u64 = 0x0001;

/// Bit fields used by lines and features.
pub mod fields {
    use super::*;

    pub const TYPE: Field = Field::from_mask(MASK_LINE_TYPE);
    pub const RESET: Field = Field::from_mask(L_RESET);

    pub const ITALIC: Field = Field::from_mask(L_ITALIC);
    pub const BOLD: Field = Field::from_mask(L_BOLD);
    pub const UNDERLINE: Field = Field::from_mask(L_UNDERLINE);
    pub const STRIKEOUT: Field = Field::from_mask(L_STRIKEOUT);
    pub const SUPERTEXT: Field = Field::from_mask(L_SUPERTEXT);
    pub const SUBTEXT: Field = Field::from_mask(L_SUBTEXT);
    pub const MONO: Field = Field::from_mask(L_MONO);

    pub const ALIGN: Field = Field::from_mask(MASK_ALIGN);
    pub const VISUAL_BREAK: Field = Field::from_mask(super::VISUAL_BREAK);
    pub const DESTINATION: Field = Field::from_mask(MASK_DESTINATION);
    pub const HEADER: Field = Field::from_mask(D_HEADER);

    pub const DCMETA: Field = Field::from_mask(F_DCMETA);
}
