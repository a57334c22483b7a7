use std::fmt;
use std::num::ParseIntError;

use crate::bitfield::Bitfield;
use crate::constants::{DEFAULT_FEATURES, fields};

/// Document feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Features(Bitfield);

impl Features {
    pub const fn new(value: u64) -> Self {
        Self(Bitfield::new(value))
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseIntError> {
        Bitfield::from_hex(s).map(Self)
    }

    pub fn value(self) -> u64 {
        self.0.value()
    }

    /// Dublin Core metadata is enabled.
    pub fn dcmeta(self) -> bool {
        self.0.is_set(fields::DCMETA)
    }

    pub fn set_dcmeta(&mut self, on: bool) {
        self.0.set_flag(fields::DCMETA, on);
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURES)
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
