use std::fmt;
use std::num::ParseIntError;

/// A named range of bits inside a [`Bitfield`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Offset of the lowest bit.
    pub offset: u32,
    /// Number of bits.
    pub width: u32,
}

impl Field {
    pub const fn new(offset: u32, width: u32) -> Self {
        Self { offset, width }
    }

    /// A single-bit field.
    pub const fn flag(offset: u32) -> Self {
        Self::new(offset, 1)
    }

    /// Derives a field from a contiguous bit mask, e.g. `0x0030` is bits 4-5.
    pub const fn from_mask(mask: u64) -> Self {
        Self::new(mask.trailing_zeros(), mask.count_ones())
    }

    /// Mask of the field's bits in place.
    pub const fn mask(self) -> u64 {
        if self.width >= u64::BITS {
            u64::MAX
        } else {
            ((1u64 << self.width) - 1) << self.offset
        }
    }
}

/// Fixed-width unsigned integer decomposed into named bit ranges.
///
/// Serializes to minimal-width lowercase hex (`{:x}`); line flags are padded
/// to four digits by the codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bitfield(u64);

impl Bitfield {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parse from hex digits, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ParseIntError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u64::from_str_radix(digits, 16).map(Self)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn get(self, field: Field) -> u64 {
        (self.0 & field.mask()) >> field.offset
    }

    /// Writes `value` into `field`; bits of `value` wider than the field are dropped.
    pub fn set(&mut self, field: Field, value: u64) {
        let mask = field.mask();
        self.0 = (self.0 & !mask) | ((value << field.offset) & mask);
    }

    pub fn is_set(self, field: Field) -> bool {
        self.get(field) != 0
    }

    pub fn set_flag(&mut self, field: Field, on: bool) {
        self.set(field, u64::from(on));
    }

    /// Builder-style variant of [`Bitfield::set`].
    pub fn with(mut self, field: Field, value: u64) -> Self {
        self.set(field, value);
        self
    }

    pub fn to_hex(self) -> String {
        format!("{:x}", self.0)
    }
}

impl From<u64> for Bitfield {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Bitfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Bitfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_mask() {
        assert_eq!(Field::from_mask(0x0003), Field::new(0, 2));
        assert_eq!(Field::from_mask(0x0004), Field::flag(2));
        assert_eq!(Field::from_mask(0x00f0), Field::new(4, 4));
        assert_eq!(Field::from_mask(0x0100), Field::flag(8));
    }

    #[test]
    fn test_get_and_set_multi_bit_field() {
        let align = Field::new(4, 2);
        let mut bits = Bitfield::new(0x0002);

        bits.set(align, 3);
        assert_eq!(bits.value(), 0x0032);
        assert_eq!(bits.get(align), 3);

        // Oversized values are truncated to the field width
        bits.set(align, 0b101);
        assert_eq!(bits.get(align), 1);
        assert_eq!(bits.value(), 0x0012);
    }

    #[test]
    fn test_flags() {
        let bold = Field::flag(5);
        let mut bits = Bitfield::default();
        assert!(!bits.is_set(bold));

        bits.set_flag(bold, true);
        assert!(bits.is_set(bold));
        assert_eq!(bits.to_hex(), "20");

        bits.set_flag(bold, false);
        assert!(bits.is_zero());
    }

    #[test]
    fn test_hex_roundtrip() {
        let bits = Bitfield::from_hex("04F1").unwrap();
        assert_eq!(bits.value(), 0x04f1);
        assert_eq!(bits.to_hex(), "4f1");
        assert_eq!(format!("{bits:04x}"), "04f1");
        assert_eq!(Bitfield::from_hex("0x11").unwrap().value(), 0x11);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(Bitfield::from_hex("zz").is_err());
        assert!(Bitfield::from_hex("").is_err());
        assert!(Bitfield::from_hex("1ffffffffffffffff").is_err());
    }
}
