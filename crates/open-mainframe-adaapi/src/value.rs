//! Typed field values held by a result set.

use std::fmt;

use crate::fdt::{FieldDef, FieldType};

/// A single field value of one record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Alphanumeric text, stored blank-padded or not.
    Alpha(String),
    /// Unpacked decimal.
    Unpacked(i64),
    /// Packed decimal.
    Packed(i64),
    /// Fixed-point binary: the low `width` bytes of `bits` are significant.
    Fixed {
        /// Native width in bytes (1, 2, 4 or 8).
        width: u8,
        /// Raw two's-complement bits, zero above `width`.
        bits: u64,
    },
    /// Floating point.
    Float(f64),
    /// Raw bytes.
    Binary(Vec<u8>),
}

fn width_mask(width: u8) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (u32::from(width) * 8)) - 1
    }
}

fn sign_extend(bits: u64, width: u8) -> i64 {
    let shift = 64 - u32::from(width.clamp(1, 8)) * 8;
    ((bits << shift) as i64) >> shift
}

impl FieldValue {
    /// Build an alphanumeric value.
    pub fn alpha(text: impl Into<String>) -> Self {
        Self::Alpha(text.into())
    }

    /// Build a fixed-point value of the given width, truncating `value`
    /// to that width.
    pub fn fixed(width: u8, value: i64) -> Self {
        Self::Fixed {
            width,
            bits: value as u64 & width_mask(width),
        }
    }

    /// The empty value for a field definition.
    pub fn empty(def: &FieldDef) -> Self {
        match def.field_type {
            FieldType::Alpha => Self::Alpha(String::new()),
            FieldType::Unpacked => Self::Unpacked(0),
            FieldType::Packed => Self::Packed(0),
            FieldType::FixedPoint => Self::fixed(def.length as u8, 0),
            FieldType::Float => Self::Float(0.0),
            FieldType::Binary => Self::Binary(Vec::new()),
        }
    }

    /// The storage format of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Alpha(_) => FieldType::Alpha,
            Self::Unpacked(_) => FieldType::Unpacked,
            Self::Packed(_) => FieldType::Packed,
            Self::Fixed { .. } => FieldType::FixedPoint,
            Self::Float(_) => FieldType::Float,
            Self::Binary(_) => FieldType::Binary,
        }
    }

    /// Integer projection; `None` for formats that are not integers.
    ///
    /// Fixed-point values are sign-extended from their native width.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Unpacked(n) | Self::Packed(n) => Some(*n),
            Self::Fixed { width, bits } => Some(sign_extend(*bits, *width)),
            Self::Alpha(_) | Self::Float(_) | Self::Binary(_) => None,
        }
    }
}

/// String projection: alpha without trailing blanks, numbers in decimal,
/// binary in upper-case hex.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alpha(s) => f.write_str(s.trim_end_matches(' ')),
            Self::Unpacked(n) | Self::Packed(n) => write!(f, "{n}"),
            Self::Fixed { width, bits } => write!(f, "{}", sign_extend(*bits, *width)),
            Self::Float(v) => write!(f, "{v}"),
            Self::Binary(bytes) => bytes.iter().try_for_each(|b| write!(f, "{b:02X}")),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_sign_extends_from_native_width() {
        assert_eq!(FieldValue::Fixed { width: 2, bits: 0xFFFF }.to_i64(), Some(-1));
        assert_eq!(FieldValue::Fixed { width: 2, bits: 0x7FFF }.to_i64(), Some(32767));
        assert_eq!(FieldValue::Fixed { width: 1, bits: 0x80 }.to_i64(), Some(-128));
        assert_eq!(FieldValue::Fixed { width: 4, bits: 0xFFFF_FFFE }.to_i64(), Some(-2));
        assert_eq!(FieldValue::fixed(8, i64::MIN).to_i64(), Some(i64::MIN));
    }

    #[test]
    fn fixed_constructor_truncates() {
        assert_eq!(FieldValue::fixed(2, -1), FieldValue::Fixed { width: 2, bits: 0xFFFF });
        assert_eq!(FieldValue::fixed(1, 300).to_i64(), Some(44));
    }

    #[test]
    fn integer_projection() {
        assert_eq!(FieldValue::Unpacked(19450120).to_i64(), Some(19450120));
        assert_eq!(FieldValue::Packed(-42).to_i64(), Some(-42));
        assert_eq!(FieldValue::alpha("11100301").to_i64(), None);
        assert_eq!(FieldValue::Float(2.0).to_i64(), None);
        assert_eq!(FieldValue::Binary(vec![1]).to_i64(), None);
    }

    #[test]
    fn string_projection() {
        assert_eq!(FieldValue::alpha("SMITH   ").to_string(), "SMITH");
        assert_eq!(FieldValue::Packed(-42).to_string(), "-42");
        assert_eq!(FieldValue::fixed(2, -5).to_string(), "-5");
        assert_eq!(FieldValue::Float(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::Binary(vec![0x0A, 0xFF]).to_string(), "0AFF");
    }

    #[test]
    fn empty_values_follow_definition() {
        let def = FieldDef::new("AS", FieldType::FixedPoint, 4);
        assert_eq!(FieldValue::empty(&def), FieldValue::Fixed { width: 4, bits: 0 });
        assert_eq!(
            FieldValue::empty(&FieldDef::alpha("AA", 8)),
            FieldValue::Alpha(String::new())
        );
    }
}
