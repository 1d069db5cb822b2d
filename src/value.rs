//! Decoded field values
//!
//! Every field of a decoded message holds a [`Value`]. A freshly allocated
//! message starts out with each field set to its base type's invalid
//! sentinel; the data-message parser overwrites a field only when the wire
//! carries a non-invalid value.

use std::sync::LazyLock;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use crate::base_type::BaseType;

/// Byte order of a definition message's multi-byte fields.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Endianness {
    Little,
    Big,
}

/// An angular position in FIT semicircle units.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Semicircles(pub i32);

impl Semicircles {
    /// Converts to degrees: `value × 180 / 2³¹`.
    pub fn degrees(self) -> f64 {
        self.0 as f64 * (180.0 / 2_147_483_648.0)
    }
}

/// The timestamp epoch all FIT date_time values are measured from.
pub(crate) static GARMIN_EPOCH: LazyLock<DateTime<Utc>> =
    LazyLock::new(|| "1989-12-31T00:00:00Z".parse::<DateTime<Utc>>().unwrap());

/// Converts raw FIT seconds into an absolute UTC moment.
pub(crate) fn date_time_from_fit(secs: u32) -> DateTime<Utc> {
    *GARMIN_EPOCH + TimeDelta::seconds(secs as i64)
}

/// A single decoded field value.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Enum(u8),
    SInt8(i8),
    UInt8(u8),
    SInt16(i16),
    UInt16(u16),
    SInt32(i32),
    UInt32(u32),
    Float32(f32),
    Float64(f64),
    UInt8z(u8),
    UInt16z(u16),
    UInt32z(u32),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Strings(Vec<String>),
    /// An absolute timestamp measured from the Garmin epoch.
    DateTime(DateTime<Utc>),
    /// A timestamp re-expressed in a zone synthesized from the device's
    /// local-time offset.
    LocalDateTime(DateTime<FixedOffset>),
    Latitude(Semicircles),
    Longitude(Semicircles),
}

impl Value {
    /// The invalid sentinel for `base`, used to initialize message fields.
    pub(crate) fn invalid(base: BaseType) -> Value {
        match base {
            BaseType::Enum => Value::Enum(0xFF),
            BaseType::SInt8 => Value::SInt8(0x7F),
            BaseType::UInt8 => Value::UInt8(0xFF),
            BaseType::SInt16 => Value::SInt16(0x7FFF),
            BaseType::UInt16 => Value::UInt16(0xFFFF),
            BaseType::SInt32 => Value::SInt32(0x7FFF_FFFF),
            BaseType::UInt32 => Value::UInt32(0xFFFF_FFFF),
            BaseType::Float32 => Value::Float32(f32::from_bits(0xFFFF_FFFF)),
            BaseType::Float64 => Value::Float64(f64::from_bits(0xFFFF_FFFF_FFFF_FFFF)),
            BaseType::UInt8z => Value::UInt8z(0),
            BaseType::UInt16z => Value::UInt16z(0),
            BaseType::UInt32z => Value::UInt32z(0),
            BaseType::String => Value::String(String::new()),
            BaseType::Byte => Value::Bytes(Vec::new()),
        }
    }

    /// Whether this value is its base type's invalid sentinel.
    pub fn is_invalid(&self) -> bool {
        match self {
            Value::Enum(v) | Value::UInt8(v) => *v == 0xFF,
            Value::SInt8(v) => *v == 0x7F,
            Value::SInt16(v) => *v == 0x7FFF,
            Value::UInt16(v) => *v == 0xFFFF,
            Value::SInt32(v) => *v == 0x7FFF_FFFF,
            Value::UInt32(v) => *v == 0xFFFF_FFFF,
            Value::Float32(v) => v.to_bits() == 0xFFFF_FFFF,
            Value::Float64(v) => v.to_bits() == 0xFFFF_FFFF_FFFF_FFFF,
            Value::UInt8z(v) => *v == 0,
            Value::UInt16z(v) => *v == 0,
            Value::UInt32z(v) => *v == 0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty() || b.iter().all(|b| *b == 0xFF),
            _ => false,
        }
    }
}

/// Decodes one unit of `base` from `bytes`, whose length must equal the
/// base type's size (strings and byte slices take the whole buffer).
pub(crate) fn decode_scalar(bytes: &[u8], base: BaseType, endian: Endianness) -> Value {
    match endian {
        Endianness::Little => scalar::<LittleEndian>(bytes, base),
        Endianness::Big => scalar::<BigEndian>(bytes, base),
    }
}

fn scalar<E: ByteOrder>(bytes: &[u8], base: BaseType) -> Value {
    match base {
        BaseType::Enum => Value::Enum(bytes[0]),
        BaseType::SInt8 => Value::SInt8(bytes[0] as i8),
        BaseType::UInt8 => Value::UInt8(bytes[0]),
        BaseType::UInt8z => Value::UInt8z(bytes[0]),
        BaseType::SInt16 => Value::SInt16(E::read_i16(bytes)),
        BaseType::UInt16 => Value::UInt16(E::read_u16(bytes)),
        BaseType::UInt16z => Value::UInt16z(E::read_u16(bytes)),
        BaseType::SInt32 => Value::SInt32(E::read_i32(bytes)),
        BaseType::UInt32 => Value::UInt32(E::read_u32(bytes)),
        BaseType::UInt32z => Value::UInt32z(E::read_u32(bytes)),
        BaseType::Float32 => Value::Float32(f32::from_bits(E::read_u32(bytes))),
        BaseType::Float64 => Value::Float64(f64::from_bits(E::read_u64(bytes))),
        BaseType::String => Value::String(string_from_bytes(bytes)),
        BaseType::Byte => Value::Bytes(bytes.to_vec()),
    }
}

/// Bytes up to the first 0x00 terminator, or the full payload if none.
pub(crate) fn string_from_bytes(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Partitions a string-array payload on 0x00 terminators.
///
/// An unterminated trailing run is still emitted. Parsing stops at an
/// empty run (consecutive terminators, or a leading one), so a single
/// empty tail string is never produced.
pub(crate) fn strings_from_bytes(bytes: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, b) in bytes.iter().enumerate() {
        if *b == 0 {
            if i == start {
                return out;
            }
            out.push(String::from_utf8_lossy(&bytes[start..i]).into_owned());
            start = i + 1;
        }
    }
    if start < bytes.len() {
        out.push(String::from_utf8_lossy(&bytes[start..]).into_owned());
    }
    out
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, ByteOrder, LittleEndian};
    use quickcheck_macros::quickcheck;

    use super::{Endianness, Semicircles, Value, decode_scalar, strings_from_bytes};
    use crate::base_type::BaseType;

    #[test]
    fn every_sentinel_is_invalid() {
        for code in [0x00u8, 0x01, 0x02, 0x83, 0x84, 0x85, 0x86, 0x07, 0x88, 0x89, 0x0A, 0x8B, 0x8C, 0x0D]
        {
            let base = BaseType::try_from(code).unwrap();
            assert!(Value::invalid(base).is_invalid(), "{base}");
        }
    }

    #[quickcheck]
    fn u16_round_trips(v: u16) -> bool {
        let mut le = [0u8; 2];
        let mut be = [0u8; 2];
        LittleEndian::write_u16(&mut le, v);
        BigEndian::write_u16(&mut be, v);
        decode_scalar(&le, BaseType::UInt16, Endianness::Little) == Value::UInt16(v)
            && decode_scalar(&be, BaseType::UInt16, Endianness::Big) == Value::UInt16(v)
    }

    #[quickcheck]
    fn i16_round_trips(v: i16) -> bool {
        let mut le = [0u8; 2];
        let mut be = [0u8; 2];
        LittleEndian::write_i16(&mut le, v);
        BigEndian::write_i16(&mut be, v);
        decode_scalar(&le, BaseType::SInt16, Endianness::Little) == Value::SInt16(v)
            && decode_scalar(&be, BaseType::SInt16, Endianness::Big) == Value::SInt16(v)
    }

    #[quickcheck]
    fn u32_round_trips(v: u32) -> bool {
        let mut le = [0u8; 4];
        let mut be = [0u8; 4];
        LittleEndian::write_u32(&mut le, v);
        BigEndian::write_u32(&mut be, v);
        decode_scalar(&le, BaseType::UInt32, Endianness::Little) == Value::UInt32(v)
            && decode_scalar(&be, BaseType::UInt32, Endianness::Big) == Value::UInt32(v)
    }

    #[quickcheck]
    fn i32_round_trips(v: i32) -> bool {
        let mut le = [0u8; 4];
        let mut be = [0u8; 4];
        LittleEndian::write_i32(&mut le, v);
        BigEndian::write_i32(&mut be, v);
        decode_scalar(&le, BaseType::SInt32, Endianness::Little) == Value::SInt32(v)
            && decode_scalar(&be, BaseType::SInt32, Endianness::Big) == Value::SInt32(v)
    }

    #[quickcheck]
    fn f32_bit_pattern_round_trips(bits: u32) -> bool {
        let mut le = [0u8; 4];
        LittleEndian::write_u32(&mut le, bits);
        match decode_scalar(&le, BaseType::Float32, Endianness::Little) {
            Value::Float32(f) => f.to_bits() == bits,
            _ => false,
        }
    }

    #[test]
    fn string_stops_at_terminator() {
        assert_eq!(
            decode_scalar(b"abc\0xxx", BaseType::String, Endianness::Little),
            Value::String("abc".to_owned())
        );
    }

    #[test]
    fn unterminated_string_takes_full_payload() {
        assert_eq!(
            decode_scalar(b"abcdefg", BaseType::String, Endianness::Little),
            Value::String("abcdefg".to_owned())
        );
    }

    #[test]
    fn empty_string_is_the_sentinel() {
        assert!(decode_scalar(b"\0\0\0", BaseType::String, Endianness::Little).is_invalid());
    }

    #[test]
    fn string_array_partitioning() {
        assert_eq!(strings_from_bytes(b"ab\0cd\0"), vec!["ab", "cd"]);
        // Unterminated trailing run is still emitted.
        assert_eq!(strings_from_bytes(b"ab\0cd"), vec!["ab", "cd"]);
        // Consecutive terminators end parsing.
        assert_eq!(strings_from_bytes(b"ab\0\0cd"), vec!["ab"]);
        // A single empty tail is not emitted.
        assert_eq!(strings_from_bytes(b"ab\0"), vec!["ab"]);
        assert_eq!(strings_from_bytes(b""), Vec::<String>::new());
    }

    #[test]
    fn semicircle_degrees() {
        use approx::assert_relative_eq;
        assert_relative_eq!(Semicircles(0x4000_0000).degrees(), 90.0);
        assert_relative_eq!(Semicircles(-0x4000_0000).degrees(), -90.0);
        assert_relative_eq!(Semicircles(0).degrees(), 0.0);
    }
}
