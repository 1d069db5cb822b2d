//! FIT base types
//!
//! Wire values manually copied from Profile.xlsx in FIT SDK 21.158.00. The
//! high bit of a code flags endian ability; the table stores the full byte
//! as it appears in field definitions.

use num_enum::TryFromPrimitive;
use strum::Display;

/// A FIT base type, carrying its full one-byte wire code.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, Debug)]
#[strum(serialize_all = "snake_case")]
pub enum BaseType {
    Enum = 0x00,
    SInt8 = 0x01,
    UInt8 = 0x02,
    SInt16 = 0x83,
    UInt16 = 0x84,
    SInt32 = 0x85,
    UInt32 = 0x86,
    String = 0x07,
    Float32 = 0x88,
    Float64 = 0x89,
    UInt8z = 0x0A,
    UInt16z = 0x8B,
    UInt32z = 0x8C,
    Byte = 0x0D,
}

impl BaseType {
    /// On-wire size of one unit, in bytes. Strings count one byte per unit.
    pub fn size(self) -> u8 {
        match self {
            BaseType::Enum
            | BaseType::SInt8
            | BaseType::UInt8
            | BaseType::String
            | BaseType::UInt8z
            | BaseType::Byte => 1,
            BaseType::SInt16 | BaseType::UInt16 | BaseType::UInt16z => 2,
            BaseType::SInt32 | BaseType::UInt32 | BaseType::UInt32z | BaseType::Float32 => 4,
            BaseType::Float64 => 8,
        }
    }

    pub fn signed(self) -> bool {
        matches!(
            self,
            BaseType::SInt8
                | BaseType::SInt16
                | BaseType::SInt32
                | BaseType::Float32
                | BaseType::Float64
        )
    }

    pub fn is_string(self) -> bool {
        self == BaseType::String
    }

    pub fn is_byte(self) -> bool {
        self == BaseType::Byte
    }
}
