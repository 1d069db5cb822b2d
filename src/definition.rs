//! Definition messages
//!
//! A definition record announces the layout of the data records that share
//! its local message type. Each declared field is validated against the
//! profile before the definition is accepted; a rejected field fails the
//! whole decode.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use thiserror::Error;

use crate::base_type::BaseType;
use crate::profile::{
    self, FieldInfo, MESG_MFG_RANGE_MAX, MESG_MFG_RANGE_MIN, MESG_NUM_INVALID, MesgNum,
};
use crate::reader::CrcReader;
use crate::value::Endianness;
use crate::{FormatError, NotSupportedError, Result};

/// A field definition rejected by profile validation.
#[derive(Error, Debug)]
#[error("global message {mesg_num}, field {field_num}: {kind}")]
pub struct ValidationError {
    pub mesg_num: u16,
    pub field_num: u8,
    pub kind: ValidationErrorKind,
}

#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("unknown base type {0:#04x}")]
    UnknownBaseType(u8),
    #[error("declared as string but the profile type is {profile}")]
    StringIncompatible { profile: BaseType },
    #[error("size {size} is below the declared base type size {base_size}")]
    SizeBelowBaseType { size: u8, base_size: u8 },
    #[error("size {size} exceeds the profile base type size {profile_size}")]
    SizeExceedsProfile { size: u8, profile_size: u8 },
    #[error("declared type {declared} and profile type {profile} differ in signedness")]
    SignednessMismatch { declared: BaseType, profile: BaseType },
    #[error("declared as {declared} but the profile type is string")]
    ProfileStringIncompatible { declared: BaseType },
    #[error(
        "array size {size} is not a multiple of the profile base type size \
         {profile_size} (declared base type size {declared_size})"
    )]
    NotAMultiple {
        size: u8,
        declared_size: u8,
        profile_size: u8,
    },
    #[error("array declared as {declared} but the profile type is {profile}")]
    ArrayTypeMismatch { declared: BaseType, profile: BaseType },
}

/// One validated field of a definition message.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldDefinition {
    pub num: u8,
    pub size: u8,
    pub base_type: BaseType,
    /// Target index and metadata, when the profile knows the field.
    pub profile: Option<(usize, &'static FieldInfo)>,
}

/// A registered definition message occupying one local message slot.
#[derive(Clone, Debug)]
pub(crate) struct DefinitionMessage {
    pub local: u8,
    pub endianness: Endianness,
    pub global: u16,
    /// `None` for a standard-range global message number the profile does
    /// not know; its data records are counted and parsed through.
    pub mesg: Option<MesgNum>,
    pub fields: Vec<FieldDefinition>,
}

impl DefinitionMessage {
    /// Decodes a definition record body. `header` is the record header
    /// byte, whose low four bits carry the local message type.
    pub(crate) fn decode<R: Read>(rdr: &mut CrcReader<R>, header: u8) -> Result<Self> {
        let local = header & 0x0F;
        let _reserved = rdr.read_u8("definition message")?;
        let arch = rdr.read_u8("definition message")?;
        let endianness = match arch {
            0 => Endianness::Little,
            1 => Endianness::Big,
            _ => return Err(FormatError::Architecture(arch).into()),
        };

        let mut buf = [0u8; 2];
        rdr.read_exact(&mut buf, "definition message")?;
        let global = match endianness {
            Endianness::Little => LittleEndian::read_u16(&buf),
            Endianness::Big => BigEndian::read_u16(&buf),
        };
        if global == MESG_NUM_INVALID {
            return Err(FormatError::MesgNumInvalid.into());
        }
        if (MESG_MFG_RANGE_MIN..=MESG_MFG_RANGE_MAX).contains(&global) {
            return Err(NotSupportedError::ManufacturerMesgNum(global).into());
        }
        let mesg = MesgNum::try_from(global).ok();

        let n_fields = rdr.read_u8("definition message")? as usize;
        let mut raw = vec![0u8; n_fields * 3];
        rdr.read_exact(&mut raw, "field definitions")?;

        let mut fields = Vec::with_capacity(n_fields);
        for chunk in raw.chunks_exact(3) {
            fields.push(validate_field(global, mesg, chunk[0], chunk[1], chunk[2])?);
        }

        Ok(Self {
            local,
            endianness,
            global,
            mesg,
            fields,
        })
    }

    /// Size in bytes of one data record under this definition, excluding
    /// its record header.
    pub(crate) fn data_size(&self) -> usize {
        self.fields.iter().map(|f| f.size as usize).sum()
    }
}

fn validate_field(
    global: u16,
    mesg: Option<MesgNum>,
    num: u8,
    size: u8,
    code: u8,
) -> Result<FieldDefinition> {
    use ValidationErrorKind::*;
    let err = |kind| ValidationError {
        mesg_num: global,
        field_num: num,
        kind,
    };

    let base_type = BaseType::try_from(code).map_err(|_| err(UnknownBaseType(code)))?;
    let profile = mesg.and_then(|m| profile::field(m, num));
    let accepted = FieldDefinition {
        num,
        size,
        base_type,
        profile,
    };

    if base_type.is_string() {
        if let Some((_, info)) = profile {
            if !info.base_type.is_string() {
                return Err(err(StringIncompatible {
                    profile: info.base_type,
                })
                .into());
            }
        }
        return Ok(accepted);
    }

    if size < base_type.size() {
        return Err(err(SizeBelowBaseType {
            size,
            base_size: base_type.size(),
        })
        .into());
    }

    let Some((_, info)) = profile else {
        return Ok(accepted);
    };
    let profile_size = info.base_type.size();

    if info.array {
        if size % profile_size != 0 {
            return Err(err(NotAMultiple {
                size,
                declared_size: base_type.size(),
                profile_size,
            })
            .into());
        }
        if base_type != info.base_type {
            return Err(err(ArrayTypeMismatch {
                declared: base_type,
                profile: info.base_type,
            })
            .into());
        }
    } else {
        if size > profile_size {
            return Err(err(SizeExceedsProfile { size, profile_size }).into());
        }
        if base_type != info.base_type {
            if info.base_type.is_string() {
                return Err(err(ProfileStringIncompatible {
                    declared: base_type,
                })
                .into());
            }
            if base_type.signed() != info.base_type.signed() {
                return Err(err(SignednessMismatch {
                    declared: base_type,
                    profile: info.base_type,
                })
                .into());
            }
        }
    }

    Ok(accepted)
}
