//! The decode pipeline
//!
//! Owns the checksumming reader, the 16 local message slots, and the
//! running timestamp reference. All four library entry points drive this
//! type; each call consumes its source and releases all decode state on
//! return.

use std::collections::BTreeMap;
use std::io::Read;
use std::mem;

use byteorder::{ByteOrder, LittleEndian};
use chrono::FixedOffset;
use tracing::{debug, warn};

use crate::base_type::BaseType;
use crate::container::{Fit, FitFile};
use crate::definition::DefinitionMessage;
use crate::header::FileHeader;
use crate::message::{FileIdMsg, Message};
use crate::profile::{self, FieldKind, MesgNum};
use crate::reader::CrcReader;
use crate::value::{self, Endianness, Semicircles, Value, date_time_from_fit};
use crate::{DecodeOptions, FormatError, IntegrityError, Result};

/// A field definition's size is a single byte, so no field can exceed
/// this many bytes on the wire.
const MAX_FIELD_SIZE: usize = 255;

/// Low five bits of a compressed-timestamp record header.
const TIME_OFFSET_MASK: u8 = 0x1F;

pub(crate) struct Decoder<R: Read> {
    rdr: CrcReader<R>,
    opts: DecodeOptions,
    defs: [Option<DefinitionMessage>; 16],
    /// Raw seconds of the most recent valid UTC timestamp field.
    last_timestamp: Option<u32>,
    /// Low five bits of the running timestamp reference.
    last_offset: u8,
    scratch: [u8; MAX_FIELD_SIZE],
    unknown_messages: BTreeMap<u16, u32>,
    unknown_fields: BTreeMap<(u16, u8), u32>,
}

impl<R: Read> Decoder<R> {
    pub(crate) fn new(src: R, opts: DecodeOptions) -> Self {
        Self {
            rdr: CrcReader::new(src),
            opts,
            defs: [const { None }; 16],
            last_timestamp: None,
            last_offset: 0,
            scratch: [0; MAX_FIELD_SIZE],
            unknown_messages: BTreeMap::new(),
            unknown_fields: BTreeMap::new(),
        }
    }

    /// Decodes the file header and marks the start of the data region.
    pub(crate) fn decode_header(&mut self) -> Result<FileHeader> {
        let header = FileHeader::decode(&mut self.rdr)?;
        self.rdr.reset_count();
        Ok(header)
    }

    /// Decodes the mandatory leading file_id definition and data records.
    pub(crate) fn decode_file_id(&mut self) -> Result<FileIdMsg> {
        let header = self.rdr.read_u8("record header")?;
        if !is_definition(header) {
            return Err(FormatError::FileIdDefinitionFirst.into());
        }
        let def = DefinitionMessage::decode(&mut self.rdr, header)?;
        if def.mesg != Some(MesgNum::FileId) {
            return Err(FormatError::FileIdDefinitionFirst.into());
        }
        let def_local = def.local;
        self.defs[def_local as usize] = Some(def);

        let header = self.rdr.read_u8("record header")?;
        if !is_data(header) {
            return Err(FormatError::FileIdDataFirst.into());
        }
        let local = header & 0x0F;
        match &self.defs[local as usize] {
            Some(def) if def.mesg == Some(MesgNum::FileId) => (),
            _ => return Err(FormatError::FileIdDataFirst.into()),
        }
        let msg = self
            .decode_data(local, None)?
            .expect("file_id is a known message");
        Ok(FileIdMsg::from(&msg))
    }

    /// Full decode: header, file_id, every following record, trailing CRC.
    pub(crate) fn decode_file(&mut self) -> Result<Fit> {
        let header = self.decode_header()?;
        let file_id = self.decode_file_id()?;
        let mut file = FitFile::for_type(file_id.file_type)?;
        debug!("decoding a {} file", file.file_type());

        while self.rdr.bytes_read() < header.data_size {
            if let Some(msg) = self.decode_record()? {
                if msg.mesg_num() == MesgNum::FileId {
                    return Err(FormatError::MultipleFileId.into());
                }
                file.add(msg);
            }
        }
        let crc = self.trailing_crc()?;

        Ok(Fit {
            header,
            crc,
            file_id,
            unknown_messages: mem::take(&mut self.unknown_messages),
            unknown_fields: mem::take(&mut self.unknown_fields),
            file,
        })
    }

    /// Streams the whole file through the CRC without keeping messages.
    pub(crate) fn check_integrity(&mut self, header_only: bool) -> Result<()> {
        let header = self.decode_header()?;
        if header_only {
            return Ok(());
        }
        self.rdr.discard(header.data_size, "data records")?;
        self.trailing_crc()?;
        Ok(())
    }

    /// Dispatches one record. Returns a message for data records of known
    /// global message numbers.
    fn decode_record(&mut self) -> Result<Option<Message>> {
        let header = self.rdr.read_u8("record header")?;
        if header & 0x80 != 0 {
            // Compressed-timestamp data message: bits 6..5 carry the local
            // message type, bits 4..0 the time offset.
            let local = (header >> 5) & 0x03;
            let offset = header & TIME_OFFSET_MASK;
            let timestamp = match self.last_timestamp {
                Some(last) => {
                    let delta = offset.wrapping_sub(self.last_offset) & TIME_OFFSET_MASK;
                    self.last_offset = offset;
                    Some((last & !u32::from(TIME_OFFSET_MASK)) + u32::from(delta))
                }
                None => {
                    warn!("compressed timestamp before any reference timestamp");
                    None
                }
            };
            self.decode_data(local, timestamp)
        } else if is_definition(header) {
            let def = DefinitionMessage::decode(&mut self.rdr, header)?;
            if self.opts.debug {
                debug!(
                    local = def.local,
                    global = def.global,
                    fields = def.fields.len(),
                    "definition message"
                );
            }
            let def_local = def.local;
            self.defs[def_local as usize] = Some(def);
            Ok(None)
        } else {
            self.decode_data(header & 0x0F, None)
        }
    }

    /// Decodes one data record against the definition in `local`'s slot.
    ///
    /// Returns `None` for unknown global message numbers, whose bytes are
    /// consumed and counted but not kept. `compressed_ts` carries the raw
    /// seconds recovered from a compressed-timestamp header, stamped into
    /// the message before field parsing.
    fn decode_data(&mut self, local: u8, compressed_ts: Option<u32>) -> Result<Option<Message>> {
        let def = self.defs[local as usize]
            .as_ref()
            .ok_or(FormatError::UndefinedLocalType(local))?;
        let endianness = def.endianness;

        let mut msg = def.mesg.map(Message::new);
        match &msg {
            Some(m) => {
                if self.opts.debug {
                    debug!(local, mesg = %m.mesg_num(), size = def.data_size(), "data message");
                }
            }
            None => {
                *self.unknown_messages.entry(def.global).or_insert(0) += 1;
            }
        }

        if let (Some(m), Some(raw)) = (msg.as_mut(), compressed_ts) {
            if let Some(index) = profile::timestamp_index(m.mesg_num()) {
                m.set(index, Value::DateTime(date_time_from_fit(raw)));
            }
        }

        for fd in &def.fields {
            let wire = fd.size as usize;
            let profile_field = if msg.is_some() { fd.profile } else { None };

            // Dynamic sub-fields may be narrower on the wire than the
            // profile's base type; widen them with zeros, preserving the
            // numeric value under the definition's byte order.
            let widened = match profile_field {
                Some((_, info)) if !info.array && !info.base_type.is_string() => {
                    info.base_type.size() as usize
                }
                _ => wire,
            };
            self.rdr.read_exact(&mut self.scratch[..wire], "data message")?;
            let padding = widened - wire;
            if padding > 0 {
                match endianness {
                    Endianness::Little => self.scratch[wire..widened].fill(0),
                    Endianness::Big => {
                        self.scratch.copy_within(0..wire, padding);
                        self.scratch[..padding].fill(0);
                    }
                }
            }

            let Some(m) = msg.as_mut() else {
                continue;
            };
            let Some((index, info)) = profile_field else {
                *self.unknown_fields.entry((def.global, fd.num)).or_insert(0) += 1;
                continue;
            };
            let buf = &self.scratch[..widened];

            match info.kind {
                FieldKind::Fit if info.array => {
                    let decoded = if info.base_type.is_byte() {
                        Value::Bytes(buf.to_vec())
                    } else if info.base_type.is_string() {
                        Value::Strings(value::strings_from_bytes(buf))
                    } else {
                        let unit = info.base_type.size() as usize;
                        Value::Array(
                            buf.chunks_exact(unit)
                                .map(|c| value::decode_scalar(c, info.base_type, endianness))
                                .collect(),
                        )
                    };
                    m.set(index, decoded);
                }
                FieldKind::Fit => {
                    let decoded = value::decode_scalar(buf, info.base_type, endianness);
                    if !decoded.is_invalid() {
                        m.set(index, decoded);
                    }
                }
                FieldKind::TimeUtc => {
                    if let Value::UInt32(raw) =
                        value::decode_scalar(buf, BaseType::UInt32, endianness)
                    {
                        if raw != 0xFFFF_FFFF {
                            m.set(index, Value::DateTime(date_time_from_fit(raw)));
                            self.last_timestamp = Some(raw);
                            self.last_offset = (raw & u32::from(TIME_OFFSET_MASK)) as u8;
                        }
                    }
                }
                FieldKind::TimeLocal => {
                    if let Value::UInt32(raw) =
                        value::decode_scalar(buf, BaseType::UInt32, endianness)
                    {
                        if raw != 0xFFFF_FFFF {
                            let reference = self.last_timestamp.unwrap_or(0);
                            let offset = i64::from(raw) - i64::from(reference);
                            match i32::try_from(offset).ok().and_then(FixedOffset::east_opt) {
                                Some(zone) => m.set(
                                    index,
                                    Value::LocalDateTime(
                                        date_time_from_fit(reference).with_timezone(&zone),
                                    ),
                                ),
                                None => {
                                    warn!(offset, "local time offset out of range, field left unset")
                                }
                            }
                        }
                    }
                }
                FieldKind::Lat | FieldKind::Lng => {
                    if let Value::SInt32(raw) =
                        value::decode_scalar(buf, BaseType::SInt32, endianness)
                    {
                        if raw != 0x7FFF_FFFF {
                            let coordinate = match info.kind {
                                FieldKind::Lat => Value::Latitude(Semicircles(raw)),
                                _ => Value::Longitude(Semicircles(raw)),
                            };
                            m.set(index, coordinate);
                        }
                    }
                }
            }
        }

        Ok(msg)
    }

    /// Reads the trailing file checksum; the running CRC over everything
    /// including these two bytes must come out zero.
    fn trailing_crc(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.rdr.read_exact(&mut buf, "file checksum")?;
        if self.rdr.crc_sum() != 0 {
            return Err(IntegrityError::FileChecksum.into());
        }
        Ok(LittleEndian::read_u16(&buf))
    }
}

fn is_definition(header: u8) -> bool {
    header & 0xC0 == 0x40
}

fn is_data(header: u8) -> bool {
    header & 0xC0 == 0x00
}
