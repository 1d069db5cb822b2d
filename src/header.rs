//! FIT file header

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use crate::crc::Crc;
use crate::reader::CrcReader;
use crate::{FormatError, IntegrityError, Result};

/// The four magic bytes every FIT header carries.
const MAGIC: &[u8; 4] = b".FIT";

/// The decoded file header.
///
/// `data_size` counts the bytes between the end of the header and the two
/// trailing checksum bytes. `crc` is present only for 14-byte headers; a
/// stored value of zero means the writer did not compute one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FileHeader {
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    pub data_size: u32,
    pub crc: Option<u16>,
}

impl FileHeader {
    pub(crate) fn decode<R: Read>(rdr: &mut CrcReader<R>) -> Result<Self> {
        let header_size = rdr.read_u8("file header")?;
        if header_size != 12 && header_size != 14 {
            return Err(FormatError::HeaderSize(header_size).into());
        }

        let mut buf = [0u8; 11];
        rdr.read_exact(&mut buf, "file header")?;

        let magic: [u8; 4] = buf[7..11].try_into().unwrap();
        if &magic != MAGIC {
            return Err(FormatError::Magic(magic).into());
        }

        let crc = if header_size == 14 {
            let mut crc_buf = [0u8; 2];
            rdr.read_exact(&mut crc_buf, "file header checksum")?;
            let stored = LittleEndian::read_u16(&crc_buf);
            if stored != 0 {
                let mut computed = Crc::new();
                computed.add_byte(header_size);
                computed.add_bytes(&buf);
                if computed.sum() != stored {
                    return Err(IntegrityError::HeaderChecksum {
                        stored,
                        computed: computed.sum(),
                    }
                    .into());
                }
            }
            Some(stored)
        } else {
            None
        };

        Ok(Self {
            header_size,
            protocol_version: buf[0],
            profile_version: LittleEndian::read_u16(&buf[1..3]),
            data_size: LittleEndian::read_u32(&buf[3..7]),
            crc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::FileHeader;
    use crate::reader::CrcReader;
    use crate::{FitError, FormatError, IntegrityError};

    // A header from a FIT file exported from Garmin Connect.
    const HEADER: [u8; 14] = [
        0x0e, 0x10, 0xb2, 0x52, 0x88, 0x42, 0x00, 0x00, 0x2e, 0x46, 0x49, 0x54, 0x4b, 0xf9,
    ];

    fn decode(bytes: &[u8]) -> Result<FileHeader, FitError> {
        FileHeader::decode(&mut CrcReader::new(bytes))
    }

    #[test]
    fn decodes_14_byte_header() -> anyhow::Result<()> {
        let h = decode(&HEADER)?;
        assert_eq!(h.header_size, 14);
        assert_eq!(h.protocol_version, 0x10);
        assert_eq!(h.profile_version, 0x52b2);
        assert_eq!(h.data_size, 0x4288);
        assert_eq!(h.crc, Some(0xf94b));
        Ok(())
    }

    #[test]
    fn decodes_12_byte_header() -> anyhow::Result<()> {
        let h = decode(&HEADER[..12])?;
        assert_eq!(h.header_size, 12);
        assert_eq!(h.crc, None);
        Ok(())
    }

    #[test]
    fn zero_stored_crc_is_accepted() -> anyhow::Result<()> {
        let mut bytes = HEADER;
        bytes[12] = 0;
        bytes[13] = 0;
        let h = decode(&bytes)?;
        assert_eq!(h.crc, Some(0));
        Ok(())
    }

    #[test]
    fn wrong_stored_crc_is_rejected() {
        let mut bytes = HEADER;
        bytes[12] ^= 0xff;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            FitError::Integrity(IntegrityError::HeaderChecksum { .. })
        ));
    }

    #[test]
    fn bad_header_size_is_rejected() {
        let mut bytes = HEADER;
        bytes[0] = 13;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, FitError::Format(FormatError::HeaderSize(13))));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = HEADER;
        bytes[8] = b'x';
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, FitError::Format(FormatError::Magic(_))));
    }

    #[test]
    fn truncated_header_is_unexpected_eof() {
        let err = decode(&HEADER[..6]).unwrap_err();
        assert!(matches!(err, FitError::UnexpectedEof("file header")));
    }
}
