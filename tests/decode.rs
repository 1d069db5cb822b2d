//! End-to-end decoding scenarios over synthetic FIT streams.

use chrono::{DateTime, TimeDelta, Utc};
use fitdec::{
    FileType, FitError, FormatError, IntegrityError, NotSupportedError, Value, decode,
    check_integrity, decode_header, decode_header_and_file_id,
};

static CRC_TABLE: &[u16] = &[
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800, 0xB401,
    0x5000, 0x9C01, 0x8801, 0x4400,
];

fn crc16(bytes: &[u8]) -> u16 {
    let mut sum = 0u16;
    for byte in bytes {
        let mut tmp = CRC_TABLE[(sum & 0x0F) as usize];
        sum = (sum >> 4) & 0x0FFF;
        sum = sum ^ tmp ^ CRC_TABLE[(byte & 0x0F) as usize];
        tmp = CRC_TABLE[(sum & 0x0F) as usize];
        sum = (sum >> 4) & 0x0FFF;
        sum = sum ^ tmp ^ CRC_TABLE[(byte >> 4) as usize];
    }
    sum
}

fn garmin_epoch() -> DateTime<Utc> {
    "1989-12-31T00:00:00Z".parse().unwrap()
}

/// Wraps a data region in a 12-byte header and the trailing checksum.
fn fit_file(data: &[u8]) -> Vec<u8> {
    let mut out = vec![12, 0x10, 0xB2, 0x52];
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(b".FIT");
    out.extend_from_slice(data);
    let crc = crc16(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    out
}

/// As `fit_file`, with a 14-byte header carrying the given stored CRC.
fn fit_file_14(data: &[u8], header_crc: impl Fn(&[u8]) -> u16) -> Vec<u8> {
    let mut out = vec![14, 0x10, 0xB2, 0x52];
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(b".FIT");
    let stored = header_crc(&out);
    out.extend_from_slice(&stored.to_le_bytes());
    out.extend_from_slice(data);
    let crc = crc16(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    out
}

/// The mandatory leading file_id definition and data records:
/// type as given, manufacturer = 1, product = 1, time_created = 0.
fn file_id_records(file_type: u8) -> Vec<u8> {
    let mut out = vec![
        0x40, 0x00, 0x00, 0, 0, 4, // definition: file_id, little endian
        0, 1, 0x00, // type: enum
        1, 2, 0x84, // manufacturer: uint16
        2, 2, 0x84, // product: uint16
        4, 4, 0x86, // time_created: uint32
    ];
    out.extend_from_slice(&[0x00, file_type, 1, 0, 1, 0, 0, 0, 0, 0]);
    out
}

#[test]
fn minimal_activity_file() -> anyhow::Result<()> {
    let fit = decode(fit_file(&file_id_records(4)).as_slice())?;
    assert_eq!(fit.file_type(), FileType::Activity);
    assert!(fit.activity().is_some());
    assert_eq!(fit.file_id.file_type, 4);
    assert_eq!(fit.file_id.manufacturer, 1);
    assert_eq!(fit.file_id.product, 1);
    assert_eq!(fit.file_id.time_created, Some(garmin_epoch()));
    assert!(fit.unknown_messages.is_empty());
    assert!(fit.unknown_fields.is_empty());
    Ok(())
}

#[test]
fn integrity_of_a_valid_file() -> anyhow::Result<()> {
    let bytes = fit_file(&file_id_records(4));
    check_integrity(bytes.as_slice(), false)?;
    check_integrity(bytes.as_slice(), true)?;
    Ok(())
}

#[test]
fn zero_header_crc_is_accepted() -> anyhow::Result<()> {
    let bytes = fit_file_14(&file_id_records(4), |_| 0);
    let header = decode_header(bytes.as_slice())?;
    assert_eq!(header.crc, Some(0));
    decode(bytes.as_slice())?;
    Ok(())
}

#[test]
fn computed_header_crc_is_verified() -> anyhow::Result<()> {
    let bytes = fit_file_14(&file_id_records(4), crc16);
    decode(bytes.as_slice())?;

    let bytes = fit_file_14(&file_id_records(4), |h| crc16(h) ^ 0x1234);
    let err = decode(bytes.as_slice()).unwrap_err();
    assert!(matches!(
        err,
        FitError::Integrity(IntegrityError::HeaderChecksum { .. })
    ));
    Ok(())
}

#[test]
fn corrupt_data_fails_the_file_checksum() {
    let mut bytes = fit_file(&file_id_records(4));
    // Flip a bit inside time_created, leaving the records parseable.
    let index = bytes.len() - 3;
    bytes[index] ^= 0x01;

    let err = decode(bytes.as_slice()).unwrap_err();
    assert!(matches!(
        err,
        FitError::Integrity(IntegrityError::FileChecksum)
    ));
    let err = check_integrity(bytes.as_slice(), false).unwrap_err();
    assert!(matches!(
        err,
        FitError::Integrity(IntegrityError::FileChecksum)
    ));
    // Header-only integrity does not look at the data region.
    check_integrity(bytes.as_slice(), true).unwrap();
}

#[test]
fn manufacturer_file_type_is_not_supported() {
    for file_type in [0xF7u8, 0xFA, 0xFE] {
        let bytes = fit_file(&file_id_records(file_type));
        let err = decode(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            FitError::NotSupported(NotSupportedError::ManufacturerFileType(t)) if t == file_type
        ));
        // The shorter entry point stops before file-type routing.
        let (_, file_id) = decode_header_and_file_id(bytes.as_slice()).unwrap();
        assert_eq!(file_id.file_type, file_type);
    }
}

#[test]
fn unknown_and_invalid_file_types_are_format_errors() {
    let err = decode(fit_file(&file_id_records(36)).as_slice()).unwrap_err();
    assert!(matches!(
        err,
        FitError::Format(FormatError::FileTypeUnknown(36))
    ));

    // 0xFF is the type field's invalid sentinel.
    let err = decode(fit_file(&file_id_records(0xFF)).as_slice()).unwrap_err();
    assert!(matches!(err, FitError::Format(FormatError::FileTypeInvalid)));
}

#[test]
fn first_record_must_define_file_id() {
    // A record definition where file_id's should be.
    let data = [0x40u8, 0x00, 0x00, 20, 0, 1, 3, 1, 0x02, 0x00, 99];
    let err = decode(fit_file(&data).as_slice()).unwrap_err();
    assert!(matches!(
        err,
        FitError::Format(FormatError::FileIdDefinitionFirst)
    ));
}

#[test]
fn second_file_id_message_is_rejected() {
    let mut data = file_id_records(4);
    data.extend_from_slice(&file_id_records(4)[18..]); // just the data record
    let err = decode(fit_file(&data).as_slice()).unwrap_err();
    assert!(matches!(err, FitError::Format(FormatError::MultipleFileId)));
}

#[test]
fn unknown_messages_are_counted_not_fatal() -> anyhow::Result<()> {
    let mut data = file_id_records(4);
    // Global message 147 is not in the profile.
    data.extend_from_slice(&[0x41, 0x00, 0x00, 147, 0, 1, 0, 2, 0x84]);
    data.extend_from_slice(&[0x01, 0x01, 0x02]);
    data.extend_from_slice(&[0x01, 0x03, 0x04]);

    let fit = decode(fit_file(&data).as_slice())?;
    assert_eq!(fit.unknown_messages.get(&147), Some(&2));
    Ok(())
}

#[test]
fn records_and_compressed_timestamps_land_in_the_activity() -> anyhow::Result<()> {
    // T chosen so that T & 0x1F == 30.
    let t: u32 = 0x1000_0000 + 30;
    let mut data = file_id_records(4);
    // Slot 1: record with timestamp and heart_rate.
    data.extend_from_slice(&[0x41, 0x00, 0x00, 20, 0, 2, 253, 4, 0x86, 3, 1, 0x02]);
    let mut full = vec![0x01];
    full.extend_from_slice(&t.to_le_bytes());
    full.push(118);
    data.extend_from_slice(&full);
    // Slot 2: record with heart_rate only, carried by compressed headers.
    data.extend_from_slice(&[0x42, 0x00, 0x00, 20, 0, 1, 3, 1, 0x02]);
    // Compressed header: slot 2, offset 2. Delta = (2 - 30) & 0x1F = 4.
    data.extend_from_slice(&[0xC2, 120]);

    let fit = decode(fit_file(&data).as_slice())?;
    let activity = fit.activity().expect("an activity container");
    assert_eq!(activity.records.len(), 2);

    let full = &activity.records[0];
    assert_eq!(
        full.field(253),
        Some(&Value::DateTime(garmin_epoch() + TimeDelta::seconds(t.into())))
    );
    assert_eq!(full.field(3), Some(&Value::UInt8(118)));

    let stamped = &activity.records[1];
    let expected = t - 26;
    assert_eq!(
        stamped.field(253),
        Some(&Value::DateTime(
            garmin_epoch() + TimeDelta::seconds(expected.into())
        ))
    );
    assert_eq!(stamped.field(3), Some(&Value::UInt8(120)));
    Ok(())
}

#[test]
fn truncated_file_is_unexpected_eof() {
    let bytes = fit_file(&file_id_records(4));
    let err = decode(&bytes[..bytes.len() - 4]).unwrap_err();
    assert!(matches!(err, FitError::UnexpectedEof(_)));
}

#[test]
fn course_file_routes_course_messages() -> anyhow::Result<()> {
    let mut data = file_id_records(6);
    // course: sport + name
    data.extend_from_slice(&[0x41, 0x00, 0x00, 31, 0, 2, 4, 1, 0x00, 5, 6, 0x07]);
    data.extend_from_slice(&[0x01, 2]);
    data.extend_from_slice(b"hills\0");
    // course_point: type + name
    data.extend_from_slice(&[0x42, 0x00, 0x00, 32, 0, 2, 5, 1, 0x00, 6, 4, 0x07]);
    data.extend_from_slice(&[0x02, 3]);
    data.extend_from_slice(b"top\0");

    let fit = decode(fit_file(&data).as_slice())?;
    let course = fit.course().expect("a course container");
    let course_msg = course.course.as_ref().expect("a course message");
    assert_eq!(course_msg.field(5), Some(&Value::String("hills".to_owned())));
    assert_eq!(course_msg.field(4), Some(&Value::Enum(2)));
    assert_eq!(course.course_points.len(), 1);
    assert_eq!(
        course.course_points[0].field(6),
        Some(&Value::String("top".to_owned()))
    );
    Ok(())
}
