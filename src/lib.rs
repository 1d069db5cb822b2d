//! A library for decoding Garmin FIT files.
//!
//! FIT is a self-describing binary container: definition records announce
//! the layout of the data records that follow, and a trailing CRC covers
//! the whole stream. This crate decodes that stream into typed messages
//! aggregated in a container matching the file's type (activity, course,
//! workout, and so on).
//!
//! See the [`decode`] function for the main entry point:
//!
//! ```no_run
//! # fn main() -> Result<(), fitdec::FitError> {
//! let file = std::fs::File::open("ride.fit").map_err(fitdec::FitError::Io)?;
//! let fit = fitdec::decode(std::io::BufReader::new(file))?;
//! if let Some(activity) = fit.activity() {
//!     println!("{} records", activity.records.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`decode_header`], [`decode_header_and_file_id`], and
//! [`check_integrity`] stop earlier in the same pipeline for callers that
//! only need the prefix of a file, or only its checksums.

mod base_type;
mod container;
mod crc;
mod decoder;
mod definition;
mod header;
mod message;
mod profile;
mod reader;
mod value;

use std::env;
use std::io::Read;

use thiserror::Error;

pub use crate::base_type::BaseType;
pub use crate::container::{
    ActivityFile, ActivitySummaryFile, BloodPressureFile, CourseFile, DeviceFile, Fit, FitFile,
    GoalsFile, MonitoringAFile, MonitoringBFile, MonitoringDailyFile, SchedulesFile, SegmentFile,
    SegmentListFile, SettingsFile, SportFile, TotalsFile, WeightFile, WorkoutFile,
};
use crate::decoder::Decoder;
pub use crate::definition::{ValidationError, ValidationErrorKind};
pub use crate::header::FileHeader;
pub use crate::message::{Field, FileIdMsg, Message};
pub use crate::profile::{FieldKind, FileType, MesgNum};
pub use crate::value::{Semicircles, Value};

/// An error decoding a FIT file.
///
/// Every variant is fatal to the decode in progress; unknown messages and
/// unknown fields are not errors and are counted in the returned [`Fit`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FitError {
    /// The stream violates the FIT specification.
    #[error("FIT format error")]
    Format(#[from] FormatError),
    /// A checksum did not match its data.
    #[error("FIT integrity error")]
    Integrity(#[from] IntegrityError),
    /// The file relies on a manufacturer-specific extension.
    #[error("not supported")]
    NotSupported(#[from] NotSupportedError),
    /// A field definition failed validation against the profile.
    #[error("field definition error")]
    Validation(#[from] ValidationError),
    /// The source ran out mid-structure.
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),
    /// The source failed for a reason other than end of input.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FitError>;

/// Ways a stream can violate the FIT specification.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FormatError {
    #[error("file header size {0}, expected 12 or 14")]
    HeaderSize(u8),
    #[error("file header magic {0:?}, expected \".FIT\"")]
    Magic([u8; 4]),
    #[error("architecture byte {0:#04x}, expected 0 or 1")]
    Architecture(u8),
    #[error("invalid global message number 0xffff in a definition")]
    MesgNumInvalid,
    #[error("data record references undefined local message type {0}")]
    UndefinedLocalType(u8),
    #[error("expected the first record to be a file_id definition")]
    FileIdDefinitionFirst,
    #[error("expected a file_id data message after its definition")]
    FileIdDataFirst,
    #[error("multiple file_id messages")]
    MultipleFileId,
    #[error("file type is invalid")]
    FileTypeInvalid,
    #[error("unknown file type {0}")]
    FileTypeUnknown(u8),
    #[error("{0} is not a valid file type")]
    FileType(u8),
}

/// A checksum mismatch, in the header or over the whole file.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IntegrityError {
    #[error("header checksum failed: stored {stored:#06x}, computed {computed:#06x}")]
    HeaderChecksum { stored: u16, computed: u16 },
    #[error("file checksum failed")]
    FileChecksum,
}

/// Manufacturer-specific extensions this decoder rejects.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NotSupportedError {
    #[error("manufacturer-specific file type {0:#04x}")]
    ManufacturerFileType(u8),
    #[error("manufacturer-specific global message number {0:#06x}")]
    ManufacturerMesgNum(u16),
}

/// Options for decoding a FIT file.
#[derive(Clone, Copy, Default, Debug)]
pub struct DecodeOptions {
    pub(crate) debug: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit per-record diagnostics at debug level while decoding.
    ///
    /// Large files pay a formatting cost for record-level logging, so it
    /// is off unless requested here or through the environment.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Options seeded from the environment: `GOFIT_DEBUG=1` (or another
    /// truthy value) switches record-level diagnostics on.
    pub fn from_env() -> Self {
        let debug = matches!(
            env::var("GOFIT_DEBUG").as_deref().map(str::trim),
            Ok(v) if v == "1"
                || v.eq_ignore_ascii_case("true")
                || v.eq_ignore_ascii_case("yes")
        );
        Self::default().with_debug(debug)
    }
}

/// Decodes a whole FIT file, verifying the trailing checksum.
pub fn decode<R: Read>(src: R) -> Result<Fit> {
    decode_with_options(src, DecodeOptions::from_env())
}

/// [`decode`] with explicit options.
pub fn decode_with_options<R: Read>(src: R, options: DecodeOptions) -> Result<Fit> {
    Decoder::new(src, options).decode_file()
}

/// Decodes only the file header.
pub fn decode_header<R: Read>(src: R) -> Result<FileHeader> {
    Decoder::new(src, DecodeOptions::from_env()).decode_header()
}

/// Decodes the file header and the mandatory leading file_id message,
/// then stops.
pub fn decode_header_and_file_id<R: Read>(src: R) -> Result<(FileHeader, FileIdMsg)> {
    let mut decoder = Decoder::new(src, DecodeOptions::from_env());
    let header = decoder.decode_header()?;
    let file_id = decoder.decode_file_id()?;
    Ok((header, file_id))
}

/// Verifies the file's checksums without keeping any decoded data.
///
/// With `header_only` set, only the header is read (and its checksum
/// verified, when present); otherwise the data region is streamed through
/// the CRC and the trailing checksum is checked.
pub fn check_integrity<R: Read>(src: R, header_only: bool) -> Result<()> {
    Decoder::new(src, DecodeOptions::from_env()).check_integrity(header_only)
}
