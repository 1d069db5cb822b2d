//! File-typed message containers
//!
//! A decoded FIT file holds exactly one sub-container, selected by the
//! file_id message's `type` field. The sub-container is the sole authority
//! for aggregating the messages that follow: known messages it has no list
//! for are dropped after decoding.

use std::collections::BTreeMap;

use tracing::debug;

use crate::header::FileHeader;
use crate::message::{FileIdMsg, Message};
use crate::profile::{
    FILE_MFG_RANGE_MAX, FILE_MFG_RANGE_MIN, FILE_TYPE_INVALID, FILE_TYPE_LAST, FileType, MesgNum,
};
use crate::{FormatError, NotSupportedError, Result};

/// A fully decoded FIT file.
#[derive(Clone, Debug)]
pub struct Fit {
    pub header: FileHeader,
    /// The trailing file checksum, as stored.
    pub crc: u16,
    pub file_id: FileIdMsg,
    /// Occurrence counts for data messages whose global message number the
    /// profile does not know.
    pub unknown_messages: BTreeMap<u16, u32>,
    /// Occurrence counts for fields the profile does not know, keyed by
    /// (global message number, field number).
    pub unknown_fields: BTreeMap<(u16, u8), u32>,
    pub file: FitFile,
}

macro_rules! file_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        /// The sub-container of the matching file type, if that is what
        /// was decoded.
        pub fn $name(&self) -> Option<&$ty> {
            match &self.file {
                FitFile::$variant(f) => Some(f),
                _ => None,
            }
        }
    };
}

impl Fit {
    /// The decoded file's type.
    pub fn file_type(&self) -> FileType {
        self.file.file_type()
    }

    file_accessor!(activity, Activity, ActivityFile);
    file_accessor!(device, Device, DeviceFile);
    file_accessor!(settings, Settings, SettingsFile);
    file_accessor!(sport, Sport, SportFile);
    file_accessor!(workout, Workout, WorkoutFile);
    file_accessor!(course, Course, CourseFile);
    file_accessor!(schedules, Schedules, SchedulesFile);
    file_accessor!(weight, Weight, WeightFile);
    file_accessor!(totals, Totals, TotalsFile);
    file_accessor!(goals, Goals, GoalsFile);
    file_accessor!(blood_pressure, BloodPressure, BloodPressureFile);
    file_accessor!(monitoring_a, MonitoringA, MonitoringAFile);
    file_accessor!(monitoring_daily, MonitoringDaily, MonitoringDailyFile);
    file_accessor!(monitoring_b, MonitoringB, MonitoringBFile);
    file_accessor!(activity_summary, ActivitySummary, ActivitySummaryFile);
    file_accessor!(segment, Segment, SegmentFile);
    file_accessor!(segment_list, SegmentList, SegmentListFile);
}

#[derive(Clone, Default, Debug)]
pub struct ActivityFile {
    pub activity: Option<Message>,
    pub sessions: Vec<Message>,
    pub laps: Vec<Message>,
    pub lengths: Vec<Message>,
    pub records: Vec<Message>,
    pub events: Vec<Message>,
    pub hrvs: Vec<Message>,
    pub device_infos: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct DeviceFile {
    pub softwares: Vec<Message>,
    pub capabilities: Vec<Message>,
    pub file_capabilities: Vec<Message>,
    pub mesg_capabilities: Vec<Message>,
    pub field_capabilities: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct SettingsFile {
    pub user_profiles: Vec<Message>,
    pub hrm_profiles: Vec<Message>,
    pub sdm_profiles: Vec<Message>,
    pub bike_profiles: Vec<Message>,
    pub device_settings: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct SportFile {
    pub zones_targets: Vec<Message>,
    pub sports: Vec<Message>,
    pub hr_zones: Vec<Message>,
    pub power_zones: Vec<Message>,
    pub met_zones: Vec<Message>,
    pub speed_zones: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct WorkoutFile {
    pub workout: Option<Message>,
    pub workout_steps: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct CourseFile {
    pub course: Option<Message>,
    pub laps: Vec<Message>,
    pub course_points: Vec<Message>,
    pub records: Vec<Message>,
    pub events: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct SchedulesFile {
    pub schedules: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct WeightFile {
    pub weight_scales: Vec<Message>,
    pub device_infos: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct TotalsFile {
    pub totals: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct GoalsFile {
    pub goals: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct BloodPressureFile {
    pub blood_pressures: Vec<Message>,
    pub device_infos: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct MonitoringAFile {
    pub monitoring_info: Option<Message>,
    pub monitorings: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct MonitoringDailyFile {
    pub monitoring_info: Option<Message>,
    pub monitorings: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct MonitoringBFile {
    pub monitoring_info: Option<Message>,
    pub monitorings: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct ActivitySummaryFile {
    pub activity: Option<Message>,
    pub sessions: Vec<Message>,
    pub laps: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct SegmentFile {
    pub segment_id: Option<Message>,
    pub segment_leaderboard_entries: Vec<Message>,
    pub segment_laps: Vec<Message>,
    pub segment_points: Vec<Message>,
}

#[derive(Clone, Default, Debug)]
pub struct SegmentListFile {
    pub segment_files: Vec<Message>,
}

/// The file-type-specific container, one variant per FIT file type.
#[derive(Clone, Debug)]
pub enum FitFile {
    Activity(ActivityFile),
    Device(DeviceFile),
    Settings(SettingsFile),
    Sport(SportFile),
    Workout(WorkoutFile),
    Course(CourseFile),
    Schedules(SchedulesFile),
    Weight(WeightFile),
    Totals(TotalsFile),
    Goals(GoalsFile),
    BloodPressure(BloodPressureFile),
    MonitoringA(MonitoringAFile),
    MonitoringDaily(MonitoringDailyFile),
    MonitoringB(MonitoringBFile),
    ActivitySummary(ActivitySummaryFile),
    Segment(SegmentFile),
    SegmentList(SegmentListFile),
}

impl FitFile {
    /// Routes a raw file_id `type` value to an empty container.
    pub(crate) fn for_type(raw: u8) -> Result<FitFile> {
        if raw == FILE_TYPE_INVALID {
            return Err(FormatError::FileTypeInvalid.into());
        }
        match FileType::try_from(raw) {
            Ok(FileType::Activity) => Ok(FitFile::Activity(Default::default())),
            Ok(FileType::Device) => Ok(FitFile::Device(Default::default())),
            Ok(FileType::Settings) => Ok(FitFile::Settings(Default::default())),
            Ok(FileType::Sport) => Ok(FitFile::Sport(Default::default())),
            Ok(FileType::Workout) => Ok(FitFile::Workout(Default::default())),
            Ok(FileType::Course) => Ok(FitFile::Course(Default::default())),
            Ok(FileType::Schedules) => Ok(FitFile::Schedules(Default::default())),
            Ok(FileType::Weight) => Ok(FitFile::Weight(Default::default())),
            Ok(FileType::Totals) => Ok(FitFile::Totals(Default::default())),
            Ok(FileType::Goals) => Ok(FitFile::Goals(Default::default())),
            Ok(FileType::BloodPressure) => Ok(FitFile::BloodPressure(Default::default())),
            Ok(FileType::MonitoringA) => Ok(FitFile::MonitoringA(Default::default())),
            Ok(FileType::MonitoringDaily) => Ok(FitFile::MonitoringDaily(Default::default())),
            Ok(FileType::MonitoringB) => Ok(FitFile::MonitoringB(Default::default())),
            Ok(FileType::ActivitySummary) => Ok(FitFile::ActivitySummary(Default::default())),
            Ok(FileType::Segment) => Ok(FitFile::Segment(Default::default())),
            Ok(FileType::SegmentList) => Ok(FitFile::SegmentList(Default::default())),
            Err(_) if (FILE_MFG_RANGE_MIN..=FILE_MFG_RANGE_MAX).contains(&raw) => {
                Err(NotSupportedError::ManufacturerFileType(raw).into())
            }
            Err(_) if raw > FILE_TYPE_LAST => Err(FormatError::FileTypeUnknown(raw).into()),
            Err(_) => Err(FormatError::FileType(raw).into()),
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            FitFile::Activity(_) => FileType::Activity,
            FitFile::Device(_) => FileType::Device,
            FitFile::Settings(_) => FileType::Settings,
            FitFile::Sport(_) => FileType::Sport,
            FitFile::Workout(_) => FileType::Workout,
            FitFile::Course(_) => FileType::Course,
            FitFile::Schedules(_) => FileType::Schedules,
            FitFile::Weight(_) => FileType::Weight,
            FitFile::Totals(_) => FileType::Totals,
            FitFile::Goals(_) => FileType::Goals,
            FitFile::BloodPressure(_) => FileType::BloodPressure,
            FitFile::MonitoringA(_) => FileType::MonitoringA,
            FitFile::MonitoringDaily(_) => FileType::MonitoringDaily,
            FitFile::MonitoringB(_) => FileType::MonitoringB,
            FitFile::ActivitySummary(_) => FileType::ActivitySummary,
            FitFile::Segment(_) => FileType::Segment,
            FitFile::SegmentList(_) => FileType::SegmentList,
        }
    }

    /// Appends a decoded message to the list its file type keeps for it.
    pub(crate) fn add(&mut self, msg: Message) {
        match (self, msg.mesg_num()) {
            (FitFile::Activity(f), MesgNum::Activity) => f.activity = Some(msg),
            (FitFile::Activity(f), MesgNum::Session) => f.sessions.push(msg),
            (FitFile::Activity(f), MesgNum::Lap) => f.laps.push(msg),
            (FitFile::Activity(f), MesgNum::Length) => f.lengths.push(msg),
            (FitFile::Activity(f), MesgNum::Record) => f.records.push(msg),
            (FitFile::Activity(f), MesgNum::Event) => f.events.push(msg),
            (FitFile::Activity(f), MesgNum::Hrv) => f.hrvs.push(msg),
            (FitFile::Activity(f), MesgNum::DeviceInfo) => f.device_infos.push(msg),

            (FitFile::Device(f), MesgNum::Software) => f.softwares.push(msg),
            (FitFile::Device(f), MesgNum::Capabilities) => f.capabilities.push(msg),
            (FitFile::Device(f), MesgNum::FileCapabilities) => f.file_capabilities.push(msg),
            (FitFile::Device(f), MesgNum::MesgCapabilities) => f.mesg_capabilities.push(msg),
            (FitFile::Device(f), MesgNum::FieldCapabilities) => f.field_capabilities.push(msg),

            (FitFile::Settings(f), MesgNum::UserProfile) => f.user_profiles.push(msg),
            (FitFile::Settings(f), MesgNum::HrmProfile) => f.hrm_profiles.push(msg),
            (FitFile::Settings(f), MesgNum::SdmProfile) => f.sdm_profiles.push(msg),
            (FitFile::Settings(f), MesgNum::BikeProfile) => f.bike_profiles.push(msg),
            (FitFile::Settings(f), MesgNum::DeviceSettings) => f.device_settings.push(msg),

            (FitFile::Sport(f), MesgNum::ZonesTarget) => f.zones_targets.push(msg),
            (FitFile::Sport(f), MesgNum::Sport) => f.sports.push(msg),
            (FitFile::Sport(f), MesgNum::HrZone) => f.hr_zones.push(msg),
            (FitFile::Sport(f), MesgNum::PowerZone) => f.power_zones.push(msg),
            (FitFile::Sport(f), MesgNum::MetZone) => f.met_zones.push(msg),
            (FitFile::Sport(f), MesgNum::SpeedZone) => f.speed_zones.push(msg),

            (FitFile::Workout(f), MesgNum::Workout) => f.workout = Some(msg),
            (FitFile::Workout(f), MesgNum::WorkoutStep) => f.workout_steps.push(msg),

            (FitFile::Course(f), MesgNum::Course) => f.course = Some(msg),
            (FitFile::Course(f), MesgNum::Lap) => f.laps.push(msg),
            (FitFile::Course(f), MesgNum::CoursePoint) => f.course_points.push(msg),
            (FitFile::Course(f), MesgNum::Record) => f.records.push(msg),
            (FitFile::Course(f), MesgNum::Event) => f.events.push(msg),

            (FitFile::Schedules(f), MesgNum::Schedule) => f.schedules.push(msg),

            (FitFile::Weight(f), MesgNum::WeightScale) => f.weight_scales.push(msg),
            (FitFile::Weight(f), MesgNum::DeviceInfo) => f.device_infos.push(msg),

            (FitFile::Totals(f), MesgNum::Totals) => f.totals.push(msg),

            (FitFile::Goals(f), MesgNum::Goal) => f.goals.push(msg),

            (FitFile::BloodPressure(f), MesgNum::BloodPressure) => f.blood_pressures.push(msg),
            (FitFile::BloodPressure(f), MesgNum::DeviceInfo) => f.device_infos.push(msg),

            (FitFile::MonitoringA(f), MesgNum::MonitoringInfo) => f.monitoring_info = Some(msg),
            (FitFile::MonitoringA(f), MesgNum::Monitoring) => f.monitorings.push(msg),
            (FitFile::MonitoringDaily(f), MesgNum::MonitoringInfo) => {
                f.monitoring_info = Some(msg)
            }
            (FitFile::MonitoringDaily(f), MesgNum::Monitoring) => f.monitorings.push(msg),
            (FitFile::MonitoringB(f), MesgNum::MonitoringInfo) => f.monitoring_info = Some(msg),
            (FitFile::MonitoringB(f), MesgNum::Monitoring) => f.monitorings.push(msg),

            (FitFile::ActivitySummary(f), MesgNum::Activity) => f.activity = Some(msg),
            (FitFile::ActivitySummary(f), MesgNum::Session) => f.sessions.push(msg),
            (FitFile::ActivitySummary(f), MesgNum::Lap) => f.laps.push(msg),

            (FitFile::Segment(f), MesgNum::SegmentId) => f.segment_id = Some(msg),
            (FitFile::Segment(f), MesgNum::SegmentLeaderboardEntry) => {
                f.segment_leaderboard_entries.push(msg)
            }
            (FitFile::Segment(f), MesgNum::SegmentLap) => f.segment_laps.push(msg),
            (FitFile::Segment(f), MesgNum::SegmentPoint) => f.segment_points.push(msg),

            (FitFile::SegmentList(f), MesgNum::SegmentFile) => f.segment_files.push(msg),

            (file, mesg) => {
                debug!("{} file keeps no list for {} messages", file.file_type(), mesg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FitFile;
    use crate::message::Message;
    use crate::profile::{FileType, MesgNum};
    use crate::{FitError, FormatError, NotSupportedError};

    #[test]
    fn routes_known_file_types() {
        let file = FitFile::for_type(4).unwrap();
        assert_eq!(file.file_type(), FileType::Activity);
        let file = FitFile::for_type(35).unwrap();
        assert_eq!(file.file_type(), FileType::SegmentList);
    }

    #[test]
    fn invalid_file_type_is_a_format_error() {
        assert!(matches!(
            FitFile::for_type(0xFF).unwrap_err(),
            FitError::Format(FormatError::FileTypeInvalid)
        ));
    }

    #[test]
    fn unknown_file_type_above_known_range() {
        assert!(matches!(
            FitFile::for_type(36).unwrap_err(),
            FitError::Format(FormatError::FileTypeUnknown(36))
        ));
        assert!(matches!(
            FitFile::for_type(0xF6).unwrap_err(),
            FitError::Format(FormatError::FileTypeUnknown(0xF6))
        ));
    }

    #[test]
    fn manufacturer_file_type_is_not_supported() {
        for raw in [0xF7u8, 0xFA, 0xFE] {
            assert!(matches!(
                FitFile::for_type(raw).unwrap_err(),
                FitError::NotSupported(NotSupportedError::ManufacturerFileType(_))
            ));
        }
    }

    #[test]
    fn gap_file_type_is_a_format_error() {
        for raw in [0u8, 8, 12, 13] {
            assert!(matches!(
                FitFile::for_type(raw).unwrap_err(),
                FitError::Format(FormatError::FileType(_))
            ));
        }
    }

    #[test]
    fn add_routes_by_message_kind() {
        let mut file = FitFile::for_type(4).unwrap();
        file.add(Message::new(MesgNum::Record));
        file.add(Message::new(MesgNum::Record));
        file.add(Message::new(MesgNum::Activity));
        // An activity file keeps no course points; this one is dropped.
        file.add(Message::new(MesgNum::CoursePoint));
        let FitFile::Activity(activity) = file else {
            panic!("expected an activity container");
        };
        assert_eq!(activity.records.len(), 2);
        assert!(activity.activity.is_some());
    }
}
