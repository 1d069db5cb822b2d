//! Static FIT profile registry
//!
//! Message numbers, file types, and per-field metadata manually copied
//! from Profile.xlsx in FIT SDK 21.158.00, restricted to the message
//! kinds the file containers aggregate. A field absent from these tables
//! is treated as unknown and counted, never rejected.

use num_enum::TryFromPrimitive;
use strum::Display;

use crate::base_type::BaseType;

/// The invalid sentinel for a global message number.
pub(crate) const MESG_NUM_INVALID: u16 = 0xFFFF;

/// Manufacturer-specific global message number range.
pub(crate) const MESG_MFG_RANGE_MIN: u16 = 0xFF00;
pub(crate) const MESG_MFG_RANGE_MAX: u16 = 0xFFFE;

/// The invalid sentinel for a file type.
pub(crate) const FILE_TYPE_INVALID: u8 = 0xFF;

/// Manufacturer-specific file type range.
pub(crate) const FILE_MFG_RANGE_MIN: u8 = 0xF7;
pub(crate) const FILE_MFG_RANGE_MAX: u8 = 0xFE;

/// Field number conventions shared by all messages.
pub(crate) const FIELD_NUM_TIMESTAMP: u8 = 253;
pub(crate) const FIELD_NUM_MESSAGE_INDEX: u8 = 254;

/// Known global message numbers.
#[repr(u16)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Display, TryFromPrimitive, Debug)]
#[strum(serialize_all = "snake_case")]
pub enum MesgNum {
    FileId = 0,
    Capabilities = 1,
    DeviceSettings = 2,
    UserProfile = 3,
    HrmProfile = 4,
    SdmProfile = 5,
    BikeProfile = 6,
    ZonesTarget = 7,
    HrZone = 8,
    PowerZone = 9,
    MetZone = 10,
    Sport = 12,
    Goal = 15,
    Session = 18,
    Lap = 19,
    Record = 20,
    Event = 21,
    DeviceInfo = 23,
    Workout = 26,
    WorkoutStep = 27,
    Schedule = 28,
    WeightScale = 30,
    Course = 31,
    CoursePoint = 32,
    Totals = 33,
    Activity = 34,
    Software = 35,
    FileCapabilities = 37,
    MesgCapabilities = 38,
    FieldCapabilities = 39,
    FileCreator = 49,
    BloodPressure = 51,
    SpeedZone = 53,
    Monitoring = 55,
    Hrv = 78,
    Length = 101,
    MonitoringInfo = 103,
    SegmentLap = 142,
    SegmentId = 148,
    SegmentLeaderboardEntry = 149,
    SegmentPoint = 150,
    SegmentFile = 151,
}

/// FIT file types, as carried in the file_id message's `type` field.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, Debug)]
#[strum(serialize_all = "snake_case")]
pub enum FileType {
    Device = 1,
    Settings = 2,
    Sport = 3,
    Activity = 4,
    Workout = 5,
    Course = 6,
    Schedules = 7,
    Weight = 9,
    Totals = 10,
    Goals = 11,
    BloodPressure = 14,
    MonitoringA = 15,
    ActivitySummary = 20,
    MonitoringDaily = 28,
    MonitoringB = 32,
    Segment = 34,
    SegmentList = 35,
}

/// The numerically last standard file type.
pub(crate) const FILE_TYPE_LAST: u8 = FileType::SegmentList as u8;

/// How the decoder interprets a field once its raw value is in hand.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FieldKind {
    /// A plain FIT value of the field's base type.
    Fit,
    /// Seconds since the Garmin epoch, decoded to an absolute UTC moment.
    TimeUtc,
    /// Device-local seconds, re-expressed in a synthesized fixed-offset
    /// zone.
    TimeLocal,
    /// Semicircle latitude.
    Lat,
    /// Semicircle longitude.
    Lng,
}

/// Profile metadata for one field of one message.
#[derive(Clone, Copy, Debug)]
pub struct FieldInfo {
    pub num: u8,
    pub name: &'static str,
    pub base_type: BaseType,
    pub kind: FieldKind,
    pub array: bool,
}

const fn f(num: u8, name: &'static str, base_type: BaseType) -> FieldInfo {
    FieldInfo {
        num,
        name,
        base_type,
        kind: FieldKind::Fit,
        array: false,
    }
}

const fn fa(num: u8, name: &'static str, base_type: BaseType) -> FieldInfo {
    FieldInfo {
        num,
        name,
        base_type,
        kind: FieldKind::Fit,
        array: true,
    }
}

const fn fk(num: u8, name: &'static str, base_type: BaseType, kind: FieldKind) -> FieldInfo {
    FieldInfo {
        num,
        name,
        base_type,
        kind,
        array: false,
    }
}

const fn timestamp() -> FieldInfo {
    fk(FIELD_NUM_TIMESTAMP, "timestamp", BaseType::UInt32, FieldKind::TimeUtc)
}

const fn message_index() -> FieldInfo {
    f(FIELD_NUM_MESSAGE_INDEX, "message_index", BaseType::UInt16)
}

use BaseType::{Byte, Enum, SInt8, SInt16, SInt32, String as Str, UInt8, UInt8z, UInt16, UInt16z, UInt32, UInt32z};
use FieldKind::{Lat, Lng, TimeLocal, TimeUtc};

static FILE_ID: &[FieldInfo] = &[
    f(0, "type", Enum),
    f(1, "manufacturer", UInt16),
    f(2, "product", UInt16),
    f(3, "serial_number", UInt32z),
    fk(4, "time_created", UInt32, TimeUtc),
    f(5, "number", UInt16),
    f(8, "product_name", Str),
];

static CAPABILITIES: &[FieldInfo] = &[
    fa(0, "languages", UInt8z),
    fa(1, "sports", UInt8z),
    f(21, "workouts_supported", UInt32z),
    f(23, "connectivity_supported", UInt32z),
];

static DEVICE_SETTINGS: &[FieldInfo] = &[
    f(0, "active_time_zone", UInt8),
    f(1, "utc_offset", UInt32),
    fa(2, "time_offset", UInt32),
    fa(5, "time_zone_offset", SInt8),
];

static USER_PROFILE: &[FieldInfo] = &[
    message_index(),
    f(0, "friendly_name", Str),
    f(1, "gender", Enum),
    f(2, "age", UInt8),
    f(3, "height", UInt8),
    f(4, "weight", UInt16),
    f(5, "language", Enum),
    f(22, "wake_time", UInt32),
    f(23, "sleep_time", UInt32),
];

static HRM_PROFILE: &[FieldInfo] = &[
    message_index(),
    f(0, "enabled", Enum),
    f(1, "hrm_ant_id", UInt16z),
    f(2, "log_hrv", Enum),
    f(3, "hrm_ant_id_trans_type", UInt8z),
];

static SDM_PROFILE: &[FieldInfo] = &[
    message_index(),
    f(0, "enabled", Enum),
    f(1, "sdm_ant_id", UInt16z),
    f(2, "sdm_cal_factor", UInt16),
    f(3, "odometer", UInt32),
    f(4, "speed_source", Enum),
];

static BIKE_PROFILE: &[FieldInfo] = &[
    message_index(),
    f(0, "name", Str),
    f(1, "sport", Enum),
    f(2, "sub_sport", Enum),
    f(3, "odometer", UInt32),
    f(8, "bike_weight", UInt16),
    f(9, "power_cal_factor", UInt16),
];

static ZONES_TARGET: &[FieldInfo] = &[
    f(1, "max_heart_rate", UInt8),
    f(2, "threshold_heart_rate", UInt8),
    f(3, "functional_threshold_power", UInt16),
    f(5, "hr_calc_type", Enum),
    f(7, "pwr_calc_type", Enum),
];

static HR_ZONE: &[FieldInfo] = &[
    message_index(),
    f(1, "high_bpm", UInt8),
    f(2, "name", Str),
];

static POWER_ZONE: &[FieldInfo] = &[
    message_index(),
    f(1, "high_value", UInt16),
    f(2, "name", Str),
];

static MET_ZONE: &[FieldInfo] = &[
    message_index(),
    f(1, "high_bpm", UInt8),
    f(2, "calories", UInt16),
    f(3, "fat_calories", UInt8),
];

static SPORT: &[FieldInfo] = &[
    f(0, "sport", Enum),
    f(1, "sub_sport", Enum),
    f(3, "name", Str),
];

static GOAL: &[FieldInfo] = &[
    message_index(),
    f(0, "sport", Enum),
    f(1, "sub_sport", Enum),
    fk(2, "start_date", UInt32, TimeUtc),
    fk(3, "end_date", UInt32, TimeUtc),
    f(4, "type", Enum),
    f(5, "value", UInt32),
    f(6, "repeat", Enum),
    f(7, "target_value", UInt32),
    f(8, "recurrence", Enum),
    f(9, "recurrence_value", UInt16),
    f(10, "enabled", Enum),
];

static SESSION: &[FieldInfo] = &[
    timestamp(),
    message_index(),
    f(0, "event", Enum),
    f(1, "event_type", Enum),
    fk(2, "start_time", UInt32, TimeUtc),
    fk(3, "start_position_lat", SInt32, Lat),
    fk(4, "start_position_long", SInt32, Lng),
    f(5, "sport", Enum),
    f(6, "sub_sport", Enum),
    f(7, "total_elapsed_time", UInt32),
    f(8, "total_timer_time", UInt32),
    f(9, "total_distance", UInt32),
    f(10, "total_cycles", UInt32),
    f(11, "total_calories", UInt16),
    f(14, "avg_speed", UInt16),
    f(15, "max_speed", UInt16),
    f(16, "avg_heart_rate", UInt8),
    f(17, "max_heart_rate", UInt8),
    f(18, "avg_cadence", UInt8),
    f(19, "max_cadence", UInt8),
    f(20, "avg_power", UInt16),
    f(21, "max_power", UInt16),
    f(22, "total_ascent", UInt16),
    f(23, "total_descent", UInt16),
    f(25, "first_lap_index", UInt16),
    f(26, "num_laps", UInt16),
];

static LAP: &[FieldInfo] = &[
    timestamp(),
    message_index(),
    f(0, "event", Enum),
    f(1, "event_type", Enum),
    fk(2, "start_time", UInt32, TimeUtc),
    fk(3, "start_position_lat", SInt32, Lat),
    fk(4, "start_position_long", SInt32, Lng),
    fk(5, "end_position_lat", SInt32, Lat),
    fk(6, "end_position_long", SInt32, Lng),
    f(7, "total_elapsed_time", UInt32),
    f(8, "total_timer_time", UInt32),
    f(9, "total_distance", UInt32),
    f(10, "total_cycles", UInt32),
    f(11, "total_calories", UInt16),
    f(13, "avg_speed", UInt16),
    f(14, "max_speed", UInt16),
    f(15, "avg_heart_rate", UInt8),
    f(16, "max_heart_rate", UInt8),
    f(17, "avg_cadence", UInt8),
    f(18, "max_cadence", UInt8),
    f(19, "avg_power", UInt16),
    f(20, "max_power", UInt16),
    f(21, "total_ascent", UInt16),
    f(22, "total_descent", UInt16),
    f(23, "intensity", Enum),
    f(24, "lap_trigger", Enum),
    f(25, "sport", Enum),
];

static RECORD: &[FieldInfo] = &[
    timestamp(),
    fk(0, "position_lat", SInt32, Lat),
    fk(1, "position_long", SInt32, Lng),
    f(2, "altitude", UInt16),
    f(3, "heart_rate", UInt8),
    f(4, "cadence", UInt8),
    f(5, "distance", UInt32),
    f(6, "speed", UInt16),
    f(7, "power", UInt16),
    fa(8, "compressed_speed_distance", Byte),
    f(9, "grade", SInt16),
    f(10, "resistance", UInt8),
    f(11, "time_from_course", SInt32),
    f(12, "cycle_length", UInt8),
    f(13, "temperature", SInt8),
    f(29, "accumulated_power", UInt32),
    f(73, "enhanced_speed", UInt32),
    f(78, "enhanced_altitude", UInt32),
];

static EVENT: &[FieldInfo] = &[
    timestamp(),
    f(0, "event", Enum),
    f(1, "event_type", Enum),
    f(2, "data16", UInt16),
    f(3, "data", UInt32),
    f(4, "event_group", UInt8),
];

static DEVICE_INFO: &[FieldInfo] = &[
    timestamp(),
    f(0, "device_index", UInt8),
    f(1, "device_type", UInt8),
    f(2, "manufacturer", UInt16),
    f(3, "serial_number", UInt32z),
    f(4, "product", UInt16),
    f(5, "software_version", UInt16),
    f(6, "hardware_version", UInt8),
    f(7, "cum_operating_time", UInt32),
    f(10, "battery_voltage", UInt16),
    f(11, "battery_status", UInt8),
    f(27, "product_name", Str),
];

static WORKOUT: &[FieldInfo] = &[
    f(4, "sport", Enum),
    f(5, "capabilities", UInt32z),
    f(6, "num_valid_steps", UInt16),
    f(8, "wkt_name", Str),
];

static WORKOUT_STEP: &[FieldInfo] = &[
    message_index(),
    f(0, "wkt_step_name", Str),
    f(1, "duration_type", Enum),
    f(2, "duration_value", UInt32),
    f(3, "target_type", Enum),
    f(4, "target_value", UInt32),
    f(5, "custom_target_value_low", UInt32),
    f(6, "custom_target_value_high", UInt32),
    f(7, "intensity", Enum),
];

static SCHEDULE: &[FieldInfo] = &[
    f(0, "manufacturer", UInt16),
    f(1, "product", UInt16),
    f(2, "serial_number", UInt32z),
    fk(3, "time_created", UInt32, TimeUtc),
    f(4, "completed", Enum),
    f(5, "type", Enum),
    fk(6, "scheduled_time", UInt32, TimeLocal),
];

static WEIGHT_SCALE: &[FieldInfo] = &[
    timestamp(),
    f(0, "weight", UInt16),
    f(1, "percent_fat", UInt16),
    f(2, "percent_hydration", UInt16),
    f(3, "visceral_fat_mass", UInt16),
    f(4, "bone_mass", UInt16),
    f(5, "muscle_mass", UInt16),
    f(7, "basal_met", UInt16),
    f(8, "physique_rating", UInt8),
    f(9, "active_met", UInt16),
    f(10, "metabolic_age", UInt8),
    f(12, "user_profile_index", UInt16),
];

static COURSE: &[FieldInfo] = &[
    f(4, "sport", Enum),
    f(5, "name", Str),
    f(6, "capabilities", UInt32z),
];

static COURSE_POINT: &[FieldInfo] = &[
    message_index(),
    fk(1, "timestamp", UInt32, TimeUtc),
    fk(2, "position_lat", SInt32, Lat),
    fk(3, "position_long", SInt32, Lng),
    f(4, "distance", UInt32),
    f(5, "type", Enum),
    f(6, "name", Str),
];

static TOTALS: &[FieldInfo] = &[
    timestamp(),
    message_index(),
    f(0, "timer_time", UInt32),
    f(1, "distance", UInt32),
    f(2, "calories", UInt32),
    f(3, "sport", Enum),
    f(4, "elapsed_time", UInt32),
    f(5, "sessions", UInt16),
    f(6, "active_time", UInt32),
];

static ACTIVITY: &[FieldInfo] = &[
    timestamp(),
    f(0, "total_timer_time", UInt32),
    f(1, "num_sessions", UInt16),
    f(2, "type", Enum),
    f(3, "event", Enum),
    f(4, "event_type", Enum),
    fk(5, "local_timestamp", UInt32, TimeLocal),
    f(6, "event_group", UInt8),
];

static SOFTWARE: &[FieldInfo] = &[
    message_index(),
    f(3, "version", UInt16),
    f(5, "part_number", Str),
];

static FILE_CAPABILITIES: &[FieldInfo] = &[
    message_index(),
    f(0, "type", Enum),
    f(1, "flags", UInt8z),
    f(2, "directory", Str),
    f(3, "max_count", UInt16),
    f(4, "max_size", UInt32),
];

static MESG_CAPABILITIES: &[FieldInfo] = &[
    message_index(),
    f(0, "file", Enum),
    f(1, "mesg_num", UInt16),
    f(2, "count_type", Enum),
    f(3, "count", UInt16),
];

static FIELD_CAPABILITIES: &[FieldInfo] = &[
    message_index(),
    f(0, "file", Enum),
    f(1, "mesg_num", UInt16),
    f(2, "field_num", UInt8),
    f(3, "count", UInt16),
];

static FILE_CREATOR: &[FieldInfo] = &[
    f(0, "software_version", UInt16),
    f(1, "hardware_version", UInt8),
];

static BLOOD_PRESSURE: &[FieldInfo] = &[
    timestamp(),
    f(0, "systolic_pressure", UInt16),
    f(1, "diastolic_pressure", UInt16),
    f(2, "mean_arterial_pressure", UInt16),
    f(3, "map_3_sample_mean", UInt16),
    f(4, "map_morning_values", UInt16),
    f(5, "map_evening_values", UInt16),
    f(6, "heart_rate", UInt8),
    f(7, "heart_rate_type", Enum),
    f(8, "status", Enum),
    f(9, "user_profile_index", UInt16),
];

static SPEED_ZONE: &[FieldInfo] = &[
    message_index(),
    f(0, "high_value", UInt16),
    f(1, "name", Str),
];

static MONITORING: &[FieldInfo] = &[
    timestamp(),
    f(0, "device_index", UInt8),
    f(1, "calories", UInt16),
    f(2, "distance", UInt32),
    f(3, "cycles", UInt32),
    f(4, "active_time", UInt32),
    f(5, "activity_type", Enum),
    f(6, "activity_subtype", Enum),
    f(19, "active_calories", UInt16),
    fa(24, "current_activity_type_intensity", Byte),
    f(26, "timestamp_16", UInt16),
    f(27, "heart_rate", UInt8),
];

static HRV: &[FieldInfo] = &[fa(0, "time", UInt16)];

static LENGTH: &[FieldInfo] = &[
    timestamp(),
    message_index(),
    f(0, "event", Enum),
    f(1, "event_type", Enum),
    fk(2, "start_time", UInt32, TimeUtc),
    f(3, "total_elapsed_time", UInt32),
    f(4, "total_timer_time", UInt32),
    f(5, "total_strokes", UInt16),
    f(6, "avg_speed", UInt16),
    f(7, "swim_stroke", Enum),
    f(9, "avg_swimming_cadence", UInt8),
    f(11, "total_calories", UInt16),
    f(12, "length_type", Enum),
];

static MONITORING_INFO: &[FieldInfo] = &[
    timestamp(),
    fk(0, "local_timestamp", UInt32, TimeLocal),
    fa(1, "activity_type", Enum),
    fa(3, "cycles_to_distance", UInt16),
    fa(4, "cycles_to_calories", UInt16),
    f(5, "resting_metabolic_rate", UInt16),
];

static SEGMENT_LAP: &[FieldInfo] = &[
    timestamp(),
    message_index(),
    f(0, "event", Enum),
    f(1, "event_type", Enum),
    fk(2, "start_time", UInt32, TimeUtc),
    fk(3, "start_position_lat", SInt32, Lat),
    fk(4, "start_position_long", SInt32, Lng),
    fk(5, "end_position_lat", SInt32, Lat),
    fk(6, "end_position_long", SInt32, Lng),
    f(7, "total_elapsed_time", UInt32),
    f(8, "total_timer_time", UInt32),
    f(9, "total_distance", UInt32),
    f(11, "total_calories", UInt16),
    f(15, "avg_heart_rate", UInt8),
    f(16, "max_heart_rate", UInt8),
    f(19, "avg_power", UInt16),
    f(20, "max_power", UInt16),
    f(23, "sport", Enum),
    f(29, "name", Str),
    f(65, "uuid", Str),
];

static SEGMENT_ID: &[FieldInfo] = &[
    f(0, "name", Str),
    f(1, "uuid", Str),
    f(2, "sport", Enum),
    f(3, "enabled", Enum),
    f(4, "user_profile_primary_key", UInt32),
    f(5, "device_id", UInt32),
    f(6, "default_race_leader", UInt8),
    f(7, "delete_status", Enum),
    f(8, "selection_type", Enum),
];

static SEGMENT_LEADERBOARD_ENTRY: &[FieldInfo] = &[
    message_index(),
    f(0, "name", Str),
    f(1, "type", Enum),
    f(2, "group_primary_key", UInt32),
    f(3, "activity_id", UInt32),
    f(4, "segment_time", UInt32),
];

static SEGMENT_POINT: &[FieldInfo] = &[
    message_index(),
    fk(1, "position_lat", SInt32, Lat),
    fk(2, "position_long", SInt32, Lng),
    f(3, "distance", UInt32),
    f(4, "altitude", UInt16),
    fa(5, "leader_time", UInt32),
];

static SEGMENT_FILE: &[FieldInfo] = &[
    message_index(),
    f(1, "file_uuid", Str),
    f(3, "user_profile_primary_key", UInt32),
    fa(7, "leader_activity_id_string", Str),
];

/// All profile fields of a message, in table order. The position of a
/// field in this slice is its target index within the decoded message.
pub(crate) fn fields(mesg: MesgNum) -> &'static [FieldInfo] {
    match mesg {
        MesgNum::FileId => FILE_ID,
        MesgNum::Capabilities => CAPABILITIES,
        MesgNum::DeviceSettings => DEVICE_SETTINGS,
        MesgNum::UserProfile => USER_PROFILE,
        MesgNum::HrmProfile => HRM_PROFILE,
        MesgNum::SdmProfile => SDM_PROFILE,
        MesgNum::BikeProfile => BIKE_PROFILE,
        MesgNum::ZonesTarget => ZONES_TARGET,
        MesgNum::HrZone => HR_ZONE,
        MesgNum::PowerZone => POWER_ZONE,
        MesgNum::MetZone => MET_ZONE,
        MesgNum::Sport => SPORT,
        MesgNum::Goal => GOAL,
        MesgNum::Session => SESSION,
        MesgNum::Lap => LAP,
        MesgNum::Record => RECORD,
        MesgNum::Event => EVENT,
        MesgNum::DeviceInfo => DEVICE_INFO,
        MesgNum::Workout => WORKOUT,
        MesgNum::WorkoutStep => WORKOUT_STEP,
        MesgNum::Schedule => SCHEDULE,
        MesgNum::WeightScale => WEIGHT_SCALE,
        MesgNum::Course => COURSE,
        MesgNum::CoursePoint => COURSE_POINT,
        MesgNum::Totals => TOTALS,
        MesgNum::Activity => ACTIVITY,
        MesgNum::Software => SOFTWARE,
        MesgNum::FileCapabilities => FILE_CAPABILITIES,
        MesgNum::MesgCapabilities => MESG_CAPABILITIES,
        MesgNum::FieldCapabilities => FIELD_CAPABILITIES,
        MesgNum::FileCreator => FILE_CREATOR,
        MesgNum::BloodPressure => BLOOD_PRESSURE,
        MesgNum::SpeedZone => SPEED_ZONE,
        MesgNum::Monitoring => MONITORING,
        MesgNum::Hrv => HRV,
        MesgNum::Length => LENGTH,
        MesgNum::MonitoringInfo => MONITORING_INFO,
        MesgNum::SegmentLap => SEGMENT_LAP,
        MesgNum::SegmentId => SEGMENT_ID,
        MesgNum::SegmentLeaderboardEntry => SEGMENT_LEADERBOARD_ENTRY,
        MesgNum::SegmentPoint => SEGMENT_POINT,
        MesgNum::SegmentFile => SEGMENT_FILE,
    }
}

/// Looks up one field of a message, returning its target index and
/// metadata, or `None` when the profile does not know the field.
pub(crate) fn field(mesg: MesgNum, num: u8) -> Option<(usize, &'static FieldInfo)> {
    fields(mesg).iter().enumerate().find(|(_, f)| f.num == num)
}

/// The target index of the message's `timestamp` field, if it has one.
pub(crate) fn timestamp_index(mesg: MesgNum) -> Option<usize> {
    field(mesg, FIELD_NUM_TIMESTAMP).map(|(i, _)| i)
}
