//! API role classification for instrumentable functions.
//!
//! Functions of the instrumentation API library are recognised by name: the
//! pretty name must start with the API namespace and contain one of the
//! characteristic call fragments below. Fragments end in `(` so `Start(` does not
//! match `StartAsync(`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace every instrumentation API function lives in.
pub const API_NAMESPACE_PREFIX: &str = "orbit_api::";

/// Role a function plays in the instrumentation API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiRole {
    #[default]
    None,
    TimerStart,
    TimerStop,
    TimerStartAsync,
    TimerStopAsync,
    TrackInt8,
    TrackInt16,
    TrackInt32,
    TrackInt64,
    TrackUint8,
    TrackUint16,
    TrackUint32,
    TrackUint64,
    TrackFloat,
    TrackDouble,
    TrackFloatAsInt,
    TrackDoubleAsInt64,
}

impl ApiRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiRole::None => "none",
            ApiRole::TimerStart => "timer_start",
            ApiRole::TimerStop => "timer_stop",
            ApiRole::TimerStartAsync => "timer_start_async",
            ApiRole::TimerStopAsync => "timer_stop_async",
            ApiRole::TrackInt8 => "track_int8",
            ApiRole::TrackInt16 => "track_int16",
            ApiRole::TrackInt32 => "track_int32",
            ApiRole::TrackInt64 => "track_int64",
            ApiRole::TrackUint8 => "track_uint8",
            ApiRole::TrackUint16 => "track_uint16",
            ApiRole::TrackUint32 => "track_uint32",
            ApiRole::TrackUint64 => "track_uint64",
            ApiRole::TrackFloat => "track_float",
            ApiRole::TrackDouble => "track_double",
            ApiRole::TrackFloatAsInt => "track_float_as_int",
            ApiRole::TrackDoubleAsInt64 => "track_double_as_int64",
        }
    }
}

impl fmt::Display for ApiRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered fragment table. The first fragment contained in the name wins, so the
/// order is part of the classification contract.
pub static API_ROLE_FRAGMENTS: &[(&str, ApiRole)] = &[
    ("Start(", ApiRole::TimerStart),
    ("Stop(", ApiRole::TimerStop),
    ("StartAsync(", ApiRole::TimerStartAsync),
    ("StopAsync(", ApiRole::TimerStopAsync),
    ("TrackInt8(", ApiRole::TrackInt8),
    ("TrackInt16(", ApiRole::TrackInt16),
    ("TrackInt32(", ApiRole::TrackInt32),
    ("TrackInt(", ApiRole::TrackInt32),
    ("TrackInt64(", ApiRole::TrackInt64),
    ("TrackUint8(", ApiRole::TrackUint8),
    ("TrackUint16(", ApiRole::TrackUint16),
    ("TrackUint32(", ApiRole::TrackUint32),
    ("TrackUint(", ApiRole::TrackUint32),
    ("TrackUint64(", ApiRole::TrackUint64),
    ("TrackFloat(", ApiRole::TrackFloat),
    ("TrackDouble(", ApiRole::TrackDouble),
    ("TrackFloatAsInt(", ApiRole::TrackFloatAsInt),
    ("TrackDoubleAsInt64(", ApiRole::TrackDoubleAsInt64),
];

/// Classifies a pretty name. Returns `None` for anything outside the API namespace
/// or without a known fragment.
pub fn classify_pretty_name(pretty_name: &str) -> Option<ApiRole> {
    if !pretty_name.starts_with(API_NAMESPACE_PREFIX) {
        return None;
    }
    API_ROLE_FRAGMENTS
        .iter()
        .find(|(fragment, _)| pretty_name.contains(fragment))
        .map(|(_, role)| *role)
}
