//! Fixed-point field transforms shared by the Allcast frame formats.
//!
//! Every orbital and status field is transmitted as a fixed-width unsigned counter.
//! The functions here turn those counters into physical values.
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Seconds between the Unix epoch and the Allcast reference epoch 2020-01-01T00:00:00Z.
pub const REFERENCE_EPOCH_SECS: i64 = 1_577_836_800;
/// Date counter resolution in milliseconds (0.125s).
const DATE_STEP_MILLIS: i64 = 125;
/// Relative date counter offset in milliseconds (8200s).
const RELATIVE_DATE_OFFSET_MILLIS: i64 = 8_200_000;
/// Earth equatorial radius, added to the semi-major axis counter.
pub const EARTH_RADIUS_METERS: u32 = 6_378_137;

/// Field bit widths.
pub mod width {
    pub const BROADCASTER: usize = 8;
    pub const FORMAT: usize = 32;
    pub const ADDRESS: usize = 8;
    pub const DATE: usize = 35;
    pub const LONGITUDE: usize = 19;
    pub const LONGITUDE_DRIFT: usize = 13;
    pub const NODAL_PERIOD: usize = 18;
    pub const SEMI_MAJOR_AXIS: usize = 20;
    pub const SEMI_MAJOR_AXIS_DECAY: usize = 10;
    pub const INCLINATION: usize = 18;
    pub const RELATIVE_DATE: usize = 17;
    pub const PAYLOAD_TYPE: usize = 3;
    pub const FCS: usize = 16;
    pub const CS_COUNTER: usize = 6;
    pub const CS_INDEX: usize = 3;
    pub const CS_TOTAL: usize = 3;
}

/// `2020-01-01T00:00:00Z + counter * 0.125s`
#[must_use]
pub fn epoch(counter: u64) -> DateTime<Utc> {
    // 35 bit counter; at most ~136 years past the reference, well inside i64 nanos
    let millis = REFERENCE_EPOCH_SECS * 1_000 + counter as i64 * DATE_STEP_MILLIS;
    Utc.timestamp_nanos(millis * 1_000_000)
}

/// Ascending node longitude in degrees.
#[must_use]
pub fn longitude(counter: u64) -> f64 {
    counter as f64 * 0.001
}

/// Ascending node longitude drift in degrees per orbit.
#[must_use]
pub fn longitude_drift(counter: u64) -> f64 {
    -28.000 + counter as f64 * 0.001
}

/// Nodal period in minutes.
#[must_use]
pub fn nodal_period(counter: u64) -> f64 {
    84.4890 + counter as f64 * 0.0001
}

/// Semi-major axis in meters.
#[must_use]
pub fn semi_major_axis(counter: u64) -> u32 {
    // 20 bit counter
    EARTH_RADIUS_METERS + counter as u32
}

/// Semi-major axis decay in meters per day.
#[must_use]
pub fn semi_major_axis_decay(counter: u64) -> f64 {
    counter as f64 * 0.1
}

/// Inclination in degrees.
#[must_use]
pub fn inclination(counter: u64) -> f64 {
    counter as f64 * 0.001
}

/// Relative date offset in seconds, `counter * 0.125 - 8200`.
#[must_use]
pub fn delta_seconds(counter: u64) -> f64 {
    -8200.0 + counter as f64 * 0.125
}

/// Relative date offset as an exact duration.
#[must_use]
pub fn delta_duration(counter: u64) -> TimeDelta {
    TimeDelta::milliseconds(counter as i64 * DATE_STEP_MILLIS - RELATIVE_DATE_OFFSET_MILLIS)
}

/// Extrapolate a reference satellite's ascending node longitude `delta_seconds` away
/// from its epoch using its drift and nodal period. The result is wrapped by a single
/// turn into `[0, 360)`.
#[must_use]
pub fn extrapolate_longitude(longitude: f64, drift: f64, period: f64, delta_seconds: f64) -> f64 {
    let drift_rate = (drift / period) / 0.001 / 60.0 * 0.125;
    wrap_longitude(longitude + drift_rate * (delta_seconds / 0.125) * 0.001)
}

#[must_use]
pub fn wrap_longitude(deg: f64) -> f64 {
    if deg < 0.0 {
        360.0 + deg
    } else if deg >= 360.0 {
        deg - 360.0
    } else {
        deg
    }
}

/// Mission payload carried by a satellite, as reported in constellation status frames.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PayloadType {
    #[serde(rename = "ARGOS_3")]
    Argos3,
    #[serde(rename = "ARGOS_NEO")]
    ArgosNeo,
    #[serde(rename = "ARGOS_4")]
    Argos4,
    #[serde(rename = "KINEIS_V1")]
    KineisV1,
    #[serde(rename = "SPARE_1")]
    Spare1,
    #[serde(rename = "SPARE_2")]
    Spare2,
    #[serde(rename = "SPARE_3")]
    Spare3,
    #[serde(rename = "SPARE_4")]
    Spare4,
}

impl PayloadType {
    /// Lookup a payload type by its 3-bit code.
    ///
    /// # Errors
    /// [Error::UnknownPayloadType] for codes that do not fit in 3 bits.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0b000 => Self::Argos3,
            0b001 => Self::ArgosNeo,
            0b010 => Self::Argos4,
            0b011 => Self::KineisV1,
            0b100 => Self::Spare1,
            0b101 => Self::Spare2,
            0b110 => Self::Spare3,
            0b111 => Self::Spare4,
            _ => return Err(Error::UnknownPayloadType(code)),
        })
    }

    #[must_use]
    pub fn code(&self) -> u8 {
        *self as u8
    }

    #[must_use]
    pub fn is_spare(&self) -> bool {
        matches!(
            self,
            Self::Spare1 | Self::Spare2 | Self::Spare3 | Self::Spare4
        )
    }
}

impl std::fmt::Display for PayloadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Argos3 => "ARGOS_3",
            Self::ArgosNeo => "ARGOS_NEO",
            Self::Argos4 => "ARGOS_4",
            Self::KineisV1 => "KINEIS_V1",
            Self::Spare1 => "SPARE_1",
            Self::Spare2 => "SPARE_2",
            Self::Spare3 => "SPARE_3",
            Self::Spare4 => "SPARE_4",
        };
        f.write_str(name)
    }
}
