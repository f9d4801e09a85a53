//! Allcast frame decoding.
//!
//! An Allcast broadcast is a concatenation of bit-packed frames. Every frame starts with
//! an 8-bit broadcaster reference followed by a 32-bit format reference that determines
//! the frame layout and its fixed total size:
//!
//! |Format|Bits|Payload|
//! |---|---|---|
//! |AOP monosat|200|1 orbital element|
//! |AOP multisat|304|1 orbital element, 4 relative satellites|
//! |CS 2 sat|104|2 satellite statuses|
//! |CS 10 sat|200|10 satellite statuses|
//! |CS 17 sat|304|17 satellite statuses|
//!
//! Each frame ends with a 16-bit frame check sequence that is carried but not verified.
use std::fmt::{Debug, Display};
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::bits::BitReader;
use crate::codec::{self, width, PayloadType};
use crate::{Error, Result};

/// 8-bit satellite address.
///
/// Displayed, serialized and parsed as uppercase hex without leading zeros, e.g.,
/// `B` for 0x0B and `FC` for 0xFC.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub u8);

impl Address {
    /// Leading hex digit of the address, i.e., the satellite's hex id.
    #[must_use]
    pub fn hex_id(&self) -> char {
        let digit = if self.0 > 0xf { self.0 >> 4 } else { self.0 };
        char::from_digit(u32::from(digit), 16)
            .unwrap_or('0')
            .to_ascii_uppercase()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({:X})", self.0)
    }
}

impl FromStr for Address {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        u8::from_str_radix(s.trim(), 16).map(Address)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid hex satellite address {s:?}")))
    }
}

/// The 32-bit format reference identifying a frame's layout.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatReference {
    #[serde(rename = "AOP_MONOSAT")]
    AopMonosat,
    #[serde(rename = "AOP_MULTISAT")]
    AopMultisat,
    #[serde(rename = "CS_2_SAT")]
    Cs2Sat,
    #[serde(rename = "CS_10_SAT")]
    Cs10Sat,
    #[serde(rename = "CS_17_SAT")]
    Cs17Sat,
}

impl FormatReference {
    /// # Errors
    /// [Error::UnknownFormat] if `code` is not a known format reference.
    pub fn from_code(code: u32) -> Result<Self> {
        Ok(match code {
            0x0000_026C => Self::AopMonosat,
            0x0000_035A => Self::AopMultisat,
            0x0000_0443 => Self::Cs2Sat,
            0x0000_0575 => Self::Cs10Sat,
            0x0000_062F => Self::Cs17Sat,
            _ => return Err(Error::UnknownFormat(code)),
        })
    }

    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::AopMonosat => 0x0000_026C,
            Self::AopMultisat => 0x0000_035A,
            Self::Cs2Sat => 0x0000_0443,
            Self::Cs10Sat => 0x0000_0575,
            Self::Cs17Sat => 0x0000_062F,
        }
    }

    /// Total frame size in bits, including any padding after the frame check sequence.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        match self {
            Self::AopMonosat | Self::Cs10Sat => 200,
            Self::AopMultisat | Self::Cs17Sat => 304,
            Self::Cs2Sat => 104,
        }
    }

    /// Number of satellite statuses carried by a constellation status format.
    #[must_use]
    pub fn num_statuses(&self) -> usize {
        match self {
            Self::AopMonosat | Self::AopMultisat => 0,
            Self::Cs2Sat => 2,
            Self::Cs10Sat => 10,
            Self::Cs17Sat => 17,
        }
    }

    #[must_use]
    pub fn is_status(&self) -> bool {
        self.num_statuses() > 0
    }
}

impl Display for FormatReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AopMonosat => "AOP_MONOSAT",
            Self::AopMultisat => "AOP_MULTISAT",
            Self::Cs2Sat => "CS_2_SAT",
            Self::Cs10Sat => "CS_10_SAT",
            Self::Cs17Sat => "CS_17_SAT",
        };
        f.write_str(name)
    }
}

/// Orbit parameters for a single satellite.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrbitalElement {
    pub address: Address,
    /// Bulletin date
    pub epoch: DateTime<Utc>,
    /// Ascending node longitude (deg)
    pub longitude: f64,
    /// Ascending node longitude drift (deg/orbit)
    pub longitude_drift: f64,
    /// Nodal period (min)
    pub nodal_period: f64,
    /// Semi-major axis (m)
    pub semi_major_axis: u32,
    /// Semi-major axis decay (m/day)
    pub semi_major_axis_decay: f64,
    /// Inclination (deg)
    pub inclination: f64,
}

impl OrbitalElement {
    /// Encoded size in bits.
    pub const BITS: usize = 141;
}

/// A satellite whose orbit is given relative to the reference satellite of a multisat
/// frame.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelativeDelta {
    pub address: Address,
    /// Bulletin date offset from the reference satellite epoch (s)
    pub delta_seconds: f64,
    #[serde(skip)]
    pub delta: TimeDelta,
}

impl RelativeDelta {
    /// Encoded size in bits.
    pub const BITS: usize = 25;

    /// Construct from a raw 17-bit relative date counter.
    #[must_use]
    pub fn from_counter(address: Address, counter: u64) -> Self {
        RelativeDelta {
            address,
            delta_seconds: codec::delta_seconds(counter),
            delta: codec::delta_duration(counter),
        }
    }
}

/// Payload activity of a single satellite.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteStatus {
    pub address: Address,
    pub payload_type: PayloadType,
    pub uplink: bool,
    pub downlink: bool,
}

impl SatelliteStatus {
    /// Encoded size in bits.
    pub const BITS: usize = 13;
}

/// A constellation status message, possibly one of several making up a full report.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub counter: u8,
    pub index: u8,
    pub total_messages: u8,
    pub statuses: Vec<SatelliteStatus>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    Monosat {
        satellite: OrbitalElement,
    },
    Multisat {
        reference: OrbitalElement,
        relatives: Vec<RelativeDelta>,
    },
    ConstellationStatus(StatusReport),
}

/// A single decoded Allcast frame.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub broadcaster: u8,
    pub format: FormatReference,
    pub payload: Payload,
    /// Frame check sequence. Not verified.
    pub fcs: u16,
}

impl Frame {
    /// Number of relative satellites in a multisat frame.
    pub const NUM_RELATIVES: usize = 4;

    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.format.bit_len()
    }

    /// Orbital element and relative satellites, if this is an AOP frame.
    #[must_use]
    pub fn orbital(&self) -> Option<(&OrbitalElement, &[RelativeDelta])> {
        match &self.payload {
            Payload::Monosat { satellite } => Some((satellite, &[])),
            Payload::Multisat {
                reference,
                relatives,
            } => Some((reference, relatives.as_slice())),
            Payload::ConstellationStatus(_) => None,
        }
    }

    /// Satellite statuses, if this is a constellation status frame.
    #[must_use]
    pub fn statuses(&self) -> &[SatelliteStatus] {
        match &self.payload {
            Payload::ConstellationStatus(report) => &report.statuses,
            _ => &[],
        }
    }
}

/// Sequential field reader over a [BitReader] starting at a fixed bit offset.
struct Fields<'a> {
    bits: BitReader<'a>,
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(bits: BitReader<'a>, pos: usize) -> Self {
        Fields { bits, pos }
    }

    fn take(&mut self, width: usize) -> Result<u64> {
        let val = self.bits.read_uint(self.pos, width)?;
        self.pos += width;
        Ok(val)
    }

    fn take_u8(&mut self, width: usize) -> Result<u8> {
        Ok(self.take(width)? as u8)
    }

    fn take_bool(&mut self) -> Result<bool> {
        let val = self.bits.read_bool(self.pos)?;
        self.pos += 1;
        Ok(val)
    }

    fn skip(&mut self, width: usize) {
        self.pos += width;
    }
}

/// Classify the frame starting at bit `offset`.
///
/// If fewer than 32 bits follow the broadcaster reference the format code is taken from
/// whatever bits remain, which will not match any known format.
///
/// # Errors
/// [Error::UnknownFormat] if the format code is not known, or [Error::OutOfRange] if
/// there are no bits after the broadcaster reference.
pub fn read_format(bits: &BitReader, offset: usize) -> Result<FormatReference> {
    let start = offset + width::BROADCASTER;
    let available = bits.len().saturating_sub(start).min(width::FORMAT);
    let code = bits.read_uint(start, available)? as u32;
    FormatReference::from_code(code)
}

/// Decode the frame starting at bit `offset`, returning the frame and its total size
/// in bits.
///
/// # Errors
/// [Error::UnknownFormat] for an unknown format reference, [Error::Truncated] if the
/// input ends before the end of the frame.
pub fn decode_frame(bits: &BitReader, offset: usize) -> Result<(Frame, usize)> {
    let format = read_format(bits, offset)?;
    let size = format.bit_len();
    let available = bits.len() - offset;
    if size > available {
        return Err(Error::Truncated {
            offset,
            needed: size,
            available,
        });
    }

    let mut fields = Fields::new(*bits, offset);
    let broadcaster = fields.take_u8(width::BROADCASTER)?;
    fields.skip(width::FORMAT);

    let payload = match format {
        FormatReference::AopMonosat => {
            let satellite = decode_orbital(&mut fields)?;
            fields.skip(1);
            Payload::Monosat { satellite }
        }
        FormatReference::AopMultisat => {
            let reference = decode_orbital(&mut fields)?;
            let relatives = (0..Frame::NUM_RELATIVES)
                .map(|_| decode_relative(&mut fields))
                .collect::<Result<Vec<_>>>()?;
            Payload::Multisat {
                reference,
                relatives,
            }
        }
        FormatReference::Cs2Sat | FormatReference::Cs10Sat | FormatReference::Cs17Sat => {
            let report = decode_status_report(&mut fields, format.num_statuses())?;
            if format == FormatReference::Cs2Sat {
                fields.skip(5);
            }
            Payload::ConstellationStatus(report)
        }
    };
    let fcs = fields.take(width::FCS)? as u16;

    trace!(offset, %format, broadcaster, fcs, "decoded frame");

    Ok((
        Frame {
            broadcaster,
            format,
            payload,
            fcs,
        },
        size,
    ))
}

fn decode_orbital(fields: &mut Fields) -> Result<OrbitalElement> {
    Ok(OrbitalElement {
        address: Address(fields.take_u8(width::ADDRESS)?),
        epoch: codec::epoch(fields.take(width::DATE)?),
        longitude: codec::longitude(fields.take(width::LONGITUDE)?),
        longitude_drift: codec::longitude_drift(fields.take(width::LONGITUDE_DRIFT)?),
        nodal_period: codec::nodal_period(fields.take(width::NODAL_PERIOD)?),
        semi_major_axis: codec::semi_major_axis(fields.take(width::SEMI_MAJOR_AXIS)?),
        semi_major_axis_decay: codec::semi_major_axis_decay(
            fields.take(width::SEMI_MAJOR_AXIS_DECAY)?,
        ),
        inclination: codec::inclination(fields.take(width::INCLINATION)?),
    })
}

fn decode_relative(fields: &mut Fields) -> Result<RelativeDelta> {
    let address = Address(fields.take_u8(width::ADDRESS)?);
    let counter = fields.take(width::RELATIVE_DATE)?;
    Ok(RelativeDelta::from_counter(address, counter))
}

fn decode_status_report(fields: &mut Fields, count: usize) -> Result<StatusReport> {
    let counter = fields.take_u8(width::CS_COUNTER)?;
    let index = fields.take_u8(width::CS_INDEX)?;
    let total_messages = fields.take_u8(width::CS_TOTAL)?;
    let statuses = (0..count)
        .map(|_| decode_status(fields))
        .collect::<Result<Vec<_>>>()?;
    Ok(StatusReport {
        counter,
        index,
        total_messages,
        statuses,
    })
}

fn decode_status(fields: &mut Fields) -> Result<SatelliteStatus> {
    Ok(SatelliteStatus {
        address: Address(fields.take_u8(width::ADDRESS)?),
        payload_type: PayloadType::from_code(fields.take_u8(width::PAYLOAD_TYPE)?)?,
        uplink: fields.take_bool()?,
        downlink: fields.take_bool()?,
    })
}
