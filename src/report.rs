//! Projection of decoded frames into the flat AOP report consumed by downstream pass
//! prediction.
//!
//! The report is a single line of space separated fields, 17 per satellite, with numeric
//! fields right-justified to fixed widths. A non-empty report starts with a space.
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use crate::codec;
use crate::frame::{Address, Frame, OrbitalElement, RelativeDelta};
use crate::metadata::Metadata;
use crate::tables::Tables;

/// Satellite names to keep in a report. An empty whitelist keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist(BTreeSet<String>);

impl Whitelist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Whitelist(
            names
                .into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    /// Parse a comma separated list of names, e.g., `1A,1B,5E`.
    #[must_use]
    pub fn parse(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.is_empty() || self.0.contains(name.trim())
    }
}

impl FromStr for Whitelist {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// A single satellite in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: String,
    pub address: Address,
    /// Downlink mission status code; empty if no status was received.
    pub downlink: String,
    /// Uplink mission status code; empty if no status was received.
    pub uplink: String,
    pub epoch: DateTime<Utc>,
    /// Semi-major axis (m)
    pub semi_major_axis: u32,
    /// Inclination (deg)
    pub inclination: f64,
    /// Ascending node longitude (deg)
    pub longitude: f64,
    /// Ascending node longitude drift (deg/orbit)
    pub longitude_drift: f64,
    /// Nodal period (min)
    pub nodal_period: f64,
    /// Semi-major axis decay (m/day)
    pub semi_major_axis_decay: f64,
}

impl ReportRow {
    /// Number of rendered fields per row.
    pub const NUM_FIELDS: usize = 17;
    /// DCS id; always 0.
    pub const DCS_ID: &'static str = "0";

    fn new(name: &str, epoch: DateTime<Utc>, longitude: f64, element: &OrbitalElement) -> Self {
        ReportRow {
            name: name.to_string(),
            address: element.address,
            downlink: String::new(),
            uplink: String::new(),
            epoch,
            semi_major_axis: element.semi_major_axis,
            inclination: element.inclination,
            longitude,
            longitude_drift: element.longitude_drift,
            nodal_period: element.nodal_period,
            semi_major_axis_decay: element.semi_major_axis_decay,
        }
    }

    /// Row for the satellite described by `element`.
    #[must_use]
    pub fn primary(name: &str, element: &OrbitalElement) -> Self {
        Self::new(name, element.epoch, element.longitude, element)
    }

    /// Row for a relative satellite, with epoch and ascending node longitude
    /// extrapolated from its `reference`.
    #[must_use]
    pub fn relative(name: &str, reference: &OrbitalElement, relative: &RelativeDelta) -> Self {
        let longitude = codec::extrapolate_longitude(
            reference.longitude,
            reference.longitude_drift,
            reference.nodal_period,
            relative.delta_seconds,
        );
        let mut row = Self::new(name, reference.epoch + relative.delta, longitude, reference);
        row.address = relative.address;
        row
    }

    /// Year, month, day, hour, minute and second fields, zero padded.
    #[must_use]
    pub fn date_fields(&self) -> [String; 6] {
        ["%Y", "%m", "%d", "%H", "%M", "%S"].map(|fmt| self.epoch.format(fmt).to_string())
    }

    /// All fields, as rendered in the report.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(Self::NUM_FIELDS);
        fields.push(self.name.clone());
        fields.push(self.address.hex_id().to_string());
        fields.push(Self::DCS_ID.to_string());
        fields.push(self.downlink.clone());
        fields.push(self.uplink.clone());
        fields.extend(self.date_fields());
        fields.push(format!("{:>9.3}", f64::from(self.semi_major_axis) * 0.001));
        fields.push(format!("{:>8.4}", self.inclination));
        fields.push(format!("{:>8.3}", self.longitude));
        fields.push(format!("{:>8.3}", self.longitude_drift));
        fields.push(format!("{:>9.4}", self.nodal_period));
        fields.push(format!("{:>6.2}", self.semi_major_axis_decay));
        fields
    }
}

/// Satellite rows in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the report text.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Prediction date range of the rendered rows.
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        Metadata::derive(&self.rows)
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            for field in row.fields() {
                write!(f, " {field}")?;
            }
        }
        Ok(())
    }
}

/// Rows keyed by address, keeping the position of the first insert for an address.
#[derive(Default)]
struct Rows {
    rows: Vec<ReportRow>,
    index: HashMap<Address, usize>,
}

impl Rows {
    fn upsert(&mut self, row: ReportRow) {
        match self.index.get(&row.address) {
            Some(&idx) => self.rows[idx] = row,
            None => {
                self.index.insert(row.address, self.rows.len());
                self.rows.push(row);
            }
        }
    }

    fn get_mut(&mut self, address: Address) -> Option<&mut ReportRow> {
        let idx = *self.index.get(&address)?;
        self.rows.get_mut(idx)
    }
}

/// Merges decoded frames into a [Report].
///
/// Orbital elements and relative satellites produce rows, later rows for an address
/// replacing earlier ones. Satellite statuses then set the link status codes of rows
/// already present. Satellites without a name in the identification table are dropped.
///
/// # Example
/// ```
/// use aopcs::report::{Projector, Whitelist};
///
/// let projector = Projector::builder()
///     .whitelist(Whitelist::parse("1A,1B"))
///     .build();
/// let report = projector.project(&[]);
/// assert_eq!(report.render(), "");
/// ```
#[derive(TypedBuilder, Debug, Clone, Default)]
pub struct Projector {
    /// Identification and status tables. Defaults to the built-in tables.
    #[builder(default)]
    tables: Tables,
    /// Satellite names to keep. Defaults to keeping everything.
    #[builder(default)]
    whitelist: Whitelist,
}

impl Projector {
    #[must_use]
    pub fn project(&self, frames: &[Frame]) -> Report {
        let mut rows = Rows::default();

        for frame in frames {
            let Some((reference, relatives)) = frame.orbital() else {
                continue;
            };
            match self.tables.name(reference.address) {
                Some(name) => rows.upsert(ReportRow::primary(name, reference)),
                None => trace!(address = %reference.address, "dropping unidentified satellite"),
            }
            for relative in relatives {
                match self.tables.name(relative.address) {
                    Some(name) => rows.upsert(ReportRow::relative(name, reference, relative)),
                    None => trace!(
                        address = %relative.address,
                        "dropping unidentified relative satellite"
                    ),
                }
            }
        }

        for status in frames.iter().flat_map(Frame::statuses) {
            let Some(row) = rows.get_mut(status.address) else {
                trace!(address = %status.address, "dropping status for satellite without orbit");
                continue;
            };
            row.downlink = self
                .tables
                .downlink
                .code(status.payload_type, status.downlink)
                .to_string();
            row.uplink = self
                .tables
                .uplink
                .code(status.payload_type, status.uplink)
                .to_string();
        }

        let total = rows.rows.len();
        let mut rows = rows.rows;
        rows.retain(|row| self.whitelist.allows(&row.name));
        debug!(total, kept = rows.len(), "projected report rows");

        Report { rows }
    }
}

/// Project `frames` using the built-in tables, returning the report text and its
/// metadata.
#[must_use]
pub fn project(frames: &[Frame], whitelist: &Whitelist) -> (String, Metadata) {
    let report = Projector::builder()
        .whitelist(whitelist.clone())
        .build()
        .project(frames);
    (report.render(), report.metadata())
}
