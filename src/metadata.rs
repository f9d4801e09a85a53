use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::report::ReportRow;

/// Report provenance metadata document.
///
/// Serializes with camelCase keys and UTC second-resolution timestamps, e.g.,
/// `2025-10-15T06:30:12Z`. Unset values serialize as `null`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub file_name: Option<String>,
    #[serde(default, with = "utc_seconds")]
    pub upload_date: Option<DateTime<Utc>>,
    /// Earliest satellite bulletin date in the report.
    #[serde(rename = "satellitePrevisionMinDate", default, with = "utc_seconds")]
    pub min_prediction_date: Option<DateTime<Utc>>,
    /// Latest satellite bulletin date in the report.
    #[serde(rename = "satellitePrevisionMaxDate", default, with = "utc_seconds")]
    pub max_prediction_date: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Derive the prediction date range from the rendered date fields of `rows`.
    ///
    /// Dates are parsed back from their rendered form, so they have the report's
    /// one-second resolution.
    #[must_use]
    pub fn derive(rows: &[ReportRow]) -> Metadata {
        let dates: Vec<DateTime<Utc>> = rows.iter().filter_map(parse_row_date).collect();
        let metadata = Metadata {
            min_prediction_date: dates.iter().min().copied(),
            max_prediction_date: dates.iter().max().copied(),
            ..Default::default()
        };
        if !dates.is_empty() {
            info!(
                min = ?metadata.min_prediction_date,
                max = ?metadata.max_prediction_date,
                "derived report metadata"
            );
        }
        metadata
    }

    #[must_use]
    pub fn with_file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn with_upload_date(mut self, date: DateTime<Utc>) -> Self {
        self.upload_date = Some(date);
        self
    }
}

fn parse_row_date(row: &ReportRow) -> Option<DateTime<Utc>> {
    let [year, month, day, hour, minute, second] = row.date_fields();
    let text = format!("{year}-{month}-{day} {hour}:{minute}:{second}");
    match NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S") {
        Ok(dt) => Some(dt.and_utc()),
        Err(err) => {
            warn!(name = %row.name, "invalid rendered date {text:?}: {err}");
            None
        }
    }
}

/// Serde support for optional UTC timestamps formatted as `%Y-%m-%dT%H:%M:%SZ`.
pub mod utc_seconds {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S: Serializer>(
        dt: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => serializer.collect_str(&dt.format(FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|dt| Some(dt.and_utc()))
            .map_err(|err| de::Error::custom(format!("invalid timestamp {s:?}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::frame::Address;

    fn row(epoch: DateTime<Utc>) -> ReportRow {
        ReportRow {
            name: "1A".to_string(),
            address: Address(0x0B),
            downlink: String::new(),
            uplink: String::new(),
            epoch,
            semi_major_axis: 6_893_137,
            inclination: 97.512,
            longitude: 0.412,
            longitude_drift: -25.0,
            nodal_period: 95.489,
            semi_major_axis_decay: 1.7,
        }
    }

    #[test]
    fn no_rows_no_dates() {
        let metadata = Metadata::derive(&[]);
        assert_eq!(metadata.min_prediction_date, None);
        assert_eq!(metadata.max_prediction_date, None);
    }

    #[test]
    fn single_row_min_equals_max() {
        let epoch = Utc.with_ymd_and_hms(2025, 10, 15, 6, 30, 12).unwrap();
        let metadata = Metadata::derive(&[row(epoch + TimeDelta::milliseconds(375))]);
        assert_eq!(metadata.min_prediction_date, Some(epoch));
        assert_eq!(metadata.max_prediction_date, Some(epoch));
    }

    #[test]
    fn min_max_over_rows() {
        let first = Utc.with_ymd_and_hms(2025, 10, 14, 23, 59, 59).unwrap();
        let last = Utc.with_ymd_and_hms(2025, 10, 16, 2, 16, 24).unwrap();
        let rows = [
            row(first + TimeDelta::hours(3)),
            row(last),
            row(first),
            row(last - TimeDelta::minutes(1)),
        ];
        let metadata = Metadata::derive(&rows);
        assert_eq!(metadata.min_prediction_date, Some(first));
        assert_eq!(metadata.max_prediction_date, Some(last));
        assert!(metadata.min_prediction_date <= metadata.max_prediction_date);
    }

    #[test]
    fn serializes_camel_case() {
        let metadata = Metadata::derive(&[row(
            Utc.with_ymd_and_hms(2025, 10, 15, 6, 30, 12).unwrap(),
        )])
        .with_file_name("aop");

        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(
            json,
            r#"{"fileName":"aop","uploadDate":null,"satellitePrevisionMinDate":"2025-10-15T06:30:12Z","satellitePrevisionMaxDate":"2025-10-15T06:30:12Z"}"#
        );

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn rejects_bad_timestamp() {
        let zult = serde_json::from_str::<Metadata>(
            r#"{"fileName":null,"uploadDate":"2025-10-15 06:30:12","satellitePrevisionMinDate":null,"satellitePrevisionMaxDate":null}"#,
        );
        assert!(zult.is_err());
    }
}
