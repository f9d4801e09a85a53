use std::{collections::BTreeMap, fs::File, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec::PayloadType;
use crate::frame::Address;
use crate::Result;

const BUILTIN_TABLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/tables.json"));

/// Mission status codes for one link direction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    /// Code used when the link is not active.
    pub off: String,
    /// Code used when the link is active, by payload type.
    #[serde(default)]
    pub payloads: BTreeMap<PayloadType, String>,
}

impl StatusTable {
    /// Status code for a link carrying `payload_type`.
    ///
    /// Payload types without a code, e.g., spares, report the `off` code.
    #[must_use]
    pub fn code(&self, payload_type: PayloadType, active: bool) -> &str {
        if !active {
            return &self.off;
        }
        match self.payloads.get(&payload_type) {
            Some(code) => code,
            None => {
                warn!(%payload_type, "no status code for payload type; using off code");
                &self.off
            }
        }
    }
}

/// Satellite identification and mission status lookup tables.
///
/// The default implementation uses the built-in tables that were included at
/// compile-time. To use custom tables see [Tables::with_file].
///
/// # Example
/// ```
/// use aopcs::frame::Address;
/// use aopcs::tables::Tables;
///
/// let tables = Tables::default();
/// assert_eq!(tables.name(Address(0x0B)), Some("1A"));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    /// Satellite mnemonics by address.
    pub satellites: BTreeMap<Address, String>,
    pub downlink: StatusTable,
    pub uplink: StatusTable,
}

impl Default for Tables {
    fn default() -> Self {
        serde_json::from_str(BUILTIN_TABLES).expect("built-in tables are not valid")
    }
}

impl Tables {
    /// Load tables from a JSON file.
    ///
    /// If `built_in` is true, the file is overlaid on the built-in tables: satellites and
    /// payload codes from the file replace built-in entries for the same address or
    /// payload type and all other built-in entries are kept.
    ///
    /// # Errors
    /// Any error opening or parsing the file.
    pub fn with_file<P: AsRef<Path>>(path: P, built_in: bool) -> Result<Tables> {
        let tables: Tables = serde_json::from_reader(File::open(path)?)?;
        if built_in {
            return Ok(Tables::default().merge(tables));
        }
        Ok(tables)
    }

    /// Overlay `other` on these tables.
    #[must_use]
    pub fn merge(mut self, other: Tables) -> Tables {
        self.satellites.extend(other.satellites);
        self.downlink.off = other.downlink.off;
        self.downlink.payloads.extend(other.downlink.payloads);
        self.uplink.off = other.uplink.off;
        self.uplink.payloads.extend(other.uplink.payloads);
        self
    }

    /// Mnemonic for the satellite at `address`.
    #[must_use]
    pub fn name(&self, address: Address) -> Option<&str> {
        self.satellites.get(&address).map(String::as_str)
    }
}
