//! Currency and station lookup tables.
//!
//! Both tables ship inside the library. Setting `FLYAN_DATA_DIR` makes the
//! process read them from that directory instead.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::FlightError;

pub const CURRENCIES_FILE: &str = "currencies.json";
pub const STATIONS_FILE: &str = "stations.json";
pub const DATA_DIR_ENV: &str = "FLYAN_DATA_DIR";

const EMBEDDED_CURRENCIES: &str = include_str!("../data/currencies.json");
const EMBEDDED_STATIONS: &str = include_str!("../data/stations.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub name: String,
    pub symbol: String,
    pub decimal_places: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub name: String,
    pub city_code: String,
    pub country_code: String,
    pub country_name: String,
    pub time_zone: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct ReferenceData {
    currencies: BTreeMap<String, Currency>,
    stations: BTreeMap<String, Station>,
}

static REFERENCE: OnceLock<ReferenceData> = OnceLock::new();

/// Returns the process-wide tables, loading them on first use.
pub fn get() -> Result<&'static ReferenceData, FlightError> {
    if let Some(data) = REFERENCE.get() {
        return Ok(data);
    }

    let data = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => ReferenceData::from_dir(Path::new(&dir))?,
        None => ReferenceData::embedded()?,
    };
    tracing::debug!(
        currencies = data.currencies.len(),
        stations = data.stations.len(),
        "loaded reference data"
    );

    Ok(REFERENCE.get_or_init(|| data))
}

fn parse_table<T: for<'de> Deserialize<'de>>(
    file: &str,
    raw: &str,
) -> Result<BTreeMap<String, T>, FlightError> {
    serde_json::from_str(raw).map_err(|e| FlightError::ReferenceData(format!("{file}: {e}")))
}

fn read_table<T: for<'de> Deserialize<'de>>(
    dir: &Path,
    file: &str,
) -> Result<BTreeMap<String, T>, FlightError> {
    let path = dir.join(file);
    let raw = std::fs::read_to_string(&path).map_err(|_| FlightError::MissingReferenceData {
        file: file.to_string(),
        search_path: dir.display().to_string(),
    })?;
    parse_table(file, &raw)
}

impl ReferenceData {
    pub fn embedded() -> Result<Self, FlightError> {
        Ok(Self {
            currencies: parse_table(CURRENCIES_FILE, EMBEDDED_CURRENCIES)?,
            stations: parse_table(STATIONS_FILE, EMBEDDED_STATIONS)?,
        })
    }

    pub fn from_dir(dir: &Path) -> Result<Self, FlightError> {
        Ok(Self {
            currencies: read_table(dir, CURRENCIES_FILE)?,
            stations: read_table(dir, STATIONS_FILE)?,
        })
    }

    pub fn station(&self, code: &str) -> Option<&Station> {
        self.stations.get(code)
    }

    pub fn currency(&self, code: &str) -> Option<&Currency> {
        self.currencies.get(code)
    }

    pub fn is_station(&self, code: &str) -> bool {
        self.stations.contains_key(code)
    }

    pub fn is_currency(&self, code: &str) -> bool {
        self.currencies.contains_key(code)
    }

    pub fn stations(&self) -> impl Iterator<Item = (&str, &Station)> {
        self.stations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn currencies(&self) -> impl Iterator<Item = (&str, &Currency)> {
        self.currencies.iter().map(|(k, v)| (k.as_str(), v))
    }
}
