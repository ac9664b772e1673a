use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub country_name: String,
    pub iata_code: String,
    pub name: String,
    pub seo_name: String,
    pub city_name: String,
    pub city_code: String,
    pub city_country_code: String,
}

/// A prior fare reported by Ryanair for price-change display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PreviousPrice {
    Text(String),
    Amount(f64),
}

impl Default for PreviousPrice {
    fn default() -> Self {
        Self::Amount(0.0)
    }
}

impl std::fmt::Display for PreviousPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Amount(v) => write!(f, "{v:.2}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flight {
    pub departure_airport: Airport,
    pub arrival_airport: Airport,
    pub departure_date: NaiveDateTime,
    pub arrival_date: NaiveDateTime,
    pub price: f64,
    pub currency: String,
    pub flight_key: String,
    pub flight_number: String,
    pub previous_price: Option<PreviousPrice>,
}

impl Flight {
    pub fn duration_minutes(&self) -> i64 {
        (self.arrival_date - self.departure_date).num_minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnFlight {
    pub outbound: Flight,
    pub inbound: Flight,
    pub summary_price: f64,
    pub summary_currency: String,
    pub previous_price: PreviousPrice,
}
