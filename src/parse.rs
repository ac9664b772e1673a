use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::error::FlightError;
use crate::model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Outbound,
    Inbound,
}

impl Leg {
    pub fn key(self) -> &'static str {
        match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
        }
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Result<&'a Value, FlightError> {
    path.split('.').try_fold(root, |val, key| {
        val.get(key)
            .ok_or_else(|| FlightError::MissingField(path.to_string()))
    })
}

fn invalid(path: &str, detail: &str) -> FlightError {
    FlightError::InvalidField {
        path: path.to_string(),
        detail: detail.to_string(),
    }
}

fn get_str(root: &Value, path: &str) -> Result<String, FlightError> {
    lookup(root, path)?
        .as_str()
        .map(String::from)
        .ok_or_else(|| invalid(path, "expected a string"))
}

fn get_f64(root: &Value, path: &str) -> Result<f64, FlightError> {
    lookup(root, path)?
        .as_f64()
        .ok_or_else(|| invalid(path, "expected a number"))
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").ok())
}

fn get_timestamp(root: &Value, path: &str) -> Result<NaiveDateTime, FlightError> {
    let raw = get_str(root, path)?;
    parse_timestamp(&raw)
        .ok_or_else(|| invalid(path, &format!("not an ISO-8601 timestamp: {raw}")))
}

fn read_previous_price(val: &Value) -> Option<PreviousPrice> {
    match val {
        Value::String(s) => Some(PreviousPrice::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(PreviousPrice::Amount),
        Value::Object(_) => val
            .get("value")
            .and_then(Value::as_f64)
            .map(PreviousPrice::Amount),
        _ => None,
    }
}

fn is_truthy(val: &Value) -> bool {
    match val {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Reads the airport object at `path`, e.g. `outbound.departureAirport`.
pub fn parse_airport(root: &Value, path: &str) -> Result<Airport, FlightError> {
    Ok(Airport {
        country_name: get_str(root, &format!("{path}.countryName"))?,
        iata_code: get_str(root, &format!("{path}.iataCode"))?,
        name: get_str(root, &format!("{path}.name"))?,
        seo_name: get_str(root, &format!("{path}.seoName"))?,
        city_name: get_str(root, &format!("{path}.city.name"))?,
        city_code: get_str(root, &format!("{path}.city.code"))?,
        city_country_code: get_str(root, &format!("{path}.city.countryCode"))?,
    })
}

pub fn parse_fare(fare: &Value, leg: Leg) -> Result<Flight, FlightError> {
    let k = leg.key();

    let previous_price = fare
        .get(k)
        .and_then(|l| l.get("previousPrice"))
        .and_then(read_previous_price);

    Ok(Flight {
        departure_airport: parse_airport(fare, &format!("{k}.departureAirport"))?,
        arrival_airport: parse_airport(fare, &format!("{k}.arrivalAirport"))?,
        departure_date: get_timestamp(fare, &format!("{k}.departureDate"))?,
        arrival_date: get_timestamp(fare, &format!("{k}.arrivalDate"))?,
        price: get_f64(fare, &format!("{k}.price.value"))?,
        currency: get_str(fare, &format!("{k}.price.currencyCode"))?,
        flight_key: get_str(fare, &format!("{k}.flightKey"))?,
        flight_number: get_str(fare, &format!("{k}.flightNumber"))?,
        previous_price,
    })
}

pub fn parse_return_fare(fare: &Value) -> Result<ReturnFlight, FlightError> {
    let outbound = parse_fare(fare, Leg::Outbound)?;
    let inbound = parse_fare(fare, Leg::Inbound)?;

    let previous_price = fare
        .get("previousPrice")
        .filter(|v| is_truthy(v))
        .and_then(read_previous_price)
        .unwrap_or_default();

    Ok(ReturnFlight {
        outbound,
        inbound,
        summary_price: get_f64(fare, "summary.price.value")?,
        summary_currency: get_str(fare, "summary.price.currencyCode")?,
        previous_price,
    })
}

fn parse_json(body: &str) -> Result<Value, FlightError> {
    serde_json::from_str(body).map_err(|e| FlightError::JsonParse(e.to_string()))
}

fn fares_array(payload: &Value) -> Result<&[Value], FlightError> {
    match payload.get("fares") {
        Some(Value::Array(arr)) => Ok(arr),
        Some(_) => Err(invalid("fares", "expected an array")),
        None => Err(FlightError::MissingField("fares".into())),
    }
}

/// Parses a `oneWayFares` response body, keeping the API's ordering.
pub fn parse_oneway_body(body: &str) -> Result<Vec<Flight>, FlightError> {
    let payload = parse_json(body)?;
    fares_array(&payload)?
        .iter()
        .map(|f| parse_fare(f, Leg::Outbound))
        .collect()
}

/// Parses a `roundTripFares` response body, keeping the API's ordering.
pub fn parse_return_body(body: &str) -> Result<Vec<ReturnFlight>, FlightError> {
    let payload = parse_json(body)?;
    fares_array(&payload)?.iter().map(parse_return_fare).collect()
}
