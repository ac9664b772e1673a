use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::FlightError;
use crate::reference::{self, ReferenceData};

const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn day_start() -> NaiveTime {
    NaiveTime::MIN
}

pub fn day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).expect("valid time")
}

pub fn parse_time(s: &str) -> Result<NaiveTime, FlightError> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|_| FlightError::InvalidTime(s.to_string()))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, FlightError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| FlightError::InvalidDate(s.to_string()))
}

fn format_date(dt: &NaiveDateTime) -> String {
    dt.date().format(DATE_FORMAT).to_string()
}

fn format_time(t: &NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Station keys are uppercase IATA codes; the code must match one exactly.
fn validate_airport(code: &str, data: &ReferenceData) -> Result<String, FlightError> {
    if !data.is_station(code) {
        return Err(FlightError::InvalidAirport(code.to_string()));
    }
    Ok(code.to_uppercase())
}

fn validate_date(
    field: &'static str,
    date: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, FlightError> {
    if date < now {
        return Err(FlightError::PastDate {
            field,
            value: date.to_string(),
        });
    }
    Ok(date)
}

fn validate_price(price: Option<i64>) -> Result<Option<i64>, FlightError> {
    match price {
        Some(p) if p <= 0 => Err(FlightError::InvalidPrice(p)),
        other => Ok(other),
    }
}

/// Validated one-way search criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearchParams {
    from_airport: String,
    from_date: NaiveDateTime,
    to_date: NaiveDateTime,
    destination_country: Option<String>,
    max_price: Option<i64>,
    to_airport: Option<String>,
    departure_time_from: NaiveTime,
    departure_time_to: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct FlightSearchParamsBuilder {
    from_airport: String,
    from_date: NaiveDateTime,
    to_date: NaiveDateTime,
    destination_country: Option<String>,
    max_price: Option<i64>,
    to_airport: Option<String>,
    departure_time_from: Option<NaiveTime>,
    departure_time_to: Option<NaiveTime>,
}

impl FlightSearchParams {
    /// Starts a search from `from_airport` departing between `from_date`
    /// and `to_date`.
    pub fn builder(
        from_airport: impl Into<String>,
        from_date: NaiveDateTime,
        to_date: NaiveDateTime,
    ) -> FlightSearchParamsBuilder {
        FlightSearchParamsBuilder {
            from_airport: from_airport.into(),
            from_date,
            to_date,
            destination_country: None,
            max_price: None,
            to_airport: None,
            departure_time_from: None,
            departure_time_to: None,
        }
    }

    pub fn from_airport(&self) -> &str {
        &self.from_airport
    }

    pub fn from_date(&self) -> NaiveDateTime {
        self.from_date
    }

    pub fn to_date(&self) -> NaiveDateTime {
        self.to_date
    }

    pub fn destination_country(&self) -> Option<&str> {
        self.destination_country.as_deref()
    }

    pub fn max_price(&self) -> Option<i64> {
        self.max_price
    }

    pub fn to_airport(&self) -> Option<&str> {
        self.to_airport.as_deref()
    }

    pub fn departure_time_from(&self) -> NaiveTime {
        self.departure_time_from
    }

    pub fn departure_time_to(&self) -> NaiveTime {
        self.departure_time_to
    }

    pub fn to_api_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("departureAirportIataCode".to_string(), self.from_airport.clone()),
            ("outboundDepartureDateFrom".to_string(), format_date(&self.from_date)),
            ("outboundDepartureDateTo".to_string(), format_date(&self.to_date)),
            (
                "outboundDepartureTimeFrom".to_string(),
                format_time(&self.departure_time_from),
            ),
            (
                "outboundDepartureTimeTo".to_string(),
                format_time(&self.departure_time_to),
            ),
        ];

        if let Some(ref country) = self.destination_country {
            params.push(("arrivalCountryCode".to_string(), country.clone()));
        }
        if let Some(price) = self.max_price {
            params.push(("priceValueTo".to_string(), price.to_string()));
        }
        if let Some(ref airport) = self.to_airport {
            params.push(("arrivalAirportIataCode".to_string(), airport.clone()));
        }

        params
    }
}

impl FlightSearchParamsBuilder {
    pub fn destination_country(mut self, country: impl Into<String>) -> Self {
        self.destination_country = Some(country.into());
        self
    }

    pub fn max_price(mut self, price: i64) -> Self {
        self.max_price = Some(price);
        self
    }

    /// Restricts results to one arrival airport. Unlike the country filter
    /// this is checked against the station table, so codes Ryanair does
    /// not serve fail with `InvalidAirport` instead of returning no fares.
    pub fn to_airport(mut self, airport: impl Into<String>) -> Self {
        self.to_airport = Some(airport.into());
        self
    }

    pub fn departure_time(mut self, from: NaiveTime, to: NaiveTime) -> Self {
        self.departure_time_from = Some(from);
        self.departure_time_to = Some(to);
        self
    }

    /// Validates against the process-wide station table and the current
    /// local time.
    pub fn build(self) -> Result<FlightSearchParams, FlightError> {
        let data = reference::get()?;
        self.build_with(data, Local::now().naive_local())
    }

    pub fn build_with(
        self,
        data: &ReferenceData,
        now: NaiveDateTime,
    ) -> Result<FlightSearchParams, FlightError> {
        let from_airport = validate_airport(&self.from_airport, data)?;
        let from_date = validate_date("from_date", self.from_date, now)?;
        let to_date = validate_date("to_date", self.to_date, now)?;
        let max_price = validate_price(self.max_price)?;
        let to_airport = self
            .to_airport
            .filter(|a| !a.trim().is_empty())
            .map(|a| validate_airport(&a, data))
            .transpose()?;
        let destination_country = self
            .destination_country
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(FlightSearchParams {
            from_airport,
            from_date,
            to_date,
            destination_country,
            max_price,
            to_airport,
            departure_time_from: self.departure_time_from.unwrap_or_else(day_start),
            departure_time_to: self.departure_time_to.unwrap_or_else(day_end),
        })
    }
}

/// Validated round-trip criteria: a one-way search plus an inbound window.
///
/// Return dates are only checked against the current time. Nothing checks
/// that they fall after the outbound window.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnFlightSearchParams {
    outbound: FlightSearchParams,
    return_date_from: NaiveDateTime,
    return_date_to: NaiveDateTime,
    inbound_departure_time_from: Option<NaiveTime>,
    inbound_departure_time_to: Option<NaiveTime>,
}

#[derive(Debug, Clone)]
pub struct ReturnFlightSearchParamsBuilder {
    outbound: FlightSearchParamsBuilder,
    return_date_from: NaiveDateTime,
    return_date_to: NaiveDateTime,
    inbound_departure_time_from: Option<NaiveTime>,
    inbound_departure_time_to: Option<NaiveTime>,
}

impl ReturnFlightSearchParams {
    pub fn builder(
        outbound: FlightSearchParamsBuilder,
        return_date_from: NaiveDateTime,
        return_date_to: NaiveDateTime,
    ) -> ReturnFlightSearchParamsBuilder {
        ReturnFlightSearchParamsBuilder {
            outbound,
            return_date_from,
            return_date_to,
            inbound_departure_time_from: Some(day_start()),
            inbound_departure_time_to: Some(day_end()),
        }
    }

    pub fn outbound(&self) -> &FlightSearchParams {
        &self.outbound
    }

    pub fn return_date_from(&self) -> NaiveDateTime {
        self.return_date_from
    }

    pub fn return_date_to(&self) -> NaiveDateTime {
        self.return_date_to
    }

    pub fn inbound_departure_time_from(&self) -> Option<NaiveTime> {
        self.inbound_departure_time_from
    }

    pub fn inbound_departure_time_to(&self) -> Option<NaiveTime> {
        self.inbound_departure_time_to
    }

    pub fn to_api_params(&self) -> Vec<(String, String)> {
        let mut params = self.outbound.to_api_params();

        params.push((
            "inboundDepartureDateFrom".to_string(),
            format_date(&self.return_date_from),
        ));
        params.push((
            "inboundDepartureDateTo".to_string(),
            format_date(&self.return_date_to),
        ));

        if let Some(ref t) = self.inbound_departure_time_from {
            params.push(("inboundDepartureTimeFrom".to_string(), format_time(t)));
        }
        if let Some(ref t) = self.inbound_departure_time_to {
            params.push(("inboundDepartureTimeTo".to_string(), format_time(t)));
        }

        params
    }
}

impl ReturnFlightSearchParamsBuilder {
    /// `None` drops the corresponding key from the query.
    pub fn inbound_departure_time(mut self, from: Option<NaiveTime>, to: Option<NaiveTime>) -> Self {
        self.inbound_departure_time_from = from;
        self.inbound_departure_time_to = to;
        self
    }

    pub fn build(self) -> Result<ReturnFlightSearchParams, FlightError> {
        let data = reference::get()?;
        self.build_with(data, Local::now().naive_local())
    }

    pub fn build_with(
        self,
        data: &ReferenceData,
        now: NaiveDateTime,
    ) -> Result<ReturnFlightSearchParams, FlightError> {
        let outbound = self.outbound.build_with(data, now)?;
        let return_date_from = validate_date("return_date_from", self.return_date_from, now)?;
        let return_date_to = validate_date("return_date_to", self.return_date_to, now)?;

        Ok(ReturnFlightSearchParams {
            outbound,
            return_date_from,
            return_date_to,
            inbound_departure_time_from: self.inbound_departure_time_from,
            inbound_departure_time_to: self.inbound_departure_time_to,
        })
    }
}
