use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

use flyan::error::FlightError;
use flyan::params::{self, FlightSearchParams, FlightSearchParamsBuilder, ReturnFlightSearchParams};
use flyan::reference::ReferenceData;

fn data() -> ReferenceData {
    ReferenceData::embedded().unwrap()
}

fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_time(NaiveTime::parse_from_str(time, "%H:%M").unwrap())
}

fn now() -> NaiveDateTime {
    at("2026-05-01", "12:00")
}

fn make_builder() -> FlightSearchParamsBuilder {
    FlightSearchParams::builder("DUB", at("2026-06-01", "00:00"), at("2026-06-07", "00:00"))
}

fn value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[test]
fn valid_params_pass() {
    let p = make_builder().build_with(&data(), now()).unwrap();
    assert_eq!(p.from_airport(), "DUB");
    assert_eq!(p.departure_time_from(), params::day_start());
    assert_eq!(p.departure_time_to(), params::day_end());
}

#[test]
fn every_station_is_accepted() {
    let data = data();
    for (code, _) in data.stations() {
        let p = FlightSearchParams::builder(code, at("2026-06-01", "00:00"), at("2026-06-02", "00:00"))
            .build_with(&data, now())
            .unwrap();
        assert_eq!(p.from_airport(), code);
    }
}

#[test]
fn rejects_lowercase_airport() {
    for code in ["dub", "Dub", " DUB "] {
        let err = FlightSearchParams::builder(code, at("2026-06-01", "00:00"), at("2026-06-02", "00:00"))
            .build_with(&data(), now())
            .unwrap_err();
        assert!(matches!(err, FlightError::InvalidAirport(ref c) if c == code), "{code}: {err:?}");
    }
}

#[test]
fn rejects_unknown_airport() {
    for code in ["XXX", "", "DUBL", "J1K"] {
        let err = FlightSearchParams::builder(code, at("2026-06-01", "00:00"), at("2026-06-02", "00:00"))
            .build_with(&data(), now())
            .unwrap_err();
        assert!(matches!(err, FlightError::InvalidAirport(_)), "{code}: {err:?}");
    }
}

#[test]
fn rejects_unknown_destination_airport() {
    let err = make_builder()
        .to_airport("ZZZ")
        .build_with(&data(), now())
        .unwrap_err();
    assert!(matches!(err, FlightError::InvalidAirport(_)));
}

#[test]
fn destination_airport_is_kept() {
    let p = make_builder().to_airport("STN").build_with(&data(), now()).unwrap();
    assert_eq!(p.to_airport(), Some("STN"));
}

#[test]
fn rejects_lowercase_destination_airport() {
    let err = make_builder()
        .to_airport("stn")
        .build_with(&data(), now())
        .unwrap_err();
    assert!(matches!(err, FlightError::InvalidAirport(_)));
}

#[test]
fn rejects_past_from_date() {
    let err = FlightSearchParams::builder("DUB", at("2026-04-30", "23:59"), at("2026-06-01", "00:00"))
        .build_with(&data(), now())
        .unwrap_err();
    assert!(matches!(err, FlightError::PastDate { field: "from_date", .. }));
    assert!(err.is_validation());
}

#[test]
fn rejects_past_to_date() {
    let err = FlightSearchParams::builder("DUB", at("2026-06-01", "00:00"), at("2026-05-01", "11:59"))
        .build_with(&data(), now())
        .unwrap_err();
    assert!(matches!(err, FlightError::PastDate { field: "to_date", .. }));
}

#[test]
fn accepts_date_equal_to_now() {
    let p = FlightSearchParams::builder("DUB", now(), now())
        .build_with(&data(), now())
        .unwrap();
    assert_eq!(p.from_date(), now());
}

#[test]
fn build_uses_current_time() {
    let soon = Local::now().naive_local() + Duration::days(30);
    assert!(FlightSearchParams::builder("DUB", soon, soon).build().is_ok());

    let past = Local::now().naive_local() - Duration::days(1);
    assert!(FlightSearchParams::builder("DUB", past, soon).build().is_err());
}

#[test]
fn rejects_non_positive_price() {
    for price in [0, -1, -500] {
        let err = make_builder()
            .max_price(price)
            .build_with(&data(), now())
            .unwrap_err();
        assert!(matches!(err, FlightError::InvalidPrice(p) if p == price));
    }
}

#[test]
fn positive_price_becomes_price_value_to() {
    for price in [1, 49, 1000] {
        let p = make_builder().max_price(price).build_with(&data(), now()).unwrap();
        let api = p.to_api_params();
        assert_eq!(value(&api, "priceValueTo"), Some(price.to_string().as_str()));
    }
}

#[test]
fn api_params_required_keys() {
    let p = make_builder().build_with(&data(), now()).unwrap();
    let api = p.to_api_params();
    assert_eq!(
        api,
        vec![
            ("departureAirportIataCode".to_string(), "DUB".to_string()),
            ("outboundDepartureDateFrom".to_string(), "2026-06-01".to_string()),
            ("outboundDepartureDateTo".to_string(), "2026-06-07".to_string()),
            ("outboundDepartureTimeFrom".to_string(), "00:00".to_string()),
            ("outboundDepartureTimeTo".to_string(), "23:59".to_string()),
        ]
    );
}

#[test]
fn api_params_optional_keys() {
    let p = make_builder()
        .destination_country("es")
        .to_airport("BCN")
        .max_price(60)
        .departure_time(params::parse_time("06:30").unwrap(), params::parse_time("12:00").unwrap())
        .build_with(&data(), now())
        .unwrap();
    let api = p.to_api_params();
    assert_eq!(value(&api, "arrivalCountryCode"), Some("es"));
    assert_eq!(value(&api, "arrivalAirportIataCode"), Some("BCN"));
    assert_eq!(value(&api, "priceValueTo"), Some("60"));
    assert_eq!(value(&api, "outboundDepartureTimeFrom"), Some("06:30"));
    assert_eq!(value(&api, "outboundDepartureTimeTo"), Some("12:00"));
}

#[test]
fn unset_optionals_are_omitted() {
    let p = make_builder().destination_country("  ").build_with(&data(), now()).unwrap();
    let api = p.to_api_params();
    assert!(value(&api, "arrivalCountryCode").is_none());
    assert!(value(&api, "priceValueTo").is_none());
    assert!(value(&api, "arrivalAirportIataCode").is_none());
}

#[test]
fn destination_country_is_sent_as_given() {
    for country in ["es", "IT", " pl "] {
        let p = make_builder()
            .destination_country(country)
            .build_with(&data(), now())
            .unwrap();
        let api = p.to_api_params();
        assert_eq!(value(&api, "arrivalCountryCode"), Some(country.trim()));
    }
}

#[test]
fn api_params_are_deterministic() {
    let p = make_builder()
        .destination_country("it")
        .max_price(25)
        .build_with(&data(), now())
        .unwrap();
    assert_eq!(p.to_api_params(), p.to_api_params());
}

#[test]
fn parse_time_rejects_garbage() {
    assert!(params::parse_time("25:00").is_err());
    assert!(params::parse_time("noon").is_err());
    assert_eq!(
        params::parse_time("07:05").unwrap(),
        NaiveTime::from_hms_opt(7, 5, 0).unwrap()
    );
}

#[test]
fn parse_date_rejects_garbage() {
    assert!(matches!(params::parse_date("01-06-2026"), Err(FlightError::InvalidDate(_))));
    assert!(params::parse_date("2026-02-30").is_err());
    assert!(params::parse_date("2028-02-29").is_ok());
}

#[test]
fn return_params_extend_oneway() {
    let p = ReturnFlightSearchParams::builder(
        make_builder(),
        at("2026-06-10", "00:00"),
        at("2026-06-14", "00:00"),
    )
    .build_with(&data(), now())
    .unwrap();

    let api = p.to_api_params();
    let base = p.outbound().to_api_params();
    assert_eq!(&api[..base.len()], base.as_slice());
    assert_eq!(value(&api, "inboundDepartureDateFrom"), Some("2026-06-10"));
    assert_eq!(value(&api, "inboundDepartureDateTo"), Some("2026-06-14"));
    assert_eq!(value(&api, "inboundDepartureTimeFrom"), Some("00:00"));
    assert_eq!(value(&api, "inboundDepartureTimeTo"), Some("23:59"));
}

#[test]
fn return_time_keys_can_be_dropped() {
    let p = ReturnFlightSearchParams::builder(
        make_builder(),
        at("2026-06-10", "00:00"),
        at("2026-06-14", "00:00"),
    )
    .inbound_departure_time(None, params::parse_time("18:00").ok())
    .build_with(&data(), now())
    .unwrap();

    let api = p.to_api_params();
    assert!(value(&api, "inboundDepartureTimeFrom").is_none());
    assert_eq!(value(&api, "inboundDepartureTimeTo"), Some("18:00"));
}

#[test]
fn return_before_outbound_is_not_rejected() {
    let p = ReturnFlightSearchParams::builder(
        make_builder(),
        at("2026-05-20", "00:00"),
        at("2026-05-21", "00:00"),
    )
    .build_with(&data(), now());
    assert!(p.is_ok());
}

#[test]
fn past_return_date_is_rejected() {
    let err = ReturnFlightSearchParams::builder(
        make_builder(),
        at("2026-04-01", "00:00"),
        at("2026-06-14", "00:00"),
    )
    .build_with(&data(), now())
    .unwrap_err();
    assert!(matches!(err, FlightError::PastDate { field: "return_date_from", .. }));
}

#[test]
fn return_validation_checks_outbound_first() {
    let err = ReturnFlightSearchParams::builder(
        FlightSearchParams::builder("NOPE", at("2026-06-01", "00:00"), at("2026-06-02", "00:00")),
        at("2026-06-10", "00:00"),
        at("2026-06-14", "00:00"),
    )
    .build_with(&data(), now())
    .unwrap_err();
    assert!(matches!(err, FlightError::InvalidAirport(_)));
}
