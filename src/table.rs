use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL};

use crate::model::{Flight, ReturnFlight};
use crate::reference::ReferenceData;

pub fn format_price(price: f64, currency: &str, data: Option<&ReferenceData>) -> String {
    match data.and_then(|d| d.currency(currency)) {
        Some(c) => {
            let places = c.decimal_places as usize;
            format!("{}{price:.places$}", c.symbol)
        }
        None => format!("{price:.2} {currency}"),
    }
}

fn format_duration(minutes: i64) -> String {
    if minutes < 0 {
        return "—".to_string();
    }
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

fn route(flight: &Flight) -> String {
    format!(
        "{} → {}",
        flight.departure_airport.iata_code, flight.arrival_airport.iata_code
    )
}

pub fn render(flights: &[Flight], data: Option<&ReferenceData>) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Flight", "Route", "Depart", "Arrive", "Duration", "Price", "Was",
        ]);

    for flight in flights {
        let was = flight
            .previous_price
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            flight.flight_number.clone(),
            route(flight),
            flight.departure_date.format("%Y-%m-%d %H:%M").to_string(),
            flight.arrival_date.format("%Y-%m-%d %H:%M").to_string(),
            format_duration(flight.duration_minutes()),
            format_price(flight.price, &flight.currency, data),
            was,
        ]);
    }

    table.to_string()
}

pub fn render_returns(trips: &[ReturnFlight], data: Option<&ReferenceData>) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Outbound", "Depart", "Inbound", "Return", "Total"]);

    for trip in trips {
        table.add_row(vec![
            format!("{} {}", trip.outbound.flight_number, route(&trip.outbound)),
            trip.outbound.departure_date.format("%Y-%m-%d %H:%M").to_string(),
            format!("{} {}", trip.inbound.flight_number, route(&trip.inbound)),
            trip.inbound.departure_date.format("%Y-%m-%d %H:%M").to_string(),
            format_price(trip.summary_price, &trip.summary_currency, data),
        ]);
    }

    table.to_string()
}

pub fn render_stations(data: &ReferenceData, country: Option<&str>) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Code", "Name", "City", "Country", "Time zone"]);

    let wanted = country.map(|c| c.to_lowercase());
    for (code, station) in data.stations() {
        if wanted.as_deref().is_some_and(|c| c != station.country_code) {
            continue;
        }
        table.add_row(vec![
            code,
            station.name.as_str(),
            station.city_code.as_str(),
            station.country_name.as_str(),
            station.time_zone.as_str(),
        ]);
    }

    table.to_string()
}

pub fn render_currencies(data: &ReferenceData) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Code", "Name", "Symbol"]);

    for (code, currency) in data.currencies() {
        table.add_row(vec![code, currency.name.as_str(), currency.symbol.as_str()]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_uses_currency_symbol() {
        let data = ReferenceData::embedded().unwrap();
        assert_eq!(format_price(49.99, "EUR", Some(&data)), "€49.99");
        assert_eq!(format_price(12000.0, "HUF", Some(&data)), "Ft12000");
    }

    #[test]
    fn price_without_table() {
        assert_eq!(format_price(10.5, "EUR", None), "10.50 EUR");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(125), "2h 05m");
        assert_eq!(format_duration(-5), "—");
    }

    #[test]
    fn stations_filtered_by_country() {
        let data = ReferenceData::embedded().unwrap();
        let out = render_stations(&data, Some("IE"));
        assert!(out.contains("DUB"));
        assert!(out.contains("ORK"));
        assert!(!out.contains("BCN"));
    }
}
