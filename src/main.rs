use std::process;

use chrono::{NaiveDateTime, NaiveTime};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flyan::client::Ryanair;
use flyan::error::FlightError;
use flyan::fetch::FetchOptions;
use flyan::model::{Flight, ReturnFlight};
use flyan::params::{self, FlightSearchParams, FlightSearchParamsBuilder, ReturnFlightSearchParams};
use flyan::reference::{self, ReferenceData};
use flyan::table;

#[derive(Parser)]
#[command(
    name = "flyan",
    about = "Search Ryanair fares from the terminal",
    version,
    after_help = "\
Examples:
  flyan oneway -f DUB -d 2026-11-01
  flyan oneway -f DUB -d 2026-11-01 --to-date 2026-11-07 --country es --max-price 60
  flyan return -f STN -t BCN -d 2026-11-01 --return-from 2026-11-08
  flyan stations --country ie"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search one-way fares",
        after_help = "\
Examples:
  Anywhere:     flyan oneway -f DUB -d 2026-11-01
  Date window:  flyan oneway -f DUB -d 2026-11-01 --to-date 2026-11-07
  Country:      flyan oneway -f DUB -d 2026-11-01 --country es
  Budget:       flyan oneway -f DUB -d 2026-11-01 --max-price 40 --top 5
  Mornings:     flyan oneway -f DUB -d 2026-11-01 --time-from 06:00 --time-to 12:00
  JSON output:  flyan oneway -f DUB -d 2026-11-01 --json --pretty"
    )]
    Oneway(OnewayArgs),
    #[command(
        about = "Search round-trip fares",
        after_help = "\
Examples:
  Weekend:      flyan return -f STN -t BCN -d 2026-11-06 --return-from 2026-11-08
  Any Spain:    flyan return -f DUB -d 2026-11-01 --return-from 2026-11-08 --country es"
    )]
    Return(ReturnArgs),
    #[command(about = "List airports known to the bundled station table")]
    Stations(StationsArgs),
    #[command(about = "List supported currencies")]
    Currencies,
}

#[derive(clap::Args)]
struct OutboundArgs {
    #[arg(
        short, long,
        value_name = "IATA",
        help = "Departure airport code",
        long_help = "Departure airport IATA code (3 letters, e.g. DUB, STN, BGY). \
            Must be a Ryanair station."
    )]
    from: String,

    #[arg(
        short = 'd', long,
        value_name = "YYYY-MM-DD",
        help = "Earliest departure date"
    )]
    from_date: String,

    #[arg(
        long,
        value_name = "YYYY-MM-DD",
        help = "Latest departure date (defaults to --from-date)"
    )]
    to_date: Option<String>,

    #[arg(short, long, value_name = "IATA", help = "Arrival airport code")]
    to: Option<String>,

    #[arg(long, value_name = "CC", help = "Arrival country code (e.g. es, it)")]
    country: Option<String>,

    #[arg(
        long,
        value_name = "N",
        allow_negative_numbers = true,
        help = "Maximum price in the selected currency"
    )]
    max_price: Option<i64>,

    #[arg(long, value_name = "HH:MM", help = "Earliest departure time [default: 00:00]")]
    time_from: Option<String>,

    #[arg(long, value_name = "HH:MM", help = "Latest departure time [default: 23:59]")]
    time_to: Option<String>,
}

#[derive(clap::Args)]
struct OutputArgs {
    #[arg(long, default_value = "EUR", value_name = "CODE", help = "Currency code (e.g. EUR, GBP, PLN)")]
    currency: String,

    #[arg(long, value_name = "N", help = "Show only the N cheapest results")]
    top: Option<usize>,

    #[arg(long, help = "One-line-per-flight output (recommended for scripts)")]
    compact: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(long, default_value = "30", value_name = "SECS", help = "Request timeout")]
    timeout: u64,
}

#[derive(clap::Args)]
struct OnewayArgs {
    #[command(flatten)]
    outbound: OutboundArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
struct ReturnArgs {
    #[command(flatten)]
    outbound: OutboundArgs,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Earliest return date")]
    return_from: String,

    #[arg(
        long,
        value_name = "YYYY-MM-DD",
        help = "Latest return date (defaults to --return-from)"
    )]
    return_to: Option<String>,

    #[arg(long, value_name = "HH:MM", help = "Earliest return departure time [default: 00:00]")]
    inbound_time_from: Option<String>,

    #[arg(long, value_name = "HH:MM", help = "Latest return departure time [default: 23:59]")]
    inbound_time_to: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
struct StationsArgs {
    #[arg(long, value_name = "CC", help = "Only stations in this country (e.g. ie)")]
    country: Option<String>,

    #[arg(long, help = "Output as JSON")]
    json: bool,
}

fn is_json(args: &OutputArgs) -> bool {
    args.json || args.pretty
}

fn error_code(err: &FlightError) -> i32 {
    match err {
        FlightError::InvalidAirport(_)
        | FlightError::PastDate { .. }
        | FlightError::InvalidPrice(_)
        | FlightError::InvalidTime(_)
        | FlightError::InvalidDate(_) => 2,
        FlightError::Timeout
        | FlightError::ConnectionFailed(_)
        | FlightError::DnsResolution(_)
        | FlightError::TlsError(_)
        | FlightError::ProxyError(_) => 3,
        FlightError::RateLimited | FlightError::Blocked(_) => 4,
        FlightError::HttpStatus(_) => 5,
        FlightError::JsonParse(_)
        | FlightError::MissingField(_)
        | FlightError::InvalidField { .. }
        | FlightError::Serialization(_) => 6,
        FlightError::MissingReferenceData { .. } | FlightError::ReferenceData(_) => 7,
    }
}

fn error_kind(err: &FlightError) -> &'static str {
    match err {
        FlightError::InvalidAirport(_) => "invalid_airport",
        FlightError::PastDate { .. } => "past_date",
        FlightError::InvalidPrice(_) => "invalid_price",
        FlightError::InvalidTime(_) => "invalid_time",
        FlightError::InvalidDate(_) => "invalid_date",
        FlightError::Timeout => "timeout",
        FlightError::ConnectionFailed(_) => "connection_failed",
        FlightError::DnsResolution(_) => "dns_error",
        FlightError::TlsError(_) => "tls_error",
        FlightError::ProxyError(_) => "proxy_error",
        FlightError::RateLimited => "rate_limited",
        FlightError::Blocked(_) => "blocked",
        FlightError::HttpStatus(_) => "http_error",
        FlightError::JsonParse(_)
        | FlightError::MissingField(_)
        | FlightError::InvalidField { .. } => "parse_error",
        FlightError::Serialization(_) => "serialize_error",
        FlightError::MissingReferenceData { .. } | FlightError::ReferenceData(_) => {
            "config_error"
        }
    }
}

fn die(err: &FlightError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).expect("valid time")
}

/// CLI dates count as valid for the whole day they name.
fn date_arg(s: &str) -> Result<NaiveDateTime, FlightError> {
    Ok(params::parse_date(s)?.and_time(end_of_day()))
}

fn time_arg(s: Option<&str>) -> Result<Option<NaiveTime>, FlightError> {
    s.map(params::parse_time).transpose()
}

fn outbound_builder(args: &OutboundArgs) -> Result<FlightSearchParamsBuilder, FlightError> {
    let from_date = date_arg(&args.from_date)?;
    let to_date = match args.to_date.as_deref() {
        Some(d) => date_arg(d)?,
        None => from_date,
    };

    let mut builder = FlightSearchParams::builder(args.from.to_uppercase(), from_date, to_date);
    if let Some(ref to) = args.to {
        builder = builder.to_airport(to.to_uppercase());
    }
    if let Some(ref country) = args.country {
        builder = builder.destination_country(country);
    }
    if let Some(price) = args.max_price {
        builder = builder.max_price(price);
    }

    let time_from = time_arg(args.time_from.as_deref())?;
    let time_to = time_arg(args.time_to.as_deref())?;
    if time_from.is_some() || time_to.is_some() {
        builder = builder.departure_time(
            time_from.unwrap_or_else(params::day_start),
            time_to.unwrap_or_else(params::day_end),
        );
    }

    Ok(builder)
}

fn build_return(args: &ReturnArgs) -> Result<ReturnFlightSearchParams, FlightError> {
    let outbound = outbound_builder(&args.outbound)?;
    let return_from = date_arg(&args.return_from)?;
    let return_to = match args.return_to.as_deref() {
        Some(d) => date_arg(d)?,
        None => return_from,
    };

    let inbound_from = time_arg(args.inbound_time_from.as_deref())?;
    let inbound_to = time_arg(args.inbound_time_to.as_deref())?;

    ReturnFlightSearchParams::builder(outbound, return_from, return_to)
        .inbound_departure_time(
            Some(inbound_from.unwrap_or_else(params::day_start)),
            Some(inbound_to.unwrap_or_else(params::day_end)),
        )
        .build()
}

fn fetch_options(args: &OutputArgs) -> FetchOptions {
    FetchOptions {
        proxy: args.proxy.clone(),
        timeout: args.timeout,
        ..FetchOptions::default()
    }
}

async fn connect(args: &OutputArgs) -> Ryanair {
    match Ryanair::with_options(&args.currency, fetch_options(args)).await {
        Ok(client) => client,
        Err(e) => die(&e, is_json(args)),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.unwrap_or_else(|e| die(&FlightError::Serialization(e.to_string()), true))
}

fn compact_line(flight: &Flight, data: Option<&ReferenceData>) -> String {
    format!(
        "{} | {}>{} | {} | {}>{}",
        table::format_price(flight.price, &flight.currency, data),
        flight.departure_airport.iata_code,
        flight.arrival_airport.iata_code,
        flight.flight_number,
        flight.departure_date.format("%b%d %H:%M"),
        flight.arrival_date.format("%H:%M"),
    )
}

fn print_oneways(mut flights: Vec<Flight>, args: &OutputArgs) {
    if let Some(n) = args.top {
        flights.sort_by(|a, b| a.price.total_cmp(&b.price));
        flights.truncate(n);
    }

    let data = reference::get().ok();
    if is_json(args) {
        println!("{}", to_json(&flights, args.pretty));
    } else if flights.is_empty() {
        println!("No flights found.");
    } else if args.compact {
        for flight in &flights {
            println!("{}", compact_line(flight, data));
        }
    } else {
        println!("{}", table::render(&flights, data));
    }
}

fn print_returns(mut trips: Vec<ReturnFlight>, args: &OutputArgs) {
    if let Some(n) = args.top {
        trips.sort_by(|a, b| a.summary_price.total_cmp(&b.summary_price));
        trips.truncate(n);
    }

    let data = reference::get().ok();
    if is_json(args) {
        println!("{}", to_json(&trips, args.pretty));
    } else if trips.is_empty() {
        println!("No flights found.");
    } else if args.compact {
        for trip in &trips {
            println!(
                "{} | {} || {}",
                table::format_price(trip.summary_price, &trip.summary_currency, data),
                compact_line(&trip.outbound, data),
                compact_line(&trip.inbound, data),
            );
        }
    } else {
        println!("{}", table::render_returns(&trips, data));
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flyan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Oneway(args) => {
            let json_mode = is_json(&args.output);
            let params = match outbound_builder(&args.outbound).and_then(|b| b.build()) {
                Ok(p) => p,
                Err(e) => die(&e, json_mode),
            };

            let client = connect(&args.output).await;
            let flights = client.get_oneways(&params).await;
            print_oneways(flights, &args.output);
        }
        Commands::Return(args) => {
            let json_mode = is_json(&args.output);
            let params = match build_return(&args) {
                Ok(p) => p,
                Err(e) => die(&e, json_mode),
            };

            let client = connect(&args.output).await;
            let trips = client.get_returns(&params).await;
            print_returns(trips, &args.output);
        }
        Commands::Stations(args) => {
            let data = match reference::get() {
                Ok(d) => d,
                Err(e) => die(&e, args.json),
            };
            if args.json {
                let wanted = args.country.as_deref().map(str::to_lowercase);
                let stations: std::collections::BTreeMap<_, _> = data
                    .stations()
                    .filter(|(_, s)| wanted.as_deref().is_none_or(|c| c == s.country_code))
                    .collect();
                println!("{}", to_json(&stations, true));
            } else {
                println!("{}", table::render_stations(data, args.country.as_deref()));
            }
        }
        Commands::Currencies => match reference::get() {
            Ok(data) => println!("{}", table::render_currencies(data)),
            Err(e) => die(&e, false),
        },
    }
}
