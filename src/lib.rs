pub mod client;
pub mod error;
pub mod fetch;
pub mod model;
pub mod params;
pub mod parse;
pub mod reference;
pub mod table;

pub use client::Ryanair;
pub use error::FlightError;
pub use fetch::{FetchOptions, RetryPolicy};
pub use model::{Airport, Flight, PreviousPrice, ReturnFlight};
pub use params::{FlightSearchParams, ReturnFlightSearchParams};
