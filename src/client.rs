//! The Ryanair client: warm-up, fare searches, graceful degradation.

use crate::error::FlightError;
use crate::fetch::{FetchOptions, Session};
use crate::model::{Flight, ReturnFlight};
use crate::params::{FlightSearchParams, ReturnFlightSearchParams};
use crate::parse;
use crate::reference::{self, ReferenceData};

pub const DEFAULT_CURRENCY: &str = "EUR";

/// Falls back to [`DEFAULT_CURRENCY`] for codes missing from the table.
pub fn resolve_currency(requested: &str, data: &ReferenceData) -> String {
    let code = requested.trim().to_uppercase();
    if data.is_currency(&code) {
        code
    } else {
        tracing::warn!(
            requested,
            fallback = DEFAULT_CURRENCY,
            "unknown currency, using fallback"
        );
        DEFAULT_CURRENCY.to_string()
    }
}

/// A warmed-up session against Ryanair's fare finder.
///
/// Searches on one client run one after another; use separate clients for
/// parallel searches.
pub struct Ryanair {
    session: Session,
    services_url: String,
    currency: String,
}

impl Ryanair {
    pub async fn new(currency: &str) -> Result<Self, FlightError> {
        Self::with_options(currency, FetchOptions::default()).await
    }

    /// Opens the session and performs the warm-up request against the home
    /// page so the fare API sees the cookies it expects.
    pub async fn with_options(currency: &str, options: FetchOptions) -> Result<Self, FlightError> {
        let data = reference::get()?;
        let session = Session::new(&options)?;

        session.get(&options.home_url, &[]).await?;
        tracing::debug!(url = %options.home_url, "session warmed up");

        Ok(Self {
            session,
            services_url: options.services_url.trim_end_matches('/').to_string(),
            currency: resolve_currency(currency, data),
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.session.user_agent()
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.services_url)
    }

    async fn fetch_fares(
        &self,
        url: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<Option<String>, FlightError> {
        params.push(("currency".to_string(), self.currency.clone()));

        let response = self.session.get(url, &params).await?;
        if !response.is_success() {
            tracing::warn!(url, status = response.status, "non-success response, no fares");
            return Ok(None);
        }
        Ok(Some(response.body))
    }

    /// One-way fares in API order. Errors are returned rather than logged.
    pub async fn try_get_oneways(
        &self,
        params: &FlightSearchParams,
    ) -> Result<Vec<Flight>, FlightError> {
        let url = self.endpoint("oneWayFares");
        match self.fetch_fares(&url, params.to_api_params()).await? {
            Some(body) => parse::parse_oneway_body(&body),
            None => Ok(Vec::new()),
        }
    }

    /// One-way fares in API order; any runtime failure is logged and
    /// yields an empty list.
    pub async fn get_oneways(&self, params: &FlightSearchParams) -> Vec<Flight> {
        tracing::info!(from = params.from_airport(), "getting one-way fares");
        let result = self.try_get_oneways(params).await;
        degrade(&self.endpoint("oneWayFares"), result)
    }

    pub async fn try_get_returns(
        &self,
        params: &ReturnFlightSearchParams,
    ) -> Result<Vec<ReturnFlight>, FlightError> {
        let url = self.endpoint("roundTripFares");
        match self.fetch_fares(&url, params.to_api_params()).await? {
            Some(body) => parse::parse_return_body(&body),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_returns(&self, params: &ReturnFlightSearchParams) -> Vec<ReturnFlight> {
        tracing::info!(
            from = params.outbound().from_airport(),
            "getting round-trip fares"
        );
        let result = self.try_get_returns(params).await;
        degrade(&self.endpoint("roundTripFares"), result)
    }
}

fn degrade<T>(url: &str, result: Result<Vec<T>, FlightError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) if e.is_transport() => {
            tracing::error!(url, error = %e, "an HTTP error occurred trying to get fares");
            Vec::new()
        }
        Err(e) => {
            tracing::error!(url, error = %e, "could not read fares from response");
            Vec::new()
        }
    }
}
