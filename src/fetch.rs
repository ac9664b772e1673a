use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use wreq::Client;
use wreq::cookie::Jar;
use wreq::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use wreq_util::Emulation;

use crate::error::{self, FlightError};

pub const HOME_URL: &str = "https://www.ryanair.com";
pub const SERVICES_URL: &str = "https://services-api.ryanair.com/farfnd/v4";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36 Edg/136.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
];

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
    image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// Exponential backoff applied to every outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget with no wait between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Wait after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let cap = self.max_delay.as_secs_f64();

        if secs.is_finite() && secs >= 0.0 {
            Duration::from_secs_f64(secs.min(cap))
        } else {
            self.max_delay
        }
    }
}

#[derive(Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: u64,
    pub home_url: String,
    pub services_url: String,
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: 30,
            home_url: HOME_URL.to_string(),
            services_url: SERVICES_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

fn browser_headers(user_agent: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("priority"),
        HeaderValue::from_static("u=0, i"),
    );
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers
}

/// Browser-like HTTP session shared by the warm-up and fare requests.
///
/// Cookies set by the warm-up request are replayed on later requests. The
/// connection pool is released when the session is dropped.
pub struct Session {
    client: Client,
    headers: HeaderMap,
    retry: RetryPolicy,
}

impl Session {
    pub fn new(options: &FetchOptions) -> Result<Self, FlightError> {
        let jar = Arc::new(Jar::default());

        let mut builder = Client::builder()
            .emulation(Emulation::Chrome137)
            .cookie_provider(jar)
            .redirect(wreq::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(options.timeout));

        if let Some(ref proxy) = options.proxy {
            builder = builder.proxy(
                wreq::Proxy::all(proxy).map_err(error::from_http_error)?,
            );
        }

        let client = builder.build().map_err(error::from_http_error)?;
        let user_agent = random_user_agent();
        tracing::debug!(user_agent, "opened HTTP session");

        Ok(Self {
            client,
            headers: browser_headers(user_agent),
            retry: options.retry.clone(),
        })
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }

    async fn get_once(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<FetchResponse, FlightError> {
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .query(params)
            .send()
            .await
            .map_err(error::from_http_error)?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(error::from_status(status));
        }

        let body = response.text().await.map_err(error::from_http_error)?;
        Ok(FetchResponse { status, body })
    }

    /// GETs `url`, retrying any failure under the session's policy. The
    /// last error is returned once the attempt budget is spent.
    pub async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<FetchResponse, FlightError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            tracing::debug!(url, attempt, "GET");
            match self.get_once(url, params).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        url,
                        attempt,
                        max_attempts,
                        error = %e,
                        "request failed, retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(url, attempts = attempt, error = %e, "giving up on request");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_five_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(8));
    }

    #[test]
    fn delay_is_capped() {
        let policy = RetryPolicy {
            max_delay: Duration::from_secs(5),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(10), Duration::from_secs(5));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn immediate_policy_never_waits() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(1), Duration::ZERO);
        assert_eq!(policy.delay_for(3), Duration::ZERO);
    }

    #[test]
    fn headers_carry_user_agent_from_pool() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        let headers = browser_headers(ua);
        assert_eq!(headers.get(USER_AGENT).unwrap(), ua);
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "no-cache");
    }

    #[test]
    fn success_range() {
        let ok = FetchResponse { status: 204, body: String::new() };
        let redirect = FetchResponse { status: 304, body: String::new() };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
