use std::fmt;

#[derive(Debug)]
pub enum FlightError {
    MissingReferenceData { file: String, search_path: String },
    ReferenceData(String),
    Timeout,
    ConnectionFailed(String),
    DnsResolution(String),
    ProxyError(String),
    RateLimited,
    Blocked(u16),
    HttpStatus(u16),
    TlsError(String),
    JsonParse(String),
    MissingField(String),
    InvalidField { path: String, detail: String },
    InvalidAirport(String),
    PastDate { field: &'static str, value: String },
    InvalidPrice(i64),
    InvalidTime(String),
    InvalidDate(String),
    Serialization(String),
}

impl FlightError {
    /// True for errors raised while building search parameters.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAirport(_)
                | Self::PastDate { .. }
                | Self::InvalidPrice(_)
                | Self::InvalidTime(_)
                | Self::InvalidDate(_)
        )
    }

    /// True for network failures and non-success HTTP statuses, the only
    /// errors worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::ConnectionFailed(_)
                | Self::DnsResolution(_)
                | Self::ProxyError(_)
                | Self::RateLimited
                | Self::Blocked(_)
                | Self::HttpStatus(_)
                | Self::TlsError(_)
        )
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::JsonParse(_)
                | Self::MissingField(_)
                | Self::InvalidField { .. }
                | Self::Serialization(_)
        )
    }
}

impl fmt::Display for FlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingReferenceData { file, search_path } => write!(
                f,
                "could not find {file} in {search_path}. \
                 Make sure the reference data files are shipped with the package"
            ),
            Self::ReferenceData(detail) => {
                write!(f, "bundled reference data is malformed: {detail}")
            }
            Self::Timeout => write!(
                f,
                "request timed out, Ryanair may be slow or unreachable. \
                 Try increasing --timeout or check your connection"
            ),
            Self::ConnectionFailed(detail) => write!(
                f,
                "connection failed, check your internet connection ({detail})"
            ),
            Self::DnsResolution(host) => write!(
                f,
                "DNS resolution failed for {host}, check your internet connection"
            ),
            Self::ProxyError(detail) => write!(
                f,
                "proxy error, check your --proxy URL is correct ({detail})"
            ),
            Self::RateLimited => write!(
                f,
                "rate limited by Ryanair (HTTP 429), wait a few minutes before retrying \
                 or use --proxy to route through a different IP"
            ),
            Self::Blocked(status) => write!(
                f,
                "request blocked by Ryanair (HTTP {status}), this usually means \
                 bot detection. Try again later or use --proxy"
            ),
            Self::HttpStatus(status) => {
                write!(f, "Ryanair API: unexpected HTTP status {status}")
            }
            Self::TlsError(detail) => write!(
                f,
                "TLS/SSL error, connection to Ryanair failed ({detail})"
            ),
            Self::JsonParse(detail) => {
                write!(f, "Ryanair API: response is not valid JSON ({detail})")
            }
            Self::MissingField(path) => write!(
                f,
                "Ryanair API: fares missing expected field \"{path}\""
            ),
            Self::InvalidField { path, detail } => write!(
                f,
                "Ryanair API: field \"{path}\" has an unexpected value ({detail})"
            ),
            Self::InvalidAirport(code) => write!(
                f,
                "unknown airport code \"{code}\", must be a 3-letter IATA code served by Ryanair"
            ),
            Self::PastDate { field, value } => write!(
                f,
                "{field} cannot be in the past (got {value})"
            ),
            Self::InvalidPrice(value) => {
                write!(f, "maximum price must be positive (got {value})")
            }
            Self::InvalidTime(time) => write!(
                f,
                "invalid time \"{time}\", must be HH:MM format (e.g. 06:30)"
            ),
            Self::InvalidDate(date) => write!(
                f,
                "invalid date \"{date}\", must be YYYY-MM-DD format (e.g. 2026-03-01)"
            ),
            Self::Serialization(detail) => write!(f, "could not serialize output ({detail})"),
        }
    }
}

impl std::error::Error for FlightError {}

pub fn from_http_error(err: wreq::Error) -> FlightError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FlightError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FlightError::DnsResolution(msg);
        }
        return FlightError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FlightError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FlightError::TlsError(msg);
    }

    if lower.contains("builder error") && lower.contains("uri") {
        return FlightError::ProxyError(msg);
    }

    FlightError::ConnectionFailed(msg)
}

/// Maps a non-success status to the matching transport error.
pub fn from_status(status: u16) -> FlightError {
    match status {
        429 => FlightError::RateLimited,
        403 | 503 => FlightError::Blocked(status),
        _ => FlightError::HttpStatus(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(from_status(429), FlightError::RateLimited));
        assert!(matches!(from_status(403), FlightError::Blocked(403)));
        assert!(matches!(from_status(500), FlightError::HttpStatus(500)));
    }

    #[test]
    fn classification() {
        assert!(FlightError::InvalidPrice(0).is_validation());
        assert!(!FlightError::InvalidPrice(0).is_transport());
        assert!(FlightError::HttpStatus(502).is_transport());
        assert!(FlightError::MissingField("fares".into()).is_structural());
        assert!(FlightError::Serialization("bad float".into()).is_structural());
        assert!(!FlightError::Serialization("bad float".into()).is_validation());
    }

    #[test]
    fn missing_field_message_names_path() {
        let err = FlightError::MissingField("outbound.price.value".into());
        assert!(err.to_string().contains("outbound.price.value"));
    }
}
