use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, FetchError};

/// A single lookup, built fresh for every user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
    pub include_forecast: bool,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into(), include_forecast: false }
    }

    pub fn with_forecast(mut self, include_forecast: bool) -> Self {
        self.include_forecast = include_forecast;
        self
    }
}

/// Decoded body of `GET /api/weather/{city}`.
///
/// Field names on the wire (`current_temp`, `current_desc`) are fixed by the
/// server and must not be renamed. Temperatures are Celsius as served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    #[serde(rename = "current_temp")]
    pub temperature: f64,
    #[serde(rename = "current_desc")]
    pub description: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<ForecastDay>>,
}

/// One entry of the optional multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub description: String,
    pub timestamp: i64,
    pub date: String,
}

impl ForecastDay {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Result of one fetch: either a decoded result or a classified failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(WeatherResult),
    Failure { kind: ErrorKind, detail: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<Result<WeatherResult, FetchError>> for Outcome {
    fn from(res: Result<WeatherResult, FetchError>) -> Self {
        match res {
            Ok(result) => Outcome::Success(result),
            Err(err) => Outcome::Failure { kind: err.kind(), detail: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_field_names() {
        let body = r#"{"current_temp": 21.5, "current_desc": "clear sky", "city": "Paris"}"#;
        let parsed: WeatherResult = serde_json::from_str(body).expect("valid body");

        assert_eq!(parsed.temperature, 21.5);
        assert_eq!(parsed.description, "clear sky");
        assert_eq!(parsed.city, "Paris");
        assert!(parsed.forecast.is_none());
    }

    #[test]
    fn missing_description_is_rejected() {
        let body = r#"{"current_temp": 21.5, "city": "Paris"}"#;
        assert!(serde_json::from_str::<WeatherResult>(body).is_err());
    }

    #[test]
    fn mistyped_temperature_is_rejected() {
        let body = r#"{"current_temp": "warm", "current_desc": "clear sky", "city": "Paris"}"#;
        assert!(serde_json::from_str::<WeatherResult>(body).is_err());
    }

    #[test]
    fn null_forecast_decodes_as_none() {
        let body = r#"{"current_temp": 3, "current_desc": "mist", "city": "Oslo", "forecast": null}"#;
        let parsed: WeatherResult = serde_json::from_str(body).expect("valid body");
        assert_eq!(parsed.temperature, 3.0);
        assert!(parsed.forecast.is_none());
    }

    #[test]
    fn forecast_entries_decode_and_expose_timestamp() {
        let body = r#"{
            "current_temp": 12.0,
            "current_desc": "light rain",
            "city": "London",
            "forecast": [
                {"temp": 11.2, "description": "overcast clouds", "timestamp": 1700000000, "date": "2023-11-14"}
            ]
        }"#;
        let parsed: WeatherResult = serde_json::from_str(body).expect("valid body");
        let days = parsed.forecast.expect("forecast present");

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temperature, 11.2);
        let at = days[0].observed_at().expect("valid timestamp");
        assert_eq!(at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn outcome_from_error_carries_kind_and_detail() {
        let outcome = Outcome::from(Err::<WeatherResult, _>(FetchError::Decode));
        assert_eq!(
            outcome,
            Outcome::Failure {
                kind: ErrorKind::Decode,
                detail: "Failed to decode response".to_string()
            }
        );
        assert!(!outcome.is_success());
    }
}
