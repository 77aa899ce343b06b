use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt::Debug;
use tracing::{debug, info, instrument, warn};

use crate::{
    Config,
    error::FetchError,
    model::{Outcome, WeatherQuery, WeatherResult},
};

#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    /// Run one lookup. Always resolves to exactly one outcome.
    async fn fetch(&self, query: &WeatherQuery) -> Outcome;
}

/// Fetches from `<base-url>/api/weather/<city>` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpWeatherFetcher {
    base_url: Url,
    http: Client,
}

impl HttpWeatherFetcher {
    pub fn new(base_url: Url) -> Self {
        Self { base_url, http: Client::new() }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn try_fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, FetchError> {
        let url = build_url(&self.base_url, query)?;

        let res = self.http.get(url).send().await.map_err(transport_error)?;

        let status = res.status();
        let body = res.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!(%status, "Weather server answered with a non-success status");
        }

        decode_body(&body)
    }
}

#[async_trait]
impl WeatherFetcher for HttpWeatherFetcher {
    #[instrument(skip(self), fields(city = %query.city))]
    async fn fetch(&self, query: &WeatherQuery) -> Outcome {
        let outcome = Outcome::from(self.try_fetch(query).await);

        match outcome.kind() {
            None => info!("Weather lookup succeeded"),
            Some(kind) => info!(%kind, "Weather lookup failed"),
        }

        outcome
    }
}

/// Build the request URL for `query`, percent-encoding the city segment.
///
/// Cities containing control characters, or equal to `.`/`..`, cannot form a
/// path segment and are rejected without touching the network.
pub fn build_url(base: &Url, query: &WeatherQuery) -> Result<Url, FetchError> {
    let city = query.city.as_str();
    if city.chars().any(char::is_control) || city == "." || city == ".." {
        return Err(FetchError::InvalidRequest);
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidRequest)?
        .pop_if_empty()
        .extend(["api", "weather", city]);

    if query.include_forecast {
        url.query_pairs_mut().append_pair("include_forecast", "true");
    }

    Ok(url)
}

/// Decode a raw response body. An empty body means nothing was observed.
pub fn decode_body(body: &[u8]) -> Result<WeatherResult, FetchError> {
    if body.is_empty() {
        return Err(FetchError::Unknown);
    }

    debug!(body = %String::from_utf8_lossy(body), "Received JSON");

    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Response body did not match the weather shape");
        FetchError::Decode
    })
}

/// Construct the HTTP fetcher from config.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherFetcher>> {
    let base_url = config.base_url()?;
    Ok(Box::new(HttpWeatherFetcher::new(base_url)))
}

/// Keep the whole cause chain, e.g. `error sending request ...: client error (Connect): ...`.
fn transport_error(err: reqwest::Error) -> FetchError {
    FetchError::Transport(format!("{:#}", anyhow::Error::new(err)))
}
