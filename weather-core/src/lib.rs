//! Core library for the `weather` lookup client.
//!
//! This crate defines:
//! - Shared domain models (queries, results, outcomes)
//! - The `WeatherFetcher` abstraction and its HTTP implementation
//! - Request sequencing and the hand-off to the display owner
//! - Status-line rendering and configuration handling
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod session;
pub mod status;

pub use config::Config;
pub use error::{ErrorKind, FetchError};
pub use fetcher::{HttpWeatherFetcher, WeatherFetcher, fetcher_from_config};
pub use model::{ForecastDay, Outcome, WeatherQuery, WeatherResult};
pub use session::{Deliveries, Delivery, Session, StatusDisplay};
