//! Core library for the `forecast` CLI.
//!
//! This crate decodes the paged village forecast feed:
//! - KST calendar arithmetic and publication slot selection
//! - The per-hour category layout and row offsets derived from it
//! - Memoized page fetching and value lookup within one request
//! - Typed weather summaries with a short-lived process-wide cache
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod base_time;
pub mod cache;
pub mod category;
pub mod config;
pub mod error;
pub mod feed;
pub mod grid;
pub mod kst;
pub mod location;
pub mod service;
pub mod session;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_support;

pub use base_time::ForecastDay;
pub use category::Category;
pub use config::Config;
pub use error::ForecastError;
pub use feed::{ForecastItem, KmaClient, VillageFeed};
pub use grid::ForecastAnchor;
pub use location::{Location, LocationDirectory};
pub use service::ForecastService;
pub use summary::WeatherSummary;
