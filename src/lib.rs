pub mod client;
pub mod collector;
pub mod config;
pub mod emit;
pub mod error;
pub mod integration;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod query;
pub mod window;

pub use client::{ApigeeClient, QueryExecutor};
pub use collector::{run, Collector, QuerySettings};
pub use config::{Config, Organization};
pub use error::{CollectorError, Result};
pub use integration::Integration;
