//! Market data clients and the provider seam the scanner consumes.

mod chart_client;
mod provider;
mod types;

pub use chart_client::ChartClient;
pub use provider::{PriceBarProvider, StaticBars};
