//! Tokenmeter Prices - price feed acquisition
//!
//! Fetches the llm-prices.com JSON feed, caches it to disk with a 24-hour
//! TTL, falls back to a stale cache when the network is unavailable, and
//! merges a local override file on top of the fetched data. The calculation
//! engine only ever sees the resulting [`tokenmeter_core::PriceTable`]; none
//! of the cache or network mechanics leak into it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod provider;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use provider::{PriceFetcher, PRICE_FEED_URL};
