//! Price Fetcher - feed download, disk cache, and local overrides
//!
//! Resolution order: fresh cache → remote fetch (persisted to cache on
//! success) → stale cache fallback on fetch failure → hard failure when
//! nothing is available. Override-file problems never fail a fetch; they
//! degrade to a warning.

use crate::clock::Clock;
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenmeter_core::{ModelPrice, PriceTable};
use tracing::{debug, info, warn};

/// Upstream price feed (simonw/llm-prices)
pub const PRICE_FEED_URL: &str = "https://www.llm-prices.com/current-v1.json";

const CACHE_FILE: &str = "price_cache.json";
const OVERRIDES_FILE: &str = "overrides.json";
const CACHE_TTL_HOURS: i64 = 24;
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Feed wire format: `{updated_at, prices: [...]}`
#[derive(Debug, Deserialize)]
struct FeedDocument {
    updated_at: Option<String>,
    #[serde(default)]
    prices: Vec<FeedEntry>,
}

/// One feed entry; parsed tolerantly, entries without an id are skipped
#[derive(Debug, Deserialize)]
struct FeedEntry {
    id: Option<String>,
    vendor: Option<String>,
    name: Option<String>,
    input: Option<f64>,
    output: Option<f64>,
    input_cached: Option<f64>,
}

/// One entry in the local overrides file, merged field-level by model id
#[derive(Debug, Deserialize)]
struct OverrideEntry {
    vendor: Option<String>,
    name: Option<String>,
    input_per_million: Option<f64>,
    output_per_million: Option<f64>,
    input_cached_per_million: Option<f64>,
}

/// Fetches and caches LLM pricing data
pub struct PriceFetcher {
    cache_file: PathBuf,
    overrides_file: PathBuf,
    feed_url: String,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl PriceFetcher {
    /// Create a fetcher storing its cache and overrides under `cache_dir`
    ///
    /// # Errors
    ///
    /// Returns an error when the cache directory cannot be created or the
    /// HTTP client cannot be built.
    pub fn new(cache_dir: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        fs::create_dir_all(cache_dir)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            cache_file: cache_dir.join(CACHE_FILE),
            overrides_file: cache_dir.join(OVERRIDES_FILE),
            feed_url: PRICE_FEED_URL.to_string(),
            client,
            clock,
        })
    }

    /// Replace the feed URL (tests and self-hosted mirrors)
    #[must_use]
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    /// Fetch current prices, using the disk cache when fresh
    ///
    /// # Errors
    ///
    /// Fails only when the remote fetch fails and no cached data exists.
    pub async fn fetch_prices(&self, force_refresh: bool) -> Result<PriceTable> {
        if !force_refresh && self.cache_is_fresh() {
            debug!(cache = %self.cache_file.display(), "using cached price data");
            return self.load_cache();
        }

        info!(url = %self.feed_url, "fetching price feed");
        match self.fetch_remote().await {
            Ok(prices) => {
                let prices = self.apply_overrides(prices);
                if let Err(err) = self.save_cache(&prices) {
                    warn!(error = %err, "failed to persist price cache");
                }
                Ok(prices)
            }
            Err(err) => {
                if self.cache_file.exists() {
                    warn!(error = %err, "price fetch failed, falling back to cached data");
                    self.load_cache()
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn fetch_remote(&self) -> Result<PriceTable> {
        let response = self.client.get(&self.feed_url).send().await?;
        let document: FeedDocument = response.error_for_status()?.json().await?;
        Ok(parse_feed(document, self.clock.now()))
    }

    /// Merge the local overrides file on top of fetched prices
    ///
    /// Known ids get field-level updates; unknown ids create synthetic
    /// entries when both input and output prices are given.
    fn apply_overrides(&self, mut prices: PriceTable) -> PriceTable {
        if !self.overrides_file.exists() {
            return prices;
        }

        let overrides: HashMap<String, OverrideEntry> = match fs::read_to_string(&self.overrides_file)
            .map_err(crate::error::Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(crate::error::Error::from))
        {
            Ok(overrides) => overrides,
            Err(err) => {
                warn!(error = %err, "could not apply price overrides");
                return prices;
            }
        };

        let count = overrides.len();
        for (model_id, entry) in overrides {
            if let Some(existing) = prices.get_mut(&model_id) {
                if let Some(input) = entry.input_per_million {
                    existing.input_per_million = input;
                }
                if let Some(output) = entry.output_per_million {
                    existing.output_per_million = output;
                }
                if let Some(cached) = entry.input_cached_per_million {
                    existing.input_cached_per_million = Some(cached);
                }
                existing.updated_at = self.clock.now();
            } else {
                let (Some(input), Some(output)) =
                    (entry.input_per_million, entry.output_per_million)
                else {
                    warn!(
                        model = %model_id,
                        "override for unknown model needs both input and output prices, skipping"
                    );
                    continue;
                };
                prices.insert(
                    model_id.clone(),
                    ModelPrice {
                        id: model_id.clone(),
                        vendor: entry.vendor.unwrap_or_else(|| "custom".to_string()),
                        name: entry.name.unwrap_or_else(|| model_id.clone()),
                        input_per_million: input,
                        output_per_million: output,
                        input_cached_per_million: entry.input_cached_per_million,
                        updated_at: self.clock.now(),
                    },
                );
            }
        }

        info!(count, "applied price overrides");
        prices
    }

    fn cache_is_fresh(&self) -> bool {
        let Ok(modified) = fs::metadata(&self.cache_file).and_then(|meta| meta.modified()) else {
            return false;
        };
        let modified: DateTime<Utc> = modified.into();
        self.clock.now() - modified < Duration::hours(CACHE_TTL_HOURS)
    }

    fn load_cache(&self) -> Result<PriceTable> {
        let raw = fs::read_to_string(&self.cache_file)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save_cache(&self, prices: &PriceTable) -> Result<()> {
        let raw = serde_json::to_string_pretty(prices)?;
        fs::write(&self.cache_file, raw)?;
        debug!(count = prices.len(), "cached model prices");
        Ok(())
    }
}

/// Convert a feed document into a price table
///
/// Entries without an id are skipped; vendor defaults to `"unknown"`, the
/// name defaults to the id, and a zero or absent cached price maps to None.
/// A malformed top-level timestamp falls back to `now`.
fn parse_feed(document: FeedDocument, now: DateTime<Utc>) -> PriceTable {
    let updated_at = document
        .updated_at
        .and_then(|raw| raw.parse::<DateTime<Utc>>().ok())
        .unwrap_or(now);

    let mut prices = PriceTable::new();
    for entry in document.prices {
        let Some(id) = entry.id else {
            continue;
        };
        prices.insert(
            id.clone(),
            ModelPrice {
                id: id.clone(),
                vendor: entry.vendor.unwrap_or_else(|| "unknown".to_string()),
                name: entry.name.unwrap_or_else(|| id.clone()),
                input_per_million: entry.input.unwrap_or(0.0),
                output_per_million: entry.output.unwrap_or(0.0),
                input_cached_per_million: entry.input_cached.filter(|price| *price > 0.0),
                updated_at,
            },
        );
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock pinned by the test, advanceable without re-building the fetcher
    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self { now: Mutex::new(now) })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn sample_table(now: DateTime<Utc>) -> PriceTable {
        let mut table = PriceTable::new();
        table.insert(
            "gpt-5".to_string(),
            ModelPrice {
                id: "gpt-5".to_string(),
                vendor: "openai".to_string(),
                name: "GPT-5".to_string(),
                input_per_million: 1.25,
                output_per_million: 10.0,
                input_cached_per_million: Some(0.125),
                updated_at: now,
            },
        );
        table
    }

    fn write_cache(dir: &Path, table: &PriceTable) {
        let raw = serde_json::to_string_pretty(table).unwrap();
        fs::write(dir.join(CACHE_FILE), raw).unwrap();
    }

    #[test]
    fn parse_feed_is_tolerant() {
        let document: FeedDocument = serde_json::from_str(
            r#"{
                "updated_at": "not a timestamp",
                "prices": [
                    {"id": "gpt-5", "vendor": "openai", "name": "GPT-5", "input": 1.25, "output": 10.0, "input_cached": 0.125},
                    {"id": "bare-model", "input": 0.5, "output": 1.0, "input_cached": 0},
                    {"vendor": "openai", "input": 1.0, "output": 2.0}
                ]
            }"#,
        )
        .unwrap();

        let now = Utc::now();
        let table = parse_feed(document, now);

        assert_eq!(table.len(), 2);

        let gpt5 = &table["gpt-5"];
        assert_eq!(gpt5.vendor, "openai");
        assert_eq!(gpt5.input_cached_per_million, Some(0.125));
        assert_eq!(gpt5.updated_at, now);

        let bare = &table["bare-model"];
        assert_eq!(bare.vendor, "unknown");
        assert_eq!(bare.name, "bare-model");
        assert_eq!(bare.input_cached_per_million, None);
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::starting_at(Utc::now());
        let fetcher = PriceFetcher::new(dir.path(), clock)
            .unwrap()
            // Unroutable: any fetch attempt would fail loudly.
            .with_feed_url("http://127.0.0.1:9/current-v1.json");

        write_cache(dir.path(), &sample_table(Utc::now()));

        let table = fetcher.fetch_prices(false).await.unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains_key("gpt-5"));
    }

    #[tokio::test]
    async fn stale_cache_is_fallback_after_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::starting_at(Utc::now());
        let fetcher = PriceFetcher::new(dir.path(), clock.clone())
            .unwrap()
            .with_feed_url("http://127.0.0.1:9/current-v1.json");

        write_cache(dir.path(), &sample_table(Utc::now()));
        clock.advance(Duration::hours(CACHE_TTL_HOURS + 1));

        // Cache is past its TTL, the fetch fails, the stale copy still wins.
        let table = fetcher.fetch_prices(false).await.unwrap();
        assert!(table.contains_key("gpt-5"));
    }

    #[tokio::test]
    async fn fetch_failure_without_cache_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::starting_at(Utc::now());
        let fetcher = PriceFetcher::new(dir.path(), clock)
            .unwrap()
            .with_feed_url("http://127.0.0.1:9/current-v1.json");

        let err = fetcher.fetch_prices(false).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Network(_)));
    }

    #[tokio::test]
    async fn force_refresh_skips_a_fresh_cache() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::starting_at(Utc::now());
        let fetcher = PriceFetcher::new(dir.path(), clock)
            .unwrap()
            .with_feed_url("http://127.0.0.1:9/current-v1.json");

        write_cache(dir.path(), &sample_table(Utc::now()));

        // Refresh forces the (failing) fetch; the cache then serves as the
        // stale fallback rather than the primary source.
        let table = fetcher.fetch_prices(true).await.unwrap();
        assert!(table.contains_key("gpt-5"));
    }

    #[test]
    fn overrides_merge_field_level_and_create_synthetic_entries() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::starting_at(Utc::now());
        let fetcher = PriceFetcher::new(dir.path(), clock).unwrap();

        fs::write(
            dir.path().join(OVERRIDES_FILE),
            r#"{
                "gpt-5": {"input_per_million": 0.99},
                "private-finetune": {"input_per_million": 2.0, "output_per_million": 4.0, "vendor": "acme"},
                "incomplete": {"input_per_million": 1.0}
            }"#,
        )
        .unwrap();

        let merged = fetcher.apply_overrides(sample_table(Utc::now()));

        // Field-level update: input overridden, output untouched.
        let gpt5 = &merged["gpt-5"];
        assert_eq!(gpt5.input_per_million, 0.99);
        assert_eq!(gpt5.output_per_million, 10.0);

        // Unknown id with both prices becomes a synthetic entry.
        let synthetic = &merged["private-finetune"];
        assert_eq!(synthetic.vendor, "acme");
        assert_eq!(synthetic.output_per_million, 4.0);

        // Unknown id missing a price is skipped.
        assert!(!merged.contains_key("incomplete"));
    }

    #[test]
    fn malformed_overrides_file_degrades_to_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::starting_at(Utc::now());
        let fetcher = PriceFetcher::new(dir.path(), clock).unwrap();

        fs::write(dir.path().join(OVERRIDES_FILE), "not json").unwrap();

        let merged = fetcher.apply_overrides(sample_table(Utc::now()));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged["gpt-5"].input_per_million, 1.25);
    }
}
