//! Bounded concurrent tile fetching.
//!
//! Every cell is fetched independently: a failed tile is retried a fixed
//! number of times with a fixed delay, then dropped. A batch never fails as
//! a whole; callers get whatever subset succeeded plus the failures.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use image::RgbaImage;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use mosaic_common::TileGridCell;

use crate::error::{TileFailure, TileFetchError};
use crate::source::TileSource;

/// Tuning for a fetch batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Concurrent tile requests in flight
    pub max_workers: usize,
    /// Additional attempts after the first one fails
    pub retries: u32,
    /// Per-attempt deadline
    pub timeout: Duration,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            retries: 2,
            timeout: Duration::from_secs(20),
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl FetchConfig {
    /// Longest a single tile can hold up a batch.
    pub fn worst_case_per_tile(&self) -> Duration {
        (self.timeout + self.retry_delay) * (self.retries + 1)
    }
}

/// A decoded tile at its grid position.
#[derive(Debug, Clone)]
pub struct TileImage {
    pub col: u32,
    pub row: u32,
    pub image: RgbaImage,
}

/// Outcome of a batch: successes in completion order, plus dropped tiles.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub tiles: Vec<TileImage>,
    pub failures: Vec<TileFailure>,
}

impl FetchReport {
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn requested(&self) -> usize {
        self.tiles.len() + self.failures.len()
    }
}

/// Fetches tiles from a [`TileSource`] under a bounded worker pool.
#[derive(Clone)]
pub struct TileFetcher {
    source: Arc<dyn TileSource>,
    config: FetchConfig,
}

impl TileFetcher {
    pub fn new(source: Arc<dyn TileSource>, config: FetchConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch and decode every cell, at most `max_workers` at a time.
    #[instrument(skip(self, cells), fields(tiles = cells.len(), url = %url))]
    pub async fn fetch_all(&self, cells: &[TileGridCell], url: &str) -> FetchReport {
        let fetches: Vec<_> = cells.iter().map(|cell| self.fetch_tile(url, cell)).collect();
        let results: Vec<Result<TileImage, TileFailure>> = stream::iter(fetches)
            .buffer_unordered(self.config.max_workers.max(1))
            .collect()
            .await;

        let mut report = FetchReport::default();
        for result in results {
            match result {
                Ok(tile) => report.tiles.push(tile),
                Err(failure) => report.failures.push(failure),
            }
        }

        info!(
            fetched = report.tiles.len(),
            failed = report.failures.len(),
            "Tile batch complete"
        );
        report
    }

    /// Fetch and decode one tile with retries.
    pub async fn fetch_tile(&self, url: &str, cell: &TileGridCell) -> Result<TileImage, TileFailure> {
        let image = self
            .with_retry(cell, move || async move {
                let bytes = self.attempt(url, cell).await?;
                decode_tile(&bytes)
            })
            .await?;

        Ok(TileImage {
            col: cell.col,
            row: cell.row,
            image,
        })
    }

    /// Fetch one tile with retries, keeping the encoded bytes.
    ///
    /// The body must still decode as an image to count as a success.
    pub async fn fetch_tile_bytes(&self, url: &str, cell: &TileGridCell) -> Result<Bytes, TileFailure> {
        self.with_retry(cell, move || async move {
            let bytes = self.attempt(url, cell).await?;
            decode_tile(&bytes)?;
            Ok(bytes)
        })
        .await
    }

    /// Single attempt, no retry: is this timestamp available at the source?
    pub async fn probe(&self, url: &str, cell: &TileGridCell) -> Result<(), TileFetchError> {
        let bytes = self.attempt(url, cell).await?;
        decode_tile(&bytes)?;
        Ok(())
    }

    async fn attempt(&self, url: &str, cell: &TileGridCell) -> Result<Bytes, TileFetchError> {
        match tokio::time::timeout(self.config.timeout, self.source.fetch(url, cell)).await {
            Ok(result) => result,
            Err(_) => Err(TileFetchError::Timeout(self.config.timeout)),
        }
    }

    async fn with_retry<T, F, Fut>(&self, cell: &TileGridCell, mut op: F) -> Result<T, TileFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TileFetchError>>,
    {
        let max_attempts = self.config.retries + 1;
        let mut attempts = 0;

        loop {
            attempts += 1;
            match op().await {
                Ok(value) => {
                    debug!(col = cell.col, row = cell.row, attempts, "Tile fetched");
                    counter!("mosaic_tiles_fetched_total").increment(1);
                    return Ok(value);
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        col = cell.col,
                        row = cell.row,
                        attempt = attempts,
                        max_attempts,
                        error = %e,
                        "Tile attempt failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    warn!(
                        col = cell.col,
                        row = cell.row,
                        attempts,
                        error = %e,
                        "Dropping tile after exhausting retries"
                    );
                    counter!("mosaic_tiles_failed_total").increment(1);
                    return Err(TileFailure {
                        col: cell.col,
                        row: cell.row,
                        attempts,
                        error: e,
                    });
                }
            }
        }
    }
}

fn decode_tile(bytes: &[u8]) -> Result<RgbaImage, TileFetchError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}
