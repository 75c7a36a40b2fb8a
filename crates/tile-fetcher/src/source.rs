//! Tile source URLs and the HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mosaic_common::{SourceTime, TileGridCell};

use crate::error::TileFetchError;
use crate::wms::WmsGetMapParams;

/// INSAT-3R L1B imager product on MOSDAC.
pub const DEFAULT_SOURCE_TEMPLATE: &str = "https://mosdac.gov.in/live_data/wms/live3RL1BSTD1km/products/Insat3r/3R_IMG/{folder_date}/3RIMG_{file_date}_{time}_L1B_STD_V01R00.h5";

/// A source URL with `{folder_date}`, `{file_date}` and `{time}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceUrlTemplate(String);

impl Default for SourceUrlTemplate {
    fn default() -> Self {
        Self(DEFAULT_SOURCE_TEMPLATE.to_string())
    }
}

impl SourceUrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute the UTC date/time fragments for one timestamp.
    pub fn render(&self, time: &SourceTime) -> String {
        self.0
            .replace("{folder_date}", &time.folder_date)
            .replace("{file_date}", &time.file_date)
            .replace("{time}", &time.time)
    }
}

/// Something that can return the raw bytes of one tile.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch one tile. A single attempt; retries and timeouts are the caller's.
    async fn fetch(&self, url: &str, cell: &TileGridCell) -> Result<Bytes, TileFetchError>;
}

/// WMS GetMap over HTTP.
pub struct HttpTileSource {
    client: Client,
    params: WmsGetMapParams,
}

impl HttpTileSource {
    pub fn new(params: WmsGetMapParams) -> Result<Self, TileFetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(16)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self { client, params })
    }

    pub fn with_client(client: Client, params: WmsGetMapParams) -> Self {
        Self { client, params }
    }

    pub fn params(&self) -> &WmsGetMapParams {
        &self.params
    }
}

#[async_trait]
impl TileSource for HttpTileSource {
    async fn fetch(&self, url: &str, cell: &TileGridCell) -> Result<Bytes, TileFetchError> {
        debug!(col = cell.col, row = cell.row, bbox = %cell.bbox.to_wms_string(), "Requesting tile");

        let response = self
            .client
            .get(url)
            .query(&self.params.query_pairs(&cell.bbox))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TileFetchError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?)
    }
}
