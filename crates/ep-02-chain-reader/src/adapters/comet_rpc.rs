//! CometBFT JSON-RPC chain reader.
//!
//! Two calls per height: `/block` for the header and raw transactions,
//! `/block_results` for the events each transaction emitted. Transaction
//! hashes are recomputed locally (SHA-256 of the raw bytes, upper-case hex)
//! and matched to results by position.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use shared_types::{BlockHeader, Height};
use tracing::debug;

use crate::domain::raw::{RawBlock, RawEvent};
use crate::error::{ChainError, ChainResult};
use crate::ports::ChainReader;

/// Substring CometBFT uses when a height is ahead of the chain.
const HEIGHT_AHEAD_MARKER: &str = "must be less than or equal to the current blockchain height";

/// Chain reader backed by a CometBFT RPC endpoint.
#[derive(Clone)]
pub struct CometRpcReader {
    client: reqwest::Client,
    base_url: String,
}

impl CometRpcReader {
    /// Create a reader for `rpc_addr` (e.g. `http://localhost:26657`).
    pub fn new(rpc_addr: &str, timeout: Duration) -> ChainResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: rpc_addr.trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, height: Height) -> ChainResult<T> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .client
            .get(&url)
            .query(&[("height", height.to_string())])
            .send()
            .await?;

        let status = response.status();
        let envelope: RpcEnvelope<T> = response.json().await.map_err(|e| {
            if status.is_success() {
                ChainError::MalformedResponse(format!("{method}: {e}"))
            } else {
                ChainError::Rpc {
                    code: i64::from(status.as_u16()),
                    message: format!("HTTP {status}"),
                }
            }
        })?;

        if let Some(error) = envelope.error {
            let detail = format!("{} {}", error.message, error.data);
            if detail.contains(HEIGHT_AHEAD_MARKER) {
                return Err(ChainError::HeightNotAvailable(height));
            }
            return Err(ChainError::Rpc {
                code: error.code,
                message: detail.trim().to_string(),
            });
        }

        envelope
            .result
            .ok_or_else(|| ChainError::MalformedResponse(format!("{method}: empty result")))
    }
}

#[async_trait]
impl ChainReader for CometRpcReader {
    async fn fetch_block_and_events(&self, height: Height) -> ChainResult<RawBlock> {
        let block: BlockResponse = self.call("block", height).await?;
        let results: BlockResultsResponse = self.call("block_results", height).await?;

        let header = parse_header(&block, height)?;
        let tx_hashes = block
            .block
            .data
            .txs
            .unwrap_or_default()
            .iter()
            .map(|tx| tx_hash(tx))
            .collect::<ChainResult<Vec<_>>>()?;

        let tx_results = results.txs_results.unwrap_or_default();
        if tx_results.len() != tx_hashes.len() {
            return Err(ChainError::MalformedResponse(format!(
                "height {height}: {} txs but {} results",
                tx_hashes.len(),
                tx_results.len()
            )));
        }

        let events: Vec<RawEvent> = tx_hashes
            .into_iter()
            .zip(tx_results)
            .flat_map(|(hash, result)| {
                result.events.unwrap_or_default().into_iter().map(move |event| RawEvent {
                    tx_hash: hash.clone(),
                    kind: event.kind,
                    attributes: event
                        .attributes
                        .into_iter()
                        .map(|attr| (attr.key, attr.value.unwrap_or_default()))
                        .collect(),
                })
            })
            .collect();

        debug!(
            "[ep-02] Fetched height {} ({} events)",
            header.height,
            events.len()
        );
        Ok(RawBlock { header, events })
    }
}

fn parse_header(block: &BlockResponse, requested: Height) -> ChainResult<BlockHeader> {
    let header = &block.block.header;
    let height: Height = header
        .height
        .parse()
        .map_err(|e| ChainError::MalformedResponse(format!("header height: {e}")))?;
    if height != requested {
        return Err(ChainError::MalformedResponse(format!(
            "asked for height {requested}, got {height}"
        )));
    }

    let timestamp = chrono::DateTime::parse_from_rfc3339(&header.time)
        .map_err(|e| ChainError::MalformedResponse(format!("header time: {e}")))?
        .timestamp();

    Ok(BlockHeader {
        height,
        block_hash: block.block_id.hash.clone(),
        parent_hash: header.last_block_id.hash.clone(),
        timestamp,
    })
}

fn tx_hash(encoded: &str) -> ChainResult<String> {
    let raw = BASE64
        .decode(encoded)
        .map_err(|e| ChainError::MalformedResponse(format!("tx encoding: {e}")))?;
    Ok(hex::encode_upper(Sha256::digest(raw)))
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: String,
}

#[derive(Deserialize)]
struct BlockResponse {
    block_id: BlockId,
    block: Block,
}

#[derive(Deserialize)]
struct BlockId {
    hash: String,
}

#[derive(Deserialize)]
struct Block {
    header: Header,
    data: BlockData,
}

#[derive(Deserialize)]
struct Header {
    height: String,
    time: String,
    last_block_id: BlockId,
}

#[derive(Deserialize)]
struct BlockData {
    #[serde(default)]
    txs: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct BlockResultsResponse {
    #[serde(default)]
    txs_results: Option<Vec<TxResult>>,
}

#[derive(Deserialize)]
struct TxResult {
    #[serde(default)]
    events: Option<Vec<AbciEvent>>,
}

#[derive(Deserialize)]
struct AbciEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Vec<AbciAttribute>,
}

#[derive(Deserialize)]
struct AbciAttribute {
    key: String,
    #[serde(default)]
    value: Option<String>,
}
