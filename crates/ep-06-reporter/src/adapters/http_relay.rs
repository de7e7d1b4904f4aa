//! Transaction relay client.
//!
//! Signing and broadcasting live in a relay service that owns the operator
//! key. The reporter posts
//!
//! ```json
//! {"task_id": 7, "status": 0, "result_object_id": "bucket-a/task-7/result.txt"}
//! ```
//!
//! to `<relay_url>/results` and expects `{"tx_hash": "..."}` back.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::TaskId;
use tracing::debug;

use crate::error::{WriterError, WriterResult};
use crate::ports::outbound::ChainWriter;

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    task_id: TaskId,
    status: u32,
    result_object_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    tx_hash: String,
}

#[derive(Clone)]
pub struct HttpRelayWriter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayWriter {
    pub fn new(relay_url: &str, timeout: Duration) -> WriterResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/results", relay_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChainWriter for HttpRelayWriter {
    async fn submit_result(
        &self,
        task_id: TaskId,
        status_code: u32,
        result_ref: &str,
    ) -> WriterResult<String> {
        let request = SubmitRequest {
            task_id,
            status: status_code,
            result_object_id: result_ref,
        };
        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(WriterError::Rejected {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }
        let hash = parse_tx_hash(&body)?;
        debug!("[ep-06] Relay accepted task {} as {}", task_id, hash);
        Ok(hash)
    }
}

fn parse_tx_hash(body: &str) -> WriterResult<String> {
    let response: SubmitResponse = serde_json::from_str(body)
        .map_err(|e| WriterError::MalformedResponse(format!("{e}: {body}")))?;
    if response.tx_hash.trim().is_empty() {
        return Err(WriterError::MalformedResponse("empty tx_hash".into()));
    }
    Ok(response.tx_hash)
}
