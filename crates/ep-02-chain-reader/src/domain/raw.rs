//! Undecoded chain data.

use shared_types::BlockHeader;

/// One event as emitted by the chain: a type tag plus string attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Upper-case hex hash of the emitting transaction.
    pub tx_hash: String,
    /// Chain event type, e.g. `execution.EventExecutionTask`.
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl RawEvent {
    /// First attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A block header plus every transaction event it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub header: BlockHeader,
    pub events: Vec<RawEvent>,
}
