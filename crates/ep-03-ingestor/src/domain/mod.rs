//! # Domain Layer
//!
//! Pure decisions of the ingestor loops. No I/O.

use std::time::Duration;

use shared_types::{BlockHeader, BlockRecord, Height, UnixTimestamp};

/// Height the fetch loop asks the chain for next.
///
/// `start_height` only applies while the ledger is empty.
pub fn next_height(tip: &BlockRecord, start_height: Option<Height>) -> Height {
    match start_height {
        Some(start) if tip.is_genesis() => start,
        _ => tip.height + 1,
    }
}

/// True when `fetched` does not extend `tip`: the chain forked under us.
pub fn is_fork(tip: &BlockRecord, fetched: &BlockHeader) -> bool {
    !tip.is_genesis() && fetched.parent_hash != tip.block_hash
}

/// Lowest height the pruner keeps, or `None` while the chain is shorter
/// than the retention window.
///
/// Everything strictly below `tip - retention_window` is removed.
pub fn prune_floor(tip: Height, retention_window: u64) -> Option<Height> {
    tip.checked_sub(retention_window).filter(|floor| *floor > 0)
}

/// Alert text when the tip has not moved for longer than `stale_after`.
pub fn stale_tip_alert(
    moniker: &str,
    tip: &BlockRecord,
    now: UnixTimestamp,
    stale_after: Duration,
) -> Option<String> {
    if tip.is_genesis() {
        return None;
    }
    let age = now.saturating_sub(tip.observed_at);
    if age <= stale_after.as_secs() as i64 {
        return None;
    }

    let observed = chrono::DateTime::from_timestamp(tip.observed_at, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| tip.observed_at.to_string());
    Some(format!(
        "[{moniker}] last block fetched at {observed}, height={}",
        tip.height
    ))
}
