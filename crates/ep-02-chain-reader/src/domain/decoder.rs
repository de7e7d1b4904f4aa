//! Attribute bag decoding.
//!
//! The chain encodes typed event fields as JSON literals: strings and
//! integers arrive quoted (`"\"7\""`), `input_object_ids` arrives as a raw
//! JSON array and `params` as quoted base64. Parameters are stored as hex.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use shared_types::{
    ChainEvent, DecodedBlock, EventBody, EventKind, ResultSubmitted, TaskCreated,
    TaskPayload, MAX_STORED_INTEGER,
};

use crate::domain::raw::{RawBlock, RawEvent};
use crate::error::DecodeError;

pub const ATTR_TASK_ID: &str = "task_id";
pub const ATTR_OPERATOR: &str = "operator";
pub const ATTR_EXECUTABLE: &str = "executable_object_id";
pub const ATTR_INPUTS: &str = "input_object_ids";
pub const ATTR_MAX_GAS: &str = "max_gas";
pub const ATTR_METHOD: &str = "method";
pub const ATTR_PARAMS: &str = "params";

/// A decoded block plus the events that had to be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub block: DecodedBlock,
    pub skipped: Vec<DecodeError>,
}

/// Decode every task-lifecycle event of `raw`. Unrelated event kinds are
/// ignored; malformed task events are returned in `skipped`.
pub fn decode_block(raw: RawBlock) -> DecodeReport {
    let RawBlock { header, events } = raw;
    let mut decoded = Vec::new();
    let mut skipped = Vec::new();

    for event in &events {
        match decode_event(event) {
            Ok(Some(event)) => decoded.push(event),
            Ok(None) => {}
            Err(err) => skipped.push(err),
        }
    }

    DecodeReport {
        block: DecodedBlock {
            header,
            events: decoded,
        },
        skipped,
    }
}

/// Decode one event. `Ok(None)` for kinds the pipeline does not track.
pub fn decode_event(raw: &RawEvent) -> Result<Option<ChainEvent>, DecodeError> {
    let Ok(kind) = raw.kind.parse::<EventKind>() else {
        return Ok(None);
    };

    let body = match kind {
        EventKind::TaskCreated => EventBody::TaskCreated(decode_task_created(raw)?),
        EventKind::ResultSubmitted => EventBody::ResultSubmitted(ResultSubmitted {
            task_id: optional_u64(raw, ATTR_TASK_ID)?,
        }),
    };

    Ok(Some(ChainEvent {
        tx_hash: raw.tx_hash.clone(),
        body,
    }))
}

fn decode_task_created(raw: &RawEvent) -> Result<TaskCreated, DecodeError> {
    let task_id = optional_u64(raw, ATTR_TASK_ID)?.ok_or_else(|| missing(raw, ATTR_TASK_ID))?;
    let executable_ref = optional_string(raw, ATTR_EXECUTABLE)?
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing(raw, ATTR_EXECUTABLE))?;

    Ok(TaskCreated {
        task_id,
        operator: optional_string(raw, ATTR_OPERATOR)?.unwrap_or_default(),
        payload: TaskPayload {
            executable_ref,
            input_refs: input_refs(raw)?,
            resource_limit: optional_u64(raw, ATTR_MAX_GAS)?.unwrap_or_default(),
            method: optional_string(raw, ATTR_METHOD)?.unwrap_or_default(),
            params_hex: params_hex(raw)?,
        },
    })
}

fn missing(raw: &RawEvent, key: &'static str) -> DecodeError {
    DecodeError::MissingAttribute {
        kind: raw.kind.clone(),
        tx_hash: raw.tx_hash.clone(),
        key,
    }
}

fn invalid(raw: &RawEvent, key: &'static str, reason: impl ToString) -> DecodeError {
    DecodeError::InvalidAttribute {
        kind: raw.kind.clone(),
        tx_hash: raw.tx_hash.clone(),
        key,
        reason: reason.to_string(),
    }
}

/// Strip JSON string quoting. Unquoted values pass through unchanged.
fn unquote(raw: &RawEvent, key: &'static str, value: &str) -> Result<String, DecodeError> {
    let trimmed = value.trim();
    if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).map_err(|e| invalid(raw, key, e))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional_string(raw: &RawEvent, key: &'static str) -> Result<Option<String>, DecodeError> {
    raw.attribute(key)
        .map(|value| unquote(raw, key, value))
        .transpose()
}

/// Quoted decimal bounded by [`MAX_STORED_INTEGER`].
fn optional_u64(raw: &RawEvent, key: &'static str) -> Result<Option<u64>, DecodeError> {
    let Some(text) = optional_string(raw, key)? else {
        return Ok(None);
    };
    let value = text.parse::<u64>().map_err(|e| invalid(raw, key, e))?;
    if value > MAX_STORED_INTEGER {
        return Err(invalid(
            raw,
            key,
            format!("{value} exceeds {MAX_STORED_INTEGER}"),
        ));
    }
    Ok(Some(value))
}

fn input_refs(raw: &RawEvent) -> Result<Vec<String>, DecodeError> {
    let Some(value) = raw.attribute(ATTR_INPUTS) else {
        return Ok(Vec::new());
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }

    // Either a raw array or an array serialized inside a JSON string.
    match serde_json::from_str::<Vec<String>>(value) {
        Ok(refs) => Ok(refs),
        Err(direct) => {
            let inner = unquote(raw, ATTR_INPUTS, value)?;
            if inner == value {
                return Err(invalid(raw, ATTR_INPUTS, direct));
            }
            serde_json::from_str::<Vec<String>>(&inner).map_err(|e| invalid(raw, ATTR_INPUTS, e))
        }
    }
}

fn params_hex(raw: &RawEvent) -> Result<String, DecodeError> {
    let Some(encoded) = optional_string(raw, ATTR_PARAMS)? else {
        return Ok(String::new());
    };
    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| invalid(raw, ATTR_PARAMS, e))?;
    Ok(hex::encode(bytes))
}
