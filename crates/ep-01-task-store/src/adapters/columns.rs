//! Column lists shared by the SQL stores. Row mappers read by position in
//! this order.

pub const BLOCK_COLUMNS: &str = "height, block_hash, parent_hash, block_time, observed_at";

pub const EVENT_COLUMNS: &str = "id, kind, block_hash, tx_hash, height, task_id, operator, \
     executable_ref, input_refs, resource_limit, method, params_hex, status, confirmations, \
     created_at, updated_at";

pub const TASK_COLUMNS: &str = "task_id, origin_tx_hash, operator, executable_ref, input_refs, \
     resource_limit, method, params_hex, resource_used, status_code, result_message, result_ref, \
     log_ref, submit_tx_hash, status, attempts, last_attempt_at, created_at, updated_at";
