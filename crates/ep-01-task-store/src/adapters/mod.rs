//! # Adapters Layer
//!
//! - `sqlite` - `TaskStore` over a single SQLite file shared by co-located processes
//! - `mysql` - `TaskStore` over a MySQL server for processes on separate hosts
//! - `backend` - Dialect switch picking one of the two at startup
//! - `time` - Wall clock and a manually driven clock for tests

pub mod backend;
mod columns;
pub mod mysql;
pub mod sqlite;
pub mod time;

#[cfg(test)]
pub(crate) mod conformance;
