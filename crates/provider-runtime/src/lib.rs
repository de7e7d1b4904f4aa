//! # Provider Runtime Library
//!
//! Wiring for the `execution-provider` binary, exposed for testing. The
//! binary itself lives in `main.rs`.
//!
//! ```text
//! execution-provider --config-path cfg.json <role>
//!
//!   ingestor  : CometRpcReader + RuntimeAlerter → IngestorService (4 loops)
//!   runner    : FsObjectStorage + ProcessLauncher → TaskRunner
//!   reporter  : HttpRelayWriter → ResultReporter
//!
//!   every role: StoreBackend (sqlite3 | mysql), /metrics + /health, Ctrl-C → watch shutdown
//! ```

pub mod adapters;
pub mod cli;
pub mod container;
pub mod metrics_server;
pub mod roles;

pub use adapters::{RuntimeAlerter, WebhookAlerter};
pub use cli::{Cli, Role};
pub use container::{ConfigError, ProviderConfig};
