//! # Execution Provider Test Suite
//!
//! Cross-crate scenarios that need the ingestor, runner and reporter wired
//! to one task store.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── pipeline_benchmarks.rs  # decode + append + confirm throughput
//! └── src/integration/
//!     ├── harness.rs              # three role handles on one SQLite file
//!     ├── e2e_pipeline.rs         # event → task → receipt → submission
//!     ├── reorg_safety.rs
//!     ├── ordering.rs
//!     ├── concurrency.rs
//!     ├── pruning.rs
//!     └── workload_packaging.rs   # filesystem storage + zip workloads
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ep-tests
//! cargo test -p ep-tests integration::reorg_safety::
//! cargo bench -p ep-tests
//! ```

pub mod integration;
