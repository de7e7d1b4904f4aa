//! # Domain Layer
//!
//! - `raw` - Blocks and events as the chain reports them
//! - `decoder` - Attribute bag to `EventBody` conversion

pub mod decoder;
pub mod raw;
