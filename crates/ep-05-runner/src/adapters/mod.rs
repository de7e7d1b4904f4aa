//! # Adapters Layer

pub mod fs_storage;
pub mod memory_storage;

pub use fs_storage::FsObjectStorage;
pub use memory_storage::InMemoryObjectStorage;
