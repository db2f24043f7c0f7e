//! Built-in credential store implementations.

mod memory;

pub use memory::MemoryCredentialStore;
