//! Core traits shared by client and storage implementations.

mod credential_store;

pub use credential_store::CredentialStore;
