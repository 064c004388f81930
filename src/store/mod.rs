//! Store module — raw persistence and the encrypted façade over it.
//!
//! This module provides:
//! - The `Backend` trait with memory and directory implementations (`backend`)
//! - `SecureStore`, which encrypts every value it writes (`secure_store`)

pub mod backend;
pub mod secure_store;

// Re-export the most commonly used items.
pub use backend::{Backend, FileBackend, MemoryBackend};
pub use secure_store::{Lookup, SecureStore};
