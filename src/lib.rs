//! HseVault — encrypted local persistence and sessions.
//!
//! Layers, leaf first: `crypto::KeyVault` owns the profile key,
//! `crypto::CryptoEnvelope` seals values with it, `store::SecureStore`
//! persists the sealed tokens, and `session::SessionService` issues and
//! validates sessions on top of the store.

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod logging;
pub mod session;
pub mod store;
