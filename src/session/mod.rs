//! Session module — identities, tokens and the session lifecycle.
//!
//! This module provides:
//! - Roles, permissions and identity resolution (`identity`)
//! - The three-segment session token (`token`)
//! - Injectable time sources (`clock`)
//! - `SessionService`, which logs users in and out (`service`)

pub mod clock;
pub mod identity;
pub mod service;
pub mod token;

// Re-export the most commonly used items.
pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::{DemoRoster, Identity, IdentityRegistry, Permission, Role};
pub use service::{
    LoginOutcome, SessionPolicy, SessionService, SessionState, CURRENT_USER_KEY, DEMO_MODE_KEY,
    SESSION_RECORD_KEYS, TOKEN_KEY,
};
pub use token::SessionToken;
