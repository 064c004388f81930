//! SessionService — login, logout and lazy expiry over `SecureStore`.
//!
//! Lifecycle: `Anonymous → Authenticating → Authenticated → Expired | LoggedOut`.
//!
//! There is no server.  A session is the pair of records written at login
//! (`hse_session_token` and `hse_current_user`, plus the `hse_demo_mode`
//! flag), all encrypted through `SecureStore`.  Expiry is detected only
//! when the session is read; expired records are left in place until the
//! next login or logout overwrites them.

use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::identity::{resolve_or_guest, Identity, IdentityRegistry};
use super::token::SessionToken;
use crate::errors::Result;
use crate::store::SecureStore;

/// Record holding the rendered session token.
pub const TOKEN_KEY: &str = "hse_session_token";

/// Record holding the current identity.
pub const CURRENT_USER_KEY: &str = "hse_current_user";

/// Record holding whether the session was opened in demo mode.
pub const DEMO_MODE_KEY: &str = "hse_demo_mode";

/// Records owned by the session layer; `SecureStore` refuses them on its
/// public surface.
pub const SESSION_RECORD_KEYS: [&str; 3] = [TOKEN_KEY, CURRENT_USER_KEY, DEMO_MODE_KEY];

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated,
    Expired,
    LoggedOut,
}

/// Token lifetimes and the demo switch.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Lifetime of a normal session.
    pub session_ttl: Duration,
    /// Lifetime when the user asked to be remembered.
    pub remember_me_ttl: Duration,
    /// Application-wide demo flag; gates profile switching.
    pub demo_mode: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            remember_me_ttl: Duration::days(365),
            demo_mode: true,
        }
    }
}

impl SessionPolicy {
    pub fn ttl(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.remember_me_ttl
        } else {
            self.session_ttl
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub identity: Identity,
    /// The rendered three-segment token.
    pub token: String,
    pub is_demo: bool,
}

/// Issues and validates sessions.
pub struct SessionService {
    store: Arc<SecureStore>,
    registry: Arc<dyn IdentityRegistry>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
    state: Mutex<SessionState>,
}

impl SessionService {
    pub fn new(
        store: Arc<SecureStore>,
        registry: Arc<dyn IdentityRegistry>,
        clock: Arc<dyn Clock>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
            policy,
            state: Mutex::new(SessionState::Anonymous),
        }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// The most recently observed lifecycle state of this instance.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Resolve `identifier`, mint a token and persist the session.
    ///
    /// Unknown identifiers are admitted as guests.  Returns `None` for a
    /// blank or malformed identifier, or when the session records could
    /// not be written.  Any error leaves the service `Anonymous`.
    pub fn login(&self, identifier: &str, remember_me: bool) -> Result<Option<LoginOutcome>> {
        self.transition(SessionState::Authenticating);

        let outcome = self.start_session(identifier, remember_me);
        let next = match &outcome {
            Ok(Some(_)) => SessionState::Authenticated,
            Ok(None) | Err(_) => SessionState::Anonymous,
        };
        self.transition(next);
        outcome
    }

    fn start_session(&self, identifier: &str, remember_me: bool) -> Result<Option<LoginOutcome>> {
        let Some(identity) = resolve_or_guest(self.registry.as_ref(), identifier) else {
            debug!("login rejected: blank or malformed identifier");
            return Ok(None);
        };

        let token = SessionToken::mint(&identity, self.clock.now(), self.policy.ttl(remember_me));
        let rendered = token.encode()?;
        let is_demo = self.policy.demo_mode;

        let written = self
            .store
            .write_reserved(TOKEN_KEY, &rendered)
            .and_then(|()| self.store.write_reserved(CURRENT_USER_KEY, &identity))
            .and_then(|()| self.store.write_reserved(DEMO_MODE_KEY, &is_demo));
        if let Err(e) = written {
            if e.is_fatal() {
                return Err(e);
            }
            warn!(error = %e, "login aborted: session could not be persisted");
            self.store.remove_reserved(TOKEN_KEY)?;
            return Ok(None);
        }

        info!(
            subject = %identity.id,
            role = %identity.role,
            guest = identity.is_guest(),
            remember_me,
            "session started"
        );

        Ok(Some(LoginOutcome {
            identity,
            token: rendered,
            is_demo,
        }))
    }

    /// Drop the session records.
    pub fn logout(&self) -> Result<()> {
        for key in SESSION_RECORD_KEYS {
            self.store.remove_reserved(key)?;
        }
        info!("session ended");
        self.transition(SessionState::LoggedOut);
        Ok(())
    }

    /// The stored token, if a session exists and has not expired.
    pub fn session(&self) -> Result<Option<SessionToken>> {
        let Some(rendered) = self.store.read_reserved::<String>(TOKEN_KEY)? else {
            self.settle_without_session();
            return Ok(None);
        };

        let token = match SessionToken::decode(&rendered) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "stored session token is unreadable");
                self.settle_without_session();
                return Ok(None);
            }
        };

        if token.is_expired_at(self.clock.now()) {
            debug!(subject = %token.subject, expired_at = %token.expires_at, "session expired");
            self.transition(SessionState::Expired);
            return Ok(None);
        }

        self.transition(SessionState::Authenticated);
        Ok(Some(token))
    }

    /// The current identity, or `None` when logged out, expired or the
    /// records are unreadable.
    ///
    /// The identity must be the token's subject.  It may differ only after
    /// a demo profile switch, and only while demo mode is still enabled.
    pub fn current_user(&self) -> Result<Option<Identity>> {
        let Some(token) = self.session()? else {
            return Ok(None);
        };
        let Some(identity) = self.store.read_reserved::<Identity>(CURRENT_USER_KEY)? else {
            self.settle_without_session();
            return Ok(None);
        };

        if identity.id != token.subject && !self.switching_enabled()? {
            warn!(
                subject = %token.subject,
                stored = %identity.id,
                "stored identity does not match the session token"
            );
            self.settle_without_session();
            return Ok(None);
        }

        Ok(Some(identity))
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.current_user()?.is_some())
    }

    /// Whether the live session was opened in demo mode.
    pub fn is_demo_session(&self) -> Result<bool> {
        if !self.is_authenticated()? {
            return Ok(false);
        }
        self.stored_demo_flag()
    }

    /// Swap the current identity for `target_id` without a new login.
    ///
    /// Only honoured when demo mode is enabled by policy and the live
    /// session is a demo session; otherwise this is a logged no-op.  The
    /// token is left untouched.
    pub fn switch_profile(&self, target_id: &str) -> Result<Option<Identity>> {
        if !self.switching_enabled()? || !self.is_authenticated()? {
            warn!(target_id, "profile switch refused outside a demo session");
            return Ok(None);
        }

        let Some(identity) = self.registry.find_by_id(target_id) else {
            warn!(target_id, "profile switch refused: unknown profile");
            return Ok(None);
        };

        self.store.write_reserved(CURRENT_USER_KEY, &identity)?;
        info!(subject = %identity.id, role = %identity.role, "switched demo profile");
        Ok(Some(identity))
    }

    /// Known profiles that `switch_profile` accepts.
    pub fn profiles(&self) -> Vec<Identity> {
        self.registry.all()
    }

    /// Demo policy is on and the stored session was opened as a demo.
    fn switching_enabled(&self) -> Result<bool> {
        Ok(self.policy.demo_mode && self.stored_demo_flag()?)
    }

    fn stored_demo_flag(&self) -> Result<bool> {
        Ok(self
            .store
            .read_reserved::<bool>(DEMO_MODE_KEY)?
            .unwrap_or(false))
    }

    fn transition(&self, next: SessionState) {
        *self.state.lock() = next;
    }

    /// No readable session: keep `LoggedOut`/`Expired` if already there.
    fn settle_without_session(&self) {
        let mut state = self.state.lock();
        if matches!(*state, SessionState::Authenticated | SessionState::Authenticating) {
            *state = SessionState::Anonymous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CryptoEnvelope, KeyVault};
    use crate::session::clock::FixedClock;
    use crate::session::identity::{DemoRoster, Role};
    use crate::store::{Backend, MemoryBackend};
    use chrono::{TimeZone, Utc};

    fn service(policy: SessionPolicy) -> (SessionService, Arc<FixedClock>) {
        service_over(MemoryBackend::new(), policy)
    }

    fn service_over(
        backend: MemoryBackend,
        policy: SessionPolicy,
    ) -> (SessionService, Arc<FixedClock>) {
        let backend: Arc<dyn Backend> = Arc::new(backend);
        let vault = Arc::new(KeyVault::with_default_slot(Arc::clone(&backend)));
        let store = Arc::new(SecureStore::new(
            Arc::new(CryptoEnvelope::new(vault)),
            backend,
        ));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap(),
        ));
        let svc = SessionService::new(
            store,
            Arc::new(DemoRoster::new()),
            Arc::clone(&clock) as Arc<dyn Clock>,
            policy,
        );
        (svc, clock)
    }

    #[test]
    fn lifecycle_states() {
        let (svc, clock) = service(SessionPolicy::default());
        assert_eq!(svc.state(), SessionState::Anonymous);

        svc.login("maria.garcia", false).unwrap().unwrap();
        assert_eq!(svc.state(), SessionState::Authenticated);

        clock.advance(Duration::hours(25));
        assert!(svc.current_user().unwrap().is_none());
        assert_eq!(svc.state(), SessionState::Expired);

        svc.login("maria.garcia", false).unwrap().unwrap();
        svc.logout().unwrap();
        assert_eq!(svc.state(), SessionState::LoggedOut);
        assert!(svc.current_user().unwrap().is_none());
        assert_eq!(svc.state(), SessionState::LoggedOut);
    }

    #[test]
    fn blank_identifier_is_rejected() {
        let (svc, _) = service(SessionPolicy::default());
        assert!(svc.login("   ", false).unwrap().is_none());
        assert_eq!(svc.state(), SessionState::Anonymous);
    }

    #[test]
    fn remember_me_extends_lifetime() {
        let (svc, clock) = service(SessionPolicy::default());
        svc.login("james.wilson", true).unwrap().unwrap();

        clock.advance(Duration::days(364));
        assert!(svc.is_authenticated().unwrap());

        clock.advance(Duration::days(2));
        assert!(!svc.is_authenticated().unwrap());
    }

    #[test]
    fn expired_records_are_not_evicted() {
        let (svc, clock) = service(SessionPolicy::default());
        svc.login("james.wilson", false).unwrap().unwrap();
        clock.advance(Duration::hours(48));

        assert!(svc.current_user().unwrap().is_none());
        assert!(svc.store.contains_reserved(TOKEN_KEY).unwrap());
    }

    #[test]
    fn switch_profile_in_demo_mode_keeps_token() {
        let (svc, _) = service(SessionPolicy::default());
        let outcome = svc.login("sarah.jones", false).unwrap().unwrap();

        let switched = svc.switch_profile("USR-006").unwrap().unwrap();
        assert_eq!(switched.role, Role::Auditor);
        assert_eq!(svc.current_user().unwrap().unwrap().role, Role::Auditor);

        let stored: String = svc.store.read_reserved(TOKEN_KEY).unwrap().unwrap();
        assert_eq!(stored, outcome.token);
    }

    #[test]
    fn switch_profile_refused_without_demo_mode() {
        let (svc, _) = service(SessionPolicy {
            demo_mode: false,
            ..SessionPolicy::default()
        });
        let outcome = svc.login("sarah.jones", false).unwrap().unwrap();
        assert!(!outcome.is_demo);
        assert!(!svc.is_demo_session().unwrap());

        assert!(svc.switch_profile("USR-001").unwrap().is_none());
        assert_eq!(
            svc.current_user().unwrap().unwrap().role,
            Role::SiteHseManager
        );
    }

    #[test]
    fn switch_profile_refused_when_logged_out() {
        let (svc, _) = service(SessionPolicy::default());
        assert!(svc.switch_profile("USR-001").unwrap().is_none());
    }

    #[test]
    fn switch_to_unknown_profile_is_noop() {
        let (svc, _) = service(SessionPolicy::default());
        svc.login("sarah.jones", false).unwrap().unwrap();
        assert!(svc.switch_profile("USR-404").unwrap().is_none());
        assert_eq!(
            svc.current_user().unwrap().unwrap().role,
            Role::SiteHseManager
        );
    }

    #[test]
    fn login_error_resets_state_to_anonymous() {
        let backend = MemoryBackend::new();
        backend
            .write(crate::crypto::DEFAULT_KEY_SLOT, "{\"kty\":\"oct\"")
            .unwrap();
        let (svc, _) = service_over(backend, SessionPolicy::default());

        let result = svc.login("sarah.jones", false);
        assert!(result.is_err_and(|e| e.is_fatal()));
        assert_eq!(svc.state(), SessionState::Anonymous);
    }

    #[test]
    fn identity_must_match_token_subject() {
        let backend = MemoryBackend::new();
        let (demo, _) = service_over(backend.clone(), SessionPolicy::default());
        demo.login("james.wilson", false).unwrap().unwrap();

        // Identity swapped behind the service's back.
        let forged = demo.registry.find_by_id("USR-001").unwrap();
        demo.store.write_reserved(CURRENT_USER_KEY, &forged).unwrap();
        demo.store.write_reserved(DEMO_MODE_KEY, &false).unwrap();

        assert!(demo.current_user().unwrap().is_none());
        assert!(!demo.is_authenticated().unwrap());
    }

    #[test]
    fn switched_identity_dropped_once_demo_mode_is_off() {
        let backend = MemoryBackend::new();
        let (demo, _) = service_over(backend.clone(), SessionPolicy::default());
        demo.login("sarah.jones", false).unwrap().unwrap();
        demo.switch_profile("USR-001").unwrap().unwrap();
        assert_eq!(demo.current_user().unwrap().unwrap().id, "USR-001");

        let (strict, _) = service_over(
            backend,
            SessionPolicy {
                demo_mode: false,
                ..SessionPolicy::default()
            },
        );
        assert!(strict.current_user().unwrap().is_none());
    }
}
