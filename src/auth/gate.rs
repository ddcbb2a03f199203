//! Authentication gate consulted before mounting and before every poll

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Session;

/// Synchronous, side-effect free authentication check.
pub trait AuthGate: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Gate backed by the shared `Session`.
///
/// Authenticated while a token is held and its `exp` claim, if any, is in
/// the future.
#[derive(Clone)]
pub struct SessionGate {
    session: Session,
    clock: Clock,
}

impl SessionGate {
    pub fn new(session: Session) -> Self {
        Self::with_clock(session, Arc::new(Utc::now))
    }

    pub fn with_clock(session: Session, clock: Clock) -> Self {
        Self { session, clock }
    }
}

impl AuthGate for SessionGate {
    fn is_authenticated(&self) -> bool {
        if !self.session.has_token() {
            return false;
        }
        match self.session.claims() {
            Some(claims) => !claims.is_expired_at((self.clock)()),
            None => true,
        }
    }
}

/// Gate for hosts that track authentication themselves.
#[derive(Debug)]
pub struct StaticGate {
    authenticated: AtomicBool,
}

impl StaticGate {
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(authenticated),
        }
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }
}

impl AuthGate for StaticGate {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}
