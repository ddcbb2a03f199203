use parking_lot::RwLock;
use std::sync::Arc;

use super::Claims;

/// Shared holder of the signed-in user's bearer token.
///
/// The HTTP client reads the token for every call and `SessionGate` reads the
/// claims, so logging out is just `clear()`.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<SessionToken>>>,
}

#[derive(Clone)]
struct SessionToken {
    raw: String,
    /// Decoded once when the token is stored; `None` for opaque tokens
    claims: Option<Claims>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let raw = token.into();
        let claims = Claims::decode_unverified(&raw);
        if claims.is_none() {
            tracing::debug!("Session token is not a JWT; treating it as opaque");
        }
        *self.inner.write() = Some(SessionToken { raw, claims });
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
        tracing::info!("Session cleared");
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().as_ref().map(|t| t.raw.clone())
    }

    pub fn has_token(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn claims(&self) -> Option<Claims> {
        self.inner.read().as_ref().and_then(|t| t.claims.clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the raw token
        f.debug_struct("Session")
            .field("has_token", &self.has_token())
            .finish()
    }
}
