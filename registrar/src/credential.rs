//! Propagation of the caller's bearer credential to upstream calls.
use std::fmt;
use std::sync::RwLock;

/// The value sent as the `Authorization` header on every upstream call.
///
/// A credential is never absent: when the caller supplied nothing and no session token is
/// available it is the empty string, so every request still carries a well-formed header.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(header_value: impl Into<String>) -> Self {
        Self(header_value.into())
    }

    /// Picks the credential for a request.
    ///
    /// A non-empty inbound `Authorization` header wins. Otherwise the session token, if any,
    /// is sent as `Bearer <token>`. Otherwise the credential is empty.
    pub fn resolve(inbound: Option<&str>, session: &dyn SessionStore) -> Self {
        match inbound.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Self::new(value),
            None => session
                .token()
                .filter(|token| !token.is_empty())
                .map(|token| Self(format!("Bearer {token}")))
                .unwrap_or_default(),
        }
    }

    pub fn header_value(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Holder of the fallback session token.
///
/// `clear` is the capability invoked when the upstream rejects the credential.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn clear(&self);
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.into());
    }
}

impl SessionStore for MemorySession {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

/// The identity an operation runs on behalf of.
///
/// Bundles the credential attached to upstream calls with the session capability that is
/// revoked when the upstream answers `401`.
#[derive(Clone, Copy)]
pub struct Caller<'a> {
    credential: &'a Credential,
    session: &'a dyn SessionStore,
}

impl<'a> Caller<'a> {
    pub fn new(credential: &'a Credential, session: &'a dyn SessionStore) -> Self {
        Self {
            credential,
            session,
        }
    }

    pub fn credential(&self) -> &'a Credential {
        self.credential
    }

    /// Drops the session token after the upstream rejected the credential.
    pub fn revoke(&self) {
        self.session.clear();
    }
}

impl fmt::Debug for Caller<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("credential", self.credential)
            .finish_non_exhaustive()
    }
}
