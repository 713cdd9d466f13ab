//! Session state machine.
//!
//! The full set of transitions (no others exist):
//!
//! ```text
//! Unauthenticated -> Validating      (startup, persisted token found)
//! Validating      -> Authenticated   (token accepted)
//! Validating      -> Unauthenticated (token rejected; silent)
//! Unauthenticated -> Authenticated   (login success)
//! Unauthenticated -> Error           (login failure, message attached)
//! Error           -> Authenticated   (retried login success)
//! Authenticated   -> Unauthenticated (logout)
//! ```
//!
//! There is no retry, refresh rotation, or expiry timer; a token is checked
//! once at startup and otherwise trusted.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};

use crate::net::types::User;

/// Where the session is in its lifecycle.
///
/// `Error` means "a login attempt just failed" and guards treat it exactly
/// like `Unauthenticated`; the message lives in [`SessionState::login_error`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Unauthenticated,
    Validating,
    Authenticated,
    Error,
}

/// Immutable snapshot of the session, published to observers on every
/// transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub token: Option<String>,
    pub user: Option<User>,
    /// Human-readable reason the last login failed, if it did.
    pub login_error: Option<String>,
    /// True while a login or logout exchange is in flight.
    pub loading: bool,
}

impl SessionState {
    /// True once a token has been accepted (by login or startup validation).
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// True while the one-shot startup validation is unresolved.
    #[must_use]
    pub fn is_validating(&self) -> bool {
        self.status == SessionStatus::Validating
    }

    /// Hydrate from persisted credentials at startup.
    ///
    /// A stored token means the session enters `Validating` until the
    /// backend confirms it; the cached user (if any) is visible immediately.
    /// No token means the session resolves `Unauthenticated` on the spot.
    #[must_use]
    pub fn hydrated(token: Option<String>, user: Option<User>) -> Self {
        let status = if token.is_some() {
            SessionStatus::Validating
        } else {
            SessionStatus::Unauthenticated
        };
        Self { status, token, user, login_error: None, loading: false }
    }

    /// Apply a successful login exchange.
    pub fn login_succeeded(&mut self, token: String, user: User) {
        self.status = SessionStatus::Authenticated;
        self.token = Some(token);
        self.user = Some(user);
        self.login_error = None;
        self.loading = false;
    }

    /// Apply a failed login exchange. Nothing about the previous session is
    /// kept; the message is surfaced to the UI.
    pub fn login_failed(&mut self, message: String) {
        self.status = SessionStatus::Error;
        self.token = None;
        self.user = None;
        self.login_error = Some(message);
        self.loading = false;
    }

    /// Apply a confirmed startup validation: the backend accepted the token
    /// and returned a fresh user record.
    pub fn validation_confirmed(&mut self, user: User) {
        self.status = SessionStatus::Authenticated;
        self.user = Some(user);
        self.login_error = None;
        self.loading = false;
    }

    /// Reset to a clean unauthenticated session (logout, or a rejected
    /// startup validation). Deliberately clears no error into view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
