//! Session manager — the single owner of authentication state.
//!
//! DESIGN
//! ======
//! One `SessionManager` mediates between the persisted credential store and
//! the in-memory session, and exposes three operations: `login` (exchange an
//! identity-provider code for a token), `logout` (best-effort server notify,
//! unconditional local clear), and `initialize` (startup hydration plus a
//! one-shot token validation). Observers subscribe to a `watch` channel and
//! receive an immutable [`SessionState`] snapshot on every transition;
//! navigation and error display are theirs to handle.
//!
//! Re-entrancy: the startup validation runs at most once per process
//! lifetime, and an overlapping `login` is rejected with
//! [`SessionError::LoginInFlight`] before it touches the network or state.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, SessionError, StoreError};
use crate::net::api::ApiClient;
use crate::net::types::User;
use crate::state::session::SessionState;
use crate::store::{CredentialStore, KEY_TOKEN, KEY_USER};

/// Controller owning the session lifecycle.
pub struct SessionManager {
    api: ApiClient,
    store: Box<dyn CredentialStore>,
    state: watch::Sender<SessionState>,
    validated: AtomicBool,
    login_busy: AtomicBool,
}

impl SessionManager {
    /// Build a manager for the configured backend and credential store.
    ///
    /// The session starts empty; call [`Self::initialize`] to hydrate it
    /// from persisted credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        config: &ClientConfig,
        store: Box<dyn CredentialStore>,
    ) -> Result<Self, SessionError> {
        let api = ApiClient::new(config)?;
        let (state, _) = watch::channel(SessionState::default());
        Ok(Self {
            api,
            store,
            state,
            validated: AtomicBool::new(false),
            login_busy: AtomicBool::new(false),
        })
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    /// Subscribe to session transitions. The receiver always holds the
    /// latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current session snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// True once a token has been accepted by login or startup validation.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// The cached user record, if a session is live.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// The bearer token held by the session, for authenticated API calls.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    /// The underlying API client, for endpoints outside the session
    /// lifecycle (moments, flashbacks).
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // LIFECYCLE OPERATIONS
    // =========================================================================

    /// Hydrate the session from persisted credentials and, if a token was
    /// found, validate it against `/me` exactly once per process lifetime.
    ///
    /// Without a stored token this resolves `Unauthenticated` with no
    /// network call. A rejected token clears the store and resets the
    /// session silently; no error reaches the user on this path.
    ///
    /// # Errors
    ///
    /// Returns an error only if the credential store itself cannot be read.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        if self.validated.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let token = self.store.get(KEY_TOKEN)?;
        let cached_user = self
            .store
            .get(KEY_USER)?
            .and_then(|raw| serde_json::from_str::<User>(&raw).ok());
        self.state.send_replace(SessionState::hydrated(token.clone(), cached_user));

        let Some(token) = token else {
            return Ok(());
        };

        match self.api.fetch_current_user(&token).await {
            Ok(user) => {
                // Keep the persisted copy in step with the backend.
                if let Err(e) = self.persist(&token, &user) {
                    warn!(error = %e, "failed to refresh persisted user record");
                }
                self.state.send_modify(|s| s.validation_confirmed(user));
            }
            Err(e) => {
                debug!(error = %e, "stored token rejected; resetting session");
                self.clear_store();
                self.state.send_modify(SessionState::reset);
            }
        }
        Ok(())
    }

    /// Exchange an identity-provider authorization code for a session.
    ///
    /// On success the token and user are persisted together and the session
    /// becomes authenticated. On failure nothing is persisted and the
    /// session carries a human-readable `login_error`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LoginInFlight`] when a login is already
    /// running, [`SessionError::LoginFailed`] when the exchange is refused,
    /// and a store error if the credentials cannot be persisted.
    pub async fn login(&self, code: &str) -> Result<(), SessionError> {
        if self.login_busy.swap(true, Ordering::SeqCst) {
            return Err(SessionError::LoginInFlight);
        }
        self.state.send_modify(|s| {
            s.loading = true;
            s.login_error = None;
        });

        let outcome = self.login_exchange(code).await;
        self.login_busy.store(false, Ordering::SeqCst);
        outcome
    }

    async fn login_exchange(&self, code: &str) -> Result<(), SessionError> {
        match self.api.exchange_code(code).await {
            Ok((token, user)) => {
                if let Err(e) = self.persist(&token, &user) {
                    self.state.send_modify(|s| s.login_failed("Login failed".to_owned()));
                    return Err(SessionError::Store(e));
                }
                self.state.send_modify(|s| s.login_succeeded(token, user));
                Ok(())
            }
            Err(e) => {
                let message = login_message(&e);
                self.state.send_modify(|s| s.login_failed(message.clone()));
                Err(SessionError::LoginFailed(message))
            }
        }
    }

    /// End the session. The server is notified on a best-effort basis; the
    /// persisted credentials and in-memory state are cleared no matter what
    /// the network does.
    pub async fn logout(&self) {
        self.state.send_modify(|s| s.loading = true);

        let token = self.state.borrow().token.clone();
        if let Some(token) = token {
            if let Err(e) = self.api.notify_logout(&token).await {
                warn!(error = %e, "logout notification failed; clearing local session anyway");
            }
        }

        self.clear_store();
        self.state.send_modify(SessionState::reset);
    }

    // =========================================================================
    // PERSISTENCE HELPERS
    // =========================================================================

    fn persist(&self, token: &str, user: &User) -> Result<(), StoreError> {
        self.store.set(KEY_TOKEN, token)?;
        self.store.set(KEY_USER, &serde_json::to_string(user)?)?;
        Ok(())
    }

    fn clear_store(&self) {
        for key in [KEY_TOKEN, KEY_USER] {
            if let Err(e) = self.store.remove(key) {
                warn!(error = %e, key, "failed to clear persisted credential");
            }
        }
    }
}

/// Reduce an API failure to the message shown on the login screen. Server
/// rejection messages pass through; transport and shape problems collapse to
/// a generic line.
fn login_message(error: &ApiError) -> String {
    match error {
        ApiError::Rejected(message) => message.clone(),
        ApiError::Transport(_) | ApiError::Status(_) | ApiError::Malformed => {
            "Login failed".to_owned()
        }
    }
}
