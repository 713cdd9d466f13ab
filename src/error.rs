//! Error taxonomy for the client core.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-2xx statuses, and `success: false` payloads all
//! collapse into [`ApiError`]; callers of the session manager only ever see
//! one "operation failed" outcome with a human-readable message attached.
//! Nothing here is fatal to the process — the UI falls back to the
//! unauthenticated view.

/// Error returned by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable `{var}`")]
    MissingVar { var: &'static str },
    #[error("invalid API base URL `{0}`")]
    InvalidBaseUrl(String),
}

/// Error returned by [`crate::net::api::ApiClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, TLS, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status code.
    #[error("server returned status {0}")]
    Status(u16),
    /// The server answered 2xx but flagged the operation as failed.
    #[error("{0}")]
    Rejected(String),
    /// The response body was not the documented shape.
    #[error("malformed response payload")]
    Malformed,
}

/// Error returned by [`crate::store::CredentialStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine a config directory for credential storage")]
    NoConfigDir,
    #[error("corrupt credential file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Error returned by [`crate::callback::parse_callback`].
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("invalid callback URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("identity provider returned an error: {0}")]
    Provider(String),
    #[error("missing authorization code in callback URL")]
    MissingCode,
}

/// Error returned by [`crate::manager::SessionManager`] operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A login exchange was refused; the message is safe to show the user.
    #[error("{0}")]
    LoginFailed(String),
    /// A login exchange is already in flight; this call was ignored.
    #[error("a login attempt is already in flight")]
    LoginInFlight,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
