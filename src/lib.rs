//! # shhava-client
//!
//! Native Rust client core for the Shhava dating application. This crate
//! owns everything between the backend HTTP API and a UI layer: the session
//! lifecycle (login, logout, one-shot startup validation), the persisted
//! credential store, typed wrappers for the endpoints the client exercises,
//! and the pure route-guard / OAuth-callback logic that sits on top of the
//! session state.
//!
//! DESIGN
//! ======
//! Session state lives in a single [`manager::SessionManager`] rather than
//! ambient global context. Consumers receive immutable
//! [`state::session::SessionState`] snapshots through a `tokio::sync::watch`
//! channel and react to transitions (e.g. navigate on logout) themselves.

pub mod callback;
pub mod config;
pub mod error;
pub mod guard;
pub mod manager;
pub mod net;
pub mod state;
pub mod store;

pub use config::ClientConfig;
pub use error::{ApiError, CallbackError, ConfigError, SessionError, StoreError};
pub use manager::SessionManager;
pub use state::session::{SessionState, SessionStatus};
