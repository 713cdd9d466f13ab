//! Client-side session state.
//!
//! DESIGN
//! ======
//! State transitions are pure methods on [`session::SessionState`] so the
//! lifecycle is testable without a network; the manager owns the only
//! mutable copy and publishes snapshots to observers.

pub mod session;
