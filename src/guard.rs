//! Protected-route guarding.
//!
//! Pure decision logic: given the current session snapshot, should a
//! protected view render, show a loading state, or bounce the user to the
//! public landing page. The embedding UI performs the actual navigation.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::state::session::SessionState;

/// What a protected view should do with the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session is authenticated; render the protected content.
    Allow,
    /// Session is still resolving (startup validation or an auth exchange
    /// in flight); show a loading state, do not redirect yet.
    Wait,
    /// No live session; navigate to the public landing view.
    RedirectToLanding,
}

/// Evaluate a protected route against a session snapshot.
#[must_use]
pub fn evaluate(state: &SessionState) -> GuardDecision {
    if state.is_validating() || state.loading {
        GuardDecision::Wait
    } else if state.is_authenticated() {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToLanding
    }
}
