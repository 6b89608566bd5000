//! Short-lived login artifacts.

pub mod challenge;
pub mod state;

pub use challenge::MfaChallenge;
pub use state::AuthorizationState;
