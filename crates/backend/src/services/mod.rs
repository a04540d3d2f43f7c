//! Business logic services.

pub mod auth;
pub mod reconcile;

pub use auth::{AuthError, AuthService};
pub use reconcile::{OrderReconciler, ReconcileError, ReconcileOutcome};
