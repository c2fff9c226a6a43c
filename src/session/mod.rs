// Private module declarations
mod auth;
mod modal;
mod store;

// ============================================================================
// Session - Signed-in user, auth dialog and token refresh
// ============================================================================
//
// State is held in `SessionStore` handles that are passed explicitly to
// whoever needs them. `AuthSession` drives the remote auth API and keeps
// the store and the dialog in step with it.
//
// ============================================================================

pub use auth::{ApiError, AuthApi, AuthSession, Credentials, LoginResponse, SignupRequest};
pub use modal::AuthModal;
pub use store::{SessionStore, User};
