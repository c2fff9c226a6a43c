use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::modal::AuthModal;
use super::store::{SessionStore, User};
use crate::metrics::Metrics;

// ============================================================================
// Auth API Contract
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Not signed in or session expired")]
    Unauthorized,

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not reach the storefront API: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub message: String,
}

/// Remote auth endpoints. Tokens live in the transport (cookies), so none of
/// these calls carry them explicitly.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError>;
    async fn me(&self) -> Result<User, ApiError>;
    async fn refresh(&self) -> Result<(), ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
}

// ============================================================================
// Auth Session
// ============================================================================

pub struct AuthSession {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    modal: watch::Sender<AuthModal>,
    metrics: Option<Arc<Metrics>>,
}

impl AuthSession {
    pub fn new(api: Arc<dyn AuthApi>, store: SessionStore) -> Self {
        let (modal, _rx) = watch::channel(AuthModal::Closed);
        Self {
            api,
            store,
            modal,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn modal(&self) -> AuthModal {
        *self.modal.borrow()
    }

    pub fn subscribe_modal(&self) -> watch::Receiver<AuthModal> {
        self.modal.subscribe()
    }

    pub fn open_modal(&self, modal: AuthModal) {
        self.modal.send_replace(modal);
    }

    pub fn switch_modal(&self) {
        self.modal.send_modify(|modal| *modal = modal.switched());
    }

    pub fn close_modal(&self) {
        self.modal.send_replace(AuthModal::Closed);
    }

    /// Sign in, store the user and close the dialog.
    /// Returns the server's greeting.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        match self.api.login(credentials).await {
            Ok(response) => {
                tracing::info!(user_id = %response.user.id, "Signed in");
                self.store.set_user(Some(response.user));
                self.close_modal();
                self.record("login");
                Ok(response.message)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Sign in failed");
                self.record("login_failed");
                Err(err)
            }
        }
    }

    /// Register, then point the dialog at login
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        self.api.signup(request).await.map_err(|err| {
            tracing::warn!(error = %err, "Sign up failed");
            err
        })?;
        self.open_modal(AuthModal::Login);
        self.record("signup");
        Ok(())
    }

    /// Ask the API who is signed in and mirror the answer into the store.
    /// `Ok(None)` means nobody is.
    pub async fn validate(&self) -> Result<Option<User>, ApiError> {
        match self.call_with_refresh(|| self.api.me()).await {
            Ok(user) => {
                self.store.set_user(Some(user.clone()));
                Ok(Some(user))
            }
            Err(ApiError::Unauthorized) => {
                self.store.clear();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Sign out. The local session ends whether or not the API agrees.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let outcome = self.api.logout().await;
        self.store.clear();
        self.record("logout");
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "Remote sign out failed; local session cleared");
        }
        outcome
    }

    /// Run `op`; on `Unauthorized` refresh the session once and run it once
    /// more. A failed refresh signs the user out and opens the login dialog.
    pub async fn call_with_refresh<T, F, Fut>(&self, op: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match op().await {
            Err(ApiError::Unauthorized) => {}
            other => return other,
        }

        tracing::debug!("Access rejected, refreshing session");
        if let Err(err) = self.api.refresh().await {
            tracing::warn!(error = %err, "Session refresh failed, signing out");
            self.record("refresh_failed");
            self.store.clear();
            self.open_modal(AuthModal::Login);
            return Err(ApiError::Unauthorized);
        }

        self.record("refreshed");
        op().await
    }

    fn record(&self, event: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_session_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    fn alice() -> User {
        User {
            id: "u-1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: "customer".to_string(),
        }
    }

    /// Tokens expire until refreshed; refresh succeeds when `refresh_ok`
    struct MockAuthApi {
        token_valid: AtomicBool,
        refresh_ok: bool,
        logout_ok: bool,
        me_calls: AtomicU32,
        refresh_calls: AtomicU32,
    }

    impl MockAuthApi {
        fn new(token_valid: bool, refresh_ok: bool) -> Self {
            Self {
                token_valid: AtomicBool::new(token_valid),
                refresh_ok,
                logout_ok: true,
                me_calls: AtomicU32::new(0),
                refresh_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AuthApi for MockAuthApi {
        async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
            if credentials.password != "secret" {
                return Err(ApiError::Status {
                    status: 400,
                    message: "Invalid credentials".to_string(),
                });
            }
            self.token_valid.store(true, Ordering::SeqCst);
            Ok(LoginResponse {
                user: alice(),
                message: "Welcome back".to_string(),
            })
        }

        async fn signup(&self, _request: &SignupRequest) -> Result<(), ApiError> {
            Ok(())
        }

        async fn me(&self) -> Result<User, ApiError> {
            self.me_calls.fetch_add(1, Ordering::SeqCst);
            if self.token_valid.load(Ordering::SeqCst) {
                Ok(alice())
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        async fn refresh(&self) -> Result<(), ApiError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if self.refresh_ok {
                self.token_valid.store(true, Ordering::SeqCst);
                Ok(())
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        async fn logout(&self) -> Result<(), ApiError> {
            if self.logout_ok {
                Ok(())
            } else {
                Err(ApiError::Transport("connection refused".to_string()))
            }
        }
    }

    fn session(api: Arc<MockAuthApi>) -> AuthSession {
        AuthSession::new(api, SessionStore::new())
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "alice@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_user_and_closes_modal() {
        let auth = session(Arc::new(MockAuthApi::new(false, true)));
        auth.open_modal(AuthModal::Login);

        let message = auth.login(&credentials("secret")).await.unwrap();

        assert_eq!(message, "Welcome back");
        assert_eq!(auth.store().current(), Some(alice()));
        assert_eq!(auth.modal(), AuthModal::Closed);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_modal_open() {
        let auth = session(Arc::new(MockAuthApi::new(false, true)));
        auth.open_modal(AuthModal::Login);

        let err = auth.login(&credentials("wrong")).await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert!(!auth.store().is_signed_in());
        assert_eq!(auth.modal(), AuthModal::Login);
    }

    #[tokio::test]
    async fn test_signup_switches_to_login() {
        let auth = session(Arc::new(MockAuthApi::new(false, true)));
        auth.open_modal(AuthModal::Signup);

        auth.signup(&SignupRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "5551234567".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(auth.modal(), AuthModal::Login);
        assert!(!auth.store().is_signed_in());
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_once() {
        let api = Arc::new(MockAuthApi::new(false, true));
        let auth = session(api.clone());

        let user = auth.validate().await.unwrap();

        assert_eq!(user, Some(alice()));
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.me_calls.load(Ordering::SeqCst), 2);
        assert!(auth.store().is_signed_in());
    }

    #[tokio::test]
    async fn test_failed_refresh_signs_out() {
        let api = Arc::new(MockAuthApi::new(false, false));
        let auth = session(api.clone());
        auth.store().set_user(Some(alice()));

        let user = auth.validate().await.unwrap();

        assert_eq!(user, None);
        assert!(!auth.store().is_signed_in());
        assert_eq!(auth.modal(), AuthModal::Login);
        assert_eq!(api.me_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_skip_refresh() {
        let api = Arc::new(MockAuthApi::new(true, true));
        let auth = session(api.clone());

        let result: Result<(), ApiError> = auth
            .call_with_refresh(|| async { Err(ApiError::Transport("timeout".to_string())) })
            .await;

        assert!(matches!(result, Err(ApiError::Transport(_))));
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_even_on_failure() {
        let mut api = MockAuthApi::new(true, true);
        api.logout_ok = false;
        let auth = session(Arc::new(api));
        auth.store().set_user(Some(alice()));

        assert!(auth.logout().await.is_err());
        assert!(!auth.store().is_signed_in());
    }

    #[tokio::test]
    async fn test_session_metrics() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let auth = session(Arc::new(MockAuthApi::new(false, true))).with_metrics(metrics.clone());

        auth.login(&credentials("secret")).await.unwrap();
        auth.logout().await.unwrap();

        assert_eq!(metrics.session_events.with_label_values(&["login"]).get(), 1);
        assert_eq!(metrics.session_events.with_label_values(&["logout"]).get(), 1);
    }
}
