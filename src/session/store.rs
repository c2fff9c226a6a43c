use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The signed-in customer as returned by the auth API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Current user, shared by handle.
///
/// Clones observe the same state; subscribers are woken on every change.
#[derive(Clone, Debug)]
pub struct SessionStore {
    user: Arc<watch::Sender<Option<User>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { user: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.borrow().is_some()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.user.send_replace(user);
    }

    pub fn clear(&self) {
        self.set_user(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }
}
