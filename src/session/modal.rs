use serde::Serialize;

/// Which auth dialog is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthModal {
    #[default]
    Closed,
    Login,
    Signup,
}

impl AuthModal {
    pub fn is_open(self) -> bool {
        self != AuthModal::Closed
    }

    /// Flip between login and signup; a closed modal stays closed
    pub fn switched(self) -> AuthModal {
        match self {
            AuthModal::Login => AuthModal::Signup,
            AuthModal::Signup => AuthModal::Login,
            AuthModal::Closed => AuthModal::Closed,
        }
    }
}
