//! Process-wide authentication state
//!
//! The session is the only mutable state in the adapter. The token sits behind a
//! read/write lock so every request sees one whole value; login and logout also
//! take the login guard so concurrent on-demand logins collapse into one.

use std::fmt;

use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::Settings;

/// Authentication state of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

impl AuthState {
    pub fn is_authenticated(self) -> bool {
        self == AuthState::Authenticated
    }
}

/// Email/password pair used for login-on-demand.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Shared session: base URL, bearer token and optional credentials.
pub struct Session {
    base_url: String,
    token: RwLock<Option<String>>,
    credentials: Option<Credentials>,
    login_guard: Mutex<()>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: RwLock::new(None),
            credentials: None,
            login_guard: Mutex::new(()),
        }
    }

    /// Session seeded from settings: token (if any) and credentials (if both set).
    pub fn from_settings(settings: &Settings) -> Self {
        let credentials = match (&settings.email, &settings.password) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        Self {
            base_url: settings.api_url.clone(),
            token: RwLock::new(settings.access_token.clone()),
            credentials,
            login_guard: Mutex::new(()),
        }
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            ..self
        }
    }

    pub fn with_credentials(self, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Some(Credentials {
                email: email.into(),
                password: password.into(),
            }),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Snapshot of the current token.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn state(&self) -> AuthState {
        if self.token.read().await.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Serializes login/logout transitions.
    pub async fn lock_transitions(&self) -> MutexGuard<'_, ()> {
        self.login_guard.lock().await
    }

    /// Store a freshly issued token. Callers hold the transition guard.
    pub async fn set_token(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    /// Drop the token, returning the previous state.
    pub async fn clear(&self) -> AuthState {
        let _guard = self.lock_transitions().await;
        match self.token.write().await.take() {
            Some(_) => AuthState::Authenticated,
            None => AuthState::Unauthenticated,
        }
    }
}
