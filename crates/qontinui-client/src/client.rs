//! Session-aware client for the Qontinui API

use std::sync::Arc;

use serde_json::{Value, json};

use crate::backend::{ApiRequest, Backend};
use crate::models::{AuthTokens, User};
use crate::session::{AuthState, Session};
use crate::{Error, HttpBackend, Result, Settings};

pub const LOGIN_PATH: &str = "/api/v1/auth/jwt/login";
pub const CURRENT_USER_PATH: &str = "/api/v1/auth/users/me";

/// Client combining a [`Backend`] with the shared [`Session`].
///
/// Cloning is cheap; clones share the session.
#[derive(Clone)]
pub struct QontinuiClient {
    backend: Arc<dyn Backend>,
    session: Arc<Session>,
}

impl QontinuiClient {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<Session>) -> Self {
        Self { backend, session }
    }

    /// Client talking HTTP to the configured backend.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let backend = HttpBackend::new(settings)?;
        let session = Session::from_settings(settings);
        Ok(Self::new(Arc::new(backend), Arc::new(session)))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send a request with the current token attached, if any.
    pub async fn request(&self, request: ApiRequest) -> Result<Value> {
        let token = self.session.token().await;
        tracing::debug!(method = %request.method, path = %request.path, "Backend request");
        self.backend.send(request, token.as_deref()).await
    }

    /// Authenticate with email and password, storing the issued token.
    ///
    /// A rejected login leaves the session untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let _guard = self.session.lock_transitions().await;
        self.login_locked(email, password).await
    }

    async fn login_locked(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let request = ApiRequest::post(LOGIN_PATH).with_form(vec![
            ("username".to_string(), email.to_string()),
            ("password".to_string(), password.to_string()),
        ]);

        let body = self.backend.send(request, None).await?;
        let tokens: AuthTokens = serde_json::from_value(body).map_err(|e| Error::Decode {
            message: format!("login response: {}", e),
        })?;

        self.session.set_token(tokens.access_token.clone()).await;
        tracing::info!(email = %email, "Logged in");
        Ok(tokens)
    }

    /// Make sure a token is held, logging in with configured credentials if needed.
    ///
    /// Concurrent callers wait on the transition guard, so at most one login runs.
    pub async fn ensure_authenticated(&self) -> Result<()> {
        if self.session.state().await.is_authenticated() {
            return Ok(());
        }

        let Some(credentials) = self.session.credentials().cloned() else {
            return Err(Error::Auth(
                "no session token; call auth_login first".to_string(),
            ));
        };

        let _guard = self.session.lock_transitions().await;
        if self.session.state().await.is_authenticated() {
            return Ok(());
        }

        tracing::info!("Logging in with configured credentials");
        self.login_locked(&credentials.email, &credentials.password)
            .await
            .map_err(|e| Error::Auth(format!("automatic login failed: {}", e)))?;
        Ok(())
    }

    /// Drop the session token.
    pub async fn logout(&self) -> AuthState {
        let previous = self.session.clear().await;
        tracing::info!(was = ?previous, "Logged out");
        previous
    }

    /// Fetch the authenticated user.
    pub async fn current_user(&self) -> Result<User> {
        let body = self.request(ApiRequest::get(CURRENT_USER_PATH)).await?;
        serde_json::from_value(body).map_err(|e| Error::Decode {
            message: format!("user response: {}", e),
        })
    }

    /// Fetch a project document.
    pub async fn get_project(&self, project_id: &str) -> Result<Value> {
        self.request(ApiRequest::get(project_path(project_id)))
            .await
    }

    /// Replace a project's configuration document.
    pub async fn update_project_configuration(
        &self,
        project_id: &str,
        configuration: Value,
    ) -> Result<Value> {
        self.request(
            ApiRequest::put(project_path(project_id))
                .with_json(json!({ "configuration": configuration })),
        )
        .await
    }
}

fn project_path(project_id: &str) -> String {
    format!("/api/v1/projects/{}", urlencoding::encode(project_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RequestBody;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers login and users/me; records every request.
    #[derive(Default)]
    struct StubBackend {
        requests: Mutex<Vec<(ApiRequest, Option<String>)>>,
        reject_login: bool,
    }

    impl StubBackend {
        fn count(&self, path: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(r, _)| r.path == path)
                .count()
        }
    }

    #[async_trait]
    impl Backend for StubBackend {
        async fn send(&self, request: ApiRequest, token: Option<&str>) -> Result<Value> {
            self.requests
                .lock()
                .unwrap()
                .push((request.clone(), token.map(str::to_string)));

            match request.path.as_str() {
                LOGIN_PATH if self.reject_login => Err(Error::Remote {
                    status: 400,
                    message: "LOGIN_BAD_CREDENTIALS".into(),
                }),
                LOGIN_PATH => Ok(json!({"access_token": "issued", "token_type": "bearer"})),
                CURRENT_USER_PATH => Ok(json!({
                    "id": "12345678-1234-1234-1234-123456789012",
                    "email": "test@example.com",
                    "is_verified": true
                })),
                _ => Ok(json!({})),
            }
        }
    }

    fn client_with(backend: Arc<StubBackend>, session: Session) -> QontinuiClient {
        QontinuiClient::new(backend, Arc::new(session))
    }

    #[tokio::test]
    async fn login_sends_form_and_stores_token() {
        let backend = Arc::new(StubBackend::default());
        let client = client_with(backend.clone(), Session::new("http://x"));

        let tokens = client.login("test@example.com", "pw").await.unwrap();
        assert_eq!(tokens.access_token, "issued");
        assert_eq!(client.session().token().await.as_deref(), Some("issued"));

        let requests = backend.requests.lock().unwrap();
        let (login, token) = &requests[0];
        assert_eq!(login.path, LOGIN_PATH);
        assert!(token.is_none());
        assert_eq!(
            login.body,
            RequestBody::Form(vec![
                ("username".into(), "test@example.com".into()),
                ("password".into(), "pw".into()),
            ])
        );
    }

    #[tokio::test]
    async fn rejected_login_keeps_previous_state() {
        let backend = Arc::new(StubBackend {
            reject_login: true,
            ..Default::default()
        });
        let client = client_with(backend, Session::new("http://x").with_token("old"));

        let err = client.login("a@b.c", "wrong").await.unwrap_err();
        assert!(err.is_status(400));
        assert_eq!(client.session().token().await.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn request_attaches_token_snapshot() {
        let backend = Arc::new(StubBackend::default());
        let client = client_with(backend.clone(), Session::new("http://x").with_token("tok"));

        client.get_project("p1").await.unwrap();
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].0.path, "/api/v1/projects/p1");
        assert_eq!(requests[0].1.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn ensure_authenticated_without_credentials_fails_offline() {
        let backend = Arc::new(StubBackend::default());
        let client = client_with(backend.clone(), Session::new("http://x"));

        let err = client.ensure_authenticated().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("auth_login"));
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ensure_authenticated_logs_in_with_credentials() {
        let backend = Arc::new(StubBackend::default());
        let client = client_with(
            backend.clone(),
            Session::new("http://x").with_credentials("test@example.com", "pw"),
        );

        client.ensure_authenticated().await.unwrap();
        client.ensure_authenticated().await.unwrap();
        assert_eq!(backend.count(LOGIN_PATH), 1);
        assert!(client.session().state().await.is_authenticated());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_auto_login_happens_once() {
        let backend = Arc::new(StubBackend::default());
        let client = client_with(
            backend.clone(),
            Session::new("http://x").with_credentials("test@example.com", "pw"),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = client.clone();
            handles.push(tokio::spawn(async move { client.ensure_authenticated().await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(backend.count(LOGIN_PATH), 1);
    }

    #[tokio::test]
    async fn failed_auto_login_is_auth_error() {
        let backend = Arc::new(StubBackend {
            reject_login: true,
            ..Default::default()
        });
        let client = client_with(
            backend,
            Session::new("http://x").with_credentials("a@b.c", "wrong"),
        );

        let err = client.ensure_authenticated().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("automatic login failed"));
    }

    #[tokio::test]
    async fn logout_reports_previous_state() {
        let backend = Arc::new(StubBackend::default());
        let client = client_with(backend, Session::new("http://x").with_token("tok"));

        assert_eq!(client.logout().await, AuthState::Authenticated);
        assert_eq!(client.logout().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn current_user_parses_model() {
        let backend = Arc::new(StubBackend::default());
        let client = client_with(backend, Session::new("http://x").with_token("tok"));

        let user = client.current_user().await.unwrap();
        assert_eq!(user.email, "test@example.com");
        assert!(user.is_verified);
    }
}
