//! Shared test utilities for the qontinui-mcp workspace.
//!
//! Both doubles implement [`qontinui_client::Backend`], so they slot in wherever
//! the reqwest backend would. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`mock`]: [`MockBackend`](mock::MockBackend), records requests and replays scripted responses
//! - [`fake`]: [`FakeQontinui`](fake::FakeQontinui), in-memory projects, login and 404s

pub mod fake;
pub mod mock;

use std::sync::Arc;

use qontinui_client::{Backend, QontinuiClient, Session};

pub use fake::FakeQontinui;
pub use mock::{MockBackend, RecordedRequest};

/// Base URL used by sessions built here; never dialed.
pub const TEST_BASE_URL: &str = "http://qontinui.test";

/// Client with no token and no credentials.
pub fn unauthenticated_client(backend: Arc<dyn Backend>) -> QontinuiClient {
    QontinuiClient::new(backend, Arc::new(Session::new(TEST_BASE_URL)))
}

/// Client holding `token`.
pub fn client_with_token(backend: Arc<dyn Backend>, token: &str) -> QontinuiClient {
    QontinuiClient::new(
        backend,
        Arc::new(Session::new(TEST_BASE_URL).with_token(token)),
    )
}

/// Client with configured credentials and no token yet.
pub fn client_with_credentials(
    backend: Arc<dyn Backend>,
    email: &str,
    password: &str,
) -> QontinuiClient {
    QontinuiClient::new(
        backend,
        Arc::new(Session::new(TEST_BASE_URL).with_credentials(email, password)),
    )
}
