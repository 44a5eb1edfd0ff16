//! Client library for the Qontinui web backend
//!
//! This crate owns everything that talks to the backend: settings loaded from the
//! environment, the shared [`Session`] holding the bearer token, the [`Backend`] seam
//! and its reqwest implementation, and [`QontinuiClient`] which ties them together.
//!
//! ```text
//! [ qontinui-mcp (tool dispatch) ]
//!        |
//!        v
//! [ QontinuiClient ] --(token snapshot)--> [ Session ]
//!        |
//!        v
//! [ dyn Backend ] --> HttpBackend --(HTTP/JSON)--> [ Qontinui API ]
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod session;

pub use backend::{ApiRequest, Backend, RequestBody};
pub use client::QontinuiClient;
pub use config::Settings;
pub use error::{Error, Result};
pub use http::HttpBackend;
pub use models::{AuthTokens, User};
pub use reqwest::Method;
pub use session::{AuthState, Credentials, Session};
