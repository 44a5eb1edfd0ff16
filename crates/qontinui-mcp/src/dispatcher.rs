//! Tool dispatch: lookup, validation, authentication, routing
//!
//! Every stage short-circuits, and nothing before routing touches the network.

use qontinui_client::QontinuiClient;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::registry::{AuthOp, Route, ToolRegistry};
use crate::validation::{self, Arguments};
use crate::{Error, Result, collections, routing};

/// Executes tool calls against the backend through a shared client.
pub struct Dispatcher {
    registry: ToolRegistry,
    client: QontinuiClient,
}

impl Dispatcher {
    /// Dispatcher over the full tool catalog.
    pub fn new(client: QontinuiClient) -> Self {
        Self::with_registry(ToolRegistry::with_catalog(), client)
    }

    pub fn with_registry(registry: ToolRegistry, client: QontinuiClient) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn client(&self) -> &QontinuiClient {
        &self.client
    }

    /// Run the named tool with raw JSON arguments.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        let args = validation::validate(tool, arguments)?;

        if tool.requires_auth() {
            self.client.ensure_authenticated().await?;
        }

        tracing::info!(tool = name, "Invoking tool");

        match &tool.route {
            Route::Http { method, path, body } => {
                let request = routing::build_request(tool, method, path, *body, &args)?;
                Ok(self.client.request(request).await?)
            }
            Route::Collection { collection, op } => {
                collections::apply(&self.client, *collection, *op, &args).await
            }
            Route::Auth(op) => self.auth(*op, &args).await,
        }
    }

    /// Like [`invoke`](Self::invoke), but gives up with [`Error::Cancelled`] once
    /// `cancel` fires. The in-flight backend request is dropped with the future.
    pub async fn invoke_cancellable(
        &self,
        name: &str,
        arguments: Value,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(tool = name, "Tool call cancelled");
                Err(Error::Cancelled)
            }
            result = self.invoke(name, arguments) => result,
        }
    }

    async fn auth(&self, op: AuthOp, args: &Arguments) -> Result<Value> {
        match op {
            AuthOp::Login => {
                let email = args.get("email").and_then(Value::as_str).unwrap_or_default();
                let password = args
                    .get("password")
                    .and_then(Value::as_str)
                    .unwrap_or_default();

                self.client.login(email, password).await?;
                let mut status = json!({ "authenticated": true });
                self.attach_user(&mut status).await;
                Ok(status)
            }
            AuthOp::Logout => {
                let previous = self.client.logout().await;
                Ok(json!({
                    "authenticated": false,
                    "was_authenticated": previous.is_authenticated(),
                    "message": "Logged out",
                }))
            }
            AuthOp::Status => {
                let session = self.client.session();
                let authenticated = session.state().await.is_authenticated();
                let mut status = json!({
                    "authenticated": authenticated,
                    "api_url": session.base_url(),
                    "credentials_configured": session.credentials().is_some(),
                });
                if authenticated {
                    self.attach_user(&mut status).await;
                }
                Ok(status)
            }
        }
    }

    /// Add the current user, or the lookup failure, to a status object.
    async fn attach_user(&self, status: &mut Value) {
        match self.client.current_user().await {
            Ok(user) => status["user"] = json!(user),
            Err(e) => {
                tracing::warn!(error = %e, "Current user lookup failed");
                status["error"] = json!(e.to_string());
            }
        }
    }
}
