//! MCP Server implementation
//!
//! Reads newline-delimited JSON-RPC from stdin and writes responses to stdout.
//! Each `tools/call` runs on its own task so a slow backend call never blocks the
//! loop; `notifications/cancelled` aborts the matching call. All responses go
//! through a single writer task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::Dispatcher;
use crate::protocol::{
    CancelledParams, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeParams,
    InitializeResult, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR,
    PROTOCOL_VERSION, REQUEST_CANCELLED, ServerCapabilities, ServerInfo, ToolCallParams,
    ToolResult, ToolsCapability,
};
use crate::{Error, Result};

/// A tool call registered for cancellation but not yet run.
struct PendingCall {
    id: Value,
    key: String,
    params: ToolCallParams,
    cancel: CancellationToken,
}

/// What to do with one incoming message.
enum Step {
    /// Answer (or stay silent) right away
    Reply(Option<JsonRpcResponse>),
    /// Run a tool call, possibly on another task
    Call(PendingCall),
}

/// MCP Server for the Qontinui backend
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use qontinui_client::{QontinuiClient, Settings};
/// use qontinui_mcp::{Dispatcher, QontinuiMcpServer};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = Settings::from_lookup(|key| std::env::var(key).ok())?;
///     let client = QontinuiClient::from_settings(&settings)?;
///     let server = Arc::new(QontinuiMcpServer::new(Dispatcher::new(client)));
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct QontinuiMcpServer {
    dispatcher: Dispatcher,
    /// Cancellation handles of running tool calls, keyed by rendered request id
    in_flight: Mutex<HashMap<String, CancellationToken>>,
}

impl QontinuiMcpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Number of tool calls currently running.
    pub fn in_flight(&self) -> usize {
        self.lock_in_flight().len()
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited messages from `reader`, answering on `writer`,
    /// until the reader reaches EOF.
    ///
    /// Tool calls still running at EOF are allowed to finish and answer. A line
    /// that is not UTF-8 gets a parse error like any other unparsable line.
    pub async fn run_with<R, W>(self: Arc<Self>, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        tracing::info!(
            tools = self.dispatcher.registry().len(),
            "MCP server ready"
        );

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let step = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::debug!(request = %line, "Received message");
                    self.step(line)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Message is not valid UTF-8");
                    Step::Reply(Some(JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    )))
                }
            };

            match step {
                Step::Reply(Some(response)) => send(&tx, &response),
                Step::Reply(None) => {}
                Step::Call(call) => {
                    let server = Arc::clone(&self);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let response = server.finish(call).await;
                        send(&tx, &response);
                    });
                }
            }
        }

        tracing::info!("input closed, shutting down");
        drop(tx);
        writer.await.map_err(std::io::Error::other)??;
        Ok(())
    }

    /// Handle a single message and wait for its answer.
    ///
    /// Returns the serialized response, or an empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let response = match self.step(message) {
            Step::Reply(None) => return Ok(String::new()),
            Step::Reply(Some(response)) => response,
            Step::Call(call) => self.finish(call).await,
        };
        serde_json::to_string(&response).map_err(Error::from)
    }

    /// Decide what a message needs. Tool calls are registered for cancellation here,
    /// before anything is spawned, so a cancel that follows is never missed.
    fn step(&self, message: &str) -> Step {
        let raw: Value = match serde_json::from_str(message) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Unparsable message");
                return Step::Reply(Some(JsonRpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                )));
            }
        };

        let raw_id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                return Step::Reply(Some(JsonRpcResponse::error(
                    raw_id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                )));
            }
        };

        let Some(id) = request.id else {
            self.handle_notification(&request.method, request.params);
            return Step::Reply(None);
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => match serde_json::from_value::<ToolCallParams>(request.params) {
                Ok(params) => return Step::Call(self.register(id, params)),
                Err(e) => {
                    JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e))
                }
            },
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Step::Reply(Some(response))
    }

    fn handle_notification(&self, method: &str, params: Value) {
        match method {
            "initialized" | "notifications/initialized" => {
                tracing::debug!("Client initialized");
            }
            "notifications/cancelled" => match serde_json::from_value::<CancelledParams>(params) {
                Ok(params) => self.cancel(&params.request_id, params.reason.as_deref()),
                Err(e) => tracing::warn!(error = %e, "Malformed cancellation"),
            },
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }

    fn register(&self, id: Value, params: ToolCallParams) -> PendingCall {
        let key = id.to_string();
        let cancel = CancellationToken::new();
        self.lock_in_flight().insert(key.clone(), cancel.clone());
        PendingCall {
            id,
            key,
            params,
            cancel,
        }
    }

    fn cancel(&self, request_id: &Value, reason: Option<&str>) {
        match self.lock_in_flight().get(&request_id.to_string()) {
            Some(token) => {
                tracing::info!(request_id = %request_id, reason, "Cancelling tool call");
                token.cancel();
            }
            None => tracing::debug!(request_id = %request_id, "Cancel for unknown request"),
        }
    }

    /// Run a registered tool call and build its response.
    async fn finish(&self, call: PendingCall) -> JsonRpcResponse {
        let PendingCall {
            id,
            key,
            params,
            cancel,
        } = call;

        let outcome = self
            .dispatcher
            .invoke_cancellable(&params.name, params.arguments, &cancel)
            .await;
        self.lock_in_flight().remove(&key);

        let result = match outcome {
            Err(Error::Cancelled) => {
                return JsonRpcResponse::error(id, REQUEST_CANCELLED, "request cancelled".into());
            }
            Ok(value) => ToolResult::json(&value),
            Err(e) => {
                tracing::warn!(tool = %params.name, kind = e.kind(), error = %e, "Tool call failed");
                ToolResult::failure(&e)
            }
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {}", e)),
        }
    }

    fn handle_initialize(&self, id: Value, params: Value) -> JsonRpcResponse {
        match serde_json::from_value::<InitializeParams>(params) {
            Ok(params) => tracing::info!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                protocol = %params.protocol_version,
                "Client connected"
            ),
            Err(e) => tracing::debug!(error = %e, "Initialize without client info"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: "qontinui-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {}", e)),
        }
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .dispatcher
            .registry()
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema(),
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn send(tx: &mpsc::UnboundedSender<String>, response: &JsonRpcResponse) {
    match serde_json::to_string(response) {
        Ok(line) => {
            if tx.send(line).is_err() {
                tracing::warn!("Writer closed, dropping response");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not serialize response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qontinui_test_utils::{MockBackend, client_with_token, unauthenticated_client};
    use std::time::Duration;

    fn server_with(backend: Arc<MockBackend>) -> QontinuiMcpServer {
        QontinuiMcpServer::new(Dispatcher::new(client_with_token(backend, "tok")))
    }

    async fn call(server: &QontinuiMcpServer, message: &str) -> Value {
        serde_json::from_str(&server.handle_message(message).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let server = server_with(Arc::new(MockBackend::new()));
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#;

        let response = call(&server, request).await;
        assert_eq!(response["result"]["serverInfo"]["name"], "qontinui-mcp");
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_initialize_without_params() {
        let server = server_with(Arc::new(MockBackend::new()));
        let response = call(&server, r#"{"jsonrpc":"2.0","id":10,"method":"initialize"}"#).await;
        assert_eq!(response["id"], 10);
        assert!(response.get("result").is_some());
    }

    #[tokio::test]
    async fn test_notifications_are_silent() {
        let server = server_with(Arc::new(MockBackend::new()));
        for message in [
            r#"{"jsonrpc":"2.0","method":"initialized"}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":99}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/progress","params":{}}"#,
        ] {
            assert!(server.handle_message(message).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let server = server_with(Arc::new(MockBackend::new()));
        let response = call(&server, r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#).await;
        assert_eq!(response["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_list_has_whole_catalog() {
        let server = server_with(Arc::new(MockBackend::new()));
        let response = call(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;

        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), crate::registry::TOOL_COUNT);
        let login = tools.iter().find(|t| t["name"] == "auth_login").unwrap();
        assert_eq!(login["inputSchema"]["required"], json!(["email", "password"]));
    }

    #[tokio::test]
    async fn test_tools_call_success_is_pretty_json() {
        let backend = Arc::new(MockBackend::with_response(json!({"id": "p1"})));
        let server = server_with(backend);
        let response = call(
            &server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"list_projects"}}"#,
        )
        .await;

        let result = &response["result"];
        assert!(result.get("isError").is_none());
        let text = result["content"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!({"id": "p1"}));
        assert_eq!(server.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_tools_call_failure_sets_is_error() {
        let backend = Arc::new(MockBackend::new());
        let server = QontinuiMcpServer::new(Dispatcher::new(unauthenticated_client(backend)));
        let response = call(
            &server,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"list_projects","arguments":{}}}"#,
        )
        .await;

        assert_eq!(response["result"]["isError"], true);
        let body: Value =
            serde_json::from_str(response["result"]["content"][0]["text"].as_str().unwrap())
                .unwrap();
        assert_eq!(body["kind"], "auth_error");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_tools_call_bad_params() {
        let server = server_with(Arc::new(MockBackend::new()));
        let response = call(
            &server,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"arguments":{}}}"#,
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_parse_error_has_null_id() {
        let server = server_with(Arc::new(MockBackend::new()));
        let response = call(&server, r#"{"invalid json"#).await;
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert!(response["id"].is_null());
    }

    #[tokio::test]
    async fn test_missing_method_is_invalid_request() {
        let server = server_with(Arc::new(MockBackend::new()));
        let response = call(&server, r#"{"jsonrpc":"2.0","id":6}"#).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_call_answers_with_request_cancelled() {
        let backend = Arc::new(MockBackend::new().with_delay(Duration::from_secs(30)));
        let server = Arc::new(server_with(backend));

        let running = {
            let server = Arc::clone(&server);
            tokio::spawn(async move {
                server
                    .handle_message(
                        r#"{"jsonrpc":"2.0","id":"slow-1","method":"tools/call","params":{"name":"list_projects"}}"#,
                    )
                    .await
            })
        };

        while server.in_flight() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let ack = server
            .handle_message(
                r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":"slow-1","reason":"user"}}"#,
            )
            .await
            .unwrap();
        assert!(ack.is_empty());

        let response: Value = serde_json::from_str(&running.await.unwrap().unwrap()).unwrap();
        assert_eq!(response["id"], "slow-1");
        assert_eq!(response["error"]["code"], REQUEST_CANCELLED);
        assert_eq!(server.in_flight(), 0);
    }
}
