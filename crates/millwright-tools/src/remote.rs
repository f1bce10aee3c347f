//! Remote MCP tool server client
//!
//! Bridges to one real, network-accessible MCP server over a
//! streamable-HTTP JSON-RPC transport with bearer-token authentication.
//!
//! Connection sessions are short-lived: every discovery and every
//! invocation opens a fresh [`McpSession`], re-runs the initialize
//! handshake, issues its one request, and drops the session. There is no
//! pooling, no retry, and no backoff anywhere in this module; a failed
//! call surfaces immediately as a classified [`RemoteError`] so the caller
//! can decide whether a connection-level fault is worth retrying.
//!
//! A failed refresh preserves the last-known-good discovered tool set:
//! the cache is only replaced after a successful `tools/list` response.

use crate::error::{RemoteError, RemoteResult};
use crate::traits::{Backend, BackendInfo, Invocation, ToolDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use millwright_core::config::RemoteSettings;
use millwright_core::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use millwright_core::{
    TimeProvider, MCP_PROTOCOL_VERSION, REMOTE_CONNECT_TIMEOUT_MS_DEFAULT,
    REMOTE_READ_TIMEOUT_MS_DEFAULT, REMOTE_TOOL_CACHE_TTL_MS_DEFAULT,
};

/// Backend name the remote adapter reports
pub const REMOTE_BACKEND_NAME: &str = "plant-hub";

/// Backend description the remote adapter reports
const REMOTE_BACKEND_DESCRIPTION: &str = "Remote plant intelligence hub (MCP)";

// ============================================================================
// Configuration
// ============================================================================

/// Connection settings for the remote MCP server
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Streamable-HTTP endpoint
    pub url: String,
    /// Optional bearer token
    pub bearer_token: Option<String>,
    /// Connect/handshake timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout for long-lived streaming reads in milliseconds
    pub read_timeout_ms: u64,
}

impl RemoteConfig {
    /// Create a configuration with default timeouts
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bearer_token: None,
            connect_timeout_ms: REMOTE_CONNECT_TIMEOUT_MS_DEFAULT,
            read_timeout_ms: REMOTE_READ_TIMEOUT_MS_DEFAULT,
        }
    }

    /// Build from the workspace configuration section
    pub fn from_settings(settings: &RemoteSettings) -> Self {
        Self {
            url: settings.url.clone(),
            bearer_token: settings.bearer_token.clone(),
            connect_timeout_ms: settings.connect_timeout_ms,
            read_timeout_ms: settings.read_timeout_ms,
        }
    }

    /// Set the bearer token
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Connect timeout as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Read timeout as a duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// A tool discovered from the remote server
///
/// Mirrors [`ToolDescriptor`] but is populated by the network handshake
/// rather than local registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveredTool {
    /// Tool name
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: String,
    /// Input schema (JSON Schema)
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

impl DiscoveredTool {
    /// Convert into the common descriptor shape
    pub fn to_descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(&self.name, &self.description, self.input_schema.clone())
    }
}

/// A content item from a tool-call response
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    /// Plain text content
    Text {
        text: String,
    },
    /// Base64 image content
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    /// Embedded resource reference
    Resource {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Serialize)]
struct RpcNotification<'a> {
    jsonrpc: &'static str,
    method: &'a str,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

// ============================================================================
// Session
// ============================================================================

/// One short-lived transport session
///
/// Owned exclusively by the call that opened it and dropped unconditionally
/// at the end of that call, success or failure.
struct McpSession {
    http: Arc<dyn HttpClient>,
    config: RemoteConfig,
    session_id: Option<String>,
    next_id: u64,
}

impl McpSession {
    /// Open a session: initialize handshake + initialized notification
    async fn open(http: Arc<dyn HttpClient>, config: RemoteConfig) -> RemoteResult<Self> {
        let mut session = Self {
            http,
            config,
            session_id: None,
            next_id: 1,
        };

        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "millwright",
                "version": env!("CARGO_PKG_VERSION"),
            },
        });
        let timeout = session.config.connect_timeout();
        let response = session.send_rpc("initialize", params, timeout).await?;
        if let Some(id) = response.header("mcp-session-id") {
            session.session_id = Some(id.to_string());
        }
        let payload = extract_payload(&response)?;
        check_rpc_result(payload)?;

        session.notify("notifications/initialized").await?;
        Ok(session)
    }

    /// Issue a request and return its JSON-RPC result
    async fn request(
        &mut self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> RemoteResult<Value> {
        let response = self.send_rpc(method, params, timeout).await?;
        let payload = extract_payload(&response)?;
        check_rpc_result(payload)
    }

    async fn send_rpc(
        &mut self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> RemoteResult<HttpResponse> {
        let id = self.next_id;
        self.next_id += 1;

        let body = serde_json::to_value(RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        })
        .map_err(|e| RemoteError::server(format!("failed to encode request: {e}")))?;

        let response = self
            .http
            .execute(self.base_request(&body, timeout))
            .await
            .map_err(classify)?;
        if !response.is_success() {
            return Err(RemoteError::server(format!(
                "{method} returned HTTP {}",
                response.status
            )));
        }
        Ok(response)
    }

    async fn notify(&mut self, method: &str) -> RemoteResult<()> {
        let body = serde_json::to_value(RpcNotification {
            jsonrpc: "2.0",
            method,
        })
        .map_err(|e| RemoteError::server(format!("failed to encode notification: {e}")))?;

        let response = self
            .http
            .execute(self.base_request(&body, self.config.connect_timeout()))
            .await
            .map_err(classify)?;
        if !response.is_success() {
            return Err(RemoteError::server(format!(
                "{method} returned HTTP {}",
                response.status
            )));
        }
        Ok(())
    }

    fn base_request(&self, body: &Value, timeout: Duration) -> HttpRequest {
        let mut request = HttpRequest::post(&self.config.url)
            .with_header("Accept", "application/json, text/event-stream")
            .with_json_body(body)
            .with_timeout(timeout);
        if let Some(token) = &self.config.bearer_token {
            request = request.with_header("Authorization", format!("Bearer {token}"));
        }
        if let Some(session_id) = &self.session_id {
            request = request.with_header("Mcp-Session-Id", session_id.clone());
        }
        request
    }
}

/// Map transport errors onto the remote taxonomy
fn classify(err: HttpError) -> RemoteError {
    if err.is_connection() {
        RemoteError::connection(err.to_string())
    } else {
        RemoteError::server(err.to_string())
    }
}

/// Unwrap a response body into its JSON payload
///
/// Streamable-HTTP servers may answer with a plain JSON document or with
/// SSE frames; for the latter the last `data:` line carries the payload.
fn extract_payload(response: &HttpResponse) -> RemoteResult<Value> {
    let trimmed = response.body.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| RemoteError::server(format!("invalid JSON response: {e}")));
    }

    let data = trimmed
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .ok_or_else(|| RemoteError::server("no JSON payload in response"))?;
    serde_json::from_str(data)
        .map_err(|e| RemoteError::server(format!("invalid JSON in event stream: {e}")))
}

/// Check a JSON-RPC envelope and return its result
fn check_rpc_result(payload: Value) -> RemoteResult<Value> {
    if payload.is_null() {
        return Ok(Value::Null);
    }
    let envelope: RpcResponse = serde_json::from_value(payload)
        .map_err(|e| RemoteError::server(format!("invalid JSON-RPC envelope: {e}")))?;
    if let Some(error) = envelope.error {
        return Err(RemoteError::server(format!(
            "JSON-RPC error {}: {}",
            error.code, error.message
        )));
    }
    Ok(envelope.result.unwrap_or(Value::Null))
}

// ============================================================================
// Remote tool server
// ============================================================================

/// Client for one remote MCP tool server
pub struct RemoteToolServer {
    config: RemoteConfig,
    http: Arc<dyn HttpClient>,
    discovered: RwLock<Vec<DiscoveredTool>>,
    connected: AtomicBool,
}

impl RemoteToolServer {
    /// Create a client; no network I/O happens until `discover`
    pub fn new(config: RemoteConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http,
            discovered: RwLock::new(Vec::new()),
            connected: AtomicBool::new(false),
        }
    }

    /// Whether the last discovery attempt succeeded
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// The last-discovered tool set
    pub async fn discovered_tools(&self) -> Vec<DiscoveredTool> {
        self.discovered.read().await.clone()
    }

    /// Connect, handshake, and replace the cached tool set
    ///
    /// The cached set is written only after a successful listing, so a
    /// failed refresh keeps the last-known-good tools. Failure marks the
    /// client disconnected, which makes the caching manager re-discover
    /// on the next use.
    pub async fn discover(&self) -> RemoteResult<Vec<DiscoveredTool>> {
        info!(url = %self.config.url, "Discovering remote tools");

        let result = self.discover_inner().await;
        match &result {
            Ok(tools) => {
                self.connected.store(true, Ordering::SeqCst);
                info!(tool_count = tools.len(), "Remote tools discovered");
            }
            Err(err) => {
                self.connected.store(false, Ordering::SeqCst);
                warn!(error = %err, kind = err.kind(), "Remote discovery failed");
            }
        }
        result
    }

    async fn discover_inner(&self) -> RemoteResult<Vec<DiscoveredTool>> {
        let mut session = McpSession::open(self.http.clone(), self.config.clone()).await?;
        let result = session
            .request("tools/list", json!({}), self.config.read_timeout())
            .await?;

        let tools: Vec<DiscoveredTool> = result
            .get("tools")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        // Full replace, not merge.
        *self.discovered.write().await = tools.clone();
        Ok(tools)
    }

    /// Call a tool on the remote server
    ///
    /// Refuses names absent from the last-discovered set before any
    /// network I/O; it does not auto-discover first.
    pub async fn call_tool(&self, name: &str, args: Value) -> RemoteResult<Vec<ContentItem>> {
        {
            let discovered = self.discovered.read().await;
            if !discovered.iter().any(|t| t.name == name) {
                return Err(RemoteError::ToolNotFound {
                    name: name.to_string(),
                    available: discovered.iter().map(|t| t.name.clone()).collect(),
                });
            }
        }

        debug!(tool = %name, "Calling remote tool");
        let mut session = McpSession::open(self.http.clone(), self.config.clone()).await?;
        let result = session
            .request(
                "tools/call",
                json!({"name": name, "arguments": args}),
                self.config.read_timeout(),
            )
            .await?;

        Ok(parse_content(&result))
    }

    /// All discovered tools as descriptors, in discovery order
    pub async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.discovered
            .read()
            .await
            .iter()
            .map(DiscoveredTool::to_descriptor)
            .collect()
    }

    /// Server metadata
    pub async fn server_info(&self) -> BackendInfo {
        let tools = self
            .discovered
            .read()
            .await
            .iter()
            .map(|t| t.name.clone())
            .collect();
        BackendInfo::new(REMOTE_BACKEND_NAME, REMOTE_BACKEND_DESCRIPTION, tools)
    }
}

/// Map structured response content into the uniform item list
fn parse_content(result: &Value) -> Vec<ContentItem> {
    let Some(items) = result.get("content").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item.get("type").and_then(Value::as_str) {
            Some("text") => Some(ContentItem::Text {
                text: item
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            Some("image") => Some(ContentItem::Image {
                data: item
                    .get("data")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                mime_type: item
                    .get("mimeType")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            Some("resource") => {
                let resource = item.get("resource").cloned().unwrap_or(Value::Null);
                Some(ContentItem::Resource {
                    uri: resource
                        .get("uri")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    text: resource
                        .get("text")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            }
            other => {
                debug!(content_type = ?other, "Skipping unsupported content item");
                None
            }
        })
        .collect()
}

// ============================================================================
// Backend adapter
// ============================================================================

/// Adapts the remote client to the common [`Backend`] surface
///
/// Typed remote errors become failure invocations here so the bridge sees
/// the same contract from every backend.
pub struct RemoteBackend {
    server: Arc<RemoteToolServer>,
}

impl RemoteBackend {
    /// Wrap a remote server
    pub fn new(server: Arc<RemoteToolServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    fn name(&self) -> &str {
        REMOTE_BACKEND_NAME
    }

    fn description(&self) -> &str {
        REMOTE_BACKEND_DESCRIPTION
    }

    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.server.list_tools().await
    }

    async fn invoke(&self, tool_name: &str, args: Value) -> Invocation {
        match self.server.call_tool(tool_name, args).await {
            Ok(items) => match serde_json::to_value(&items) {
                Ok(content) => Invocation::success(json!({ "content": content })),
                Err(e) => Invocation::failure_with_kind(
                    format!("unserializable tool content: {e}"),
                    "server",
                ),
            },
            Err(err) => Invocation::failure_with_kind(err.to_string(), err.kind()),
        }
    }

    async fn info(&self) -> BackendInfo {
        self.server.server_info().await
    }
}

// ============================================================================
// Caching manager
// ============================================================================

/// TTL cache over remote tool discovery
///
/// Serves the wrapped client untouched unless the caller forces a refresh,
/// the client has never successfully connected, or the TTL has lapsed; in
/// those cases a fresh `discover()` runs before returning. Concurrent
/// callers racing an expired cache may both trigger discovery; there is no
/// single-flight de-duplication.
pub struct CachedRemote {
    server: Arc<RemoteToolServer>,
    time: Arc<dyn TimeProvider>,
    ttl_ms: u64,
    last_discovery_ms: RwLock<Option<u64>>,
}

impl CachedRemote {
    /// Wrap a remote server with the default 5-minute TTL
    pub fn new(server: Arc<RemoteToolServer>, time: Arc<dyn TimeProvider>) -> Self {
        Self {
            server,
            time,
            ttl_ms: REMOTE_TOOL_CACHE_TTL_MS_DEFAULT,
            last_discovery_ms: RwLock::new(None),
        }
    }

    /// Override the cache TTL
    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// Get the server, discovering first when the cache cannot be trusted
    pub async fn get(&self, force_refresh: bool) -> RemoteResult<Arc<RemoteToolServer>> {
        let expired = {
            let last = self.last_discovery_ms.read().await;
            match *last {
                None => true,
                Some(at_ms) => self.time.now_ms().saturating_sub(at_ms) > self.ttl_ms,
            }
        };

        if force_refresh || !self.server.is_connected() || expired {
            self.server.discover().await?;
            *self.last_discovery_ms.write().await = Some(self.time.now_ms());
        }

        Ok(self.server.clone())
    }

    /// Force a refresh and return the discovered tools
    pub async fn refresh(&self) -> RemoteResult<Vec<DiscoveredTool>> {
        let server = self.get(true).await?;
        Ok(server.discovered_tools().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millwright_core::http::HttpResult;
    use millwright_core::ManualClock;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Fake transport: replays scripted responses and records requests
    struct ScriptedHttp {
        requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<VecDeque<HttpResult<HttpResponse>>>,
    }

    impl ScriptedHttp {
        fn new(responses: Vec<HttpResult<HttpResponse>>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request_at(&self, index: usize) -> HttpRequest {
            self.requests.lock().unwrap()[index].clone()
        }

        fn push_responses(&self, responses: Vec<HttpResult<HttpResponse>>) {
            self.responses.lock().unwrap().extend(responses);
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttp {
        async fn execute(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(HttpError::RequestFailed {
                        reason: "no scripted response".to_string(),
                    })
                })
        }
    }

    fn rpc_ok(id: u64, result: Value) -> HttpResult<HttpResponse> {
        Ok(HttpResponse::new(
            200,
            json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string(),
        ))
    }

    fn initialize_ok() -> HttpResult<HttpResponse> {
        Ok(HttpResponse::new(
            200,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {"protocolVersion": MCP_PROTOCOL_VERSION}
            })
            .to_string(),
        )
        .with_header("Mcp-Session-Id", "session-abc"))
    }

    fn notification_ok() -> HttpResult<HttpResponse> {
        Ok(HttpResponse::new(202, ""))
    }

    fn tools_list_ok(names: &[&str]) -> HttpResult<HttpResponse> {
        let tools: Vec<Value> = names
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "description": format!("remote tool {name}"),
                    "inputSchema": {"type": "object", "properties": {}}
                })
            })
            .collect();
        rpc_ok(2, json!({ "tools": tools }))
    }

    fn server_with(http: Arc<ScriptedHttp>) -> RemoteToolServer {
        RemoteToolServer::new(
            RemoteConfig::new("http://localhost:45345/mcp").with_bearer_token("secret"),
            http,
        )
    }

    #[tokio::test]
    async fn test_discover_populates_tools_and_sends_bearer() {
        let http = ScriptedHttp::new(vec![
            initialize_ok(),
            notification_ok(),
            tools_list_ok(&["get_tag_value", "browse_tags"]),
        ]);
        let server = server_with(http.clone());

        let tools = server.discover().await.unwrap();
        assert_eq!(tools.len(), 2);
        assert!(server.is_connected());
        assert_eq!(http.request_count(), 3);

        let init = http.request_at(0);
        assert_eq!(
            init.headers.get("Authorization").map(String::as_str),
            Some("Bearer secret")
        );
        // Session id captured from initialize is carried on later requests
        let list = http.request_at(2);
        assert_eq!(
            list.headers.get("Mcp-Session-Id").map(String::as_str),
            Some("session-abc")
        );
    }

    #[tokio::test]
    async fn test_discover_connect_failure_classified() {
        let http = ScriptedHttp::new(vec![Err(HttpError::ConnectionFailed {
            reason: "connection refused".to_string(),
        })]);
        let server = server_with(http);

        let err = server.discover().await.unwrap_err();
        assert!(matches!(err, RemoteError::Connection { .. }));
        assert!(!server.is_connected());
    }

    #[tokio::test]
    async fn test_discover_protocol_failure_classified_as_server() {
        let http = ScriptedHttp::new(vec![
            initialize_ok(),
            notification_ok(),
            Ok(HttpResponse::new(500, "internal error")),
        ]);
        let server = server_with(http);

        let err = server.discover().await.unwrap_err();
        assert!(matches!(err, RemoteError::Server { .. }));
    }

    #[tokio::test]
    async fn test_invoke_undiscovered_tool_makes_no_network_call() {
        let http = ScriptedHttp::new(vec![]);
        let server = server_with(http.clone());

        let err = server.call_tool("get_tag_value", json!({})).await.unwrap_err();
        assert!(matches!(err, RemoteError::ToolNotFound { .. }));
        assert_eq!(http.request_count(), 0, "no network side effect expected");
    }

    #[tokio::test]
    async fn test_invoke_opens_fresh_session_and_maps_content() {
        let http = ScriptedHttp::new(vec![
            initialize_ok(),
            notification_ok(),
            tools_list_ok(&["get_tag_value"]),
        ]);
        let server = server_with(http.clone());
        server.discover().await.unwrap();

        http.push_responses(vec![
            initialize_ok(),
            notification_ok(),
            rpc_ok(
                2,
                json!({
                    "content": [
                        {"type": "text", "text": "72.4"},
                        {"type": "image", "data": "aGk=", "mimeType": "image/png"},
                        {"type": "resource", "resource": {"uri": "tag://temp", "text": "Temp"}},
                        {"type": "audio", "data": "ignored"}
                    ]
                }),
            ),
        ]);

        let items = server
            .call_tool("get_tag_value", json!({"tag_id": "temp"}))
            .await
            .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            ContentItem::Text {
                text: "72.4".to_string()
            }
        );
        assert!(matches!(items[1], ContentItem::Image { .. }));
        assert!(matches!(items[2], ContentItem::Resource { .. }));
        // 3 requests for discovery + 3 for the call: no session reuse
        assert_eq!(http.request_count(), 6);
    }

    #[tokio::test]
    async fn test_failed_refresh_preserves_tools() {
        let http = ScriptedHttp::new(vec![
            initialize_ok(),
            notification_ok(),
            tools_list_ok(&["get_tag_value"]),
        ]);
        let server = server_with(http.clone());
        server.discover().await.unwrap();
        assert_eq!(server.discovered_tools().await.len(), 1);

        http.push_responses(vec![Err(HttpError::Timeout { timeout_ms: 30_000 })]);
        let err = server.discover().await.unwrap_err();
        assert!(matches!(err, RemoteError::Connection { .. }));

        // Last-known-good set survives the failed refresh.
        assert_eq!(server.discovered_tools().await.len(), 1);
        assert!(!server.is_connected());
    }

    #[tokio::test]
    async fn test_sse_payload_unwrapped() {
        let body = format!(
            "event: message\ndata: {}\n\n",
            json!({"jsonrpc": "2.0", "id": 2, "result": {"tools": []}})
        );
        let http = ScriptedHttp::new(vec![
            initialize_ok(),
            notification_ok(),
            Ok(HttpResponse::new(200, body)),
        ]);
        let server = server_with(http);

        let tools = server.discover().await.unwrap();
        assert!(tools.is_empty());
    }

    #[tokio::test]
    async fn test_cached_remote_discovers_once_within_ttl() {
        let http = ScriptedHttp::new(vec![
            initialize_ok(),
            notification_ok(),
            tools_list_ok(&["get_tag_value"]),
        ]);
        let server = Arc::new(server_with(http.clone()));
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = CachedRemote::new(server, clock.clone());

        cache.get(false).await.unwrap();
        assert_eq!(http.request_count(), 3);

        // Within TTL: served from cache, no new requests.
        clock.advance_ms(60_000);
        cache.get(false).await.unwrap();
        assert_eq!(http.request_count(), 3);
    }

    #[tokio::test]
    async fn test_cached_remote_refreshes_after_ttl() {
        let http = ScriptedHttp::new(vec![
            initialize_ok(),
            notification_ok(),
            tools_list_ok(&["get_tag_value"]),
        ]);
        let server = Arc::new(server_with(http.clone()));
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = CachedRemote::new(server, clock.clone());

        cache.get(false).await.unwrap();
        clock.advance_ms(REMOTE_TOOL_CACHE_TTL_MS_DEFAULT + 1);

        http.push_responses(vec![
            initialize_ok(),
            notification_ok(),
            tools_list_ok(&["get_tag_value", "browse_tags"]),
        ]);
        let server = cache.get(false).await.unwrap();
        assert_eq!(http.request_count(), 6);
        assert_eq!(server.discovered_tools().await.len(), 2);
    }

    #[tokio::test]
    async fn test_cached_remote_force_refresh() {
        let http = ScriptedHttp::new(vec![
            initialize_ok(),
            notification_ok(),
            tools_list_ok(&["get_tag_value"]),
        ]);
        let server = Arc::new(server_with(http.clone()));
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = CachedRemote::new(server, clock);

        cache.get(false).await.unwrap();
        http.push_responses(vec![
            initialize_ok(),
            notification_ok(),
            tools_list_ok(&["get_tag_value"]),
        ]);
        cache.get(true).await.unwrap();
        assert_eq!(http.request_count(), 6);
    }

    #[tokio::test]
    async fn test_remote_backend_flattens_errors_to_invocations() {
        let http = ScriptedHttp::new(vec![]);
        let server = Arc::new(server_with(http));
        let backend = RemoteBackend::new(server);

        let outcome = backend.invoke("nope", json!({})).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind.as_deref(), Some("not_found"));
    }
}
