//! Named limits and defaults for Millwright
//!
//! TigerStyle: explicit bounds with unit-suffixed, big-endian names.

/// Protocol version reported in backend metadata
pub const PROTOCOL_VERSION: &str = "1.0";

/// MCP wire protocol version used in the remote handshake
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Default connect timeout for the remote MCP server (30 seconds)
pub const REMOTE_CONNECT_TIMEOUT_MS_DEFAULT: u64 = 30_000;

/// Default read timeout for long-lived streaming reads (5 minutes)
pub const REMOTE_READ_TIMEOUT_MS_DEFAULT: u64 = 300_000;

/// Default time-to-live for the discovered remote tool set (5 minutes)
pub const REMOTE_TOOL_CACHE_TTL_MS_DEFAULT: u64 = 300_000;

/// Maximum tools a single tool set will accept
pub const TOOLSET_TOOLS_COUNT_MAX: usize = 1000;

/// Hard cap on synthetic work-order query results, regardless of the
/// requested limit (preserved from the system this simulates)
pub const WORK_ORDER_RESULTS_COUNT_MAX: usize = 20;

/// Default number of retrieval results returned by a search tool
pub const SEARCH_RESULTS_COUNT_DEFAULT: usize = 4;

/// Maximum LLM round trips per agent task
pub const AGENT_TURNS_COUNT_MAX: usize = 8;

/// Maximum HTTP response body accepted from any transport (10MB)
pub const HTTP_RESPONSE_BYTES_MAX: u64 = 10 * 1024 * 1024;

/// Default HTTP request timeout (30 seconds)
pub const HTTP_TIMEOUT_MS_DEFAULT: u64 = 30_000;
