//! Millwright Core
//!
//! Shared types, errors, and constants for the Millwright manufacturing
//! operations agent.
//!
//! # Overview
//!
//! Millwright answers manufacturing-operations questions by routing an LLM
//! orchestrator onto named tools served by mock and real MCP backends. This
//! crate holds everything those layers share:
//!
//! - Error types and the workspace `Result` alias
//! - Configuration loaded from the environment
//! - I/O abstraction (time + randomness) so synthetic-data generators and
//!   cache clocks are injectable in tests
//! - HTTP client abstraction so network transports are swappable
//! - Telemetry (tracing subscriber) initialization

pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod io;
pub mod telemetry;

pub use config::MillwrightConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use http::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResult};
pub use io::{IoContext, ManualClock, RngProvider, SystemRng, TimeProvider, WallClock};
pub use telemetry::{init_telemetry, TelemetryConfig};
