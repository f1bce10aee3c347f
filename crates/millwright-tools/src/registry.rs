//! Tool set: the per-backend registry
//!
//! TigerStyle: centralized tool management with explicit lifecycle.
//!
//! A [`ToolSet`] owns the tools of one logical backend. It is populated at
//! backend construction and never mutated afterwards. Listing preserves
//! registration order; re-registering a name replaces the handler in place
//! (last registration wins). `invoke` converts every failure into a tagged
//! result rather than propagating it.

use crate::error::ToolError;
use crate::traits::{BackendInfo, Invocation, ToolDescriptor, ToolHandler};
use serde_json::Value;
use tracing::{debug, warn};

use millwright_core::TOOLSET_TOOLS_COUNT_MAX;

struct ToolEntry {
    descriptor: ToolDescriptor,
    handler: ToolHandler,
}

/// Ordered collection of named tools for one backend
pub struct ToolSet {
    name: String,
    description: String,
    entries: Vec<ToolEntry>,
}

impl ToolSet {
    /// Create an empty tool set for the named backend
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            entries: Vec::new(),
        }
    }

    /// Backend name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Register a tool
    ///
    /// A duplicate name overwrites the existing entry in place, keeping
    /// its original position in the listing order.
    pub fn register(&mut self, descriptor: ToolDescriptor, handler: ToolHandler) {
        assert!(
            self.entries.len() < TOOLSET_TOOLS_COUNT_MAX,
            "tool set is at capacity"
        );

        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.descriptor.name == descriptor.name)
        {
            warn!(tool = %descriptor.name, backend = %self.name, "Re-registering tool; last registration wins");
            existing.descriptor = descriptor;
            existing.handler = handler;
            return;
        }

        debug!(tool = %descriptor.name, backend = %self.name, "Registering tool");
        self.entries.push(ToolEntry {
            descriptor,
            handler,
        });
    }

    /// All tool definitions in registration order
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    /// Names of all registered tools, in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.descriptor.name.clone())
            .collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke a tool by name
    ///
    /// Unknown names and handler errors both come back as failure results;
    /// this method never propagates an error.
    pub fn invoke(&self, tool_name: &str, args: Value) -> Invocation {
        let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.descriptor.name == tool_name)
        else {
            let err = ToolError::NotFound {
                name: tool_name.to_string(),
                available: self.tool_names(),
            };
            debug!(tool = %tool_name, backend = %self.name, "Tool not found");
            return Invocation::failure(&err);
        };

        match (entry.handler)(args) {
            Ok(data) => Invocation::success(data),
            Err(err) => {
                debug!(tool = %tool_name, backend = %self.name, error = %err, "Tool handler failed");
                Invocation::failure(&err)
            }
        }
    }

    /// Backend metadata
    pub fn info(&self) -> BackendInfo {
        BackendInfo::new(&self.name, &self.description, self.tool_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn echo_set() -> ToolSet {
        let mut tools = ToolSet::new("echo-backend", "Echoes things back");
        tools.register(
            ToolDescriptor::new(
                "echo",
                "Echo the arguments",
                json!({"type": "object", "properties": {"message": {"type": "string"}}}),
            ),
            Arc::new(|args| Ok(args)),
        );
        tools.register(
            ToolDescriptor::new(
                "fail",
                "Always fails",
                json!({"type": "object", "properties": {}}),
            ),
            Arc::new(|_| Err(ToolError::validation("always fails"))),
        );
        tools
    }

    #[test]
    fn test_list_matches_registration_order() {
        let tools = echo_set();
        let names: Vec<String> = tools.list().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["echo", "fail"]);
    }

    #[test]
    fn test_invoke_success() {
        let tools = echo_set();
        let outcome = tools.invoke("echo", json!({"message": "hello"}));
        assert!(outcome.is_success());
        assert_eq!(outcome.data.unwrap()["message"], "hello");
    }

    #[test]
    fn test_invoke_unknown_tool_names_available() {
        let tools = echo_set();
        let outcome = tools.invoke("bogus", json!({}));
        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind.as_deref(), Some("not_found"));
        let error = outcome.error.unwrap();
        assert!(error.contains("bogus"));
        assert!(error.contains("echo"));
        assert!(error.contains("fail"));
    }

    #[test]
    fn test_invoke_handler_error_is_contained() {
        let tools = echo_set();
        let outcome = tools.invoke("fail", json!({}));
        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind.as_deref(), Some("validation"));
    }

    #[test]
    fn test_reregistration_last_wins_keeps_position() {
        let mut tools = echo_set();
        tools.register(
            ToolDescriptor::new("echo", "Replaced", json!({"type": "object"})),
            Arc::new(|_| Ok(json!("replaced"))),
        );

        let names: Vec<String> = tools.list().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["echo", "fail"]);

        let outcome = tools.invoke("echo", json!({}));
        assert_eq!(outcome.data.unwrap(), json!("replaced"));
        assert_eq!(tools.list()[0].description, "Replaced");
    }

    #[test]
    fn test_info() {
        let tools = echo_set();
        let info = tools.info();
        assert_eq!(info.name, "echo-backend");
        assert_eq!(info.tools, vec!["echo", "fail"]);
        assert_eq!(info.protocol_version, "1.0");
    }
}
