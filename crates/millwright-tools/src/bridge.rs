//! Tool bridge: backend tools as agent-runtime callables
//!
//! Adapts a backend-neutral [`ToolDescriptor`] into an [`AgentTool`]: a
//! strongly-typed, directly callable unit for the agent runtime. Parameter
//! shapes are derived from the descriptor's JSON schema through a mapping
//! table; unrecognized schema types fall back to string.
//!
//! The generated callable always returns a string. Successful invocations
//! render as pretty-printed JSON; every failure, expected or not, becomes
//! an `Error: `-prefixed message. Nothing escapes this boundary as an
//! error or panic, so the agent runtime only ever sees text.

use crate::traits::{Backend, Invocation, ToolDescriptor};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Parameter types the bridge can derive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// String value (also the fallback for unknown schema types)
    String,
    /// Integer value
    Integer,
    /// Floating point value
    Number,
    /// Boolean value
    Boolean,
}

impl ParamType {
    /// JSON schema type string for this parameter type
    pub fn schema_type(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

/// Schema type string -> parameter type, kept as data rather than
/// scattered conditionals; anything not listed maps to String.
pub const PARAM_TYPE_TABLE: &[(&str, ParamType)] = &[
    ("string", ParamType::String),
    ("integer", ParamType::Integer),
    ("number", ParamType::Number),
    ("boolean", ParamType::Boolean),
];

impl ParamType {
    /// Map a JSON schema type string, falling back to String
    pub fn from_schema_type(schema_type: &str) -> Self {
        PARAM_TYPE_TABLE
            .iter()
            .find(|(name, _)| *name == schema_type)
            .map(|(_, param_type)| *param_type)
            .unwrap_or(ParamType::String)
    }
}

/// A derived parameter of a bridged tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Derived type
    pub param_type: ParamType,
    /// Description from the schema
    pub description: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Default applied when an optional parameter is omitted
    pub default: Option<Value>,
}

/// Derive parameter specs from a JSON-schema-like input description
///
/// Each property becomes a named, typed parameter. A property absent from
/// `required` is optional; its default comes from the schema, or null.
pub fn derive_params(input_schema: &Value) -> Vec<ParamSpec> {
    let required: Vec<&str> = input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = input_schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, schema)| {
            let param_type = schema
                .get("type")
                .and_then(Value::as_str)
                .map(ParamType::from_schema_type)
                .unwrap_or(ParamType::String);
            let description = schema
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let is_required = required.contains(&name.as_str());

            ParamSpec {
                name: name.clone(),
                param_type,
                description,
                required: is_required,
                default: schema.get("default").cloned(),
            }
        })
        .collect()
}

/// Handler signature for agent tools: arguments in, rendered string out
pub type AgentToolFn = Arc<dyn Fn(Value) -> BoxFuture<'static, String> + Send + Sync>;

/// A directly callable tool for the agent runtime
pub struct AgentTool {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Derived parameter shape
    pub parameters: Vec<ParamSpec>,
    handler: AgentToolFn,
}

impl AgentTool {
    /// Bridge one backend tool
    pub fn from_descriptor(backend: Arc<dyn Backend>, descriptor: ToolDescriptor) -> Self {
        let parameters = derive_params(&descriptor.input_schema);
        let tool_name = descriptor.name.clone();

        let handler: AgentToolFn = Arc::new(move |args| {
            let backend = backend.clone();
            let tool_name = tool_name.clone();
            Box::pin(async move {
                let outcome = backend.invoke(&tool_name, args).await;
                render_outcome(outcome)
            })
        });

        Self {
            name: descriptor.name,
            description: descriptor.description,
            parameters,
            handler,
        }
    }

    /// Build a tool from an arbitrary string-returning handler
    ///
    /// The handler owns the never-raise contract for whatever it wraps.
    pub fn from_fn(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParamSpec>,
        handler: AgentToolFn,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    /// Call the tool
    ///
    /// Non-object arguments are treated as an empty argument set. Omitted
    /// optional parameters are filled from their defaults before the call
    /// is forwarded. Always returns a string, never an error.
    pub async fn call(&self, args: Value) -> String {
        let mut args = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                debug!(tool = %self.name, args = %other, "Non-object arguments; using empty set");
                Map::new()
            }
        };

        for param in &self.parameters {
            if !param.required && !args.contains_key(&param.name) {
                if let Some(default) = &param.default {
                    args.insert(param.name.clone(), default.clone());
                }
            }
        }

        (self.handler)(Value::Object(args)).await
    }

    /// Rebuild the JSON schema for this tool's parameters
    ///
    /// Used when advertising the tool to an LLM.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(param.param_type.schema_type()));
            if !param.description.is_empty() {
                property.insert("description".to_string(), json!(param.description));
            }
            if let Some(default) = &param.default {
                property.insert("default".to_string(), default.clone());
            }
            properties.insert(param.name.clone(), Value::Object(property));
            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("parameters", &self.parameters.len())
            .finish()
    }
}

impl Clone for AgentTool {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            handler: self.handler.clone(),
        }
    }
}

/// Render an invocation outcome as the bridge's string contract
fn render_outcome(outcome: Invocation) -> String {
    if outcome.is_success() {
        let data = outcome.data.unwrap_or(Value::Null);
        serde_json::to_string_pretty(&data)
            .unwrap_or_else(|_| "Error: unserializable tool result".to_string())
    } else {
        format!(
            "Error: {}",
            outcome
                .error
                .unwrap_or_else(|| "unknown error".to_string())
        )
    }
}

/// Bridge every tool a backend serves
pub async fn bridge_backend(backend: Arc<dyn Backend>) -> Vec<AgentTool> {
    backend
        .list_tools()
        .await
        .into_iter()
        .map(|descriptor| AgentTool::from_descriptor(backend.clone(), descriptor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::registry::ToolSet;
    use crate::traits::BackendInfo;
    use async_trait::async_trait;

    struct FixtureBackend {
        tools: ToolSet,
    }

    impl FixtureBackend {
        fn new() -> Self {
            let mut tools = ToolSet::new("fixture", "Bridge test backend");
            tools.register(
                ToolDescriptor::new(
                    "echo_args",
                    "Echoes its arguments back",
                    json!({
                        "type": "object",
                        "properties": {
                            "a": {"type": "string", "description": "required field"},
                            "b": {"type": "integer", "default": 5}
                        },
                        "required": ["a"]
                    }),
                ),
                Arc::new(|args| Ok(args)),
            );
            tools.register(
                ToolDescriptor::new(
                    "always_fails",
                    "Fails on every call",
                    json!({"type": "object", "properties": {}}),
                ),
                Arc::new(|_| Err(ToolError::validation("synthetic failure"))),
            );
            Self { tools }
        }
    }

    #[async_trait]
    impl Backend for FixtureBackend {
        fn name(&self) -> &str {
            self.tools.name()
        }

        fn description(&self) -> &str {
            self.tools.description()
        }

        async fn list_tools(&self) -> Vec<ToolDescriptor> {
            self.tools.list()
        }

        async fn invoke(&self, tool_name: &str, args: Value) -> Invocation {
            self.tools.invoke(tool_name, args)
        }

        async fn info(&self) -> BackendInfo {
            self.tools.info()
        }
    }

    async fn bridged() -> Vec<AgentTool> {
        bridge_backend(Arc::new(FixtureBackend::new())).await
    }

    #[test]
    fn test_param_type_table_fallback() {
        assert_eq!(ParamType::from_schema_type("integer"), ParamType::Integer);
        assert_eq!(ParamType::from_schema_type("boolean"), ParamType::Boolean);
        assert_eq!(ParamType::from_schema_type("object"), ParamType::String);
        assert_eq!(ParamType::from_schema_type("array"), ParamType::String);
    }

    #[test]
    fn test_derive_params_required_and_defaults() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "integer", "default": 5}
            },
            "required": ["a"]
        });
        let params = derive_params(&schema);
        assert_eq!(params.len(), 2);

        let a = params.iter().find(|p| p.name == "a").unwrap();
        assert!(a.required);
        assert!(a.default.is_none());

        let b = params.iter().find(|p| p.name == "b").unwrap();
        assert!(!b.required);
        assert_eq!(b.default, Some(json!(5)));
        assert_eq!(b.param_type, ParamType::Integer);
    }

    #[tokio::test]
    async fn test_omitted_default_equals_explicit_value() {
        let tools = bridged().await;
        let echo = tools.iter().find(|t| t.name == "echo_args").unwrap();

        let implicit = echo.call(json!({"a": "x"})).await;
        let explicit = echo.call(json!({"a": "x", "b": 5})).await;
        assert_eq!(implicit, explicit);
        assert!(implicit.contains("\"b\": 5"));
    }

    #[tokio::test]
    async fn test_success_renders_pretty_json() {
        let tools = bridged().await;
        let echo = tools.iter().find(|t| t.name == "echo_args").unwrap();

        let rendered = echo.call(json!({"a": "hello"})).await;
        assert!(rendered.contains("\"a\": \"hello\""));
        assert!(!rendered.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_failure_renders_error_string() {
        let tools = bridged().await;
        let failing = tools.iter().find(|t| t.name == "always_fails").unwrap();

        let rendered = failing.call(json!({})).await;
        assert!(rendered.starts_with("Error:"));
        assert!(rendered.contains("synthetic failure"));
    }

    #[tokio::test]
    async fn test_unknown_tool_via_backend_still_a_string() {
        let backend: Arc<dyn Backend> = Arc::new(FixtureBackend::new());
        let ghost = AgentTool::from_descriptor(
            backend,
            ToolDescriptor::new("ghost", "not registered", json!({"type": "object"})),
        );

        let rendered = ghost.call(json!({})).await;
        assert!(rendered.starts_with("Error:"));
        assert!(rendered.contains("ghost"));
    }

    #[tokio::test]
    async fn test_non_object_args_treated_as_empty() {
        let tools = bridged().await;
        let failing = tools.iter().find(|t| t.name == "always_fails").unwrap();
        let rendered = failing.call(json!("not an object")).await;
        assert!(rendered.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_input_schema_round_trip() {
        let tools = bridged().await;
        let echo = tools.iter().find(|t| t.name == "echo_args").unwrap();

        let schema = echo.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["b"]["default"], 5);
        assert_eq!(schema["required"], json!(["a"]));
    }
}
