//! Equipment telemetry simulator
//!
//! Simulates OPC-UA style plant data: current tag values, historical time
//! series at a fixed sampling interval, and equipment status with a
//! correlated health score. Equipment ids and tag names are validated
//! against a static map; everything else is randomized per call within
//! per-tag value ranges.

use crate::backends::{now_utc, round2};
use crate::error::ToolError;
use crate::registry::ToolSet;
use crate::traits::{Backend, BackendInfo, Invocation, ToolDescriptor};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use millwright_core::{IoContext, RngProvider};

/// Backend name
pub const TELEMETRY_BACKEND_NAME: &str = "telemetry-sim";

/// Equipment id -> valid tag names
const EQUIPMENT: &[(&str, &[&str])] = &[
    ("CNC-Machine-1", &["Temperature", "Speed", "Vibration", "Status"]),
    ("CNC-Machine-2", &["Temperature", "Speed", "Vibration", "Status"]),
    ("CNC-Machine-3", &["Temperature", "Speed", "Vibration", "Status"]),
    ("Conveyor-A", &["Speed", "Load", "Status"]),
    ("Conveyor-B", &["Speed", "Load", "Status"]),
    ("Press-1", &["Force", "Temperature", "CycleCount", "Status"]),
];

/// Tag -> simulated value range
const TAG_VALUE_RANGES: &[(&str, f64, f64)] = &[
    ("Temperature", 65.0, 85.0),
    ("Speed", 1200.0, 2400.0),
    ("Vibration", 0.1, 1.5),
    ("Load", 20.0, 80.0),
    ("Force", 5000.0, 15000.0),
    ("CycleCount", 100.0, 1000.0),
    ("Status", 0.0, 1.0),
];

/// Tag -> engineering unit
const TAG_UNITS: &[(&str, &str)] = &[
    ("Temperature", "°F"),
    ("Speed", "RPM"),
    ("Vibration", "mm/s"),
    ("Load", "%"),
    ("Force", "lbs"),
    ("CycleCount", "cycles"),
    ("Status", "boolean"),
];

/// Weighted status set: Running is three times as likely as either other
const STATUS_CHOICES: &[&str] = &["Running", "Running", "Running", "Idle", "Maintenance"];

/// Simulated equipment telemetry backend
pub struct TelemetryBackend {
    tools: ToolSet,
}

impl TelemetryBackend {
    /// Construct the backend and register its four tools
    pub fn new(io: IoContext) -> Self {
        let mut tools = ToolSet::new(
            TELEMETRY_BACKEND_NAME,
            "Simulated plant telemetry hub for real-time and historical equipment data",
        );

        let io_realtime = io.clone();
        tools.register(
            ToolDescriptor::new(
                "get_realtime_data",
                "Get current real-time value for an equipment tag",
                json!({
                    "type": "object",
                    "properties": {
                        "equipment_id": {
                            "type": "string",
                            "description": "Equipment identifier (e.g., 'CNC-Machine-1')"
                        },
                        "tag_name": {
                            "type": "string",
                            "description": "Tag name (e.g., 'Temperature', 'Speed')"
                        }
                    },
                    "required": ["equipment_id", "tag_name"]
                }),
            ),
            Arc::new(move |args| realtime_data(&io_realtime, args)),
        );

        let io_series = io.clone();
        tools.register(
            ToolDescriptor::new(
                "query_timeseries",
                "Query historical time-series data for a tag",
                json!({
                    "type": "object",
                    "properties": {
                        "equipment_id": {"type": "string"},
                        "tag_name": {"type": "string"},
                        "start_time": {
                            "type": "string",
                            "description": "ISO format datetime (e.g., '2024-12-07T10:00:00')"
                        },
                        "end_time": {
                            "type": "string",
                            "description": "ISO format datetime"
                        },
                        "interval_seconds": {
                            "type": "integer",
                            "description": "Data point interval in seconds",
                            "default": 60
                        }
                    },
                    "required": ["equipment_id", "tag_name", "start_time", "end_time"]
                }),
            ),
            Arc::new(move |args| query_timeseries(&io_series, args)),
        );

        let io_status = io.clone();
        tools.register(
            ToolDescriptor::new(
                "get_equipment_status",
                "Get current status and health of equipment",
                json!({
                    "type": "object",
                    "properties": {
                        "equipment_id": {"type": "string"}
                    },
                    "required": ["equipment_id"]
                }),
            ),
            Arc::new(move |args| equipment_status(&io_status, args)),
        );

        tools.register(
            ToolDescriptor::new(
                "list_equipment",
                "List all available equipment and their tags",
                json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
            Arc::new(|_| Ok(list_equipment())),
        );

        Self { tools }
    }
}

#[async_trait]
impl Backend for TelemetryBackend {
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

// ============================================================================
// Handlers
// ============================================================================

fn tags_for(equipment_id: &str) -> Result<&'static [&'static str], ToolError> {
    EQUIPMENT
        .iter()
        .find(|(id, _)| *id == equipment_id)
        .map(|(_, tags)| *tags)
        .ok_or_else(|| ToolError::validation(format!("unknown equipment: {equipment_id}")))
}

fn validate_tag(equipment_id: &str, tag_name: &str) -> Result<(), ToolError> {
    let tags = tags_for(equipment_id)?;
    if !tags.contains(&tag_name) {
        return Err(ToolError::validation(format!(
            "unknown tag '{tag_name}' for equipment '{equipment_id}'"
        )));
    }
    Ok(())
}

fn generate_tag_value(rng: &dyn RngProvider, tag_name: &str) -> f64 {
    let (min, max) = TAG_VALUE_RANGES
        .iter()
        .find(|(tag, _, _)| *tag == tag_name)
        .map(|(_, min, max)| (*min, *max))
        .unwrap_or((0.0, 100.0));
    round2(rng.gen_range_f64(min, max))
}

fn tag_unit(tag_name: &str) -> &'static str {
    TAG_UNITS
        .iter()
        .find(|(tag, _)| *tag == tag_name)
        .map(|(_, unit)| *unit)
        .unwrap_or("units")
}

#[derive(Deserialize)]
struct RealtimeArgs {
    equipment_id: String,
    tag_name: String,
}

fn realtime_data(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: RealtimeArgs = parse_args(args)?;
    validate_tag(&args.equipment_id, &args.tag_name)?;

    let value = generate_tag_value(io.rng.as_ref(), &args.tag_name);

    Ok(json!({
        "equipment_id": args.equipment_id,
        "tag_name": args.tag_name,
        "value": value,
        "timestamp": now_utc(io).to_rfc3339(),
        "quality": "Good",
        "unit": tag_unit(&args.tag_name),
    }))
}

#[derive(Deserialize)]
struct TimeseriesArgs {
    equipment_id: String,
    tag_name: String,
    start_time: String,
    end_time: String,
    #[serde(default = "default_interval_seconds")]
    interval_seconds: i64,
}

fn default_interval_seconds() -> i64 {
    60
}

fn query_timeseries(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: TimeseriesArgs = parse_args(args)?;
    validate_tag(&args.equipment_id, &args.tag_name)?;

    let start: NaiveDateTime = args.start_time.parse().map_err(|_| {
        ToolError::validation(format!("invalid start_time: '{}'", args.start_time))
    })?;
    let end: NaiveDateTime = args
        .end_time
        .parse()
        .map_err(|_| ToolError::validation(format!("invalid end_time: '{}'", args.end_time)))?;
    if args.interval_seconds <= 0 {
        return Err(ToolError::validation(format!(
            "interval_seconds must be positive, got {}",
            args.interval_seconds
        )));
    }

    // One point per interval, inclusive of both endpoints.
    let mut data_points = Vec::new();
    let mut current = start;
    while current <= end {
        data_points.push(json!({
            "timestamp": current.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "value": generate_tag_value(io.rng.as_ref(), &args.tag_name),
            "quality": "Good",
        }));
        current = current + ChronoDuration::seconds(args.interval_seconds);
    }

    Ok(json!({
        "equipment_id": args.equipment_id,
        "tag_name": args.tag_name,
        "start_time": args.start_time,
        "end_time": args.end_time,
        "interval_seconds": args.interval_seconds,
        "data_points": data_points,
        "count": data_points.len(),
    }))
}

#[derive(Deserialize)]
struct StatusArgs {
    equipment_id: String,
}

fn equipment_status(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: StatusArgs = parse_args(args)?;
    tags_for(&args.equipment_id)?;

    let rng = io.rng.as_ref();
    let status = STATUS_CHOICES[rng.pick_index(STATUS_CHOICES.len())];
    let health_score = if status == "Running" {
        rng.gen_range_f64(75.0, 100.0)
    } else {
        rng.gen_range_f64(50.0, 90.0)
    };

    let now = now_utc(io);
    let last_maintenance = now - ChronoDuration::days(rng.gen_range_i64(1, 60));
    let alerts: Vec<&str> = if status == "Running" {
        Vec::new()
    } else {
        vec!["Minor vibration detected"]
    };

    Ok(json!({
        "equipment_id": args.equipment_id,
        "status": status,
        "health_score": round2(health_score),
        "uptime_hours": round2(rng.gen_range_f64(100.0, 5000.0)),
        "last_maintenance": last_maintenance.to_rfc3339(),
        "alerts": alerts,
        "timestamp": now.to_rfc3339(),
    }))
}

fn list_equipment() -> Value {
    let equipment: Vec<Value> = EQUIPMENT
        .iter()
        .map(|(id, tags)| {
            json!({
                "id": id,
                "tags": tags,
                "tag_count": tags.len(),
            })
        })
        .collect();

    json!({
        "equipment": equipment,
        "total_equipment": EQUIPMENT.len(),
    })
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args)
        .map_err(|e| ToolError::validation(format!("invalid arguments: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> TelemetryBackend {
        TelemetryBackend::new(IoContext::seeded(42, 1_700_000_000_000))
    }

    #[tokio::test]
    async fn test_lists_four_tools() {
        let names: Vec<String> = backend()
            .list_tools()
            .await
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "get_realtime_data",
                "query_timeseries",
                "get_equipment_status",
                "list_equipment"
            ]
        );
    }

    #[tokio::test]
    async fn test_realtime_temperature_in_range_with_unit() {
        let backend = backend();
        for _ in 0..20 {
            let outcome = backend
                .invoke(
                    "get_realtime_data",
                    json!({"equipment_id": "CNC-Machine-1", "tag_name": "Temperature"}),
                )
                .await;
            assert!(outcome.is_success());
            let data = outcome.data.unwrap();
            let value = data["value"].as_f64().unwrap();
            assert!((65.0..=85.0).contains(&value), "out of range: {value}");
            assert_eq!(data["unit"], "°F");
            assert_eq!(data["quality"], "Good");
        }
    }

    #[tokio::test]
    async fn test_realtime_unknown_equipment_fails() {
        let outcome = backend()
            .invoke(
                "get_realtime_data",
                json!({"equipment_id": "Lathe-9", "tag_name": "Temperature"}),
            )
            .await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind.as_deref(), Some("validation"));
        assert!(outcome.error.unwrap().contains("unknown equipment"));
    }

    #[tokio::test]
    async fn test_realtime_unknown_tag_fails() {
        let outcome = backend()
            .invoke(
                "get_realtime_data",
                json!({"equipment_id": "Conveyor-A", "tag_name": "Temperature"}),
            )
            .await;
        assert!(!outcome.is_success());
        assert!(outcome.error.unwrap().contains("unknown tag"));
    }

    #[tokio::test]
    async fn test_timeseries_inclusive_endpoints() {
        // Five minutes at sixty-second intervals: six points, both
        // endpoints included.
        let outcome = backend()
            .invoke(
                "query_timeseries",
                json!({
                    "equipment_id": "CNC-Machine-1",
                    "tag_name": "Temperature",
                    "start_time": "2024-01-01T00:00:00",
                    "end_time": "2024-01-01T00:05:00",
                    "interval_seconds": 60
                }),
            )
            .await;
        assert!(outcome.is_success());
        let data = outcome.data.unwrap();
        assert_eq!(data["count"], 6);
        let points = data["data_points"].as_array().unwrap();
        assert_eq!(points[0]["timestamp"], "2024-01-01T00:00:00");
        assert_eq!(points[5]["timestamp"], "2024-01-01T00:05:00");
    }

    #[tokio::test]
    async fn test_timeseries_unparseable_timestamp_fails() {
        let outcome = backend()
            .invoke(
                "query_timeseries",
                json!({
                    "equipment_id": "CNC-Machine-1",
                    "tag_name": "Temperature",
                    "start_time": "yesterday",
                    "end_time": "2024-01-01T00:05:00"
                }),
            )
            .await;
        assert!(!outcome.is_success());
        assert!(outcome.error.unwrap().contains("invalid start_time"));
    }

    #[tokio::test]
    async fn test_timeseries_rejects_non_positive_interval() {
        let outcome = backend()
            .invoke(
                "query_timeseries",
                json!({
                    "equipment_id": "CNC-Machine-1",
                    "tag_name": "Temperature",
                    "start_time": "2024-01-01T00:00:00",
                    "end_time": "2024-01-01T00:05:00",
                    "interval_seconds": 0
                }),
            )
            .await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.error_kind.as_deref(), Some("validation"));
    }

    #[tokio::test]
    async fn test_status_shape_and_health_correlation() {
        let backend = backend();
        for _ in 0..20 {
            let outcome = backend
                .invoke("get_equipment_status", json!({"equipment_id": "Press-1"}))
                .await;
            let data = outcome.data.unwrap();
            let status = data["status"].as_str().unwrap();
            let health = data["health_score"].as_f64().unwrap();
            match status {
                "Running" => {
                    assert!((75.0..=100.0).contains(&health));
                    assert!(data["alerts"].as_array().unwrap().is_empty());
                }
                "Idle" | "Maintenance" => {
                    assert!((50.0..=90.0).contains(&health));
                    assert!(!data["alerts"].as_array().unwrap().is_empty());
                }
                other => panic!("unexpected status: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_list_equipment() {
        let outcome = backend().invoke("list_equipment", json!({})).await;
        let data = outcome.data.unwrap();
        assert_eq!(data["total_equipment"], 6);
        assert_eq!(data["equipment"].as_array().unwrap().len(), 6);
    }
}
