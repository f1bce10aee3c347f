//! Production analytics simulator
//!
//! Simulates an analytics warehouse: SQL-ish query execution by keyword
//! sniffing (no real parsing), aggregated production metrics per product
//! line, and day-by-day quality trends with a trailing-7-day
//! classification.

use crate::backends::{now_utc, round2};
use crate::error::ToolError;
use crate::registry::ToolSet;
use crate::traits::{Backend, BackendInfo, Invocation, ToolDescriptor};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use millwright_core::{IoContext, RngProvider};

/// Backend name
pub const ANALYTICS_BACKEND_NAME: &str = "analytics-sim";

/// Product lines covered by the simulated warehouse
const PRODUCT_LINES: &[&str] = &["Line-A", "Line-B", "Line-C"];

/// Row cap for keyword-sniffed query results
const QUERY_ROWS_COUNT_MAX: usize = 30;

/// Simulated analytics backend
pub struct AnalyticsBackend {
    tools: ToolSet,
}

impl AnalyticsBackend {
    /// Construct the backend and register its three tools
    pub fn new(io: IoContext) -> Self {
        let mut tools = ToolSet::new(
            ANALYTICS_BACKEND_NAME,
            "Simulated analytics warehouse for production metrics and quality trends",
        );

        let io_query = io.clone();
        tools.register(
            ToolDescriptor::new(
                "execute_query",
                "Execute an analytical SQL query",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "SQL query to execute"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of rows to return",
                            "default": 100
                        }
                    },
                    "required": ["query"]
                }),
            ),
            Arc::new(move |args| execute_query(&io_query, args)),
        );

        let io_metrics = io.clone();
        tools.register(
            ToolDescriptor::new(
                "get_production_metrics",
                "Get aggregated production metrics for a date range",
                json!({
                    "type": "object",
                    "properties": {
                        "start_date": {
                            "type": "string",
                            "description": "Start date (YYYY-MM-DD)"
                        },
                        "end_date": {
                            "type": "string",
                            "description": "End date (YYYY-MM-DD)"
                        },
                        "product_line": {
                            "type": "string",
                            "description": "Optional product line filter"
                        }
                    },
                    "required": ["start_date", "end_date"]
                }),
            ),
            Arc::new(move |args| production_metrics(&io_metrics, args)),
        );

        let io_trends = io.clone();
        tools.register(
            ToolDescriptor::new(
                "analyze_quality_trends",
                "Analyze quality metrics and trends over time",
                json!({
                    "type": "object",
                    "properties": {
                        "product_line": {
                            "type": "string",
                            "description": "Product line to analyze"
                        },
                        "days": {
                            "type": "integer",
                            "description": "Number of days to analyze",
                            "default": 30
                        }
                    },
                    "required": ["product_line"]
                }),
            ),
            Arc::new(move |args| quality_trends(&io_trends, args)),
        );

        Self { tools }
    }
}

#[async_trait]
impl Backend for AnalyticsBackend {
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

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
    #[serde(default = "default_query_limit")]
    limit: usize,
}

fn default_query_limit() -> usize {
    100
}

fn execute_query(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: QueryArgs = parse_args(args)?;
    let rng = io.rng.as_ref();
    let query_lower = args.query.to_lowercase();

    // No real SQL parsing: the row shape is picked by sniffing keywords.
    let (columns, rows) = if query_lower.contains("production") || query_lower.contains("output") {
        (
            vec!["date", "product_line", "units_produced", "target_units", "efficiency"],
            production_rows(io, args.limit),
        )
    } else if query_lower.contains("quality") || query_lower.contains("defect") {
        (
            vec!["date", "product_line", "total_units", "defects", "defect_rate"],
            quality_rows(io, args.limit),
        )
    } else {
        let rows = (0..args.limit.min(10))
            .map(|i| {
                json!([i, rng.gen_range(0, 1001), now_utc(io).to_rfc3339()])
            })
            .collect();
        (vec!["id", "value", "timestamp"], rows)
    };

    let query_echo = if args.query.len() > 100 {
        let truncated: String = args.query.chars().take(100).collect();
        format!("{truncated}...")
    } else {
        args.query.clone()
    };
    let row_count = rows.len();

    Ok(json!({
        "query": query_echo,
        "columns": columns,
        "rows": rows,
        "row_count": row_count,
        "execution_time_ms": rng.gen_range(50, 501),
    }))
}

fn production_rows(io: &IoContext, limit: usize) -> Vec<Value> {
    let rng = io.rng.as_ref();
    let today = now_utc(io).date_naive();

    (0..limit.min(QUERY_ROWS_COUNT_MAX))
        .map(|i| {
            let date = today - ChronoDuration::days(i as i64);
            let line = PRODUCT_LINES[rng.pick_index(PRODUCT_LINES.len())];
            let units = rng.gen_range(800, 1501);
            let target = rng.gen_range(900, 1401);
            let efficiency = round2(units as f64 / target as f64 * 100.0);
            json!([date.format("%Y-%m-%d").to_string(), line, units, target, efficiency])
        })
        .collect()
}

fn quality_rows(io: &IoContext, limit: usize) -> Vec<Value> {
    let rng = io.rng.as_ref();
    let today = now_utc(io).date_naive();

    (0..limit.min(QUERY_ROWS_COUNT_MAX))
        .map(|i| {
            let date = today - ChronoDuration::days(i as i64);
            let line = PRODUCT_LINES[rng.pick_index(PRODUCT_LINES.len())];
            let total = rng.gen_range(800, 1501);
            let defects = rng.gen_range(5, 31);
            let defect_rate = round2(defects as f64 / total as f64 * 100.0);
            json!([date.format("%Y-%m-%d").to_string(), line, total, defects, defect_rate])
        })
        .collect()
}

#[derive(Deserialize)]
struct MetricsArgs {
    start_date: String,
    end_date: String,
    #[serde(default)]
    product_line: Option<String>,
}

fn production_metrics(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: MetricsArgs = parse_args(args)?;
    let rng = io.rng.as_ref();

    let start = parse_date(&args.start_date, "start_date")?;
    let end = parse_date(&args.end_date, "end_date")?;
    let days = (end - start).num_days() + 1;

    let lines: Vec<String> = match &args.product_line {
        Some(line) => vec![line.clone()],
        None => PRODUCT_LINES.iter().map(|s| s.to_string()).collect(),
    };

    let mut metrics = Vec::new();
    let mut total_production: i64 = 0;
    for line in &lines {
        let total_units = rng.gen_range_i64(10_000, 50_000) * days.max(1);
        let target_units = total_units + rng.gen_range_i64(-5_000, 5_000);
        let efficiency = if target_units > 0 {
            total_units as f64 / target_units as f64 * 100.0
        } else {
            0.0
        };
        total_production += total_units;

        metrics.push(json!({
            "product_line": line,
            "total_units_produced": total_units,
            "target_units": target_units,
            "efficiency_percent": round2(efficiency),
            "average_daily_output": round2(total_units as f64 / days.max(1) as f64),
            "downtime_hours": round2(rng.gen_range_f64(5.0, 50.0)),
            "oee": round2(rng.gen_range_f64(75.0, 95.0)),
        }));
    }

    Ok(json!({
        "start_date": args.start_date,
        "end_date": args.end_date,
        "days": days,
        "product_lines": metrics,
        "total_production": total_production,
    }))
}

#[derive(Deserialize)]
struct TrendArgs {
    product_line: String,
    #[serde(default = "default_trend_days")]
    days: usize,
}

fn default_trend_days() -> usize {
    30
}

fn quality_trends(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: TrendArgs = parse_args(args)?;
    if args.days == 0 {
        return Err(ToolError::validation("days must be positive"));
    }

    let rng = io.rng.as_ref();
    let mut current = now_utc(io).date_naive() - ChronoDuration::days(args.days as i64);
    let base_defect_rate = rng.gen_range_f64(0.5, 2.5);

    let mut daily_data = Vec::with_capacity(args.days);
    let mut defect_rates = Vec::with_capacity(args.days);
    for _ in 0..args.days {
        let defect_rate = (base_defect_rate + rng.gen_range_f64(-0.5, 0.5)).max(0.1);
        let total_units = rng.gen_range(800, 1501);
        let defects = (total_units as f64 * defect_rate / 100.0) as u64;

        daily_data.push(json!({
            "date": current.format("%Y-%m-%d").to_string(),
            "total_units": total_units,
            "defects": defects,
            "defect_rate_percent": round2(defect_rate),
        }));
        defect_rates.push(round2(defect_rate));
        current = current + ChronoDuration::days(1);
    }

    let average = defect_rates.iter().sum::<f64>() / defect_rates.len() as f64;
    let window = defect_rates.len().min(7);
    let recent: f64 =
        defect_rates[defect_rates.len() - window..].iter().sum::<f64>() / window as f64;
    let trend = if recent < average { "improving" } else { "worsening" };

    let total_defects: u64 = daily_data
        .iter()
        .filter_map(|d| d["defects"].as_u64())
        .sum();
    let total_units: u64 = daily_data
        .iter()
        .filter_map(|d| d["total_units"].as_u64())
        .sum();

    Ok(json!({
        "product_line": args.product_line,
        "analysis_period_days": args.days,
        "daily_data": daily_data,
        "average_defect_rate": round2(average),
        "recent_7day_average": round2(recent),
        "trend": trend,
        "total_defects": total_defects,
        "total_units": total_units,
    }))
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ToolError::validation(format!("invalid {field}: '{value}' (expected YYYY-MM-DD)")))
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args)
        .map_err(|e| ToolError::validation(format!("invalid arguments: {e}")))
}
