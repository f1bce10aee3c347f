//! Work-order and inventory simulator
//!
//! Simulates the transactional side of the plant: filtered work-order
//! queries, inventory levels across warehouse locations, maintenance
//! ticket creation, and maintenance history. Created tickets are the only
//! mutable state: an append-only list plus a monotonically increasing id
//! counter seeded at a fixed base.
//!
//! Work-order queries never return more than
//! [`WORK_ORDER_RESULTS_COUNT_MAX`] records regardless of the requested
//! limit; the bound is a documented property of the simulated system.

use crate::backends::{now_utc, round2};
use crate::error::ToolError;
use crate::registry::ToolSet;
use crate::traits::{Backend, BackendInfo, Invocation, ToolDescriptor};
use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use millwright_core::{IoContext, RngProvider, WORK_ORDER_RESULTS_COUNT_MAX};

/// Backend name
pub const MAINTENANCE_BACKEND_NAME: &str = "maintenance-sim";

/// First ticket id handed out
const TICKET_ID_BASE: u64 = 1000;

/// Equipment ids referenced by synthetic work orders
const WORK_ORDER_EQUIPMENT: &[&str] =
    &["CNC-Machine-1", "CNC-Machine-2", "Press-1", "Conveyor-A"];

const WORK_ORDER_STATUSES: &[&str] = &["open", "in_progress", "completed"];

const WORK_ORDER_PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

const WORK_ORDER_DESCRIPTIONS: &[&str] = &[
    "Routine maintenance",
    "Tool replacement",
    "Calibration check",
    "Software update",
    "Belt replacement",
];

const TECHNICIANS: &[&str] = &["Tech-A", "Tech-B", "Tech-C"];

/// Part catalog: (part number, reorder quantity, minimum quantity)
const PARTS_CATALOG: &[(&str, u64, u64)] = &[
    ("Bearing-6205", 50, 20),
    ("Belt-V-100", 30, 10),
    ("Filter-Air-Standard", 100, 25),
    ("Lubricant-5W30", 200, 50),
    ("Seal-O-Ring-25mm", 500, 100),
    ("Sensor-Temp-K-Type", 40, 15),
];

const WAREHOUSES: &[&str] = &["Warehouse-A", "Warehouse-B"];

const MAINTENANCE_TYPES: &[&str] = &[
    "Preventive Maintenance",
    "Corrective Maintenance",
    "Inspection",
    "Repair",
    "Calibration",
];

const MAINTENANCE_DESCRIPTIONS: &[&str] = &[
    "Routine lubrication",
    "Replaced worn bearings",
    "Calibrated sensors",
    "Software update",
    "Belt tension adjustment",
];

struct TicketLedger {
    tickets: Vec<Value>,
    next_id: u64,
}

/// Simulated transactional backend
pub struct MaintenanceBackend {
    tools: ToolSet,
    ledger: Arc<Mutex<TicketLedger>>,
}

impl MaintenanceBackend {
    /// Construct the backend and register its four tools
    pub fn new(io: IoContext) -> Self {
        let ledger = Arc::new(Mutex::new(TicketLedger {
            tickets: Vec::new(),
            next_id: TICKET_ID_BASE,
        }));

        let mut tools = ToolSet::new(
            MAINTENANCE_BACKEND_NAME,
            "Simulated transactional store for work orders, inventory, and maintenance tickets",
        );

        let io_orders = io.clone();
        tools.register(
            ToolDescriptor::new(
                "query_work_orders",
                "Query work orders with optional filters",
                json!({
                    "type": "object",
                    "properties": {
                        "status": {
                            "type": "string",
                            "description": "Filter by status (open, in_progress, completed, all)",
                            "default": "all"
                        },
                        "priority": {
                            "type": "string",
                            "description": "Filter by priority (low, medium, high, critical)"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of results",
                            "default": 50
                        }
                    },
                    "required": []
                }),
            ),
            Arc::new(move |args| query_work_orders(&io_orders, args)),
        );

        let io_inventory = io.clone();
        tools.register(
            ToolDescriptor::new(
                "get_inventory_levels",
                "Get current inventory levels for parts and materials",
                json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "Warehouse location"
                        },
                        "low_stock_only": {
                            "type": "boolean",
                            "description": "Only return items with low stock",
                            "default": false
                        }
                    },
                    "required": []
                }),
            ),
            Arc::new(move |args| inventory_levels(&io_inventory, args)),
        );

        let io_create = io.clone();
        let ledger_create = ledger.clone();
        tools.register(
            ToolDescriptor::new(
                "create_maintenance_ticket",
                "Create a new maintenance ticket for equipment",
                json!({
                    "type": "object",
                    "properties": {
                        "equipment_id": {
                            "type": "string",
                            "description": "Equipment identifier"
                        },
                        "description": {
                            "type": "string",
                            "description": "Issue description"
                        },
                        "priority": {
                            "type": "string",
                            "description": "Priority level (low, medium, high, critical)",
                            "default": "medium"
                        }
                    },
                    "required": ["equipment_id", "description"]
                }),
            ),
            Arc::new(move |args| create_ticket(&io_create, &ledger_create, args)),
        );

        let io_history = io.clone();
        tools.register(
            ToolDescriptor::new(
                "get_maintenance_history",
                "Get maintenance history for equipment",
                json!({
                    "type": "object",
                    "properties": {
                        "equipment_id": {
                            "type": "string",
                            "description": "Equipment identifier"
                        },
                        "days": {
                            "type": "integer",
                            "description": "Number of days to look back",
                            "default": 90
                        }
                    },
                    "required": ["equipment_id"]
                }),
            ),
            Arc::new(move |args| maintenance_history(&io_history, args)),
        );

        Self { tools, ledger }
    }

    /// Number of tickets created since construction
    pub fn ticket_count(&self) -> usize {
        self.ledger.lock().map(|l| l.tickets.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Backend for MaintenanceBackend {
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
struct WorkOrderArgs {
    #[serde(default = "default_status")]
    status: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default = "default_work_order_limit")]
    limit: usize,
}

fn default_status() -> String {
    "all".to_string()
}

fn default_work_order_limit() -> usize {
    50
}

fn query_work_orders(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: WorkOrderArgs = parse_args(args)?;
    let rng = io.rng.as_ref();
    let now = now_utc(io);

    // Candidates are generated up to the hard cap, then filtered by
    // equality, so the response can hold at most
    // WORK_ORDER_RESULTS_COUNT_MAX records whatever the limit says.
    let mut work_orders = Vec::new();
    for i in 0..args.limit.min(WORK_ORDER_RESULTS_COUNT_MAX) {
        let status = WORK_ORDER_STATUSES[rng.pick_index(WORK_ORDER_STATUSES.len())];
        let priority = WORK_ORDER_PRIORITIES[rng.pick_index(WORK_ORDER_PRIORITIES.len())];

        if args.status != "all" && status != args.status {
            continue;
        }
        if let Some(wanted) = &args.priority {
            if priority != wanted {
                continue;
            }
        }

        let created = now - ChronoDuration::days(rng.gen_range_i64(1, 30));
        let assigned: Value = match rng.pick_index(TECHNICIANS.len() + 1) {
            i if i < TECHNICIANS.len() => json!(TECHNICIANS[i]),
            _ => Value::Null,
        };

        work_orders.push(json!({
            "id": format!("WO-{}", 10_000 + i),
            "equipment_id": WORK_ORDER_EQUIPMENT[rng.pick_index(WORK_ORDER_EQUIPMENT.len())],
            "description": WORK_ORDER_DESCRIPTIONS[rng.pick_index(WORK_ORDER_DESCRIPTIONS.len())],
            "status": status,
            "priority": priority,
            "created_date": created.format("%Y-%m-%d").to_string(),
            "assigned_to": assigned,
            "estimated_hours": rng.gen_range(1, 9),
        }));
    }

    let count = work_orders.len();
    Ok(json!({
        "work_orders": work_orders,
        "count": count,
        "filters": {
            "status": args.status,
            "priority": args.priority,
        },
    }))
}

#[derive(Deserialize)]
struct InventoryArgs {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    low_stock_only: bool,
}

fn inventory_levels(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: InventoryArgs = parse_args(args)?;
    let rng = io.rng.as_ref();
    let now = now_utc(io);

    let locations: Vec<String> = match &args.location {
        Some(loc) => vec![loc.clone()],
        None => WAREHOUSES.iter().map(|s| s.to_string()).collect(),
    };

    let mut items = Vec::new();
    let mut low_stock_count = 0usize;
    for location in &locations {
        for (part_number, reorder_qty, min_qty) in PARTS_CATALOG {
            let on_hand = rng.gen_range(0, reorder_qty * 2 + 1);
            let low_stock = on_hand <= *min_qty;

            if args.low_stock_only && !low_stock {
                continue;
            }
            if low_stock {
                low_stock_count += 1;
            }

            items.push(json!({
                "part_number": part_number,
                "location": location,
                "quantity_on_hand": on_hand,
                "minimum_quantity": min_qty,
                "reorder_quantity": reorder_qty,
                "low_stock": low_stock,
                "unit_cost": round2(rng.gen_range_f64(5.0, 500.0)),
                "last_updated": now.format("%Y-%m-%d %H:%M:%S").to_string(),
            }));
        }
    }

    let count = items.len();
    Ok(json!({
        "inventory_items": items,
        "count": count,
        "low_stock_count": low_stock_count,
        "locations": locations,
    }))
}

#[derive(Deserialize)]
struct CreateTicketArgs {
    equipment_id: String,
    description: String,
    #[serde(default = "default_priority")]
    priority: String,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn create_ticket(
    io: &IoContext,
    ledger: &Arc<Mutex<TicketLedger>>,
    args: Value,
) -> Result<Value, ToolError> {
    let args: CreateTicketArgs = parse_args(args)?;
    let now = now_utc(io);

    let mut ledger = ledger.lock().map_err(|_| ToolError::Internal {
        reason: "ticket ledger poisoned".to_string(),
    })?;
    let ticket_id = format!("MT-{}", ledger.next_id);
    ledger.next_id += 1;

    let ticket = json!({
        "ticket_id": ticket_id,
        "equipment_id": args.equipment_id,
        "description": args.description,
        "priority": args.priority,
        "status": "open",
        "created_date": now.to_rfc3339(),
        "created_by": "system",
        "assigned_to": Value::Null,
        "estimated_resolution": (now + ChronoDuration::hours(24)).to_rfc3339(),
    });

    ledger.tickets.push(ticket.clone());

    Ok(json!({
        "ticket": ticket,
        "message": format!("Maintenance ticket {} created successfully",
                           ticket["ticket_id"].as_str().unwrap_or_default()),
    }))
}

#[derive(Deserialize)]
struct HistoryArgs {
    equipment_id: String,
    #[serde(default = "default_history_days")]
    days: i64,
}

fn default_history_days() -> i64 {
    90
}

fn maintenance_history(io: &IoContext, args: Value) -> Result<Value, ToolError> {
    let args: HistoryArgs = parse_args(args)?;
    if args.days <= 0 {
        return Err(ToolError::validation("days must be positive"));
    }

    let rng = io.rng.as_ref();
    let now = now_utc(io);
    let event_count = rng.gen_range(3, 11);

    let mut history = Vec::new();
    for _ in 0..event_count {
        let event_date = now - ChronoDuration::days(rng.gen_range_i64(1, args.days));
        history.push(json!({
            "ticket_id": format!("MT-{}", rng.gen_range(1000, 10_000)),
            "equipment_id": args.equipment_id,
            "date": event_date.format("%Y-%m-%d").to_string(),
            "type": MAINTENANCE_TYPES[rng.pick_index(MAINTENANCE_TYPES.len())],
            "description": MAINTENANCE_DESCRIPTIONS[rng.pick_index(MAINTENANCE_DESCRIPTIONS.len())],
            "technician": TECHNICIANS[rng.pick_index(TECHNICIANS.len())],
            "hours_spent": rng.gen_range(1, 7),
            "parts_used": rng.gen_range(0, 6),
            "cost": round2(rng.gen_range_f64(50.0, 500.0)),
        }));
    }

    history.sort_by(|a, b| {
        let da = a["date"].as_str().unwrap_or_default();
        let db = b["date"].as_str().unwrap_or_default();
        db.cmp(da)
    });

    let total_cost: f64 = history.iter().filter_map(|h| h["cost"].as_f64()).sum();
    let total_hours: u64 = history
        .iter()
        .filter_map(|h| h["hours_spent"].as_u64())
        .sum();
    let count = history.len();

    Ok(json!({
        "equipment_id": args.equipment_id,
        "history": history,
        "count": count,
        "date_range_days": args.days,
        "total_maintenance_cost": round2(total_cost),
        "total_hours": total_hours,
    }))
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args)
        .map_err(|e| ToolError::validation(format!("invalid arguments: {e}")))
}
