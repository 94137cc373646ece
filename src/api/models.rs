//! Wire models of the scheduling-board API.

use serde::{Deserialize, Serialize};

use crate::core::{OrgId, Role, UserId};

/// Production task identifier.
pub type TaskId = u64;
/// Print machine identifier.
pub type MachineId = u64;

/// Answer of the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token for API calls.
    pub access_token: String,
    /// Refresh token for the reauthorization cycle.
    pub refresh_token: String,
    /// Operator id.
    pub user_id: UserId,
    /// Organization id.
    pub company_id: OrgId,
    /// Operator role.
    pub role: Role,
    /// Optional message the server wants shown after login.
    #[serde(default)]
    pub optional_alert_message: Option<String>,
}

/// One production task as listed by the order-list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// Task id.
    pub id: TaskId,
    /// Parent order id.
    pub parent_id: TaskId,
    /// Machine the task is scheduled on.
    pub machine_id: MachineId,
    /// Task name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Optional operator comment.
    #[serde(default)]
    pub optional_comment: Option<String>,
    /// Publication timestamp info, preformatted by the server.
    #[serde(default)]
    pub published_date_time_info: Option<String>,
    /// Display color.
    pub hex_color: String,
    /// First occupied slot on the timeline.
    pub starting_slot_index: i64,
    /// Last occupied slot on the timeline.
    pub ending_slot_index: i64,
    /// Slot count the task needs.
    pub time_slots_needed: i64,
    /// Duration hours component.
    pub hours: i64,
    /// Duration minutes component.
    pub minutes: i64,
    /// ISO start time.
    pub iso_start_time: String,
    /// ISO end time.
    pub iso_end_time: String,
    /// Task finished.
    pub is_completed: bool,
    /// Task locked against edits.
    pub is_locked: bool,
    /// Task currently in production.
    pub is_processing: bool,
    /// Task waiting for production.
    pub is_waiting: bool,
}

/// One scheduled task inside the calendar payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTask {
    /// Task id.
    pub id: TaskId,
    /// Parent order id.
    pub parent_id: TaskId,
    /// Machine the task is scheduled on.
    pub machine_id: MachineId,
    /// Task name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Optional operator comment.
    #[serde(default)]
    pub optional_comment: Option<String>,
    /// Display color.
    pub hex_color: String,
    /// Start of the scheduled window (unix).
    pub start_time: i64,
    /// End of the scheduled window (unix).
    pub end_time: i64,
    /// ISO start time (unix form used by the calendar payload).
    pub iso_start_time: i64,
    /// ISO end time (unix form used by the calendar payload).
    pub iso_end_time: i64,
    /// Task finished.
    pub is_completed: bool,
    /// Task locked against edits.
    pub is_locked: bool,
    /// Task currently in production.
    pub is_processing: bool,
    /// Task waiting for production.
    pub is_waiting: bool,
    /// Task is a working-time block rather than an order.
    pub is_time_task: bool,
    /// Operator may move the task.
    pub can_move: bool,
    /// Operator may stretch the task.
    pub can_stretch: bool,
    /// Operator may delete the task.
    pub can_delete: bool,
}

/// One machine's row on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSchedule {
    /// Machine id.
    pub machine_id: MachineId,
    /// Machine display name.
    pub machine_name: String,
    /// Tasks scheduled on this machine.
    pub list_of_orders: Vec<BoardTask>,
}

/// Full per-machine timeline payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarData {
    /// All machines with their scheduled tasks.
    pub list_of_machines_with_data: Vec<MachineSchedule>,
}

/// Server-side key/value option entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValue<V> {
    /// Display key.
    #[serde(rename = "Key")]
    pub key: String,
    /// Associated value.
    #[serde(rename = "Value")]
    pub value: V,
}

/// Form parameters for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperParams {
    /// Density options per paper type.
    pub all_density_list_for_each_paper_type: Vec<serde_json::Value>,
    /// Format size options.
    pub all_format_sizes_and_values_list: Vec<serde_json::Value>,
    /// Machines with their ids.
    pub all_machines_with_ids: Vec<KeyValue<MachineId>>,
    /// Paper types with their values.
    pub all_paper_types_and_values_list: Vec<KeyValue<String>>,
}
