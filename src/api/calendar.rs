//! Scheduling-board operations: timeline queries and task mutations.

use serde_json::json;

use super::{BoardClient, CalendarData, MachineId, PaperParams, TaskId, TaskSummary};
use crate::core::{ApiError, ApiRequest, SessionStore, TokenRefresher, Transport};

impl<T, R, S> BoardClient<T, R, S>
where
    T: Transport,
    R: TokenRefresher,
    S: SessionStore,
{
    /// All production tasks of the operator's organization.
    pub async fn tasks_list(&self) -> Result<Vec<TaskSummary>, ApiError> {
        let who = self.identity().await?;
        self.run(ApiRequest::get(format!(
            "/GetFrontendOrdersList?companyId={}&userId={}",
            who.org_id, who.user_id
        )))
        .await
    }

    /// The per-machine timeline.
    pub async fn calendar(&self) -> Result<CalendarData, ApiError> {
        let who = self.identity().await?;
        self.run(ApiRequest::get(format!(
            "/getCalendar/?userId={}",
            who.user_id
        )))
        .await
    }

    /// Form parameters (paper types, formats, machines) for a new task.
    pub async fn paper_params(&self) -> Result<PaperParams, ApiError> {
        let who = self.identity().await?;
        self.run(ApiRequest::get(format!(
            "/GetNewFormData/?userId={}&companyId={}",
            who.user_id, who.org_id
        )))
        .await
    }

    /// Create a new task from a form draft.
    pub async fn create_task(&self, draft: serde_json::Value) -> Result<(), ApiError> {
        let who = self.identity().await?;
        self.run_ok(ApiRequest::post(
            "/PostNewTask/",
            json!({ "userId": who.user_id, "newTaskFromPost": draft }),
        ))
        .await
    }

    /// Publish a task to the production floor.
    pub async fn publish_task(
        &self,
        task_id: TaskId,
        draft: serde_json::Value,
    ) -> Result<(), ApiError> {
        let who = self.identity().await?;
        self.run_ok(ApiRequest::post(
            "/PublishTask/",
            json!({ "userId": who.user_id, "taskId": task_id, "newTaskFromPost": draft }),
        ))
        .await
    }

    /// Delete a task.
    pub async fn delete_task(&self, task_id: TaskId) -> Result<(), ApiError> {
        let who = self.identity().await?;
        self.run_ok(ApiRequest::post(
            "/DeleteTask/",
            json!({ "userId": who.user_id, "taskId": task_id }),
        ))
        .await
    }

    /// Lock a task against edits.
    pub async fn lock_task(&self, task_id: TaskId) -> Result<(), ApiError> {
        let who = self.identity().await?;
        self.run_ok(ApiRequest::post(
            "/LockTask/",
            json!({ "userId": who.user_id, "taskId": task_id }),
        ))
        .await
    }

    /// Move a task to another machine and/or start time.
    pub async fn move_task(
        &self,
        task_id: TaskId,
        to_machine_id: MachineId,
        new_time_stamp: i64,
    ) -> Result<(), ApiError> {
        let who = self.identity().await?;
        self.run_ok(ApiRequest::post(
            "/MoveTask/",
            json!({
                "userId": who.user_id,
                "toMachineId": to_machine_id,
                "newTimeStamp": new_time_stamp,
                "taskId": task_id,
            }),
        ))
        .await
    }

    /// Stretch or shrink a task's scheduled window.
    pub async fn resize_task(
        &self,
        task_id: TaskId,
        unix_start_time: i64,
        unix_end_time: i64,
    ) -> Result<(), ApiError> {
        let who = self.identity().await?;
        self.run_ok(ApiRequest::post(
            "/StretchTaskTime/",
            json!({
                "userId": who.user_id,
                "taskId": task_id,
                "unixStartTime": unix_start_time,
                "unixEndTime": unix_end_time,
            }),
        ))
        .await
    }

    /// Resize a machine's working-time block.
    pub async fn resize_work_time(
        &self,
        task_id: TaskId,
        machine_id: MachineId,
        unix_start_time: i64,
        unix_end_time: i64,
    ) -> Result<(), ApiError> {
        let who = self.identity().await?;
        self.run_ok(ApiRequest::post(
            "/EditWorkingTime/",
            json!({
                "userId": who.user_id,
                "taskId": task_id,
                "machineId": machine_id,
                "unixStartTime": unix_start_time,
                "unixEndTime": unix_end_time,
            }),
        ))
        .await
    }
}
