/// REST handlers for the tasks/subtasks exercise.
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::{error_response, not_found};
use crate::db::models::*;
use crate::db::{DbPool, Store};

/// List all tasks
/// GET /api/tasks/
pub async fn get_tasks(pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    match Store::all_tasks(&pool).await {
        Ok(tasks) => Ok(HttpResponse::Ok().json(json!({ "tasks": tasks }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create a task
/// POST /api/tasks/
pub async fn create_task(
    pool: web::Data<DbPool>,
    req: web::Json<CreateTaskRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_task(&pool, &req.description, req.done).await {
        Ok(task) => Ok(HttpResponse::Created().json(task)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Get a task by id
/// GET /api/tasks/{task_id}/
pub async fn get_task(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::get_task(&pool, *task_id).await {
        Ok(Some(task)) => Ok(HttpResponse::Ok().json(task)),
        Ok(None) => Ok(not_found("Task")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Partially update a task; absent fields keep their prior value
/// POST /api/tasks/{task_id}/
pub async fn update_task(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
    req: web::Json<UpdateTaskRequest>,
) -> ActixResult<HttpResponse> {
    match Store::update_task(&pool, *task_id, req.description.as_deref(), req.done).await {
        Ok(Some(task)) => Ok(HttpResponse::Ok().json(task)),
        Ok(None) => Ok(not_found("Task")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Delete a task, returning the deleted record
/// DELETE /api/tasks/{task_id}/
pub async fn delete_task(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::delete_task(&pool, *task_id).await {
        Ok(Some(task)) => Ok(HttpResponse::Ok().json(task)),
        Ok(None) => Ok(not_found("Task")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// List a task's subtasks
/// GET /api/tasks/{task_id}/subtasks/
pub async fn get_subtasks(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::get_task(&pool, *task_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found("Task")),
        Err(e) => return Ok(error_response(e.into())),
    }

    match Store::subtasks_of(&pool, *task_id).await {
        Ok(subtasks) => Ok(HttpResponse::Ok().json(json!({ "subtasks": subtasks }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create a subtask under a task
/// POST /api/tasks/{task_id}/subtasks/
pub async fn create_subtask(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
    req: web::Json<CreateSubtaskRequest>,
) -> ActixResult<HttpResponse> {
    match Store::get_task(&pool, *task_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found("Task")),
        Err(e) => return Ok(error_response(e.into())),
    }

    match Store::create_subtask(&pool, *task_id, &req.description, req.done).await {
        Ok(subtask) => Ok(HttpResponse::Created().json(subtask)),
        Err(e) => Ok(error_response(e.into())),
    }
}
