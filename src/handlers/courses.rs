/// REST handlers for the course-management exercise.
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::{bad_request, error_response, not_found};
use crate::db::models::*;
use crate::db::{DbPool, Store};

/// List all courses, fully serialized
/// GET /api/courses/
pub async fn get_courses(pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    match Store::all_courses(&pool).await {
        Ok(courses) => Ok(HttpResponse::Ok().json(json!({ "courses": courses }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create a course
/// POST /api/courses/
pub async fn create_course(
    pool: web::Data<DbPool>,
    req: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_course(&pool, &req.code, &req.name).await {
        Ok(course) => Ok(HttpResponse::Created().json(course)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Get a course with assignments and members
/// GET /api/courses/{course_id}/
pub async fn get_course(
    pool: web::Data<DbPool>,
    course_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::get_course(&pool, *course_id).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(course)),
        Ok(None) => Ok(not_found("Course")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Delete a course, cascading to assignments and submissions
/// DELETE /api/courses/{course_id}/
pub async fn delete_course(
    pool: web::Data<DbPool>,
    course_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::delete_course(&pool, *course_id).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(course)),
        Ok(None) => Ok(not_found("Course")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create a student
/// POST /api/students/
pub async fn create_student(
    pool: web::Data<DbPool>,
    req: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_student(&pool, &req.name, &req.netid).await {
        Ok(student) => Ok(HttpResponse::Created().json(student)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Get a student with their serialized courses
/// GET /api/students/{user_id}/
pub async fn get_student(
    pool: web::Data<DbPool>,
    user_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::get_student(&pool, *user_id).await {
        Ok(Some(student)) => Ok(HttpResponse::Ok().json(student)),
        Ok(None) => Ok(not_found("User")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Add a user to a course as instructor or student
/// POST /api/courses/{course_id}/add/
pub async fn assign_user(
    pool: web::Data<DbPool>,
    course_id: web::Path<i64>,
    req: web::Json<EnrollRequest>,
) -> ActixResult<HttpResponse> {
    let Some(role) = Role::from_str(&req.role) else {
        return Ok(bad_request());
    };

    match Store::enroll(&pool, *course_id, req.user_id, role).await {
        Ok(course) => Ok(HttpResponse::Ok().json(course)),
        Err(e) => Ok(error_response(e)),
    }
}

/// Drop a user from a course, returning the dropped student
/// POST /api/courses/{course_id}/drop/
pub async fn drop_student(
    pool: web::Data<DbPool>,
    course_id: web::Path<i64>,
    req: web::Json<DropStudentRequest>,
) -> ActixResult<HttpResponse> {
    match Store::drop_student(&pool, *course_id, req.user_id).await {
        Ok(student) => Ok(HttpResponse::Ok().json(student)),
        Err(e) => Ok(error_response(e)),
    }
}

/// Create an assignment under a course
/// POST /api/courses/{course_id}/assignment/
pub async fn create_assignment(
    pool: web::Data<DbPool>,
    course_id: web::Path<i64>,
    req: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_assignment(&pool, *course_id, &req.title, req.due_date).await {
        Ok(assignment) => Ok(HttpResponse::Created().json(assignment)),
        Err(e) => Ok(error_response(e)),
    }
}

/// Partially update an assignment
/// POST /api/assignments/{assignment_id}/
pub async fn update_assignment(
    pool: web::Data<DbPool>,
    assignment_id: web::Path<i64>,
    req: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    match Store::update_assignment(&pool, *assignment_id, req.title.as_deref(), req.due_date).await
    {
        Ok(Some(assignment)) => Ok(HttpResponse::Ok().json(assignment)),
        Ok(None) => Ok(not_found("Assignment")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Submit work for an assignment
/// POST /api/assignments/{assignment_id}/submit/
pub async fn create_submission(
    pool: web::Data<DbPool>,
    assignment_id: web::Path<i64>,
    req: web::Json<CreateSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_submission(&pool, *assignment_id, req.user_id, &req.content).await {
        Ok(submission) => Ok(HttpResponse::Created().json(submission)),
        Err(e) => Ok(error_response(e)),
    }
}

/// Grade a submission; responds with the assignment
/// POST /api/assignments/{assignment_id}/grade/
pub async fn grade_submission(
    pool: web::Data<DbPool>,
    assignment_id: web::Path<i64>,
    req: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    match Store::grade_submission(&pool, *assignment_id, req.submission_id, req.score).await {
        Ok(assignment) => Ok(HttpResponse::Ok().json(assignment)),
        Err(e) => Ok(error_response(e)),
    }
}
