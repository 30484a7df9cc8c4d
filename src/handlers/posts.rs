/// REST handlers for the posts/comments exercise, including the strict
/// "extra" endpoints with explicit type checks and the sorted listing.
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::{bad_request, error_response, not_found};
use crate::db::models::*;
use crate::db::{DbPool, Store};

/// List all posts
/// GET /api/posts/
pub async fn get_posts(pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    match Store::all_posts(&pool).await {
        Ok(posts) => Ok(HttpResponse::Ok().json(json!({ "posts": posts }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create a post
/// POST /api/posts/
pub async fn create_post(
    pool: web::Data<DbPool>,
    req: web::Json<CreatePostRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_post(&pool, &req.title, &req.link, &req.username).await {
        Ok(post) => Ok(HttpResponse::Created().json(post)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Get a post by id
/// GET /api/posts/{post_id}/
pub async fn get_post(
    pool: web::Data<DbPool>,
    post_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::get_post(&pool, *post_id).await {
        Ok(Some(post)) => Ok(HttpResponse::Ok().json(post)),
        Ok(None) => Ok(not_found("Post")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Delete a post, returning the deleted record
/// DELETE /api/posts/{post_id}/
pub async fn delete_post(
    pool: web::Data<DbPool>,
    post_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::delete_post(&pool, *post_id).await {
        Ok(Some(post)) => Ok(HttpResponse::Ok().json(post)),
        Ok(None) => Ok(not_found("Post")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// List a post's comments
/// GET /api/posts/{post_id}/comments/
pub async fn get_comments(
    pool: web::Data<DbPool>,
    post_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::get_post(&pool, *post_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found("Post")),
        Err(e) => return Ok(error_response(e.into())),
    }

    match Store::comments_of(&pool, *post_id).await {
        Ok(comments) => Ok(HttpResponse::Ok().json(json!({ "comments": comments }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create a comment on a post
/// POST /api/posts/{post_id}/comments/
pub async fn create_comment(
    pool: web::Data<DbPool>,
    post_id: web::Path<i64>,
    req: web::Json<CreateCommentRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_comment(&pool, *post_id, &req.text, &req.username).await {
        Ok(comment) => Ok(HttpResponse::Created().json(comment)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Replace a comment's text
/// PUT /api/posts/{post_id}/comments/{comment_id}/
pub async fn update_comment(
    pool: web::Data<DbPool>,
    path: web::Path<(i64, i64)>,
    req: web::Json<UpdateCommentRequest>,
) -> ActixResult<HttpResponse> {
    let (_post_id, comment_id) = path.into_inner();

    match Store::update_comment_text(&pool, comment_id, &req.text).await {
        Ok(comment) => Ok(HttpResponse::Ok().json(comment)),
        Err(e) => Ok(error_response(e)),
    }
}

/// List posts sorted by upvotes; the sort parameter is required
/// GET /api/extra/posts/?sort=increasing|decreasing
pub async fn get_posts_sorted(
    pool: web::Data<DbPool>,
    query: web::Query<SortQuery>,
) -> ActixResult<HttpResponse> {
    let Some(order) = query.sort.as_deref().and_then(SortOrder::from_str) else {
        return Ok(bad_request());
    };

    match Store::posts_sorted(&pool, order).await {
        Ok(posts) => Ok(HttpResponse::Ok().json(json!({ "posts": posts }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Strict post creation: title, link, and username must be JSON strings
/// POST /api/extra/posts/
pub async fn create_post_strict(
    pool: web::Data<DbPool>,
    body: web::Json<serde_json::Value>,
) -> ActixResult<HttpResponse> {
    let (Some(title), Some(link), Some(username)) = (
        body.get("title").and_then(|v| v.as_str()),
        body.get("link").and_then(|v| v.as_str()),
        body.get("username").and_then(|v| v.as_str()),
    ) else {
        return Ok(bad_request());
    };

    match Store::create_post(&pool, title, link, username).await {
        Ok(post) => Ok(HttpResponse::Created().json(post)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Bump a post's upvotes; an empty or unparseable body means +1
/// POST /api/extra/posts/{post_id}/
pub async fn bump_upvotes(
    pool: web::Data<DbPool>,
    post_id: web::Path<i64>,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let delta = serde_json::from_slice::<BumpUpvotesRequest>(&body)
        .map(|req| req.upvotes)
        .unwrap_or(1);

    match Store::bump_upvotes(&pool, *post_id, delta).await {
        Ok(Some(post)) => Ok(HttpResponse::Ok().json(post)),
        Ok(None) => Ok(not_found("Post")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Strict comment creation: the post must exist and fields must be strings
/// POST /api/extra/posts/{post_id}/comments/
pub async fn create_comment_strict(
    pool: web::Data<DbPool>,
    post_id: web::Path<i64>,
    body: web::Json<serde_json::Value>,
) -> ActixResult<HttpResponse> {
    match Store::get_post(&pool, *post_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found("Post")),
        Err(e) => return Ok(error_response(e.into())),
    }

    let (Some(text), Some(username)) = (
        body.get("text").and_then(|v| v.as_str()),
        body.get("username").and_then(|v| v.as_str()),
    ) else {
        return Ok(bad_request());
    };

    match Store::create_comment(&pool, *post_id, text, username).await {
        Ok(comment) => Ok(HttpResponse::Created().json(comment)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Strict comment update: post and comment must exist, text must be a string
/// PUT /api/extra/posts/{post_id}/comments/{comment_id}/
pub async fn update_comment_strict(
    pool: web::Data<DbPool>,
    path: web::Path<(i64, i64)>,
    body: web::Json<serde_json::Value>,
) -> ActixResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    match Store::get_post(&pool, post_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found("Post")),
        Err(e) => return Ok(error_response(e.into())),
    }

    let Some(text) = body.get("text").and_then(|v| v.as_str()) else {
        return Ok(bad_request());
    };

    match Store::update_comment_text(&pool, comment_id, text).await {
        Ok(comment) => Ok(HttpResponse::Ok().json(comment)),
        Err(e) => Ok(error_response(e)),
    }
}
