/// REST handlers for the payments exercise: users, money transfers,
/// transactions, friendships, and the password-protected "extra" endpoints.
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::{bad_request, error_response, not_found, unauthorized};
use crate::auth::{self, HashParams};
use crate::db::models::*;
use crate::db::{DbPool, Store, StoreError};

/// List all users (reduced projection)
/// GET /api/users/
pub async fn get_users(pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    match Store::all_users(&pool).await {
        Ok(users) => Ok(HttpResponse::Ok().json(json!({ "users": users }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create a user; balance defaults to 0
/// POST /api/users/
pub async fn create_user(
    pool: web::Data<DbPool>,
    req: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_user(&pool, &req.name, &req.username, req.balance).await {
        Ok(user) => Ok(HttpResponse::Created().json(user)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Get a user with their transactions
/// GET /api/users/{user_id}/
pub async fn get_user(
    pool: web::Data<DbPool>,
    user_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::get_user(&pool, *user_id).await {
        Ok(Some(profile)) => Ok(HttpResponse::Ok().json(profile)),
        Ok(None) => Ok(not_found("User")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Delete a user, returning the deleted record
/// DELETE /api/users/{user_id}/
pub async fn delete_user(
    pool: web::Data<DbPool>,
    user_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::delete_user(&pool, *user_id).await {
        Ok(Some(profile)) => Ok(HttpResponse::Ok().json(profile)),
        Ok(None) => Ok(not_found("User")),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Transfer money between two users
/// POST /api/send/
pub async fn send_money(
    pool: web::Data<DbPool>,
    req: web::Json<SendMoneyRequest>,
) -> ActixResult<HttpResponse> {
    match Store::transfer(&pool, req.sender_id, req.receiver_id, req.amount).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "sender_id": req.sender_id,
            "receiver_id": req.receiver_id,
            "amount": req.amount,
        }))),
        Err(e) => Ok(error_response(e)),
    }
}

/// Create a transaction; creating it already accepted transfers immediately
/// POST /api/transactions/
pub async fn create_transaction(
    pool: web::Data<DbPool>,
    req: web::Json<CreateTransactionRequest>,
) -> ActixResult<HttpResponse> {
    match Store::create_transaction(
        &pool,
        req.sender_id,
        req.receiver_id,
        req.amount,
        &req.message,
        req.accepted.as_deref(),
    )
    .await
    {
        Ok(txn) => Ok(HttpResponse::Created().json(txn)),
        Err(e) => Ok(error_response(e)),
    }
}

/// Decide a pending transaction; deciding a terminal one is forbidden
/// POST /api/transactions/{transaction_id}/
pub async fn decide_transaction(
    pool: web::Data<DbPool>,
    transaction_id: web::Path<i64>,
    req: web::Json<DecideTransactionRequest>,
) -> ActixResult<HttpResponse> {
    match Store::decide_transaction(&pool, *transaction_id, &req.accepted).await {
        Ok(txn) => Ok(HttpResponse::Ok().json(txn)),
        Err(e) => Ok(error_response(e)),
    }
}

/// List a user's friends (reduced projection)
/// GET /api/extra/users/{user_id}/friends/
pub async fn get_friends(
    pool: web::Data<DbPool>,
    user_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::friends_of(&pool, *user_id).await {
        Ok(friends) => Ok(HttpResponse::Ok().json(json!({ "friends": friends }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create one directed friendship edge
/// POST /api/extra/users/{user_id}/friends/{friend_id}/
pub async fn create_friendship(
    pool: web::Data<DbPool>,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (user_id, friend_id) = path.into_inner();

    match Store::add_friend(&pool, user_id, friend_id).await {
        Ok(()) => Ok(HttpResponse::Created().json("Success")),
        Err(e) => Ok(error_response(e)),
    }
}

/// List every transaction a user participates in
/// GET /api/extra/users/{user_id}/join/
pub async fn get_user_transactions(
    pool: web::Data<DbPool>,
    user_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    match Store::transactions_of(&pool, *user_id).await {
        Ok(transactions) => Ok(HttpResponse::Ok().json(json!({ "transactions": transactions }))),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Create a password-protected user; only the hash is stored
/// POST /api/extra/users/
pub async fn create_user_protected(
    pool: web::Data<DbPool>,
    params: web::Data<HashParams>,
    req: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    let Some(password) = req.password.as_deref() else {
        return Ok(bad_request());
    };
    let hash = auth::hash_password(&params, password);

    match Store::create_user_protected(&pool, &req.name, &req.username, req.balance, &hash).await {
        Ok(user) => Ok(HttpResponse::Created().json(user)),
        Err(e) => Ok(error_response(e.into())),
    }
}

/// Get a protected user; the request body must carry the right password
/// POST /api/extra/users/{user_id}/
pub async fn get_user_protected(
    pool: web::Data<DbPool>,
    params: web::Data<HashParams>,
    user_id: web::Path<i64>,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let profile = match Store::get_user(&pool, *user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => return Ok(not_found("User")),
        Err(e) => return Ok(error_response(e.into())),
    };

    let Ok(req) = serde_json::from_slice::<PasswordRequest>(&body) else {
        return Ok(unauthorized());
    };

    match authenticate(&pool, &params, *user_id, &req.password).await {
        Ok(true) => Ok(HttpResponse::Ok().json(profile)),
        Ok(false) => Ok(unauthorized()),
        Err(e) => Ok(error_response(e)),
    }
}

/// Transfer money, requiring the sender's password
/// POST /api/extra/send/
pub async fn send_money_protected(
    pool: web::Data<DbPool>,
    params: web::Data<HashParams>,
    req: web::Json<SendMoneyRequest>,
) -> ActixResult<HttpResponse> {
    let Some(password) = req.password.as_deref() else {
        return Ok(unauthorized());
    };

    match authenticate(&pool, &params, req.sender_id, password).await {
        Ok(true) => {}
        Ok(false) => return Ok(unauthorized()),
        Err(e) => return Ok(error_response(e)),
    }

    match Store::transfer(&pool, req.sender_id, req.receiver_id, req.amount).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "sender_id": req.sender_id,
            "receiver_id": req.receiver_id,
            "amount": req.amount,
        }))),
        Err(e) => Ok(error_response(e)),
    }
}

/// Check a plaintext password against a user's stored hash. Users without a
/// stored hash never authenticate.
async fn authenticate(
    pool: &DbPool,
    params: &HashParams,
    user_id: i64,
    password: &str,
) -> Result<bool, StoreError> {
    let stored = Store::password_hash_of(pool, user_id)
        .await?
        .ok_or(StoreError::NotFound("User"))?;

    Ok(match stored {
        Some(hash) => auth::verify_password(params, password, &hash),
        None => false,
    })
}
