/// HTTP server factory and route configuration.
/// Provides a reusable function to create and configure the HTTP server
/// for use in the main binary and in tests.
use actix_web::{middleware, web, App, HttpServer};

use crate::auth::HashParams;
use crate::db::DbPool;
use crate::handlers::{bank, courses, health, posts, tasks};

/// Register every route on an actix service config. Shared by the real
/// server, the test server, and in-process service tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        // Posts exercise
        .route("/api/posts/", web::get().to(posts::get_posts))
        .route("/api/posts/", web::post().to(posts::create_post))
        .route("/api/posts/{post_id}/", web::get().to(posts::get_post))
        .route("/api/posts/{post_id}/", web::delete().to(posts::delete_post))
        .route(
            "/api/posts/{post_id}/comments/",
            web::get().to(posts::get_comments),
        )
        .route(
            "/api/posts/{post_id}/comments/",
            web::post().to(posts::create_comment),
        )
        .route(
            "/api/posts/{post_id}/comments/{comment_id}/",
            web::put().to(posts::update_comment),
        )
        .route("/api/extra/posts/", web::get().to(posts::get_posts_sorted))
        .route("/api/extra/posts/", web::post().to(posts::create_post_strict))
        .route(
            "/api/extra/posts/{post_id}/",
            web::post().to(posts::bump_upvotes),
        )
        .route(
            "/api/extra/posts/{post_id}/comments/",
            web::post().to(posts::create_comment_strict),
        )
        .route(
            "/api/extra/posts/{post_id}/comments/{comment_id}/",
            web::put().to(posts::update_comment_strict),
        )
        // Tasks exercise
        .route("/api/tasks/", web::get().to(tasks::get_tasks))
        .route("/api/tasks/", web::post().to(tasks::create_task))
        .route("/api/tasks/{task_id}/", web::get().to(tasks::get_task))
        .route("/api/tasks/{task_id}/", web::post().to(tasks::update_task))
        .route("/api/tasks/{task_id}/", web::delete().to(tasks::delete_task))
        .route(
            "/api/tasks/{task_id}/subtasks/",
            web::get().to(tasks::get_subtasks),
        )
        .route(
            "/api/tasks/{task_id}/subtasks/",
            web::post().to(tasks::create_subtask),
        )
        // Bank exercise
        .route("/api/users/", web::get().to(bank::get_users))
        .route("/api/users/", web::post().to(bank::create_user))
        .route("/api/users/{user_id}/", web::get().to(bank::get_user))
        .route("/api/users/{user_id}/", web::delete().to(bank::delete_user))
        .route("/api/send/", web::post().to(bank::send_money))
        .route("/api/transactions/", web::post().to(bank::create_transaction))
        .route(
            "/api/transactions/{transaction_id}/",
            web::post().to(bank::decide_transaction),
        )
        .route(
            "/api/extra/users/",
            web::post().to(bank::create_user_protected),
        )
        .route(
            "/api/extra/users/{user_id}/",
            web::post().to(bank::get_user_protected),
        )
        .route(
            "/api/extra/users/{user_id}/friends/",
            web::get().to(bank::get_friends),
        )
        .route(
            "/api/extra/users/{user_id}/friends/{friend_id}/",
            web::post().to(bank::create_friendship),
        )
        .route(
            "/api/extra/users/{user_id}/join/",
            web::get().to(bank::get_user_transactions),
        )
        .route("/api/extra/send/", web::post().to(bank::send_money_protected))
        // Courses exercise
        .route("/api/courses/", web::get().to(courses::get_courses))
        .route("/api/courses/", web::post().to(courses::create_course))
        .route("/api/courses/{course_id}/", web::get().to(courses::get_course))
        .route(
            "/api/courses/{course_id}/",
            web::delete().to(courses::delete_course),
        )
        .route(
            "/api/courses/{course_id}/add/",
            web::post().to(courses::assign_user),
        )
        .route(
            "/api/courses/{course_id}/drop/",
            web::post().to(courses::drop_student),
        )
        .route(
            "/api/courses/{course_id}/assignment/",
            web::post().to(courses::create_assignment),
        )
        .route("/api/students/", web::post().to(courses::create_student))
        .route("/api/students/{user_id}/", web::get().to(courses::get_student))
        .route(
            "/api/assignments/{assignment_id}/",
            web::post().to(courses::update_assignment),
        )
        .route(
            "/api/assignments/{assignment_id}/submit/",
            web::post().to(courses::create_submission),
        )
        .route(
            "/api/assignments/{assignment_id}/grade/",
            web::post().to(courses::grade_submission),
        );
}

/// Create a configured HTTP server
///
/// Takes a database pool, the hashing parameters, and a bind address, then
/// returns a fully configured `HttpServer` ready to be run.
pub fn create_http_server(
    pool: web::Data<DbPool>,
    hash_params: web::Data<HashParams>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(hash_params.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

/// Create a test HTTP server with an in-memory database, bound to a random
/// available port. Returns the server and its bind address.
pub fn create_test_http_server() -> std::io::Result<(actix_web::dev::Server, String)> {
    let pool = web::Data::new(crate::db::create_test_pool());
    let hash_params = web::Data::new(HashParams {
        salt: "testsalt".to_string(),
        iterations: 1000,
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(hash_params.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind("127.0.0.1:0")?;

    let addrs = server.addrs();
    let addr_str = addrs
        .first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No bind address found"))?
        .to_string();

    let server = server.run();

    Ok((server, addr_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::json;

    macro_rules! test_app {
        () => {{
            let pool = web::Data::new(crate::db::create_test_pool());
            let hash_params = web::Data::new(HashParams {
                salt: "testsalt".to_string(),
                iterations: 1000,
            });

            test::init_service(
                App::new()
                    .app_data(pool)
                    .app_data(hash_params)
                    .configure(configure_routes),
            )
            .await
        }};
    }

    #[tokio::test]
    async fn test_create_http_server_with_test_pool() {
        let pool = web::Data::new(crate::db::create_test_pool());
        let hash_params = web::Data::new(HashParams {
            salt: "testsalt".to_string(),
            iterations: 1000,
        });

        let result = create_http_server(pool, hash_params, "127.0.0.1:0");
        assert!(result.is_ok(), "create_http_server should succeed");
    }

    #[tokio::test]
    async fn test_create_test_http_server() {
        let result = create_test_http_server();
        assert!(result.is_ok(), "create_test_http_server should succeed");

        let (_server, addr) = result.unwrap();
        assert!(addr.contains("127.0.0.1:"), "Address should contain 127.0.0.1:");
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_post_crud_over_http() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/posts/")
            .set_json(json!({
                "title": "My cat is the cutest!",
                "link": "https://i.imgur.com/jseZqNK.jpg",
                "username": "alicia98"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let created: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(created["upvotes"], 1);
        let id = created["id"].as_i64().expect("id missing");

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}/"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}/"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}/"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_strict_post_creation_type_checks() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/extra/posts/")
            .set_json(json!({
                "title": 42,
                "link": "https://example.com",
                "username": "bob"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Bad request");
    }

    #[actix_web::test]
    async fn test_sorted_posts_requires_sort_param() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/extra/posts/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::get()
            .uri("/api/extra/posts/?sort=increasing")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_decide_transaction_terminal_is_forbidden() {
        let app = test_app!();

        for (name, username, balance) in [("A", "a", 100), ("B", "b", 50)] {
            let req = test::TestRequest::post()
                .uri("/api/users/")
                .set_json(json!({"name": name, "username": username, "balance": balance}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 201);
        }

        let req = test::TestRequest::post()
            .uri("/api/transactions/")
            .set_json(json!({
                "sender_id": 1, "receiver_id": 2, "amount": 10, "message": "lunch"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let txn: serde_json::Value = test::read_body_json(resp).await;
        let id = txn["id"].as_i64().expect("id missing");

        let req = test::TestRequest::post()
            .uri(&format!("/api/transactions/{id}/"))
            .set_json(json!({"accepted": "true"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri(&format!("/api/transactions/{id}/"))
            .set_json(json!({"accepted": "false"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["Forbidden"], "Can not edit this transaction.");
    }

    #[actix_web::test]
    async fn test_protected_user_auth_flow() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/extra/users/")
            .set_json(json!({
                "name": "Carol", "username": "carol3", "balance": 20, "password": "hunter2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let user: serde_json::Value = test::read_body_json(resp).await;
        let id = user["id"].as_i64().expect("id missing");

        let req = test::TestRequest::post()
            .uri(&format!("/api/extra/users/{id}/"))
            .set_json(json!({"password": "hunter2"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri(&format!("/api/extra/users/{id}/"))
            .set_json(json!({"password": "wrong"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_comment_on_missing_post_is_created_but_invisible() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/posts/999/comments/")
            .set_json(json!({"text": "into the void", "username": "u"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        // Listing still 404s because the post itself does not exist
        let req = test::TestRequest::get()
            .uri("/api/posts/999/comments/")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_protected_send_requires_password() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/extra/users/")
            .set_json(json!({
                "name": "Dan", "username": "dan4", "balance": 100, "password": "hunter2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let sender: serde_json::Value = test::read_body_json(resp).await;
        let sender_id = sender["id"].as_i64().expect("id missing");

        let req = test::TestRequest::post()
            .uri("/api/users/")
            .set_json(json!({"name": "Eve", "username": "eve5", "balance": 50}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let receiver: serde_json::Value = test::read_body_json(resp).await;
        let receiver_id = receiver["id"].as_i64().expect("id missing");

        // Wrong password is rejected before any balance changes
        let req = test::TestRequest::post()
            .uri("/api/extra/send/")
            .set_json(json!({
                "sender_id": sender_id, "receiver_id": receiver_id,
                "amount": 30, "password": "wrong"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = test::TestRequest::post()
            .uri(&format!("/api/extra/users/{sender_id}/"))
            .set_json(json!({"password": "hunter2"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let profile: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(profile["balance"], 100);

        let req = test::TestRequest::post()
            .uri("/api/extra/send/")
            .set_json(json!({
                "sender_id": sender_id, "receiver_id": receiver_id,
                "amount": 30, "password": "hunter2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri(&format!("/api/extra/users/{sender_id}/"))
            .set_json(json!({"password": "hunter2"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let profile: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(profile["balance"], 70);

        let req = test::TestRequest::get()
            .uri(&format!("/api/users/{receiver_id}/"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let profile: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(profile["balance"], 80);
    }

    #[actix_web::test]
    async fn test_course_not_found_error_body() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/courses/99/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Course not found");
    }
}
