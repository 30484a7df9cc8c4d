/// Integration tests exercising the store through the library crate,
/// covering the cross-entity workflows: transfers, transaction decisions,
/// course cascades, and the password-protected user flow.
use campus_backend::auth::{self, HashParams};
use campus_backend::db::models::{Role, SortOrder};
use campus_backend::db::{create_test_pool, Store, StoreError};

fn test_params() -> HashParams {
    HashParams {
        salt: "integration-salt".to_string(),
        iterations: 1000,
    }
}

#[tokio::test]
async fn test_transfer_scenario() {
    let pool = create_test_pool();

    let a = Store::create_user(&pool, "A", "usera", 100)
        .await
        .expect("Failed to create user");
    let b = Store::create_user(&pool, "B", "userb", 50)
        .await
        .expect("Failed to create user");

    Store::transfer(&pool, a.id, b.id, 30)
        .await
        .expect("Transfer failed");

    let a_after = Store::get_user(&pool, a.id)
        .await
        .expect("Query failed")
        .expect("User not found");
    let b_after = Store::get_user(&pool, b.id)
        .await
        .expect("Query failed")
        .expect("User not found");

    assert_eq!(a_after.balance, 70);
    assert_eq!(b_after.balance, 80);
    assert_eq!(a_after.balance + b_after.balance, 150);
}

#[tokio::test]
async fn test_transaction_decision_scenario() {
    let pool = create_test_pool();

    let a = Store::create_user(&pool, "A", "usera", 100)
        .await
        .expect("Failed to create user");
    let b = Store::create_user(&pool, "B", "userb", 50)
        .await
        .expect("Failed to create user");

    let txn = Store::create_transaction(&pool, a.id, b.id, 10, "coffee", None)
        .await
        .expect("Failed to create transaction");
    assert!(txn.accepted.is_none());

    let decided = Store::decide_transaction(&pool, txn.id, "true")
        .await
        .expect("Decide failed");
    assert_eq!(decided.accepted.as_deref(), Some("true"));

    // Any further decision is refused and leaves balances untouched.
    for value in ["true", "false"] {
        let result = Store::decide_transaction(&pool, txn.id, value).await;
        assert!(matches!(result, Err(StoreError::TransactionDecided)));
    }

    let a_after = Store::get_user(&pool, a.id)
        .await
        .expect("Query failed")
        .expect("User not found");
    let b_after = Store::get_user(&pool, b.id)
        .await
        .expect("Query failed")
        .expect("User not found");
    assert_eq!(a_after.balance, 90);
    assert_eq!(b_after.balance, 60);

    // The decided transaction shows up in both users' embedded listings.
    assert_eq!(a_after.transactions.len(), 1);
    assert_eq!(b_after.transactions.len(), 1);
    assert_eq!(a_after.transactions[0].accepted.as_deref(), Some("true"));
}

#[tokio::test]
async fn test_protected_user_scenario() {
    let pool = create_test_pool();
    let params = test_params();

    let hash = auth::hash_password(&params, "hunter2");
    let user = Store::create_user_protected(&pool, "Carol", "carol3", 0, &hash)
        .await
        .expect("Failed to create user");

    let stored = Store::password_hash_of(&pool, user.id)
        .await
        .expect("Query failed")
        .expect("User not found")
        .expect("Password missing");

    assert!(auth::verify_password(&params, "hunter2", &stored));
    assert!(!auth::verify_password(&params, "wrong", &stored));
}

#[tokio::test]
async fn test_course_cascade_workflow() {
    let pool = create_test_pool();

    let course = Store::create_course(&pool, "CS 1998", "Backend")
        .await
        .expect("Failed to create course");
    let instructor = Store::create_student(&pool, "Prof", "prof1")
        .await
        .expect("Failed to create student");
    let student = Store::create_student(&pool, "Stu", "stu1")
        .await
        .expect("Failed to create student");

    Store::enroll(&pool, course.id, instructor.id, Role::Instructor)
        .await
        .expect("Enroll failed");
    Store::enroll(&pool, course.id, student.id, Role::Student)
        .await
        .expect("Enroll failed");

    let assignment = Store::create_assignment(&pool, course.id, "PA1", 1_700_000_000)
        .await
        .expect("Failed to create assignment");
    let submission = Store::create_submission(&pool, assignment.id, student.id, "answer")
        .await
        .expect("Failed to create submission");
    Store::grade_submission(&pool, assignment.id, submission.id, 90)
        .await
        .expect("Grade failed");

    let detail = Store::get_course(&pool, course.id)
        .await
        .expect("Query failed")
        .expect("Course not found");
    assert_eq!(detail.instructors.len(), 1);
    assert_eq!(detail.students.len(), 1);
    assert_eq!(detail.assignments.len(), 1);

    Store::delete_course(&pool, course.id)
        .await
        .expect("Delete failed")
        .expect("Course not found");

    // Every descendant is gone; the people remain.
    assert!(Store::get_course(&pool, course.id)
        .await
        .expect("Query failed")
        .is_none());
    assert!(Store::get_assignment(&pool, assignment.id)
        .await
        .expect("Query failed")
        .is_none());
    assert!(Store::get_submission(&pool, submission.id)
        .await
        .expect("Query failed")
        .is_none());
    assert!(Store::get_student(&pool, student.id)
        .await
        .expect("Query failed")
        .is_some());
}

#[tokio::test]
async fn test_sorted_listing_matches_unsorted_set() {
    let pool = create_test_pool();

    for (title, bump) in [("a", 0), ("b", 7), ("c", 3), ("d", 7)] {
        let post = Store::create_post(&pool, title, "link", "user")
            .await
            .expect("Failed to create post");
        if bump > 0 {
            Store::bump_upvotes(&pool, post.id, bump)
                .await
                .expect("Bump failed");
        }
    }

    let unsorted = Store::all_posts(&pool).await.expect("Query failed");
    let increasing = Store::posts_sorted(&pool, SortOrder::Increasing)
        .await
        .expect("Query failed");
    let decreasing = Store::posts_sorted(&pool, SortOrder::Decreasing)
        .await
        .expect("Query failed");

    assert!(increasing.windows(2).all(|w| w[0].upvotes <= w[1].upvotes));
    assert!(decreasing.windows(2).all(|w| w[0].upvotes >= w[1].upvotes));

    // Same element set in all three listings.
    let mut base: Vec<i64> = unsorted.iter().map(|p| p.id).collect();
    let mut inc: Vec<i64> = increasing.iter().map(|p| p.id).collect();
    let mut dec: Vec<i64> = decreasing.iter().map(|p| p.id).collect();
    base.sort_unstable();
    inc.sort_unstable();
    dec.sort_unstable();
    assert_eq!(base, inc);
    assert_eq!(base, dec);
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() {
    let pool = create_test_pool();

    let first = Store::create_task(&pool, "one", false)
        .await
        .expect("Failed to create task");
    Store::delete_task(&pool, first.id)
        .await
        .expect("Delete failed");

    let second = Store::create_task(&pool, "two", false)
        .await
        .expect("Failed to create task");
    assert!(second.id > first.id);
}
