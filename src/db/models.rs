/// Data models for database operations.
/// Covers the four exercise groups: posts, tasks, bank, and courses.
use serde::{Deserialize, Serialize};

// -- Posts ----------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub upvotes: i64,
    pub title: String,
    pub link: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub upvotes: i64,
    pub text: String,
    pub username: String,
}

/// Sort direction for the upvote-sorted post listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Increasing,
    Decreasing,
}

impl SortOrder {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "increasing" => Some(SortOrder::Increasing),
            "decreasing" => Some(SortOrder::Decreasing),
            _ => None,
        }
    }
}

// -- Tasks ----------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subtask {
    pub id: i64,
    pub description: String,
    pub done: bool,
    pub task_id: i64,
}

// -- Bank -----------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub balance: i64,
}

/// Reduced projection used for the user index and friend listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub username: String,
}

/// Full user view including every transaction the user participates in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub balance: i64,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub timestamp: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: i64,
    pub message: String,
    /// Unset until decided, then "true" or "false" forever.
    pub accepted: Option<String>,
}

impl Transaction {
    pub fn is_decided(&self) -> bool {
        self.accepted.is_some()
    }
}

// -- Courses --------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// Serialized course view: assignments plus members split by role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetail {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub assignments: Vec<Assignment>,
    pub instructors: Vec<Student>,
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub netid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDetail {
    pub id: i64,
    pub name: String,
    pub netid: String,
    pub courses: Vec<CourseDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub due_date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub score: Option<i64>,
}

/// Course membership role, stored in the course_roles side table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    Instructor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Instructor => "instructor",
            Role::Student => "student",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "instructor" => Some(Role::Instructor),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub link: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct BumpUpvotesRequest {
    pub upvotes: i64,
}

#[derive(Debug, Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub description: Option<String>,
    pub done: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubtaskRequest {
    pub description: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub balance: i64,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMoneyRequest {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: i64,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: i64,
    pub message: String,
    pub accepted: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecideTransactionRequest {
    pub accepted: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub netid: String,
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct DropStudentRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub due_date: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub due_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub user_id: i64,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct GradeSubmissionRequest {
    pub submission_id: i64,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_serialization() {
        let post = Post {
            id: 1,
            upvotes: 1,
            title: "Cat loaf".to_string(),
            link: "https://example.com/loaf.jpg".to_string(),
            username: "alicia98".to_string(),
        };

        let json = serde_json::to_string(&post).expect("Serialization failed");
        let deserialized: Post = serde_json::from_str(&json).expect("Deserialization failed");

        assert_eq!(deserialized, post);
    }

    #[test]
    fn test_transaction_accepted_tristate() {
        let json = r#"{"id":1,"timestamp":"t","sender_id":1,"receiver_id":2,"amount":5,"message":"hi","accepted":null}"#;
        let txn: Transaction = serde_json::from_str(json).expect("Deserialization failed");
        assert!(!txn.is_decided());
        assert_eq!(txn.accepted, None);
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!(SortOrder::from_str("increasing"), Some(SortOrder::Increasing));
        assert_eq!(SortOrder::from_str("decreasing"), Some(SortOrder::Decreasing));
        assert_eq!(SortOrder::from_str("sideways"), None);
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str("instructor"), Some(Role::Instructor));
        assert_eq!(Role::from_str("student"), Some(Role::Student));
        assert_eq!(Role::from_str("ta"), None);
        assert_eq!(Role::Instructor.as_str(), "instructor");
    }

    #[test]
    fn test_create_user_request_default_balance() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"name":"Alice","username":"alice1"}"#)
                .expect("Deserialization failed");
        assert_eq!(req.balance, 0);
        assert!(req.password.is_none());
    }
}
