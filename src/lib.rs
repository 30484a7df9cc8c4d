/// Campus Backend library
///
/// A set of CRUD teaching backends unified behind one HTTP server and one
/// embedded SQLite store: posts/comments, tasks/subtasks,
/// users/transactions/friendships, and courses/assignments/submissions.
pub mod auth;
pub mod config;
pub mod db;
pub mod handlers;
pub mod server;
