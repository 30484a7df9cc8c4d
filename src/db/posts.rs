/// Post and comment storage for the reddit-style exercise.
/// Comments attach to posts through the post_comments link table; deleting a
/// post leaves its comments and link rows dangling, and listings skip them.
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

use super::models::{Comment, Post, SortOrder};
use super::{DbPool, Store, StoreError, StoreResult};

fn post_from_row(row: &Row) -> SqliteResult<Post> {
    Ok(Post {
        id: row.get(0)?,
        upvotes: row.get(1)?,
        title: row.get(2)?,
        link: row.get(3)?,
        username: row.get(4)?,
    })
}

fn comment_from_row(row: &Row) -> SqliteResult<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        upvotes: row.get(1)?,
        text: row.get(2)?,
        username: row.get(3)?,
    })
}

impl Store {
    /// Create a post; upvotes start at 1.
    pub async fn create_post(
        pool: &DbPool,
        title: &str,
        link: &str,
        username: &str,
    ) -> SqliteResult<Post> {
        let conn = pool.lock().await;

        conn.execute(
            "INSERT INTO posts (title, link, username) VALUES (?1, ?2, ?3)",
            params![title, link, username],
        )?;
        let id = conn.last_insert_rowid();

        let mut stmt =
            conn.prepare("SELECT id, upvotes, title, link, username FROM posts WHERE id = ?1")?;
        stmt.query_row(params![id], post_from_row)
    }

    /// Get post by id
    pub async fn get_post(pool: &DbPool, id: i64) -> SqliteResult<Option<Post>> {
        let conn = pool.lock().await;

        let mut stmt =
            conn.prepare("SELECT id, upvotes, title, link, username FROM posts WHERE id = ?1")?;
        stmt.query_row(params![id], post_from_row).optional()
    }

    /// All posts in id order
    pub async fn all_posts(pool: &DbPool) -> SqliteResult<Vec<Post>> {
        let conn = pool.lock().await;

        let mut stmt =
            conn.prepare("SELECT id, upvotes, title, link, username FROM posts ORDER BY id")?;
        let posts = stmt
            .query_map([], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// All posts ordered by upvotes. Id is the tiebreaker so both
    /// directions are stable total orders over the same element set.
    pub async fn posts_sorted(pool: &DbPool, order: SortOrder) -> SqliteResult<Vec<Post>> {
        let conn = pool.lock().await;

        let sql = match order {
            SortOrder::Increasing => {
                "SELECT id, upvotes, title, link, username FROM posts ORDER BY upvotes ASC, id ASC"
            }
            SortOrder::Decreasing => {
                "SELECT id, upvotes, title, link, username FROM posts ORDER BY upvotes DESC, id ASC"
            }
        };

        let mut stmt = conn.prepare(sql)?;
        let posts = stmt
            .query_map([], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// Delete a post and return the prior value. Comments and link rows are
    /// left in place; comment listings skip dangling links.
    pub async fn delete_post(pool: &DbPool, id: i64) -> SqliteResult<Option<Post>> {
        let conn = pool.lock().await;

        let post = conn
            .query_row(
                "SELECT id, upvotes, title, link, username FROM posts WHERE id = ?1",
                params![id],
                post_from_row,
            )
            .optional()?;

        if post.is_some() {
            conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        }

        Ok(post)
    }

    /// Add `delta` to a post's upvote count and return the updated post.
    pub async fn bump_upvotes(pool: &DbPool, id: i64, delta: i64) -> SqliteResult<Option<Post>> {
        let conn = pool.lock().await;

        let changed = conn.execute(
            "UPDATE posts SET upvotes = upvotes + ?1 WHERE id = ?2",
            params![delta, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        conn.query_row(
            "SELECT id, upvotes, title, link, username FROM posts WHERE id = ?1",
            params![id],
            post_from_row,
        )
        .optional()
    }

    /// Create a comment and its link row in one transaction. The caller is
    /// responsible for checking the post exists where the endpoint demands it.
    pub async fn create_comment(
        pool: &DbPool,
        post_id: i64,
        text: &str,
        username: &str,
    ) -> SqliteResult<Comment> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO comments (text, username) VALUES (?1, ?2)",
            params![text, username],
        )?;
        let comment_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO post_comments (post_id, comment_id) VALUES (?1, ?2)",
            params![post_id, comment_id],
        )?;

        let comment = tx.query_row(
            "SELECT id, upvotes, text, username FROM comments WHERE id = ?1",
            params![comment_id],
            comment_from_row,
        )?;
        tx.commit()?;

        Ok(comment)
    }

    /// Comments attached to a post. The join drops link rows whose comment
    /// has gone missing.
    pub async fn comments_of(pool: &DbPool, post_id: i64) -> SqliteResult<Vec<Comment>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare(
            "SELECT c.id, c.upvotes, c.text, c.username
             FROM post_comments pc
             JOIN comments c ON c.id = pc.comment_id
             WHERE pc.post_id = ?1
             ORDER BY c.id",
        )?;
        let comments = stmt
            .query_map(params![post_id], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// Replace a comment's text, reporting NotFound when it is missing.
    pub async fn update_comment_text(
        pool: &DbPool,
        comment_id: i64,
        text: &str,
    ) -> StoreResult<Comment> {
        let conn = pool.lock().await;

        let changed = conn.execute(
            "UPDATE comments SET text = ?1 WHERE id = ?2",
            params![text, comment_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("Comment"));
        }

        let comment = conn.query_row(
            "SELECT id, upvotes, text, username FROM comments WHERE id = ?1",
            params![comment_id],
            comment_from_row,
        )?;

        Ok(comment)
    }
}
