/// User, transaction, and friendship storage for the payments exercise.
///
/// The two multi-step mutations (transfer, decide_transaction) run inside a
/// single SQL transaction so the balance-sum invariant holds even if the
/// process dies between the two balance writes. There is no overdraft
/// check: balances may go negative.
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

use super::models::{Transaction, User, UserProfile, UserSummary};
use super::{DbPool, Store, StoreError, StoreResult};

fn user_from_row(row: &Row) -> SqliteResult<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        balance: row.get(3)?,
    })
}

fn transaction_from_row(row: &Row) -> SqliteResult<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        sender_id: row.get(2)?,
        receiver_id: row.get(3)?,
        amount: row.get(4)?,
        message: row.get(5)?,
        accepted: row.get(6)?,
    })
}

const TXN_COLUMNS: &str = "id, timestamp, sender_id, receiver_id, amount, message, accepted";

/// Debit sender and credit receiver on an open connection/transaction.
/// No overdraft check.
fn transfer_on(conn: &Connection, sender_id: i64, receiver_id: i64, amount: i64) -> StoreResult<()> {
    let balances: Vec<Option<i64>> = [sender_id, receiver_id]
        .iter()
        .map(|id| {
            conn.query_row(
                "SELECT balance FROM users WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
        })
        .collect::<Result<_, _>>()?;

    let (Some(sender_balance), Some(receiver_balance)) = (balances[0], balances[1]) else {
        return Err(StoreError::NotFound("User"));
    };

    conn.execute(
        "UPDATE users SET balance = ?1 WHERE id = ?2",
        params![sender_balance - amount, sender_id],
    )?;
    conn.execute(
        "UPDATE users SET balance = ?1 WHERE id = ?2",
        params![receiver_balance + amount, receiver_id],
    )?;

    Ok(())
}

fn transactions_for(conn: &Connection, user_id: i64) -> SqliteResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TXN_COLUMNS} FROM transactions
         WHERE sender_id = ?1 OR receiver_id = ?1
         ORDER BY id"
    ))?;
    let txns = stmt
        .query_map(params![user_id], transaction_from_row)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(txns)
}

fn profile_for(conn: &Connection, id: i64) -> SqliteResult<Option<UserProfile>> {
    let user = conn
        .query_row(
            "SELECT id, name, username, balance FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()?;
    let Some(user) = user else {
        return Ok(None);
    };

    let transactions = transactions_for(conn, id)?;
    Ok(Some(UserProfile {
        id: user.id,
        name: user.name,
        username: user.username,
        balance: user.balance,
        transactions,
    }))
}

impl Store {
    pub async fn create_user(
        pool: &DbPool,
        name: &str,
        username: &str,
        balance: i64,
    ) -> SqliteResult<User> {
        let conn = pool.lock().await;

        conn.execute(
            "INSERT INTO users (name, username, balance) VALUES (?1, ?2, ?3)",
            params![name, username, balance],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            "SELECT id, name, username, balance FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
    }

    /// Create a user with a password hash. Only the hash is ever stored;
    /// hashing happens at the boundary with the configured parameters.
    pub async fn create_user_protected(
        pool: &DbPool,
        name: &str,
        username: &str,
        balance: i64,
        password_hash: &str,
    ) -> SqliteResult<User> {
        let conn = pool.lock().await;

        conn.execute(
            "INSERT INTO users (name, username, balance, password) VALUES (?1, ?2, ?3, ?4)",
            params![name, username, balance, password_hash],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            "SELECT id, name, username, balance FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
    }

    /// User index: reduced projection without balances or transactions.
    pub async fn all_users(pool: &DbPool) -> SqliteResult<Vec<UserSummary>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare("SELECT id, name, username FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    username: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Full user view with every transaction the user sends or receives.
    pub async fn get_user(pool: &DbPool, id: i64) -> SqliteResult<Option<UserProfile>> {
        let conn = pool.lock().await;
        profile_for(&conn, id)
    }

    /// Delete a user, returning the prior profile. Transactions and
    /// friendship edges referencing the user are left in place.
    pub async fn delete_user(pool: &DbPool, id: i64) -> SqliteResult<Option<UserProfile>> {
        let conn = pool.lock().await;

        let profile = profile_for(&conn, id)?;
        if profile.is_some() {
            conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        }

        Ok(profile)
    }

    /// Stored password hash for a user. Outer None means the user is
    /// missing; inner None means the user has no password set.
    pub async fn password_hash_of(pool: &DbPool, id: i64) -> SqliteResult<Option<Option<String>>> {
        let conn = pool.lock().await;

        conn.query_row(
            "SELECT password FROM users WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()
    }

    /// Move `amount` from sender to receiver atomically. The sum of the two
    /// balances is unchanged; either balance may go negative.
    pub async fn transfer(
        pool: &DbPool,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> StoreResult<()> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        transfer_on(&tx, sender_id, receiver_id, amount)?;
        tx.commit()?;

        Ok(())
    }

    /// Record a transaction. A transaction created already accepted ("true")
    /// performs its transfer in the same SQL transaction.
    pub async fn create_transaction(
        pool: &DbPool,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
        message: &str,
        accepted: Option<&str>,
    ) -> StoreResult<Transaction> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;
        let timestamp = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO transactions (timestamp, sender_id, receiver_id, amount, message, accepted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![timestamp, sender_id, receiver_id, amount, message, accepted],
        )?;
        let id = tx.last_insert_rowid();

        if accepted == Some("true") {
            transfer_on(&tx, sender_id, receiver_id, amount)?;
        }

        let txn = tx.query_row(
            &format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1"),
            params![id],
            transaction_from_row,
        )?;
        tx.commit()?;

        Ok(txn)
    }

    pub async fn get_transaction(pool: &DbPool, id: i64) -> SqliteResult<Option<Transaction>> {
        let conn = pool.lock().await;

        conn.query_row(
            &format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1"),
            params![id],
            transaction_from_row,
        )
        .optional()
    }

    /// Decide a pending transaction. "true" transfers the funds and marks it
    /// accepted; "false" just marks it declined. A decided transaction is
    /// terminal: any further decide attempt fails and changes nothing.
    pub async fn decide_transaction(
        pool: &DbPool,
        id: i64,
        accepted: &str,
    ) -> StoreResult<Transaction> {
        if accepted != "true" && accepted != "false" {
            return Err(StoreError::BadRequest);
        }

        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1"),
                params![id],
                transaction_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound("Transaction"))?;

        if current.is_decided() {
            return Err(StoreError::TransactionDecided);
        }

        if accepted == "true" {
            transfer_on(&tx, current.sender_id, current.receiver_id, current.amount)?;
        }
        tx.execute(
            "UPDATE transactions SET accepted = ?1 WHERE id = ?2",
            params![accepted, id],
        )?;

        let updated = tx.query_row(
            &format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1"),
            params![id],
            transaction_from_row,
        )?;
        tx.commit()?;

        Ok(updated)
    }

    /// Insert one directed friendship edge. The reverse direction is a
    /// separate insert by the caller.
    pub async fn add_friend(pool: &DbPool, user_id: i64, friend_id: i64) -> StoreResult<()> {
        let conn = pool.lock().await;

        for id in [user_id, friend_id] {
            let exists: Option<i64> = conn
                .query_row("SELECT id FROM users WHERE id = ?1", params![id], |row| {
                    row.get(0)
                })
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::NotFound("User"));
            }
        }

        conn.execute(
            "INSERT INTO friendships (user_id, friend_id) VALUES (?1, ?2)",
            params![user_id, friend_id],
        )?;

        Ok(())
    }

    /// Friends of a user as reduced projections (no balances).
    pub async fn friends_of(pool: &DbPool, user_id: i64) -> SqliteResult<Vec<UserSummary>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.username
             FROM friendships f
             JOIN users u ON u.id = f.friend_id
             WHERE f.user_id = ?1
             ORDER BY f.id",
        )?;
        let friends = stmt
            .query_map(params![user_id], |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    username: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(friends)
    }

    /// Every transaction where the user is sender or receiver.
    pub async fn transactions_of(pool: &DbPool, user_id: i64) -> SqliteResult<Vec<Transaction>> {
        let conn = pool.lock().await;
        transactions_for(&conn, user_id)
    }
}
