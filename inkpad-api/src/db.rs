//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the Postgres
//! implementation of [`Store`]. Every operation that writes more than one
//! row runs inside a single transaction; dropping an uncommitted
//! transaction rolls it back.

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use inkpad_core::{
    Note, NoteChanges, NoteId, StorageError, StorageResult, UniqueField, User,
    UserActivity, UserId,
};
use inkpad_storage::Store;
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row, Transaction};

/// Idempotent schema applied by [`DbClient::migrate`].
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          UUID PRIMARY KEY,
    username    VARCHAR(50)  NOT NULL,
    email       VARCHAR(255) NOT NULL,
    password    TEXT         NOT NULL,
    created_at  TIMESTAMPTZ  NOT NULL DEFAULT now(),
    CONSTRAINT users_username_key UNIQUE (username),
    CONSTRAINT users_email_key UNIQUE (email)
);

CREATE TABLE IF NOT EXISTS user_activity (
    user_id          UUID PRIMARY KEY REFERENCES users (id) ON DELETE CASCADE,
    notes_created    INTEGER NOT NULL DEFAULT 0 CHECK (notes_created >= 0),
    notes_deleted    INTEGER NOT NULL DEFAULT 0 CHECK (notes_deleted >= 0),
    notes_shared     INTEGER NOT NULL DEFAULT 0 CHECK (notes_shared >= 0),
    times_logged_in  INTEGER NOT NULL DEFAULT 0 CHECK (times_logged_in >= 0),
    private_notes    INTEGER NOT NULL DEFAULT 0 CHECK (private_notes >= 0)
);

CREATE TABLE IF NOT EXISTS notes (
    id          UUID PRIMARY KEY,
    user_id     UUID         NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    title       VARCHAR(200) NOT NULL,
    content     TEXT         NOT NULL,
    is_private  BOOLEAN      NOT NULL DEFAULT FALSE,
    created_at  TIMESTAMPTZ  NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS notes_user_id_created_at_idx ON notes (user_id, created_at, id);
"#;

const USER_COLUMNS: &str = "id, username, email, password, created_at";
const NOTE_COLUMNS: &str = "id, user_id, title, content, is_private, created_at";
const ACTIVITY_COLUMNS: &str =
    "user_id, notes_created, notes_deleted, notes_shared, times_logged_in, private_notes";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Clone)]
pub struct DbConfig {
    /// Full connection URL; overrides the discrete fields when set
    pub url: Option<String>,
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection wait timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("max_size", &self.max_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            dbname: "inkpad".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// `DATABASE_URL` wins over the `INKPAD_DB_*` variables when present.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            host: std::env::var("INKPAD_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("INKPAD_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("INKPAD_DB_NAME").unwrap_or_else(|_| "inkpad".to_string()),
            user: std::env::var("INKPAD_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("INKPAD_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("INKPAD_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("INKPAD_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    fn pool_config(&self) -> Config {
        let mut cfg = Config::new();
        match &self.url {
            Some(url) => cfg.url = Some(url.clone()),
            None => {
                cfg.host = Some(self.host.clone());
                cfg.port = Some(self.port);
                cfg.dbname = Some(self.dbname.clone());
                cfg.user = Some(self.user.clone());
                cfg.password = Some(self.password.clone());
            }
        }

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_cfg);
        cfg
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        self.pool_config()
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create connection pool");
                ApiError::database_error("Failed to create connection pool")
            })
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn pg_error(err: tokio_postgres::Error) -> StorageError {
    if let Some(db_error) = err.as_db_error() {
        if db_error.code() == &SqlState::UNIQUE_VIOLATION {
            if let Some(field) = db_error.constraint().and_then(UniqueField::from_constraint) {
                return StorageError::UniqueViolation { field };
            }
        }
    }
    tracing::error!("Database error: {:?}", err);
    StorageError::Backend {
        reason: err.to_string(),
    }
}

fn pool_error(err: PoolError) -> StorageError {
    tracing::error!(error = ?err, "Could not check out a connection");
    match err {
        PoolError::Timeout(_) => StorageError::PoolTimeout,
        other => StorageError::Backend {
            reason: format!("connection pool: {}", other),
        },
    }
}

fn commit_error(err: tokio_postgres::Error) -> StorageError {
    tracing::error!("Commit failed: {:?}", err);
    StorageError::TransactionFailed {
        reason: err.to_string(),
    }
}

fn row_to_user(row: &Row) -> StorageResult<User> {
    Ok(User {
        user_id: row.try_get("id").map_err(pg_error)?,
        username: row.try_get("username").map_err(pg_error)?,
        email: row.try_get("email").map_err(pg_error)?,
        password_hash: row.try_get("password").map_err(pg_error)?,
        created_at: row.try_get("created_at").map_err(pg_error)?,
    })
}

fn row_to_note(row: &Row) -> StorageResult<Note> {
    Ok(Note {
        id: row.try_get("id").map_err(pg_error)?,
        user_id: row.try_get("user_id").map_err(pg_error)?,
        title: row.try_get("title").map_err(pg_error)?,
        content: row.try_get("content").map_err(pg_error)?,
        is_private: row.try_get("is_private").map_err(pg_error)?,
        created_at: row.try_get("created_at").map_err(pg_error)?,
    })
}

fn row_to_activity(row: &Row) -> StorageResult<UserActivity> {
    Ok(UserActivity {
        user_id: row.try_get("user_id").map_err(pg_error)?,
        notes_created: row.try_get("notes_created").map_err(pg_error)?,
        notes_deleted: row.try_get("notes_deleted").map_err(pg_error)?,
        notes_shared: row.try_get("notes_shared").map_err(pg_error)?,
        times_logged_in: row.try_get("times_logged_in").map_err(pg_error)?,
        private_notes: row.try_get("private_notes").map_err(pg_error)?,
    })
}

/// Lock and load a user's counters inside `tx`.
async fn activity_for_update(
    tx: &Transaction<'_>,
    user_id: UserId,
) -> StorageResult<Option<UserActivity>> {
    let query = format!(
        "SELECT {} FROM user_activity WHERE user_id = $1 FOR UPDATE",
        ACTIVITY_COLUMNS
    );
    tx.query_opt(query.as_str(), &[&user_id])
        .await
        .map_err(pg_error)?
        .map(|row| row_to_activity(&row))
        .transpose()
}

async fn write_activity(tx: &Transaction<'_>, activity: &UserActivity) -> StorageResult<()> {
    tx.execute(
        "UPDATE user_activity SET notes_created = $2, notes_deleted = $3, notes_shared = $4, \
         times_logged_in = $5, private_notes = $6 WHERE user_id = $1",
        &[
            &activity.user_id,
            &activity.notes_created,
            &activity.notes_deleted,
            &activity.notes_shared,
            &activity.times_logged_in,
            &activity.private_notes,
        ],
    )
    .await
    .map_err(pg_error)?;
    Ok(())
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StorageResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(pool_error)
    }

    /// Apply the schema. Safe to run on every start.
    pub async fn migrate(&self) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA).await.map_err(pg_error)?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl Store for DbClient {
    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    async fn user_insert_with_activity(&self, user: &User) -> StorageResult<()> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;

        tx.execute(
            "INSERT INTO users (id, username, email, password, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
            &[
                &user.user_id,
                &user.username,
                &user.email,
                &user.password_hash,
                &user.created_at,
            ],
        )
        .await
        .map_err(pg_error)?;

        tx.execute(
            "INSERT INTO user_activity (user_id) VALUES ($1)",
            &[&user.user_id],
        )
        .await
        .map_err(pg_error)?;

        tx.commit().await.map_err(commit_error)
    }

    async fn user_get(&self, id: UserId) -> StorageResult<Option<User>> {
        let conn = self.get_conn().await?;
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        conn.query_opt(query.as_str(), &[&id])
            .await
            .map_err(pg_error)?
            .map(|row| row_to_user(&row))
            .transpose()
    }

    async fn user_get_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let conn = self.get_conn().await?;
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        conn.query_opt(query.as_str(), &[&username])
            .await
            .map_err(pg_error)?
            .map(|row| row_to_user(&row))
            .transpose()
    }

    async fn user_delete(&self, id: UserId) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        // Notes and activity go with the user via ON DELETE CASCADE.
        let deleted = conn
            .execute("DELETE FROM users WHERE id = $1", &[&id])
            .await
            .map_err(pg_error)?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // ACTIVITY OPERATIONS
    // ========================================================================

    async fn activity_get(&self, user_id: UserId) -> StorageResult<Option<UserActivity>> {
        let conn = self.get_conn().await?;
        let query = format!(
            "SELECT {} FROM user_activity WHERE user_id = $1",
            ACTIVITY_COLUMNS
        );
        conn.query_opt(query.as_str(), &[&user_id])
            .await
            .map_err(pg_error)?
            .map(|row| row_to_activity(&row))
            .transpose()
    }

    async fn activity_get_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<UserActivity>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT a.user_id, a.notes_created, a.notes_deleted, a.notes_shared, \
                 a.times_logged_in, a.private_notes \
                 FROM user_activity a JOIN users u ON u.id = a.user_id \
                 WHERE u.username = $1",
                &[&username],
            )
            .await
            .map_err(pg_error)?;
        row.map(|row| row_to_activity(&row)).transpose()
    }

    async fn activity_record_login(&self, user_id: UserId) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        let updated = conn
            .execute(
                "UPDATE user_activity SET times_logged_in = times_logged_in + 1 \
                 WHERE user_id = $1",
                &[&user_id],
            )
            .await
            .map_err(pg_error)?;
        Ok(updated > 0)
    }

    // ========================================================================
    // NOTE OPERATIONS
    // ========================================================================

    async fn note_insert_counted(&self, note: &Note) -> StorageResult<Note> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;

        let Some(mut activity) = activity_for_update(&tx, note.user_id).await? else {
            return Err(StorageError::UserNotFound {
                user_id: note.user_id,
            });
        };

        tx.execute(
            "INSERT INTO notes (id, user_id, title, content, is_private, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &note.id,
                &note.user_id,
                &note.title,
                &note.content,
                &note.is_private,
                &note.created_at,
            ],
        )
        .await
        .map_err(pg_error)?;

        activity.record_note_created(note.is_private);
        write_activity(&tx, &activity).await?;

        tx.commit().await.map_err(commit_error)?;
        Ok(note.clone())
    }

    async fn note_list_by_owner(&self, owner: UserId) -> StorageResult<Vec<Note>> {
        let conn = self.get_conn().await?;
        let query = format!(
            "SELECT {} FROM notes WHERE user_id = $1 ORDER BY created_at, id",
            NOTE_COLUMNS
        );
        let rows = conn
            .query(query.as_str(), &[&owner])
            .await
            .map_err(pg_error)?;
        rows.iter().map(row_to_note).collect()
    }

    async fn note_update_owned(
        &self,
        note_id: NoteId,
        owner: UserId,
        changes: &NoteChanges,
    ) -> StorageResult<Option<Note>> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;

        let query = format!(
            "SELECT {} FROM notes WHERE id = $1 AND user_id = $2 FOR UPDATE",
            NOTE_COLUMNS
        );
        let Some(row) = tx
            .query_opt(query.as_str(), &[&note_id, &owner])
            .await
            .map_err(pg_error)?
        else {
            return Ok(None);
        };

        let mut note = row_to_note(&row)?;
        let was_private = changes.apply_to(&mut note);

        tx.execute(
            "UPDATE notes SET title = $2, content = $3, is_private = $4 WHERE id = $1",
            &[&note.id, &note.title, &note.content, &note.is_private],
        )
        .await
        .map_err(pg_error)?;

        if was_private != note.is_private {
            if let Some(mut activity) = activity_for_update(&tx, owner).await? {
                activity.record_visibility_change(was_private, note.is_private);
                write_activity(&tx, &activity).await?;
            }
        }

        tx.commit().await.map_err(commit_error)?;
        Ok(Some(note))
    }

    async fn note_delete_counted(
        &self,
        note_id: NoteId,
        owner: UserId,
    ) -> StorageResult<Option<Note>> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;

        // A concurrent delete of the same row blocks here, then sees no row.
        let query = format!(
            "DELETE FROM notes WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTE_COLUMNS
        );
        let Some(row) = tx
            .query_opt(query.as_str(), &[&note_id, &owner])
            .await
            .map_err(pg_error)?
        else {
            return Ok(None);
        };
        let note = row_to_note(&row)?;

        if let Some(mut activity) = activity_for_update(&tx, owner).await? {
            activity.record_note_deleted(note.is_private);
            write_activity(&tx, &activity).await?;
        }

        tx.commit().await.map_err(commit_error)?;
        Ok(Some(note))
    }

    // ========================================================================
    // HEALTH
    // ========================================================================

    async fn ping(&self) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(pg_error)?;
        Ok(())
    }
}
