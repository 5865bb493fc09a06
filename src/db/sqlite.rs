// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, ban flag)
//! - Skills (catalog) and user skills (offered / wanted associations)
//! - Swap requests (creation, compare-and-set status transitions)
//! - Feedback (ratings attached to swaps)

use crate::db::SCHEMA;
use crate::error::{is_unique_violation, AppError};
use crate::models::{
    Feedback, RatingSummary, Role, Skill, SkillDirection, SwapRequest, SwapStatus, User,
    UserSkill,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::str::FromStr;
use std::time::Duration;

const USER_COLUMNS: &str = "id, name, email, password_hash, location, profile_photo, \
                            is_public, availability, role, is_banned, created_at, updated_at";
const SWAP_COLUMNS: &str = "id, sender_id, receiver_id, sender_skill_id, receiver_skill_id, \
                            message, status, created_at, updated_at";
const FEEDBACK_COLUMNS: &str = "id, swap_id, rater_id, rated_id, rating, comment, created_at";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Which side of a swap a listing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapSide {
    Sent,
    Received,
}

/// Storage-level user search filter. All present fields must match.
#[derive(Debug, Clone, Default)]
pub struct UserSearch {
    /// Case-insensitive substring of a skill name
    pub skill: Option<String>,
    /// Restrict the skill match to one direction
    pub direction: Option<SkillDirection>,
    /// Exact availability tag
    pub availability: Option<String>,
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    location: Option<String>,
    profile_photo: Option<String>,
    is_public: bool,
    availability: Option<String>,
    role: String,
    is_banned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            role: Role::from_str(&row.role).map_err(AppError::Database)?,
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            location: row.location,
            profile_photo: row.profile_photo,
            is_public: row.is_public,
            availability: row.availability,
            is_banned: row.is_banned,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct UserSkillRow {
    skill_id: String,
    name: String,
    direction: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserSkillRow> for UserSkill {
    type Error = AppError;

    fn try_from(row: UserSkillRow) -> Result<Self, Self::Error> {
        Ok(UserSkill {
            direction: SkillDirection::from_str(&row.direction).map_err(AppError::Database)?,
            skill_id: row.skill_id,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct SwapRow {
    id: String,
    sender_id: String,
    receiver_id: String,
    sender_skill_id: String,
    receiver_skill_id: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SwapRow> for SwapRequest {
    type Error = AppError;

    fn try_from(row: SwapRow) -> Result<Self, Self::Error> {
        Ok(SwapRequest {
            status: SwapStatus::from_str(&row.status).map_err(AppError::Database)?,
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            sender_skill_id: row.sender_skill_id,
            receiver_skill_id: row.receiver_skill_id,
            message: row.message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Escape LIKE wildcards and wrap in `%...%` for substring matching.
fn like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    escaped.push('%');
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_search_conditions(qb: &mut QueryBuilder<'_, Sqlite>, filter: &UserSearch, exclude_id: &str) {
    qb.push(" WHERE u.is_public = 1 AND u.is_banned = 0 AND u.id <> ");
    qb.push_bind(exclude_id.to_string());

    if let Some(availability) = &filter.availability {
        qb.push(" AND u.availability = ");
        qb.push_bind(availability.clone());
    }

    if let Some(skill) = &filter.skill {
        qb.push(
            " AND EXISTS (SELECT 1 FROM user_skills us JOIN skills s ON s.id = us.skill_id \
             WHERE us.user_id = u.id AND s.name LIKE ",
        );
        qb.push_bind(like_pattern(skill));
        qb.push(" ESCAPE '\\'");
        if let Some(direction) = filter.direction {
            qb.push(" AND us.direction = ");
            qb.push_bind(direction.as_str());
        }
        qb.push(")");
    }
}

/// SQLite database client.
#[derive(Clone)]
pub struct SqliteDb {
    pool: SqlitePool,
}

impl SqliteDb {
    /// Connect to a SQLite database, creating the file if needed.
    ///
    /// `sqlite::memory:` URLs are routed to [`SqliteDb::in_memory`].
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open {url}: {e}")))?;

        tracing::info!(url, max_connections, "Connected to SQLite");

        Ok(Self { pool })
    }

    /// Private in-memory database (tests, local experiments).
    ///
    /// An in-memory database lives as long as its single connection, so the
    /// pool is pinned to exactly one connection that is never recycled.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Create tables and indexes if they do not exist.
    pub async fn migrate(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!(statements = SCHEMA.len(), "Schema applied");
        Ok(())
    }

    /// Cheap round trip used by the health check.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Seed the catalog with `names` if it is empty. Returns the number inserted.
    pub async fn seed_skills(&self, names: &[&str]) -> Result<usize, AppError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for name in names {
            sqlx::query("INSERT OR IGNORE INTO skills (id, name, created_at) VALUES (?, ?, ?)")
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(*name)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(count = names.len(), "Seeded skill catalog");
        Ok(names.len())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Insert a new user. Fails with `Conflict` if the email is taken.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, location, profile_photo,
                is_public, availability, role, is_banned, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.location)
        .bind(&user.profile_photo)
        .bind(user.is_public)
        .bind(&user.availability)
        .bind(user.role.as_str())
        .bind(user.is_banned)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else {
                AppError::from(e)
            }
        })?;
        Ok(())
    }

    /// Get a user by id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// Get a user by (lowercased) email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    /// Page through all users in insertion order.
    pub async fn list_users(&self, offset: u32, limit: u32) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY rowid LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Set or clear the ban flag. Returns `false` if the user does not exist.
    pub async fn set_user_banned(
        &self,
        user_id: &str,
        banned: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET is_banned = ?, updated_at = ? WHERE id = ?")
            .bind(banned)
            .bind(now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn count_banned_users(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_banned = 1")
            .fetch_one(&self.pool)
            .await?)
    }

    /// Write a user's mutable profile fields and, when given, replace the
    /// offered / wanted skill sets, all in one transaction.
    pub async fn save_profile(
        &self,
        user: &User,
        offered: Option<&[String]>,
        wanted: Option<&[String]>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, location = ?, profile_photo = ?, is_public = ?,
                availability = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.location)
        .bind(&user.profile_photo)
        .bind(user.is_public)
        .bind(&user.availability)
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user.id)));
        }

        for (direction, skill_ids) in [
            (SkillDirection::Offered, offered),
            (SkillDirection::Wanted, wanted),
        ] {
            let Some(skill_ids) = skill_ids else {
                continue;
            };

            sqlx::query("DELETE FROM user_skills WHERE user_id = ? AND direction = ?")
                .bind(&user.id)
                .bind(direction.as_str())
                .execute(&mut *tx)
                .await?;

            for skill_id in skill_ids {
                sqlx::query(
                    "INSERT INTO user_skills (user_id, skill_id, direction, created_at) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(&user.id)
                .bind(skill_id)
                .bind(direction.as_str())
                .bind(user.updated_at)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Public, non-banned users matching `filter`, excluding `exclude_id`.
    ///
    /// Returns one page in insertion order plus the total match count.
    pub async fn search_users(
        &self,
        filter: &UserSearch,
        exclude_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<(Vec<User>, i64), AppError> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users u");
        push_search_conditions(&mut count_query, filter, exclude_id);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users u"));
        push_search_conditions(&mut page_query, filter, exclude_id);
        page_query.push(" ORDER BY u.rowid LIMIT ");
        page_query.push_bind(i64::from(limit));
        page_query.push(" OFFSET ");
        page_query.push_bind(i64::from(offset));

        let rows: Vec<UserRow> = page_query.build_query_as().fetch_all(&self.pool).await?;
        Ok((convert_all(rows)?, total))
    }

    // ─── Skill Catalog ───────────────────────────────────────────

    /// All catalog skills, alphabetically.
    pub async fn list_skills(&self) -> Result<Vec<Skill>, AppError> {
        Ok(sqlx::query_as::<_, Skill>(
            "SELECT id, name, created_at FROM skills ORDER BY name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_skill(&self, skill_id: &str) -> Result<Option<Skill>, AppError> {
        Ok(
            sqlx::query_as::<_, Skill>("SELECT id, name, created_at FROM skills WHERE id = ?")
                .bind(skill_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Look up a skill by name (case-insensitive).
    pub async fn find_skill_by_name(&self, name: &str) -> Result<Option<Skill>, AppError> {
        Ok(
            sqlx::query_as::<_, Skill>("SELECT id, name, created_at FROM skills WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Look up a skill by name (case-insensitive), creating it if missing.
    pub async fn get_or_create_skill(&self, name: &str) -> Result<Skill, AppError> {
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO skills (id, name, created_at) VALUES (?, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!(name, "Added skill to catalog");
        }

        Ok(
            sqlx::query_as::<_, Skill>("SELECT id, name, created_at FROM skills WHERE name = ?")
                .bind(name)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    // ─── User Skill Operations ───────────────────────────────────

    /// A user's skills with names resolved, in the order they were added.
    pub async fn get_user_skills(&self, user_id: &str) -> Result<Vec<UserSkill>, AppError> {
        let rows = sqlx::query_as::<_, UserSkillRow>(
            r#"
            SELECT us.skill_id, s.name, us.direction, us.created_at
            FROM user_skills us
            JOIN skills s ON s.id = us.skill_id
            WHERE us.user_id = ?
            ORDER BY us.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Whether `user_id` lists `skill_id` in `direction`.
    pub async fn has_user_skill(
        &self,
        user_id: &str,
        skill_id: &str,
        direction: SkillDirection,
    ) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_skills \
             WHERE user_id = ? AND skill_id = ? AND direction = ?)",
        )
        .bind(user_id)
        .bind(skill_id)
        .bind(direction.as_str())
        .fetch_one(&self.pool)
        .await?)
    }

    /// Add one skill association, refusing if the direction already holds
    /// `max_per_direction` entries.
    ///
    /// Returns `false` when the cap was hit; `Conflict` on a duplicate.
    pub async fn add_user_skill(
        &self,
        user_id: &str,
        skill_id: &str,
        direction: SkillDirection,
        max_per_direction: usize,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // Cap check and insert are one statement so concurrent adds cannot overshoot.
        let result = sqlx::query(
            r#"
            INSERT INTO user_skills (user_id, skill_id, direction, created_at)
            SELECT ?, ?, ?, ?
            WHERE (SELECT COUNT(*) FROM user_skills WHERE user_id = ? AND direction = ?) < ?
            "#,
        )
        .bind(user_id)
        .bind(skill_id)
        .bind(direction.as_str())
        .bind(now)
        .bind(user_id)
        .bind(direction.as_str())
        .bind(max_per_direction as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Skill already listed as {direction}"))
            } else {
                AppError::from(e)
            }
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove one skill association. Returns `false` if it did not exist.
    pub async fn remove_user_skill(
        &self,
        user_id: &str,
        skill_id: &str,
        direction: SkillDirection,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM user_skills WHERE user_id = ? AND skill_id = ? AND direction = ?",
        )
        .bind(user_id)
        .bind(skill_id)
        .bind(direction.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Swap Request Operations ─────────────────────────────────

    /// Insert a new swap request unless an identical one is still pending.
    ///
    /// "Identical" means same sender, receiver and skill pair. Returns
    /// `false` (nothing written) when such a pending request exists.
    pub async fn insert_swap_unless_duplicate(&self, swap: &SwapRequest) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO swap_requests (
                id, sender_id, receiver_id, sender_skill_id, receiver_skill_id,
                message, status, created_at, updated_at
            )
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM swap_requests
                WHERE sender_id = ? AND receiver_id = ?
                  AND sender_skill_id = ? AND receiver_skill_id = ?
                  AND status = 'pending'
            )
            "#,
        )
        .bind(&swap.id)
        .bind(&swap.sender_id)
        .bind(&swap.receiver_id)
        .bind(&swap.sender_skill_id)
        .bind(&swap.receiver_skill_id)
        .bind(&swap.message)
        .bind(swap.status.as_str())
        .bind(swap.created_at)
        .bind(swap.updated_at)
        .bind(&swap.sender_id)
        .bind(&swap.receiver_id)
        .bind(&swap.sender_skill_id)
        .bind(&swap.receiver_skill_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_swap(&self, swap_id: &str) -> Result<Option<SwapRequest>, AppError> {
        sqlx::query_as::<_, SwapRow>(&format!(
            "SELECT {SWAP_COLUMNS} FROM swap_requests WHERE id = ?"
        ))
        .bind(swap_id)
        .fetch_optional(&self.pool)
        .await?
        .map(SwapRequest::try_from)
        .transpose()
    }

    /// Compare-and-set the status of a swap.
    ///
    /// The update only applies while the stored status is still `from`, so of
    /// two racing transitions exactly one observes `true`.
    pub async fn transition_swap(
        &self,
        swap_id: &str,
        from: SwapStatus,
        to: SwapStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE swap_requests SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(to.as_str())
        .bind(now)
        .bind(swap_id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Swaps sent or received by `user_id`, newest first.
    pub async fn list_swaps_for_user(
        &self,
        user_id: &str,
        side: SwapSide,
        status: Option<SwapStatus>,
    ) -> Result<Vec<SwapRequest>, AppError> {
        let column = match side {
            SwapSide::Sent => "sender_id",
            SwapSide::Received => "receiver_id",
        };

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SWAP_COLUMNS} FROM swap_requests WHERE {column} = "
        ));
        query.push_bind(user_id.to_string());
        if let Some(status) = status {
            query.push(" AND status = ");
            query.push_bind(status.as_str());
        }
        query.push(" ORDER BY rowid DESC");

        let rows: Vec<SwapRow> = query.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    /// All swaps (admin view), newest first.
    pub async fn list_swaps(
        &self,
        status: Option<SwapStatus>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<SwapRequest>, AppError> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {SWAP_COLUMNS} FROM swap_requests"));
        if let Some(status) = status {
            query.push(" WHERE status = ");
            query.push_bind(status.as_str());
        }
        query.push(" ORDER BY rowid DESC LIMIT ");
        query.push_bind(i64::from(limit));
        query.push(" OFFSET ");
        query.push_bind(i64::from(offset));

        let rows: Vec<SwapRow> = query.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    pub async fn count_swaps(&self, status: Option<SwapStatus>) -> Result<i64, AppError> {
        let count = match status {
            Some(status) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM swap_requests WHERE status = ?")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM swap_requests")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    /// Hard-delete a swap and its feedback. Returns `false` if it did not exist.
    pub async fn delete_swap(&self, swap_id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let feedback = sqlx::query("DELETE FROM feedback WHERE swap_id = ?")
            .bind(swap_id)
            .execute(&mut *tx)
            .await?;

        let swap = sqlx::query("DELETE FROM swap_requests WHERE id = ?")
            .bind(swap_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            swap_id,
            feedback_deleted = feedback.rows_affected(),
            "Deleted swap request"
        );
        Ok(swap.rows_affected() > 0)
    }

    // ─── Feedback Operations ─────────────────────────────────────

    /// Insert feedback. Fails with `Conflict` if the rater already rated this swap.
    pub async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        sqlx::query(&format!(
            "INSERT INTO feedback ({FEEDBACK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&feedback.id)
        .bind(&feedback.swap_id)
        .bind(&feedback.rater_id)
        .bind(&feedback.rated_id)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Feedback already submitted for this swap".to_string())
            } else {
                AppError::from(e)
            }
        })?;
        Ok(())
    }

    pub async fn has_feedback(&self, swap_id: &str, rater_id: &str) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM feedback WHERE swap_id = ? AND rater_id = ?)",
        )
        .bind(swap_id)
        .bind(rater_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Feedback written by `rater_id`, newest first.
    pub async fn list_feedback_by_rater(&self, rater_id: &str) -> Result<Vec<Feedback>, AppError> {
        self.feedback_where("rater_id", rater_id).await
    }

    /// Feedback received by `rated_id`, newest first.
    pub async fn list_feedback_for_user(&self, rated_id: &str) -> Result<Vec<Feedback>, AppError> {
        self.feedback_where("rated_id", rated_id).await
    }

    pub async fn list_feedback_for_swap(&self, swap_id: &str) -> Result<Vec<Feedback>, AppError> {
        self.feedback_where("swap_id", swap_id).await
    }

    async fn feedback_where(&self, column: &str, value: &str) -> Result<Vec<Feedback>, AppError> {
        Ok(sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE {column} = ? ORDER BY rowid DESC"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?)
    }

    /// All feedback (admin view), newest first.
    pub async fn list_feedback(&self, offset: u32, limit: u32) -> Result<Vec<Feedback>, AppError> {
        Ok(sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback ORDER BY rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?)
    }

    /// Hard-delete one feedback record. Returns `false` if it did not exist.
    pub async fn delete_feedback(&self, feedback_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = ?")
            .bind(feedback_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_feedback(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
            .fetch_one(&self.pool)
            .await?)
    }

    /// Mean of all ratings on the platform, `None` if there are none.
    pub async fn average_rating(&self) -> Result<Option<f64>, AppError> {
        Ok(sqlx::query_scalar("SELECT AVG(rating) FROM feedback")
            .fetch_one(&self.pool)
            .await?)
    }

    /// Rating aggregate for one user.
    pub async fn rating_summary(&self, user_id: &str) -> Result<RatingSummary, AppError> {
        let (average, count): (Option<f64>, i64) =
            sqlx::query_as("SELECT AVG(rating), COUNT(*) FROM feedback WHERE rated_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(RatingSummary {
            average,
            count: u32::try_from(count).unwrap_or(u32::MAX),
        })
    }
}
