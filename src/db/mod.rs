// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite via sqlx).

pub mod sqlite;

pub use sqlite::{SqliteDb, SwapSide, UserSearch};

/// Schema statements, applied in order at startup. Each is idempotent.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY NOT NULL,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        location      TEXT,
        profile_photo TEXT,
        is_public     INTEGER NOT NULL DEFAULT 1,
        availability  TEXT,
        role          TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
        is_banned     INTEGER NOT NULL DEFAULT 0,
        created_at    TEXT NOT NULL,
        updated_at    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS skills (
        id         TEXT PRIMARY KEY NOT NULL,
        name       TEXT NOT NULL UNIQUE COLLATE NOCASE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_skills (
        user_id    TEXT NOT NULL REFERENCES users(id),
        skill_id   TEXT NOT NULL REFERENCES skills(id),
        direction  TEXT NOT NULL CHECK (direction IN ('offered', 'wanted')),
        created_at TEXT NOT NULL,
        PRIMARY KEY (user_id, skill_id, direction)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS swap_requests (
        id                TEXT PRIMARY KEY NOT NULL,
        sender_id         TEXT NOT NULL REFERENCES users(id),
        receiver_id       TEXT NOT NULL REFERENCES users(id),
        sender_skill_id   TEXT NOT NULL REFERENCES skills(id),
        receiver_skill_id TEXT NOT NULL REFERENCES skills(id),
        message           TEXT,
        status            TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'accepted', 'rejected', 'cancelled', 'completed')),
        created_at        TEXT NOT NULL,
        updated_at        TEXT NOT NULL,
        CHECK (sender_id <> receiver_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_swap_requests_sender ON swap_requests (sender_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_swap_requests_receiver ON swap_requests (receiver_id, status)",
    r#"
    CREATE TABLE IF NOT EXISTS feedback (
        id         TEXT PRIMARY KEY NOT NULL,
        swap_id    TEXT NOT NULL REFERENCES swap_requests(id) ON DELETE CASCADE,
        rater_id   TEXT NOT NULL REFERENCES users(id),
        rated_id   TEXT NOT NULL REFERENCES users(id),
        rating     INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        comment    TEXT,
        created_at TEXT NOT NULL,
        UNIQUE (swap_id, rater_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_feedback_rated ON feedback (rated_id)",
];
