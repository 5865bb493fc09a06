// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for response timestamps and token lifetimes.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `(issued_at, expires_at)` as Unix seconds for a token issued at `now`.
///
/// Lifetimes below one minute are raised to one minute.
pub fn token_window(now: DateTime<Utc>, lifetime_minutes: i64) -> anyhow::Result<(usize, usize)> {
    let issued = now.timestamp();
    let expires = now
        .checked_add_signed(Duration::minutes(lifetime_minutes.max(1)))
        .ok_or_else(|| anyhow::anyhow!("token lifetime of {lifetime_minutes} minutes overflows"))?
        .timestamp();

    Ok((usize::try_from(issued)?, usize::try_from(expires)?))
}
