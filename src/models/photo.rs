// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo model.

use chrono::{DateTime, Utc};

/// A photo owned by exactly one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: u64,
    pub user_id: u64,
    /// Image store URL
    pub url: String,
    /// Image store asset ID. `None` for photos that were never uploaded
    /// through the store (seeded/legacy rows).
    pub public_id: Option<String>,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
    pub is_main: bool,
}
