// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member listing.

use crate::error::Result;
use crate::pagination::{PageParams, Paginated};
use crate::routes::auth::UserSummary;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/users", get(list_users))
}

/// Paged member list with each member's main photo URL.
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Paginated<UserSummary>> {
    let page = Paginated::from_items(state.store.list_users(), &params)?;

    let mut summaries = Vec::with_capacity(page.items.len());
    for user in &page.items {
        let photo_url = state.store.get_main_photo(user.id).await.ok().map(|p| p.url);
        summaries.push(UserSummary::new(user, photo_url));
    }

    Ok(Paginated {
        items: summaries,
        meta: page.meta,
    })
}
