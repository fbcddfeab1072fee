// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pagination metadata for list endpoints.
//!
//! Paging counters travel in a `Pagination` response header as camelCase
//! JSON, never inside the body, so clients can read them without knowing the
//! payload schema.

use crate::error::AppError;
use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Response header carrying [`PaginationHeader`].
pub const PAGINATION_HEADER: &str = "Pagination";

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Derived paging counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PaginationHeader {
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_pages: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_items: u64,
}

impl PaginationHeader {
    /// Compute the counters. `total_pages` is 0 when there are no items.
    pub fn compute(
        current_page: i64,
        items_per_page: i64,
        total_items: u64,
    ) -> Result<Self, AppError> {
        if current_page <= 0 {
            return Err(AppError::InvalidArgument(
                "Page number must be greater than 0".to_string(),
            ));
        }
        if items_per_page <= 0 {
            return Err(AppError::InvalidArgument(
                "Page size must be greater than 0".to_string(),
            ));
        }

        let current_page = u32::try_from(current_page)
            .map_err(|_| AppError::InvalidArgument("Page number too large".to_string()))?;
        let items_per_page = u32::try_from(items_per_page)
            .map_err(|_| AppError::InvalidArgument("Page size too large".to_string()))?;
        let total_pages = u32::try_from(total_items.div_ceil(items_per_page as u64))
            .map_err(|_| AppError::InvalidArgument("Too many pages".to_string()))?;

        Ok(Self {
            current_page,
            items_per_page,
            total_pages,
            total_items,
        })
    }

    /// Offset of the first item on the current page.
    pub fn offset(&self) -> usize {
        (self.current_page as usize - 1).saturating_mul(self.items_per_page as usize)
    }

    /// Encode as a header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, AppError> {
        let json = serde_json::to_string(self)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Pagination encode failed: {}", e)))?;
        HeaderValue::from_str(&json)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Pagination header invalid: {}", e)))
    }
}

/// `?pageNumber=&pageSize=` query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_number() -> i64 {
    1
}
fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page_number: default_page_number(),
            page_size: default_page_size(),
        }
    }
}

impl PageParams {
    /// Page size capped at [`MAX_PAGE_SIZE`]. Non-positive values pass
    /// through so `compute` rejects them.
    pub fn effective_page_size(&self) -> i64 {
        self.page_size.min(MAX_PAGE_SIZE)
    }
}

/// One page of items plus its counters.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationHeader,
}

impl<T> Paginated<T> {
    /// Slice the current page out of the full item list.
    pub fn from_items(items: Vec<T>, params: &PageParams) -> Result<Self, AppError> {
        let meta = PaginationHeader::compute(
            params.page_number,
            params.effective_page_size(),
            items.len() as u64,
        )?;

        let items = items
            .into_iter()
            .skip(meta.offset())
            .take(meta.items_per_page as usize)
            .collect();

        Ok(Self { items, meta })
    }

    /// Convert items, keeping the counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        let header_value = match self.meta.to_header_value() {
            Ok(v) => v,
            Err(e) => return e.into_response(),
        };

        let mut response = Json(self.items).into_response();
        let headers = response.headers_mut();
        headers.insert(PAGINATION_HEADER, header_value);
        headers.append(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(PAGINATION_HEADER),
        );
        response
    }
}
