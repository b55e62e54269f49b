//! Response bodies shared across handlers.
//!
//! Everything except login and refresh is wrapped as `{ "data": ... }`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// One page of a filtered list. `total` counts every match, not just this
/// page, so the console can size its pager.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
