//! Message body helpers used by the composer while typing.

use axum::Json;
use msgdesk_core::template::{extract_variables, sms_segment_count};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

#[derive(Debug, Deserialize)]
pub struct VariablesRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct VariablesResponse {
    /// Distinct variable names in order of first appearance.
    pub variables: Vec<String>,
    /// Body length in characters.
    pub length: usize,
    pub sms_segments: usize,
}

/// POST /api/templates/variables
pub async fn variables(
    _user: AuthUser,
    Json(input): Json<VariablesRequest>,
) -> AppResult<Json<DataResponse<VariablesResponse>>> {
    Ok(Json(DataResponse {
        data: VariablesResponse {
            variables: extract_variables(&input.body),
            length: input.body.chars().count(),
            sms_segments: sms_segment_count(&input.body),
        },
    }))
}
