//! Home page endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, services::catalog::CatalogCounts};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct IndexResponse {
    #[serde(flatten)]
    pub counts: CatalogCounts,
    /// Previous visits of the current user
    pub num_visits: i64,
}

/// Catalog counters and the visit count of the current user
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Home page counters", body = IndexResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<IndexResponse>> {
    let counts = state.services.catalog.counts().await?;
    let num_visits = state.services.redis.record_visit(claims.user_id).await?;

    Ok(Json(IndexResponse { counts, num_visits }))
}
