//! Group API endpoints

use api_types::{
    group::{GroupNew, GroupView},
    settlement::SettlementResponse,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    ServerError,
    server::ServerState,
    views::{group_view, new_member, settlement_view},
};

/// Handle requests for creating a new group
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let members = payload.members.into_iter().map(new_member).collect();
    let group = state
        .engine
        .create_group(
            &payload.name,
            payload.description.as_deref().unwrap_or_default(),
            members,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(group_view(&group))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(&group_id).await?;
    Ok(Json(group_view(&group)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(&group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Transfers that settle the group, computed from the latest snapshot
pub async fn settlement(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<SettlementResponse>, ServerError> {
    let group = state.engine.group(&group_id).await?;
    let settlements = engine::compute_settlement(&group.expenses);

    Ok(Json(SettlementResponse {
        settlements: settlements.iter().map(settlement_view).collect(),
        total_expenses: group.total_expenses(),
    }))
}
