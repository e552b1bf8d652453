//! Member API endpoints

use std::collections::HashMap;

use api_types::{
    group::GroupView,
    member::MemberNew,
    removal::{PendingReassignments, RemoveMember},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    ServerError,
    server::ServerState,
    views::{group_view, new_member, pending_view},
};

/// Enroll a member directly, without going through the invite policy
pub async fn add(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state
        .engine
        .add_member(&group_id, new_member(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(group_view(&group))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((group_id, member_id)): Path<(String, usize)>,
    Json(payload): Json<MemberNew>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state
        .engine
        .update_member(&group_id, member_id, new_member(payload))
        .await?;
    Ok(Json(group_view(&group)))
}

/// Expenses that need a new payer before the member can be removed
pub async fn removal(
    State(state): State<ServerState>,
    Path((group_id, member_id)): Path<(String, usize)>,
) -> Result<Json<PendingReassignments>, ServerError> {
    let pending = state
        .engine
        .pending_reassignments(&group_id, member_id)
        .await?;
    Ok(Json(PendingReassignments {
        pending: pending.into_iter().map(pending_view).collect(),
    }))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((group_id, member_id)): Path<(String, usize)>,
    Json(payload): Json<RemoveMember>,
) -> Result<Json<GroupView>, ServerError> {
    let mut reassignments = HashMap::with_capacity(payload.reassignments.len());
    for entry in payload.reassignments {
        if reassignments
            .insert(entry.expense_id, entry.payer_id)
            .is_some()
        {
            return Err(ServerError::Generic(format!(
                "expense {} reassigned twice",
                entry.expense_id
            )));
        }
    }

    let group = state
        .engine
        .remove_member(&group_id, member_id, &reassignments)
        .await?;
    Ok(Json(group_view(&group)))
}
