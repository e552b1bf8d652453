//! Invite link endpoints

use api_types::{
    group::GroupView,
    invite::{InvitePreview, InviteUpdate},
    member::MemberNew,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::EngineError;

use crate::{
    ServerError,
    server::ServerState,
    views::{group_view, new_member},
};

pub async fn update_policy(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<InviteUpdate>,
) -> Result<Json<GroupView>, ServerError> {
    if payload.allow_invites.is_none() && payload.max_members.is_none() {
        return Err(ServerError::Generic(
            "allow_invites or max_members required".to_string(),
        ));
    }
    let group = state
        .engine
        .update_invite(&group_id, payload.allow_invites, payload.max_members)
        .await?;
    Ok(Json(group_view(&group)))
}

/// Show the group behind an invite code, refusing closed or full groups
pub async fn preview(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<InvitePreview>, ServerError> {
    let group = state.engine.group_by_invite(&code).await?;
    let invite = group
        .invite
        .as_ref()
        .ok_or_else(|| EngineError::KeyNotFound("invite code".to_string()))?;
    invite.ensure_can_join(group.members.len())?;

    Ok(Json(InvitePreview {
        group_id: group.id.clone(),
        name: group.name.clone(),
        description: group.description.clone(),
        members: group.members.iter().map(|m| m.name.clone()).collect(),
        max_members: invite.max_members,
    }))
}

pub async fn join(
    State(state): State<ServerState>,
    Path(code): Path<String>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state
        .engine
        .join_by_invite(&code, new_member(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(group_view(&group))))
}
