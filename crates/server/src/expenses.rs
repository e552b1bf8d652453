//! Expense API endpoints

use api_types::{expense::ExpenseNew, group::GroupView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    ServerError,
    server::ServerState,
    views::{group_view, new_expense},
};

pub async fn add(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state
        .engine
        .add_expense(&group_id, new_expense(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(group_view(&group))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(String, usize)>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state
        .engine
        .update_expense(&group_id, expense_id, new_expense(payload))
        .await?;
    Ok(Json(group_view(&group)))
}

/// Later expenses shift down one id
pub async fn delete(
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(String, usize)>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.delete_expense(&group_id, expense_id).await?;
    Ok(Json(group_view(&group)))
}
