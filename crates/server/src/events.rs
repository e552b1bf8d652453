//! Server-sent events carrying every committed change of a group.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};

use crate::{ServerError, server::ServerState, views::group_view};

/// One `group` event with the full `GroupView` per change. The stream ends
/// when the group is deleted.
pub async fn subscribe(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    let receiver = state.engine.subscribe(&group_id).await?;
    tracing::debug!(group_id = %group_id, "subscriber attached");

    let stream = BroadcastStream::new(receiver).filter_map(move |change| match change {
        Ok(group) => match Event::default().event("group").json_data(group_view(&group)) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                tracing::error!("failed to encode group event: {err}");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!(skipped, "subscriber lagged behind");
            None
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
