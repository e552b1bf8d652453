use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod events;
mod expenses;
mod export;
mod groups;
mod invites;
mod members;
mod server;
mod views;

pub mod types {
    pub mod group {
        pub use api_types::group::{GroupNew, GroupView};
    }

    pub mod member {
        pub use api_types::member::{MemberNew, MemberView};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpenseView};
    }

    pub mod invite {
        pub use api_types::invite::{InvitePreview, InviteUpdate, InviteView};
    }

    pub mod settlement {
        pub use api_types::settlement::{SettlementResponse, SettlementView};
    }

    pub mod removal {
        pub use api_types::removal::{
            PendingReassignmentView, PendingReassignments, Reassignment, RemoveMember,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Internal(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::DuplicateMember(_) => StatusCode::CONFLICT,
        EngineError::InviteRejected(_) => StatusCode::FORBIDDEN,
        EngineError::InvalidDocument(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvariantViolation(_)
        | EngineError::InvalidReassignment(_)
        | EngineError::MalformedExpense(_)
        | EngineError::InvalidMember(_)
        | EngineError::InvalidGroup(_)
        | EngineError::InvalidInvite(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::InvalidDocument(msg) => {
            tracing::error!("invalid stored document: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Internal(err) => {
                tracing::error!("{err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_invite_rejected_maps_to_403() {
        let res = ServerError::from(EngineError::InviteRejected("closed".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_duplicate_member_maps_to_409() {
        let res = ServerError::from(EngineError::DuplicateMember("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::MalformedExpense("x".to_string()),
            EngineError::InvalidReassignment("x".to_string()),
            EngineError::InvariantViolation("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn invalid_document_is_hidden() {
        let res = ServerError::from(EngineError::InvalidDocument("members: bad".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
