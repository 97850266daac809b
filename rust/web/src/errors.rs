use crate::service::ServiceError;
use crate::store::StoreError;
use cuatro_engine::errors::{GameError, ProjectionError};
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

/// JSON body every failed request carries.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        warp::reply::with_status(warp::reply::json(&self), status).into_response()
    }
}

/// Maps a domain error to the HTTP response it should produce.
pub trait IntoErrorResponse {
    fn status(&self) -> StatusCode;
    fn tag(&self) -> &'static str;

    fn into_http_response(self) -> Response
    where
        Self: std::fmt::Display + Sized,
    {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request refused");
        }
        ErrorResponse::new(self.tag(), self.to_string()).into_response(status)
    }
}

impl IntoErrorResponse for ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            ServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServiceError::Store(StoreError::Expired(_)) => StatusCode::GONE,
            ServiceError::Store(StoreError::StoragePoisoned) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Game(GameError::InvalidConfig { .. }) => StatusCode::BAD_REQUEST,
            ServiceError::Game(GameError::PlayerAlreadyInGame)
            | ServiceError::Game(GameError::GameIsFull)
            | ServiceError::Game(GameError::NotTurn) => StatusCode::CONFLICT,
            ServiceError::Game(GameError::PlayerNoCard)
            | ServiceError::Game(GameError::CardMismatch) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Game(GameError::UnknownPlayer(_)) => StatusCode::NOT_FOUND,
            ServiceError::Projection(ProjectionError::UsernameRequired(_)) => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::Projection(ProjectionError::UnknownPlayer(_)) => StatusCode::NOT_FOUND,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            ServiceError::Store(StoreError::NotFound(_)) => "game_not_found",
            ServiceError::Store(StoreError::Expired(_)) => "game_expired",
            ServiceError::Store(StoreError::StoragePoisoned) => "internal_error",
            ServiceError::Game(GameError::InvalidConfig { .. }) => "invalid_config",
            ServiceError::Game(GameError::PlayerAlreadyInGame) => "player_already_in_game",
            ServiceError::Game(GameError::GameIsFull) => "game_is_full",
            ServiceError::Game(GameError::NotTurn) => "not_turn",
            ServiceError::Game(GameError::PlayerNoCard) => "player_no_card",
            ServiceError::Game(GameError::CardMismatch) => "card_mismatch",
            ServiceError::Game(GameError::UnknownPlayer(_)) => "unknown_player",
            ServiceError::Projection(ProjectionError::UsernameRequired(_)) => "username_required",
            ServiceError::Projection(ProjectionError::UnknownPlayer(_)) => "unknown_player",
        }
    }
}
