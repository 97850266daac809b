use crate::errors::{ErrorResponse, IntoErrorResponse};
use crate::service::{GameService, ServiceError};
use cuatro_engine::errors::GameError;
use cuatro_engine::game::{Action, GameConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

const MAX_DEPTH: u8 = 3;

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub creator: String,
    #[serde(default)]
    pub config: Option<GameConfig>,
}

#[derive(Debug, Deserialize)]
pub struct JoinQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    #[serde(default)]
    pub depth: u8,
    pub username: Option<String>,
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    reply::with_status(reply::json(body), status).into_response()
}

/// Creates a new game owned by the requesting player.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/games`
///
/// # Request Format
/// JSON payload with the creator's username and an optional
/// configuration block:
/// ```json
/// { "creator": "alice", "config": { "card_count": 5, "max_players": 4 } }
/// ```
///
/// # Response Format
/// - **Success (201 Created)**: the full game snapshot, including the
///   key under which the game can be addressed
/// - **Error (400 Bad Request)**: a configuration field is out of range
pub async fn create_game(service: Arc<GameService>, request: CreateGameRequest) -> Response {
    let config = request.config.unwrap_or_default();

    match service.create(&request.creator, config) {
        Ok(game) => json_response(StatusCode::CREATED, &game),
        Err(err) => err.into_http_response(),
    }
}

/// Seats a player in an existing game.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/games/{key}/join?username=<name>`
///
/// # Response Format
/// - **Success (200 OK)**: the updated game snapshot. A player who is
///   already seated gets the current snapshot back unchanged, so a
///   retried join is harmless.
/// - **Error (409 Conflict)**: the game already has its full complement
/// - **Error (404 / 410)**: the game does not exist or has expired
pub async fn join_game(service: Arc<GameService>, key: String, query: JoinQuery) -> Response {
    match service.join(&key, &query.username) {
        Ok(game) => json_response(StatusCode::OK, &game),
        Err(ServiceError::Game(GameError::PlayerAlreadyInGame)) => {
            match service.snapshot(&key) {
                Ok(game) => json_response(StatusCode::OK, &game),
                Err(err) => err.into_http_response(),
            }
        }
        Err(err) => err.into_http_response(),
    }
}

/// Projects the game state at the requested visibility depth.
///
/// # HTTP Method and Path
/// - **Method**: GET
/// - **Path**: `/api/games/{key}/state?depth=<0..3>&username=<name>`
///
/// Depths 0 and 1 are public. Depth 2 and above reveal per-player
/// detail and require a `username`; without one the request is refused
/// with 401. Depths beyond 3 are rejected with 400.
pub async fn get_state(service: Arc<GameService>, key: String, query: StateQuery) -> Response {
    if query.depth > MAX_DEPTH {
        return ErrorResponse::new(
            "invalid_depth",
            format!("depth must be at most {MAX_DEPTH}, got {}", query.depth),
        )
        .into_response(StatusCode::BAD_REQUEST);
    }

    match service.state(&key, query.depth, query.username.as_deref()) {
        Ok(view) => json_response(StatusCode::OK, &view),
        Err(err) => err.into_http_response(),
    }
}

/// Applies one gameplay action: place a card, draw, or settle a card
/// debt.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/games/{key}/actions`
///
/// # Request Format
/// A tagged action object:
/// ```json
/// { "kind": "place", "username": "alice", "card": 35 }
/// ```
///
/// # Response Format
/// - **Success (200 OK)**: the updated game snapshot
/// - **Error (409 Conflict)**: it is not this player's turn
/// - **Error (422 Unprocessable Entity)**: the card does not match the
///   reference, or the player does not hold it
pub async fn submit_action(service: Arc<GameService>, key: String, action: Action) -> Response {
    match service.dispatch(&key, &action) {
        Ok(game) => json_response(StatusCode::OK, &game),
        Err(err) => err.into_http_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuatro_engine::game::Game;

    fn seeded_service() -> Arc<GameService> {
        Arc::new(GameService::new().with_seed(9))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = warp::hyper::body::to_bytes(response.into_body())
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn create_returns_the_new_game() {
        let service = seeded_service();
        let request = CreateGameRequest {
            creator: "alice".to_string(),
            config: None,
        };

        let response = create_game(service, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let game: Game = serde_json::from_value(body_json(response).await).expect("game snapshot");
        assert_eq!(game.creator, "alice");
        assert_eq!(game.players[0].cards.len(), 5);
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_config() {
        let service = seeded_service();
        let request = CreateGameRequest {
            creator: "alice".to_string(),
            config: Some(GameConfig {
                card_count: 99,
                max_players: 4,
            }),
        };

        let response = create_game(service, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_config");
    }

    #[tokio::test]
    async fn rejoining_hands_back_the_current_snapshot() {
        let service = seeded_service();
        let game = service
            .create("alice", GameConfig::default())
            .expect("create");

        let response = join_game(
            Arc::clone(&service),
            game.key.clone(),
            JoinQuery {
                username: "alice".to_string(),
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["key"], game.key.as_str());
    }

    #[tokio::test]
    async fn deep_state_without_username_is_unauthorized() {
        let service = seeded_service();
        let game = service
            .create("alice", GameConfig::default())
            .expect("create");

        let response = get_state(
            service,
            game.key,
            StateQuery {
                depth: 2,
                username: None,
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "username_required");
    }

    #[tokio::test]
    async fn absurd_depth_is_a_bad_request() {
        let service = seeded_service();
        let game = service
            .create("alice", GameConfig::default())
            .expect("create");

        let response = get_state(
            service,
            game.key,
            StateQuery {
                depth: 9,
                username: None,
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_depth");
    }

    #[tokio::test]
    async fn actions_against_missing_games_are_not_found() {
        let service = seeded_service();
        let action = Action::Draw {
            username: "alice".to_string(),
        };

        let response = submit_action(service, "missing".to_string(), action).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "game_not_found");
    }
}
