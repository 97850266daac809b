use crate::store::{GameStore, StoreError};
use cuatro_engine::engine::Engine;
use cuatro_engine::errors::{GameError, ProjectionError};
use cuatro_engine::game::{Action, Game, GameConfig};
use cuatro_engine::view::StateView;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Stateless facade over the engine and the game store.
///
/// Each operation runs a full load-mutate-store cycle: the snapshot
/// comes out of the store, an [`Engine`] is rebuilt around it, the
/// operation runs, and the resulting snapshot goes back in. The store
/// serializes concurrent cycles per game.
#[derive(Debug)]
pub struct GameService {
    store: Arc<GameStore>,
    seed: Option<u64>,
}

impl Default for GameService {
    fn default() -> Self {
        Self::new()
    }
}

impl GameService {
    pub fn new() -> Self {
        Self::with_store(Arc::new(GameStore::new()))
    }

    pub fn with_store(store: Arc<GameStore>) -> Self {
        Self { store, seed: None }
    }

    /// Pins the generator seed for every rebuilt engine. Test-oriented;
    /// production engines stay entropy-seeded.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn store(&self) -> Arc<GameStore> {
        Arc::clone(&self.store)
    }

    /// Creates a new game, stores it, and returns the initial snapshot.
    pub fn create(&self, creator: &str, config: GameConfig) -> Result<Game, ServiceError> {
        let engine = Engine::create(creator, config, self.seed)?;
        let game = engine.into_game();
        self.store.insert(game.clone())?;
        tracing::info!(key = %game.key, creator = %game.creator, "game created");
        Ok(game)
    }

    /// Seats a player in an existing game and returns the updated
    /// snapshot.
    pub fn join(&self, key: &str, username: &str) -> Result<Game, ServiceError> {
        let game = self.mutate(key, |engine| engine.join(username))?;
        tracing::info!(key, username, filled = game.filled, "player joined");
        Ok(game)
    }

    /// Applies one gameplay action and returns the updated snapshot.
    pub fn dispatch(&self, key: &str, action: &Action) -> Result<Game, ServiceError> {
        let game = self.mutate(key, |engine| engine.dispatch(action))?;
        tracing::info!(key, username = action.username(), "action applied");
        Ok(game)
    }

    /// Projects the stored snapshot at the requested depth.
    pub fn state(
        &self,
        key: &str,
        depth: u8,
        username: Option<&str>,
    ) -> Result<StateView, ServiceError> {
        let game = self.store.read(key)?;
        Ok(game.project(depth, username)?)
    }

    /// Returns the full stored snapshot, unprojected.
    pub fn snapshot(&self, key: &str) -> Result<Game, ServiceError> {
        Ok(self.store.read(key)?)
    }

    fn mutate(
        &self,
        key: &str,
        op: impl FnOnce(&mut Engine) -> Result<(), GameError>,
    ) -> Result<Game, ServiceError> {
        let seed = self.seed;
        let outcome = self.store.update(key, |game| {
            let mut engine = Engine::load(game.clone(), seed);
            op(&mut engine)?;
            *game = engine.into_game();
            Ok::<Game, GameError>(game.clone())
        })?;
        Ok(outcome?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuatro_engine::cards::PLUS_FOUR;

    fn filled_service() -> (GameService, String) {
        let service = GameService::new().with_seed(77);
        let game = service
            .create("alice", GameConfig::new(3, 2).unwrap())
            .expect("create");
        service.join(&game.key, "bob").expect("join");
        (service, game.key)
    }

    #[test]
    fn create_stores_the_initial_snapshot() {
        let service = GameService::new().with_seed(11);
        let game = service
            .create("alice", GameConfig::default())
            .expect("create");

        assert_eq!(service.snapshot(&game.key).expect("snapshot"), game);
        assert!(!game.filled);
        assert_eq!(game.players.len(), 1);
    }

    #[test]
    fn join_persists_the_seated_player() {
        let (service, key) = filled_service();
        let game = service.snapshot(&key).expect("snapshot");

        assert!(game.filled);
        assert_eq!(game.current.as_deref(), Some("alice"));
        assert_eq!(game.players[1].username, "bob");
        assert_eq!(game.players[1].cards.len(), 3);
    }

    #[test]
    fn rejoin_is_refused_without_touching_the_snapshot() {
        let (service, key) = filled_service();
        let before = service.snapshot(&key).expect("snapshot");

        assert_eq!(
            service.join(&key, "alice"),
            Err(ServiceError::Game(GameError::PlayerAlreadyInGame))
        );
        assert_eq!(service.snapshot(&key).expect("snapshot"), before);
    }

    #[test]
    fn refused_actions_leave_the_snapshot_untouched() {
        let (service, key) = filled_service();
        let before = service.snapshot(&key).expect("snapshot");

        // bob is not the current player, so the turn check refuses this
        let action = Action::Place {
            username: "bob".to_string(),
            card: PLUS_FOUR,
        };
        assert_eq!(
            service.dispatch(&key, &action),
            Err(ServiceError::Game(GameError::NotTurn))
        );
        assert_eq!(service.snapshot(&key).expect("snapshot"), before);
    }

    #[test]
    fn draw_grows_the_hand_through_the_store() {
        let (service, key) = filled_service();

        let game = service
            .dispatch(
                &key,
                &Action::Draw {
                    username: "bob".to_string(),
                },
            )
            .expect("draw");

        assert_eq!(game.players[1].cards.len(), 4);
        assert_eq!(service.snapshot(&key).expect("snapshot"), game);
    }

    #[test]
    fn state_projects_without_consuming_the_game() {
        let (service, key) = filled_service();

        let view = service.state(&key, 0, None).expect("project");
        assert_eq!(view.filled, Some(true));
        assert_eq!(view.opponents.len(), 2);

        assert_eq!(
            service.state(&key, 2, None),
            Err(ServiceError::Projection(ProjectionError::UsernameRequired(2)))
        );
    }

    #[test]
    fn unknown_keys_surface_store_errors() {
        let service = GameService::new();
        assert_eq!(
            service.snapshot("missing"),
            Err(ServiceError::Store(StoreError::NotFound(
                "missing".to_string()
            )))
        );
    }
}
