use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::errors::{GameError, ProjectionError};
use crate::game::{Action, Game, GameConfig, Player};
use crate::generator;
use crate::pacing;
use crate::view::StateView;

/// Core engine that applies one operation to one loaded game.
///
/// The engine is a pure state transformer and holds nothing between
/// requests: the caller loads a snapshot, applies one operation, and
/// serializes the game back out. Randomness comes from an injected
/// ChaCha20 stream so behavior is reproducible under a fixed seed.
///
/// # Examples
///
/// ```
/// use cuatro_engine::engine::Engine;
/// use cuatro_engine::game::GameConfig;
///
/// let config = GameConfig::new(2, 2).unwrap();
/// let mut engine = Engine::create("alice", config, Some(7)).unwrap();
/// assert_eq!(engine.game().players.len(), 1);
/// assert_eq!(engine.game().players[0].cards.len(), 2);
///
/// engine.join("bob").unwrap();
/// assert!(engine.game().filled);
/// assert_eq!(engine.game().current.as_deref(), Some("alice"));
/// ```
#[derive(Debug)]
pub struct Engine {
    rng: ChaCha20Rng,
    game: Game,
}

impl Engine {
    /// Builds a fresh game: the creator is seated with `card_count`
    /// unbiased cards, the reference card is generated numbers-only,
    /// and the opaque key is derived from the creation time and the
    /// creator's name.
    pub fn create(
        creator: &str,
        config: GameConfig,
        seed: Option<u64>,
    ) -> Result<Engine, GameError> {
        config.validate()?;
        let mut rng = seeded_rng(seed);

        let creation = epoch_now();
        let cards = deal(&mut rng, config.card_count);
        let ref_card = generator::generate(&mut rng, true, None, 1.0);

        let game = Game {
            creator: creator.to_string(),
            config,
            key: format!("{:.1}-{}", creation % 10_000.0, creator),
            creation,
            players: vec![Player::new(creator, cards)],
            ref_card,
            current: None,
            clockwise: true,
            filled: false,
        };

        Ok(Engine { rng, game })
    }

    /// Rehydrates an engine around a stored snapshot.
    pub fn load(game: Game, seed: Option<u64>) -> Engine {
        Engine {
            rng: seeded_rng(seed),
            game,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn into_game(self) -> Game {
        self.game
    }

    /// Admits a joining player with a freshly dealt hand. The hand is
    /// dealt only after the membership and capacity checks pass.
    pub fn join(&mut self, username: &str) -> Result<(), GameError> {
        self.game.ensure_joinable(username)?;
        let cards = deal(&mut self.rng, self.game.config.card_count);
        self.game.admit(Player::new(username, cards))
    }

    /// Routes one action to the state machine.
    ///
    /// Settle-debt and draw are free actions: neither checks turn
    /// order nor advances the turn. Draw biases its card toward the
    /// reference card, dampened by the pace value for the elapsed
    /// game time; settle-debt draws are unbiased.
    pub fn dispatch(&mut self, action: &Action) -> Result<(), GameError> {
        let player_i = self
            .game
            .player_index(action.username())
            .ok_or_else(|| GameError::UnknownPlayer(action.username().to_string()))?;

        match action {
            Action::SettleDebt { .. } => {
                let debt = self.game.players[player_i].debt;
                let drawn = (0..debt)
                    .map(|_| generator::generate(&mut self.rng, false, None, 1.0))
                    .collect();
                self.game.settle_debt(player_i, drawn);
                Ok(())
            }
            Action::Draw { .. } => {
                let pace = pacing::pace(epoch_now() - self.game.creation);
                let card =
                    generator::generate(&mut self.rng, false, Some(self.game.ref_card), pace);
                self.game.players[player_i].cards.push(card);
                Ok(())
            }
            Action::Place { card, .. } => self.game.place(player_i, *card),
        }
    }

    /// Depth-limited state projection for the API layer.
    pub fn project(&self, depth: u8, username: Option<&str>) -> Result<StateView, ProjectionError> {
        self.game.project(depth, username)
    }
}

fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

fn deal(rng: &mut ChaCha20Rng, count: u8) -> Vec<u8> {
    (0..count)
        .map(|_| generator::generate(rng, false, None, 1.0))
        .collect()
}

fn epoch_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
