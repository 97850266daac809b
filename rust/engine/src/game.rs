use serde::{Deserialize, Serialize};

use crate::cards::{is_playable, Card, CardKind, PLUS_FOUR};
use crate::errors::GameError;

/// Configuration bounds for a game.
pub const MIN_CARD_COUNT: u8 = 2;
pub const MAX_CARD_COUNT: u8 = 15;
pub const MIN_PLAYER_COUNT: u8 = 2;
pub const MAX_PLAYER_COUNT: u8 = 4;

/// Per-game configuration chosen by the creator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Cards dealt to each player on entry (2-15)
    pub card_count: u8,
    /// Roster size that fills the game and starts play (2-4)
    pub max_players: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            card_count: 5,
            max_players: MAX_PLAYER_COUNT,
        }
    }
}

impl GameConfig {
    pub fn new(card_count: u8, max_players: u8) -> Result<Self, GameError> {
        let config = Self {
            card_count,
            max_players,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the numeric bounds. Deserialized configs must pass
    /// through here before a game is built around them.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.card_count < MIN_CARD_COUNT || self.card_count > MAX_CARD_COUNT {
            return Err(GameError::InvalidConfig {
                field: "card_count",
                value: self.card_count,
                min: MIN_CARD_COUNT,
                max: MAX_CARD_COUNT,
            });
        }
        if self.max_players < MIN_PLAYER_COUNT || self.max_players > MAX_PLAYER_COUNT {
            return Err(GameError::InvalidConfig {
                field: "max_players",
                value: self.max_players,
                min: MIN_PLAYER_COUNT,
                max: MAX_PLAYER_COUNT,
            });
        }
        Ok(())
    }
}

/// One seat at the table: a hand of packed card bytes and the
/// accumulated forced-draw debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub username: String,
    /// Hand as a multiset of packed card bytes
    pub cards: Vec<u8>,
    /// Forced-draw count owed; cleared only by settle-debt
    pub debt: u32,
}

impl Player {
    pub fn new(username: impl Into<String>, cards: Vec<u8>) -> Self {
        Self {
            username: username.into(),
            cards,
            debt: 0,
        }
    }
}

/// Requested game action, dispatched by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Play a card onto the reference card
    Place { username: String, card: u8 },
    /// Draw one generated card; a free action, ignores turn order
    Draw { username: String },
    /// Draw all owed debt cards and reset the debt to zero
    SettleDebt { username: String },
}

impl Action {
    pub fn username(&self) -> &str {
        match self {
            Action::Place { username, .. }
            | Action::Draw { username }
            | Action::SettleDebt { username } => username,
        }
    }
}

/// Complete game state. This struct is the snapshot exchanged with the
/// persistence layer; serializing it captures everything, including
/// full hands. Redaction for partial views lives in [`crate::view`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub creator: String,
    pub config: GameConfig,
    /// Opaque key derived from the creation time and creator name
    pub key: String,
    /// Creation timestamp, seconds since the Unix epoch
    pub creation: f64,
    /// Seats in join order; the creator is always index 0
    pub players: Vec<Player>,
    /// The most recently played card, as a packed byte
    pub ref_card: u8,
    /// Username whose turn it is; set once the game fills
    pub current: Option<String>,
    /// Direction flag, flipped only by reverse cards
    pub clockwise: bool,
    /// True once the roster reached `config.max_players`
    pub filled: bool,
}

impl Game {
    pub fn player_index(&self, username: &str) -> Option<usize> {
        self.players.iter().position(|p| p.username == username)
    }

    pub fn player(&self, username: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.username == username)
    }

    /// Checks whether `username` could join right now without
    /// mutating anything. Used to avoid dealing a hand for a join
    /// that is going to be refused.
    pub fn ensure_joinable(&self, username: &str) -> Result<(), GameError> {
        if self.players.iter().any(|p| p.username == username) {
            return Err(GameError::PlayerAlreadyInGame);
        }
        if self.filled {
            return Err(GameError::GameIsFull);
        }
        Ok(())
    }

    /// Seats a player with an already-dealt hand. Filling the roster
    /// transitions the game from forming to active: the filled flag is
    /// raised and the turn is handed to the creator.
    pub fn admit(&mut self, player: Player) -> Result<(), GameError> {
        self.ensure_joinable(&player.username)?;
        self.players.push(player);
        if self.players.len() >= usize::from(self.config.max_players) {
            self.filled = true;
            self.current = Some(self.creator.clone());
        }
        Ok(())
    }

    /// Seat index the turn passes to from `player_i` under the current
    /// direction. Clockwise steps forward modulo the roster size;
    /// counter-clockwise steps back, wrapping from seat 0 to the last
    /// occupied seat.
    pub fn next_index(&self, player_i: usize) -> usize {
        if self.clockwise {
            (player_i + 1) % usize::from(self.config.max_players)
        } else if player_i == 0 {
            self.players.len() - 1
        } else {
            player_i - 1
        }
    }

    /// Applies a place action for the seated player at `player_i`.
    ///
    /// Check order: turn, then card legality, then ownership. A
    /// plus-four is matched against its canonical encoding; every
    /// other card must be present as the exact submitted byte. On
    /// success the submitted byte becomes the reference card and the
    /// turn advances to the resolved next seat.
    pub fn place(&mut self, player_i: usize, card: u8) -> Result<(), GameError> {
        if self.current.as_deref() != Some(self.players[player_i].username.as_str()) {
            return Err(GameError::NotTurn);
        }
        if !is_playable(self.ref_card, card) {
            return Err(GameError::CardMismatch);
        }

        let parsed = Card::decode(card);
        let mut next_i = self.next_index(player_i);

        match parsed.kind {
            CardKind::PlusFour => {
                self.remove_from_hand(player_i, PLUS_FOUR)?;
                self.players[next_i].debt += 4;
            }
            kind => {
                // membership is checked before any side effect
                let pos = self.players[player_i]
                    .cards
                    .iter()
                    .position(|&c| c == card)
                    .ok_or(GameError::PlayerNoCard)?;

                match kind {
                    CardKind::PlusTwo => {
                        self.players[next_i].debt += 2;
                    }
                    CardKind::Reverse => {
                        self.clockwise = !self.clockwise;
                        // with two players a reverse keeps the turn;
                        // otherwise the next seat is recomputed under
                        // the flipped direction
                        next_i = if self.players.len() == 2 {
                            player_i
                        } else {
                            self.next_index(player_i)
                        };
                    }
                    _ => {}
                }

                self.players[player_i].cards.remove(pos);
            }
        }

        self.ref_card = card;
        self.current = Some(self.players[next_i].username.clone());
        Ok(())
    }

    /// Clears the player's debt in exchange for the given freshly
    /// generated cards. Never touches the turn.
    pub fn settle_debt(&mut self, player_i: usize, drawn: Vec<u8>) {
        let player = &mut self.players[player_i];
        player.cards.extend(drawn);
        player.debt = 0;
    }

    fn remove_from_hand(&mut self, player_i: usize, card: u8) -> Result<(), GameError> {
        let cards = &mut self.players[player_i].cards;
        let pos = cards
            .iter()
            .position(|&c| c == card)
            .ok_or(GameError::PlayerNoCard)?;
        cards.remove(pos);
        Ok(())
    }
}
