use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("player is already in the game")]
    PlayerAlreadyInGame,
    #[error("game is full")]
    GameIsFull,
    #[error("it is not the player's turn")]
    NotTurn,
    #[error("player does not own the card")]
    PlayerNoCard,
    #[error("card does not match the reference card")]
    CardMismatch,
    #[error("player {0} is not in the game")]
    UnknownPlayer(String),
    #[error("invalid {field}: {value} (allowed {min}..={max})")]
    InvalidConfig {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },
}

/// Failures of the depth-projection helper. Kept apart from
/// [`GameError`] because these never arise from game actions, only
/// from state reads with a bad viewer argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("username required for depth {0}")]
    UsernameRequired(u8),
    #[error("player {0} is not in the game")]
    UnknownPlayer(String),
}
