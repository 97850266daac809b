pub mod game;
pub mod health;

pub use game::{
    create_game, get_state, join_game, submit_action, CreateGameRequest, JoinQuery, StateQuery,
};
