//! # cuatro-engine: Uno-Style Card Game Engine Core
//!
//! A deterministic engine for a turn-based, Uno-style multiplayer card
//! game. Cards are packed into single bytes, player actions are
//! validated and applied by a pure state machine, and new cards come
//! from a weighted generator that can be biased toward the current
//! reference card and dampened by a time-decaying pacing function.
//!
//! The engine holds no state between calls: every operation is a full
//! load-mutate-serialize cycle over a [`game::Game`] snapshot, with
//! randomness drawn from an injected seeded RNG.
//!
//! ## Core Modules
//!
//! - [`cards`] - Single-byte card codec and the play-legality rule
//! - [`generator`] - Weighted card generation with reference-card bias
//! - [`pacing`] - Decaying time scalar that tunes the bias strength
//! - [`game`] - Game state, turn order, and action application
//! - [`engine`] - Orchestration: create, join, dispatch, project
//! - [`view`] - Depth-limited state projections for the API layer
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use cuatro_engine::cards::{is_playable, Card, CardColor, CardKind};
//!
//! let reference = Card::new(CardKind::Number, CardColor::Blue, 7).encode();
//! let candidate = Card::new(CardKind::Reverse, CardColor::Blue, 0).encode();
//!
//! // equal colors always play
//! assert!(is_playable(reference, candidate));
//! ```
//!
//! ## Deterministic Gameplay
//!
//! All card generation is reproducible under a fixed seed:
//!
//! ```rust
//! use cuatro_engine::engine::Engine;
//! use cuatro_engine::game::GameConfig;
//!
//! let a = Engine::create("alice", GameConfig::default(), Some(42)).unwrap();
//! let b = Engine::create("alice", GameConfig::default(), Some(42)).unwrap();
//! assert_eq!(a.game().players[0].cards, b.game().players[0].cards);
//! ```

pub mod cards;
pub mod engine;
pub mod errors;
pub mod game;
pub mod generator;
pub mod pacing;
pub mod view;
