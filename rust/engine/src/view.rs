use serde::{Deserialize, Serialize};

use crate::errors::ProjectionError;
use crate::game::{Game, GameConfig};

/// What a player is allowed to know about an opponent: a name and a
/// hand size, never the cards themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentView {
    pub username: String,
    pub card_count: usize,
}

/// Depth-limited projection of a [`Game`]. Fields absent at the
/// requested depth stay `None` and are skipped during serialization,
/// so each depth produces exactly its documented shape on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_card: Option<u8>,
    pub opponents: Vec<OpponentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clockwise: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GameConfig>,
}

impl Game {
    /// Projects the game to one of the four fixed visibility levels.
    ///
    /// - 0: filled, reference card, opponent hand sizes
    /// - 1: level 0 plus the current turn
    /// - 2: reference card, current turn, own debt, opponents
    /// - 3: the full curated state including the viewer's hand
    ///
    /// Depths 2 and 3 require a username; depths above 3 are treated
    /// as 3. The opponent list excludes the viewer at every depth.
    pub fn project(&self, depth: u8, username: Option<&str>) -> Result<StateView, ProjectionError> {
        let opponents: Vec<OpponentView> = self
            .players
            .iter()
            .filter(|p| Some(p.username.as_str()) != username)
            .map(|p| OpponentView {
                username: p.username.clone(),
                card_count: p.cards.len(),
            })
            .collect();

        let view = match depth {
            0 => StateView {
                filled: Some(self.filled),
                ref_card: Some(self.ref_card),
                opponents,
                ..Default::default()
            },
            1 => StateView {
                filled: Some(self.filled),
                ref_card: Some(self.ref_card),
                current: self.current.clone(),
                opponents,
                ..Default::default()
            },
            _ => {
                let username =
                    username.ok_or(ProjectionError::UsernameRequired(depth.min(3)))?;
                let player = self
                    .player(username)
                    .ok_or_else(|| ProjectionError::UnknownPlayer(username.to_string()))?;

                if depth == 2 {
                    StateView {
                        ref_card: Some(self.ref_card),
                        current: self.current.clone(),
                        debt: Some(player.debt),
                        opponents,
                        ..Default::default()
                    }
                } else {
                    StateView {
                        filled: Some(self.filled),
                        ref_card: Some(self.ref_card),
                        current: self.current.clone(),
                        debt: Some(player.debt),
                        hand: Some(player.cards.clone()),
                        clockwise: Some(self.clockwise),
                        creation: Some(self.creation),
                        creator: Some(self.creator.clone()),
                        key: Some(self.key.clone()),
                        config: Some(self.config),
                        opponents,
                    }
                }
            }
        };

        Ok(view)
    }
}
