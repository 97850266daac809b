use cuatro_engine::game::Game;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

pub type GameKey = String;

/// How long an unfilled game survives without a write.
const JOIN_WINDOW: Duration = Duration::from_secs(5 * 60);
/// How long a filled game survives without a write.
const PLAY_WINDOW: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("game not found: {0}")]
    NotFound(GameKey),
    #[error("game expired: {0}")]
    Expired(GameKey),
    #[error("game storage poisoned")]
    StoragePoisoned,
}

#[derive(Debug)]
struct StoredGame {
    game: Mutex<Game>,
    deadline: Mutex<Instant>,
}

impl StoredGame {
    fn new(game: Game, deadline: Instant) -> Self {
        Self {
            game: Mutex::new(game),
            deadline: Mutex::new(deadline),
        }
    }

    fn deadline(&self) -> Result<Instant, StoreError> {
        self.deadline
            .lock()
            .map(|d| *d)
            .map_err(|_| StoreError::StoragePoisoned)
    }

    fn arm(&self, deadline: Instant) {
        if let Ok(mut guard) = self.deadline.lock() {
            *guard = deadline;
        }
    }
}

/// In-process key-value store for game snapshots with per-key expiry.
///
/// Every write re-arms the entry's expiry window relative to that
/// write: a short join window while the game is still forming, a
/// longer play window once it has filled. Reads never extend a game's
/// life. The per-entry game mutex is also the serialization point for
/// concurrent operations on one game: a full load-mutate-store cycle
/// runs under it, so racing requests queue up instead of silently
/// overwriting each other.
#[derive(Debug)]
pub struct GameStore {
    games: RwLock<HashMap<GameKey, Arc<StoredGame>>>,
    join_window: Duration,
    play_window: Duration,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore {
    pub fn new() -> Self {
        Self::with_windows(JOIN_WINDOW, PLAY_WINDOW)
    }

    pub fn with_windows(join_window: Duration, play_window: Duration) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            join_window,
            play_window,
        }
    }

    /// Stores a fresh snapshot under its own key and arms the expiry
    /// window for its fill state.
    pub fn insert(&self, game: Game) -> Result<GameKey, StoreError> {
        let key = game.key.clone();
        let deadline = Instant::now() + self.window_for(game.filled);

        let mut guard = self
            .games
            .write()
            .map_err(|_| StoreError::StoragePoisoned)?;
        guard.insert(key.clone(), Arc::new(StoredGame::new(game, deadline)));

        tracing::debug!(key = %key, "stored new game");
        Ok(key)
    }

    /// Runs one load-mutate-store cycle against the stored game under
    /// its entry lock. The expiry window is re-armed only when the
    /// closure succeeds; a refused operation is not a write.
    pub fn update<T, E>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Game) -> Result<T, E>,
    ) -> Result<Result<T, E>, StoreError> {
        let entry = self.live_entry(key)?;
        let mut game = entry.game.lock().map_err(|_| StoreError::StoragePoisoned)?;

        let outcome = f(&mut game);
        if outcome.is_ok() {
            entry.arm(Instant::now() + self.window_for(game.filled));
        }
        Ok(outcome)
    }

    /// Clones the stored snapshot without touching its expiry.
    pub fn read(&self, key: &str) -> Result<Game, StoreError> {
        let entry = self.live_entry(key)?;
        let game = entry.game.lock().map_err(|_| StoreError::StoragePoisoned)?;
        Ok(game.clone())
    }

    /// Drops every entry whose window has lapsed; returns how many
    /// were reaped.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = match self.games.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = guard.len();
        guard.retain(|key, entry| match entry.deadline() {
            Ok(deadline) if deadline <= now => {
                tracing::debug!(key = %key, "reaping expired game");
                false
            }
            _ => true,
        });
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.games.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn window_for(&self, filled: bool) -> Duration {
        if filled {
            self.play_window
        } else {
            self.join_window
        }
    }

    fn live_entry(&self, key: &str) -> Result<Arc<StoredGame>, StoreError> {
        let entry = {
            let guard = self.games.read().map_err(|_| StoreError::StoragePoisoned)?;
            guard
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(key.to_string()))?
        };

        if entry.deadline()? <= Instant::now() {
            if let Ok(mut guard) = self.games.write() {
                guard.remove(key);
            }
            return Err(StoreError::Expired(key.to_string()));
        }

        Ok(entry)
    }
}

#[cfg(test)]
impl GameStore {
    fn force_deadline(&self, key: &str, deadline: Instant) {
        if let Ok(guard) = self.games.read() {
            if let Some(entry) = guard.get(key) {
                entry.arm(deadline);
            }
        }
    }

    fn deadline(&self, key: &str) -> Option<Instant> {
        self.games
            .read()
            .ok()
            .and_then(|g| g.get(key).and_then(|e| e.deadline().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuatro_engine::engine::Engine;
    use cuatro_engine::game::GameConfig;

    fn fresh_game(creator: &str, seed: u64) -> Game {
        Engine::create(creator, GameConfig::new(2, 2).unwrap(), Some(seed))
            .expect("create game")
            .into_game()
    }

    #[test]
    fn stores_and_reads_back_snapshots() {
        let store = GameStore::new();
        let game = fresh_game("alice", 1);
        let key = store.insert(game.clone()).expect("insert");

        assert_eq!(key, game.key);
        assert_eq!(store.read(&key).expect("read"), game);
    }

    #[test]
    fn missing_keys_are_not_found() {
        let store = GameStore::new();
        assert_eq!(
            store.read("nope"),
            Err(StoreError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn lapsed_entries_expire_then_vanish() {
        let store = GameStore::new();
        let key = store.insert(fresh_game("alice", 2)).expect("insert");

        store.force_deadline(&key, Instant::now() - Duration::from_secs(1));

        assert_eq!(store.read(&key), Err(StoreError::Expired(key.clone())));
        // the expired entry was removed on first touch
        assert_eq!(store.read(&key), Err(StoreError::NotFound(key)));
    }

    #[test]
    fn successful_updates_rearm_the_window() {
        let store = GameStore::new();
        let key = store.insert(fresh_game("alice", 3)).expect("insert");

        let stale = Instant::now() + Duration::from_secs(1);
        store.force_deadline(&key, stale);

        store
            .update(&key, |game| {
                game.players[0].debt += 1;
                Ok::<(), ()>(())
            })
            .expect("entry is live")
            .expect("closure succeeded");

        assert!(store.deadline(&key).expect("deadline") > stale);
        assert_eq!(store.read(&key).expect("read").players[0].debt, 1);
    }

    #[test]
    fn refused_updates_do_not_rearm_the_window() {
        let store = GameStore::new();
        let key = store.insert(fresh_game("alice", 4)).expect("insert");

        let before = store.deadline(&key).expect("deadline");
        let outcome: Result<(), &str> = store
            .update(&key, |_| Err("refused"))
            .expect("entry is live");

        assert_eq!(outcome, Err("refused"));
        assert_eq!(store.deadline(&key).expect("deadline"), before);
    }

    #[test]
    fn filled_games_get_the_longer_window() {
        let store = GameStore::with_windows(Duration::from_secs(60), Duration::from_secs(3600));
        let key = store.insert(fresh_game("alice", 5)).expect("insert");

        store
            .update(&key, |game| {
                game.filled = true;
                Ok::<(), ()>(())
            })
            .expect("entry is live")
            .expect("closure succeeded");

        let remaining = store.deadline(&key).expect("deadline") - Instant::now();
        assert!(remaining > Duration::from_secs(60));
    }

    #[test]
    fn cleanup_reaps_only_lapsed_entries() {
        let store = GameStore::new();
        let lapsed = store.insert(fresh_game("alice", 6)).expect("insert");
        let live = store.insert(fresh_game("bob", 7)).expect("insert");
        assert_ne!(lapsed, live, "distinct creators produce distinct keys");

        store.force_deadline(&lapsed, Instant::now() - Duration::from_secs(1));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.read(&live).is_ok());
    }
}
