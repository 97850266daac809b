//! HTTP front end for the card game engine.
//!
//! The crate wires the deterministic engine into a small warp server:
//! game snapshots live in an expiring in-process store, every request
//! runs a full load-mutate-store cycle through [`GameService`], and
//! the handlers translate engine refusals into HTTP statuses.

pub mod errors;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod service;
pub mod store;

pub use errors::{ErrorResponse, IntoErrorResponse};
pub use logging::init_logging;
pub use middleware::with_request_logging;
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use service::{GameService, ServiceError};
pub use store::{GameKey, GameStore, StoreError};

#[cfg(test)]
mod tests {
    use super::*;
    use cuatro_engine::game::GameConfig;

    #[test]
    fn context_provides_a_shared_service() {
        let ctx = AppContext::new_for_tests();

        let service = ctx.service();
        let game = service
            .create("alice", GameConfig::default())
            .expect("create");

        // both handles look at the same store
        assert!(ctx.service().snapshot(&game.key).is_ok());
    }
}
