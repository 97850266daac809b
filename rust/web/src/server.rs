use crate::handlers;
use crate::middleware;
use crate::service::GameService;
use crate::store::GameStore;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::{Filter, Reply};

/// How often the background sweep reaps expired games.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

#[derive(Debug, Clone)]
pub struct AppContext {
    config: ServerConfig,
    service: Arc<GameService>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(GameStore::new());
        Self::with_service(config, Arc::new(GameService::with_store(store)))
    }

    pub fn with_service(config: ServerConfig, service: Arc<GameService>) -> Self {
        Self { config, service }
    }

    pub fn new_for_tests() -> Self {
        Self::new(ServerConfig::for_tests())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<GameService> {
        Arc::clone(&self.service)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            context: AppContext::new(config),
        }
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let config = context.config().clone();
        let bind_addr = Self::bind_addr(&config)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = Self::routes(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!("web server listening on http://{}", addr);

        let sweeper = Self::spawn_cleanup_sweep(context.service().store());
        let task = tokio::spawn(async move {
            server_future.await;
            Ok(())
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task, sweeper, context))
    }

    fn spawn_cleanup_sweep(store: Arc<GameStore>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reaped = store.cleanup_expired();
                if reaped > 0 {
                    tracing::info!(reaped, "reaped expired games");
                }
            }
        })
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }

        ServerError::ConfigError(err.to_string())
    }

    fn routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let health = Self::health_route();
        let api_routes = Self::api_routes(context);

        let combined = health.or(api_routes).unify().boxed();
        middleware::with_request_logging(combined).boxed()
    }

    fn health_route() -> BoxedFilter<(warp::reply::Response,)> {
        warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .map(|| handlers::health::health().into_response())
            .boxed()
    }

    fn api_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let service = context.service();

        let create = warp::path!("api" / "games")
            .and(warp::post())
            .and(Self::with_service(service.clone()))
            .and(warp::body::json())
            .and_then(
                |service: Arc<GameService>, request: handlers::CreateGameRequest| async move {
                    let response = handlers::create_game(service, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let join = warp::path!("api" / "games" / String / "join")
            .and(warp::post())
            .and(Self::with_service(service.clone()))
            .and(warp::query::<handlers::JoinQuery>())
            .and_then(
                |key: String, service: Arc<GameService>, query: handlers::JoinQuery| async move {
                    let response = handlers::join_game(service, key, query).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let state = warp::path!("api" / "games" / String / "state")
            .and(warp::get())
            .and(Self::with_service(service.clone()))
            .and(warp::query::<handlers::StateQuery>())
            .and_then(
                |key: String, service: Arc<GameService>, query: handlers::StateQuery| async move {
                    let response = handlers::get_state(service, key, query).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let actions = warp::path!("api" / "games" / String / "actions")
            .and(warp::post())
            .and(Self::with_service(service))
            .and(warp::body::json())
            .and_then(
                |key: String,
                 service: Arc<GameService>,
                 action: cuatro_engine::game::Action| async move {
                    let response = handlers::submit_action(service, key, action).await;
                    Ok::<_, Infallible>(response)
                },
            );

        create
            .or(join)
            .unify()
            .or(state)
            .unify()
            .or(actions)
            .unify()
            .boxed()
    }

    fn with_service(
        service: Arc<GameService>,
    ) -> impl Filter<Extract = (Arc<GameService>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&service))
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    sweeper: JoinHandle<()>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        sweeper: JoinHandle<()>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            sweeper,
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.sweeper.abort();

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::ConfigError(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.sweeper.abort();
    }
}
