use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::ledger::{LedgerService, PgLedgerStore};
use crate::middleware::jwt_auth_middleware;
use crate::services::{ProfileService, UserService};

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub users: UserService,
    pub profiles: ProfileService,
    pub ledger: LedgerService<PgLedgerStore>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            users: UserService::new(pool.clone(), config.security.bcrypt_cost),
            profiles: ProfileService::new(pool.clone()),
            ledger: LedgerService::new(PgLedgerStore::new(pool.clone())),
            pool,
        }
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login", post(public::login))
}

fn protected_routes() -> Router<AppState> {
    use protected::{activities, me, profiles, users};

    Router::new()
        .route("/auth/me", get(me::me))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            get(users::show).put(users::update).delete(users::delete),
        )
        .route("/profiles", get(profiles::list).post(profiles::create))
        .route(
            "/profiles/:id",
            get(profiles::show).put(profiles::update).delete(profiles::delete),
        )
        .route("/activities", get(activities::list).post(activities::create))
        .route(
            "/activities/:id",
            get(activities::show).delete(activities::reverse),
        )
        .route_layer(from_fn(jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() || config.security.cors_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
