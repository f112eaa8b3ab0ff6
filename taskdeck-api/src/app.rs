/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::jwt;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token validation
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// The authenticated user, injected into request extensions by the JWT layer
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    /// User ID from the token's `sub` claim
    pub id: Uuid,
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                              # Health check (public)
/// └── /v1/                                 # API v1 (JWT required)
///     ├── /projects                        # Project lifecycle
///     │   ├── /:id/team                    # Per-project roster
///     │   └── /:id/board                   # Board column registry
///     ├── /team                            # Cross-project roster (fan-out)
///     └── /tasks                           # Task lifecycle
///         └── /:id/comments
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (everything under /v1)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/:id/team",
            get(routes::team::list_project_team).post(routes::team::invite_member),
        )
        .route(
            "/:id/team/:user_id",
            put(routes::team::update_member_role).delete(routes::team::remove_member),
        )
        .route(
            "/:id/board",
            get(routes::board::list_columns).post(routes::board::create_column),
        )
        .route(
            "/:id/board/:identifier",
            put(routes::board::update_column).delete(routes::board::delete_column),
        );

    // Fan-out roster routes operating across every project the actor administers
    let team_routes = Router::new()
        .route(
            "/",
            get(routes::team::list_team).post(routes::team::attach_everywhere),
        )
        .route(
            "/:user_id",
            put(routes::team::update_role_everywhere).delete(routes::team::detach_everywhere),
        );

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", patch(routes::tasks::transition_status))
        .route(
            "/:id/comments",
            get(routes::tasks::list_comments).post(routes::tasks::add_comment),
        );

    // Everything under /v1 requires a valid token
    let v1_routes = Router::new()
        .nest("/projects", project_routes)
        .nest("/team", team_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects [`CurrentUser`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(CurrentUser { id: claims.sub });

    Ok(next.run(req).await)
}
