/// Common test utilities for integration tests
///
/// Shared infrastructure:
/// - Test database setup via migrations
/// - Test user creation and token generation
/// - App construction against the real router
///
/// Requires a PostgreSQL instance reachable through `DATABASE_URL` and a
/// `JWT_SECRET` in the environment (a `.env` file works).
use sqlx::PgPool;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_shared::auth::jwt::create_access_token;
use taskdeck_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../taskdeck-shared/migrations").run(&db).await?;

        let user = User::create(
            &db,
            CreateUser {
                name: "Test User".to_string(),
                email: format!("test-{}@example.com", Uuid::new_v4()),
            },
        )
        .await?;

        let jwt_token = create_access_token(user.id, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates an additional user with their own token
    pub async fn create_user(&self, name: &str) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                name: name.to_string(),
                email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
            },
        )
        .await?;

        let token = create_access_token(user.id, &self.config.jwt.secret)?;

        Ok((user, token))
    }
}

/// Helper to create a project through the API, returning its id
pub async fn create_test_project(ctx: &TestContext, title: &str) -> anyhow::Result<Uuid> {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::Service as _;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/projects")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "title": title,
                "description": "integration test project",
                "start_date": "2026-01-01",
                "end_date": "2026-12-31",
                "status": "in_progress"
            })
            .to_string(),
        ))?;

    let response = ctx.app.clone().call(request).await?;
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;

    let id = json["id"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("project response missing id: {}", json))?;

    Ok(Uuid::parse_str(id)?)
}
