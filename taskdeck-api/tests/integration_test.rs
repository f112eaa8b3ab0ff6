/// Integration tests for the Taskdeck API
///
/// These tests verify the full system end-to-end against a real database:
/// - Authorization across the role hierarchy
/// - Project lifecycle with cascading deletion
/// - Board column registry and task status transitions
/// - Roster operations, per-project and fan-out
///
/// They require PostgreSQL (`DATABASE_URL`) and `JWT_SECRET` in the
/// environment, so they are ignored by default:
///
/// ```bash
/// cargo test -p taskdeck-api -- --ignored
/// ```
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Requests without a token are rejected before reaching any handler
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_missing_token_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Creating a project attaches exactly one owner membership for the creator
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_project_attaches_owner() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/projects",
            &ctx.jwt_token,
            json!({
                "title": "Launch",
                "start_date": "2026-01-01",
                "end_date": "2026-06-30"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let project = body_json(response).await;

    let members = project["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"], json!(ctx.user.id));
    assert_eq!(members[0]["role"], "owner");
}

/// End date not after start date is a validation failure
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_project_rejects_inverted_dates() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/projects",
            &ctx.jwt_token,
            json!({
                "title": "Backwards",
                "start_date": "2026-06-30",
                "end_date": "2026-01-01"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Non-members cannot see a project; members can
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_project_visibility_requires_membership() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Private").await.unwrap();
    let (_outsider, outsider_token) = ctx.create_user("Outsider").await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(get(&format!("/v1/projects/{}", project_id), &outsider_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .call(get(&format!("/v1/projects/{}", project_id), &ctx.jwt_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// The full board scenario: member moves a task, non-member cannot,
/// fixed columns survive deletion attempts
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_task_transition_scenario() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Kanban").await.unwrap();

    // Invite B as member
    let (member, member_token) = ctx.create_user("Bea").await.unwrap();
    let response = ctx
        .app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/team", project_id),
            &ctx.jwt_token,
            json!({ "email": member.email, "role": "member" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Create task assigned to B, status defaults to todo
    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/tasks",
            &ctx.jwt_token,
            json!({
                "project_id": project_id,
                "title": "Ship it",
                "assignee_id": member.id
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await;
    assert_eq!(task["status"], "todo");
    let task_id = task["id"].as_str().unwrap().to_string();

    // C, not a member, cannot move the task
    let (_outsider, outsider_token) = ctx.create_user("Cal").await.unwrap();
    let response = ctx
        .app
        .clone()
        .call(patch(
            &format!("/v1/tasks/{}/status", task_id),
            &outsider_token,
            json!({ "status": "in_progress" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // B can
    let response = ctx
        .app
        .clone()
        .call(patch(
            &format!("/v1/tasks/{}/status", task_id),
            &member_token,
            json!({ "status": "in_progress" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "in_progress");

    // A cannot delete a fixed column, even as owner
    let response = ctx
        .app
        .clone()
        .call(delete(
            &format!("/v1/projects/{}/board/in_progress", project_id),
            &ctx.jwt_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // The task's status survived the rejected deletion
    let response = ctx
        .app
        .clone()
        .call(get(&format!("/v1/tasks/{}", task_id), &ctx.jwt_token))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["status"], "in_progress");
}

/// A status outside the project's column registry is rejected
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_transition_to_unknown_column_fails() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Strict").await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/tasks",
            &ctx.jwt_token,
            json!({ "project_id": project_id, "title": "Drifter" }),
        ))
        .await
        .unwrap();
    let task_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = ctx
        .app
        .clone()
        .call(patch(
            &format!("/v1/tasks/{}/status", task_id),
            &ctx.jwt_token,
            json!({ "status": "archived" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Custom columns: slugified identifier, max+1 position, duplicate rejected
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_custom_column_creation() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Boards").await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/board", project_id),
            &ctx.jwt_token,
            json!({ "title": "Code Review" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let column = body_json(response).await;
    assert_eq!(column["identifier"], "code_review");
    assert_eq!(column["is_fixed"], false);
    // Custom columns slot in after the fixed block
    assert_eq!(column["position"], 3);

    // Second column with the same title collides on the identifier
    let response = ctx
        .app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/board", project_id),
            &ctx.jwt_token,
            json!({ "title": "Code Review" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Listing shows the three fixed columns first
    let response = ctx
        .app
        .clone()
        .call(get(&format!("/v1/projects/{}/board", project_id), &ctx.jwt_token))
        .await
        .unwrap();
    let columns = body_json(response).await["columns"].as_array().unwrap().clone();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[0]["identifier"], "todo");
    assert_eq!(columns[1]["identifier"], "in_progress");
    assert_eq!(columns[2]["identifier"], "completed");
    assert_eq!(columns[3]["identifier"], "code_review");

    // Every listed position is distinct
    let positions: Vec<i64> = columns.iter().map(|c| c["position"].as_i64().unwrap()).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);

    // The fixed block's positions are off limits for custom columns
    let response = ctx
        .app
        .clone()
        .call(put(
            &format!("/v1/projects/{}/board/code_review", project_id),
            &ctx.jwt_token,
            json!({ "position": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Deleting a custom column moves its tasks back to todo
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_custom_column_reassigns_tasks() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Cleanup").await.unwrap();

    ctx.app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/board", project_id),
            &ctx.jwt_token,
            json!({ "title": "Review" }),
        ))
        .await
        .unwrap();

    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/tasks",
            &ctx.jwt_token,
            json!({
                "project_id": project_id,
                "title": "In review",
                "status": "review"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = ctx
        .app
        .clone()
        .call(delete(
            &format!("/v1/projects/{}/board/review", project_id),
            &ctx.jwt_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .call(get(&format!("/v1/tasks/{}", task_id), &ctx.jwt_token))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["status"], "todo");
}

/// Self-removal from a roster always fails
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_self_removal_forbidden() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Solo").await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(delete(
            &format!("/v1/projects/{}/team/{}", project_id, ctx.user.id),
            &ctx.jwt_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Same rule on the fan-out path
    let response = ctx
        .app
        .clone()
        .call(delete(&format!("/v1/team/{}", ctx.user.id), &ctx.jwt_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Members below admin cannot manage the roster
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_member_cannot_invite() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Gated").await.unwrap();

    let (member, member_token) = ctx.create_user("Mel").await.unwrap();
    ctx.app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/team", project_id),
            &ctx.jwt_token,
            json!({ "email": member.email, "role": "member" }),
        ))
        .await
        .unwrap();

    let (target, _) = ctx.create_user("Tia").await.unwrap();
    let response = ctx
        .app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/team", project_id),
            &member_token,
            json!({ "email": target.email, "role": "member" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Fan-out attach reports per-project outcomes and is idempotent
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_fanout_attach_reports_outcomes() {
    let ctx = TestContext::new().await.unwrap();
    let first = common::create_test_project(&ctx, "First").await.unwrap();
    let second = common::create_test_project(&ctx, "Second").await.unwrap();

    let (target, _) = ctx.create_user("Nova").await.unwrap();

    // Already a member of the first project
    ctx.app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/team", first),
            &ctx.jwt_token,
            json!({ "email": target.email, "role": "member" }),
        ))
        .await
        .unwrap();

    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/team",
            &ctx.jwt_token,
            json!({ "email": target.email, "role": "member" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let report = body_json(response).await;
    let outcomes = report["outcomes"].as_array().unwrap();
    assert!(outcomes.len() >= 2);

    let by_id = |id: uuid::Uuid| {
        outcomes
            .iter()
            .find(|o| o["project_id"] == json!(id))
            .unwrap()["status"]
            .clone()
    };
    assert_eq!(by_id(first), "skipped");
    assert_eq!(by_id(second), "applied");
}

/// A user who administers no project cannot fan out at all
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_fanout_requires_an_administered_project() {
    let ctx = TestContext::new().await.unwrap();
    let (nobody, nobody_token) = ctx.create_user("Zed").await.unwrap();
    let (target, _) = ctx.create_user("Targ").await.unwrap();
    let _ = nobody;

    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/team",
            &nobody_token,
            json!({ "email": target.email, "role": "member" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

async fn project_row_counts(db: &sqlx::PgPool, project_id: uuid::Uuid) -> (i64, i64, i64, i64, i64) {
    let projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_one(db)
        .await
        .unwrap();
    let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
        .bind(project_id)
        .fetch_one(db)
        .await
        .unwrap();
    let members: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM project_members WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(db)
            .await
            .unwrap();
    let columns: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM board_columns WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(db)
            .await
            .unwrap();
    let comments: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
    )
    .bind(project_id)
    .fetch_one(db)
    .await
    .unwrap();
    (projects, tasks, members, columns, comments)
}

/// A failure mid-cascade rolls the whole deletion back, leaving every row
/// exactly as it was
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_project_rolls_back_on_failure() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Survivor").await.unwrap();

    // Populate every cascade target: a member, a custom column, a task in
    // that column, and a comment
    let (member, _) = ctx.create_user("Orla").await.unwrap();
    ctx.app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/team", project_id),
            &ctx.jwt_token,
            json!({ "email": member.email, "role": "member" }),
        ))
        .await
        .unwrap();
    ctx.app
        .clone()
        .call(post(
            &format!("/v1/projects/{}/board", project_id),
            &ctx.jwt_token,
            json!({ "title": "Review" }),
        ))
        .await
        .unwrap();
    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/tasks",
            &ctx.jwt_token,
            json!({ "project_id": project_id, "title": "Hardy", "status": "review" }),
        ))
        .await
        .unwrap();
    let task_id = body_json(response).await["id"].as_str().unwrap().to_string();
    ctx.app
        .clone()
        .call(post(
            &format!("/v1/tasks/{}/comments", task_id),
            &ctx.jwt_token,
            json!({ "body": "still here" }),
        ))
        .await
        .unwrap();

    let before = project_row_counts(&ctx.db, project_id).await;
    assert_eq!(before, (1, 1, 2, 1, 1));

    // The project row is the cascade's last step; blocking its deletion
    // forces a failure after every child row was already deleted inside the
    // transaction
    sqlx::query(
        "CREATE OR REPLACE FUNCTION block_doomed_delete() RETURNS trigger AS $$ \
         BEGIN RAISE EXCEPTION 'deletion blocked'; END; $$ LANGUAGE plpgsql",
    )
    .execute(&ctx.db)
    .await
    .unwrap();
    sqlx::query(&format!(
        "CREATE TRIGGER block_doomed_delete BEFORE DELETE ON projects \
         FOR EACH ROW WHEN (OLD.id = '{}') EXECUTE FUNCTION block_doomed_delete()",
        project_id
    ))
    .execute(&ctx.db)
    .await
    .unwrap();

    let response = ctx
        .app
        .clone()
        .call(delete(&format!("/v1/projects/{}", project_id), &ctx.jwt_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Nothing was lost: child rows deleted before the failing step came back
    // with the rollback
    let after = project_row_counts(&ctx.db, project_id).await;
    assert_eq!(after, before);

    // With the obstacle removed the same call succeeds
    sqlx::query("DROP TRIGGER block_doomed_delete ON projects")
        .execute(&ctx.db)
        .await
        .unwrap();
    sqlx::query("DROP FUNCTION block_doomed_delete")
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx
        .app
        .clone()
        .call(delete(&format!("/v1/projects/{}", project_id), &ctx.jwt_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(project_row_counts(&ctx.db, project_id).await, (0, 0, 0, 0, 0));
}

/// Project deletion removes tasks, columns, memberships, and comments
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_project_cascades() {
    let ctx = TestContext::new().await.unwrap();
    let project_id = common::create_test_project(&ctx, "Doomed").await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(post(
            "/v1/tasks",
            &ctx.jwt_token,
            json!({ "project_id": project_id, "title": "Short lived" }),
        ))
        .await
        .unwrap();
    let task_id = body_json(response).await["id"].as_str().unwrap().to_string();

    ctx.app
        .clone()
        .call(post(
            &format!("/v1/tasks/{}/comments", task_id),
            &ctx.jwt_token,
            json!({ "body": "last words" }),
        ))
        .await
        .unwrap();

    let response = ctx
        .app
        .clone()
        .call(delete(&format!("/v1/projects/{}", project_id), &ctx.jwt_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Everything under the project is gone
    let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
        .bind(project_id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(tasks, 0);

    let members: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM project_members WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(members, 0);

    let comments: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
    )
    .bind(project_id)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(comments, 0);

    let response = ctx
        .app
        .clone()
        .call(get(&format!("/v1/projects/{}", project_id), &ctx.jwt_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
