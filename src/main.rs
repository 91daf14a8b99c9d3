use anyhow::Context;
use axum::{routing::get, routing::post, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use orgdir_api::database::manager::DatabaseManager;
use orgdir_api::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, DB_HOST, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = orgdir_api::config::config();
    tracing::info!("Starting orgdir API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("ORGDIR_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("orgdir API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(department_routes())
        .merge(employee_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn department_routes() -> Router {
    use handlers::departments;

    Router::new()
        .route(
            "/api/departments",
            get(departments::department_list_get).post(departments::department_post),
        )
        .route("/api/departments/:id", get(departments::department_get))
        .route("/api/departments/:id/tree", get(departments::department_tree_get))
        .route(
            "/api/departments/:id/employees",
            get(departments::department_employees_get),
        )
}

fn employee_routes() -> Router {
    use handlers::employees;

    Router::new()
        .route("/api/employees", get(employees::employee_list_get))
        .route("/api/employees/:id", get(employees::employee_get))
        .route(
            "/api/employees/by-departments",
            post(employees::employees_by_departments_post),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "orgdir API",
            "version": version,
            "description": "Department tree and employee lookup backend",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "departments": "/api/departments[/:id]",
                "department_tree": "/api/departments/:id/tree",
                "department_employees": "/api/departments/:id/employees",
                "employees": "/api/employees[/:id]",
                "employees_by_departments": "/api/employees/by-departments",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
