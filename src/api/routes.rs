//! HTTP route handlers.

use std::sync::Arc;

use axum::middleware;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::board::{BoardError, BoardSnapshot, BoardStore};
use crate::command::{BoardContext, CommandBridge, CommandError, TaskDraft};
use crate::config::Config;
use crate::llm::OpenRouterClient;
use crate::model::Task;
use crate::persist::{BoardPersistence, RestPersistence, TaskPatch};

use super::auth::{self, AuthUser};
use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// The board engine; single writer of UI-visible state.
    pub store: BoardStore,
    /// Command channel, absent when no generation provider is configured.
    pub bridge: Option<CommandBridge>,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let gateway: Option<Arc<dyn BoardPersistence>> = match &config.persistence {
        Some(p) => Some(Arc::new(RestPersistence::new(&p.url, &p.service_key))),
        None => {
            tracing::info!("No persistence service configured, board will run local-only");
            None
        }
    };

    let bridge = match config.openrouter_api_key.clone() {
        Some(key) => Some(CommandBridge::new(
            Arc::new(OpenRouterClient::new(key)),
            config.ai_model.clone(),
        )),
        None => {
            tracing::info!("Command channel disabled (no OpenRouter key configured)");
            None
        }
    };

    let store = BoardStore::new(gateway, config.board_id.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        bridge,
    });

    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/board", get(get_board))
        .route("/api/board/suggestions", get(get_suggestions))
        .route("/api/tasks", post(add_task))
        .route("/api/tasks/:id", patch(edit_task).delete(delete_task))
        .route("/api/tasks/:id/move", post(move_task))
        .route("/api/command", post(run_command))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGTERM/SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dev_mode: state.config.dev_mode,
        auth_required: state.config.auth.auth_required(state.config.dev_mode),
    })
}

/// Full ordered board snapshot, loading state on first access.
async fn get_board(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<BoardSnapshot> {
    state.store.load(&user.id).await;
    Json(state.store.snapshot().await)
}

async fn add_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AddTaskRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    state.store.load(&user.id).await;

    let draft = TaskDraft {
        title: req.title,
        description: req.description,
        priority: req.priority.unwrap_or_default(),
        tags: req.tags,
    };
    state
        .store
        .add_task(&req.column_id, draft, false)
        .await
        .map(Json)
        .map_err(board_error)
}

async fn edit_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<EditTaskRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    state.store.load(&user.id).await;

    let patch = TaskPatch {
        title: req.title,
        description: req.description,
        priority: req.priority,
        tags: req.tags,
        ..TaskPatch::default()
    };
    state
        .store
        .edit_task(&id, patch)
        .await
        .map(Json)
        .map_err(board_error)
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.store.load(&user.id).await;
    state
        .store
        .delete_task(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(board_error)
}

/// Apply a drag gesture and return the resulting snapshot. Gestures with no
/// valid target are ignored rather than rejected.
async fn move_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<Json<BoardSnapshot>, (StatusCode, String)> {
    state.store.load(&user.id).await;
    state
        .store
        .move_task(&id, &req.column_id, req.index)
        .await
        .map_err(board_error)?;
    Ok(Json(state.store.snapshot().await))
}

/// Natural-language task creation.
async fn run_command(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let bridge = command_bridge(&state)?;
    state.store.load(&user.id).await;

    let context = board_context(&state.store.snapshot().await);
    let draft = bridge
        .interpret(&req.command, &context)
        .await
        .map_err(command_error)?;

    state
        .store
        .add_generated_task(draft)
        .await
        .map(Json)
        .map_err(board_error)
}

async fn get_suggestions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SuggestionsResponse>, (StatusCode, String)> {
    let bridge = command_bridge(&state)?;
    state.store.load(&user.id).await;

    let context = board_context(&state.store.snapshot().await);
    let suggestions = bridge.suggest(&context).await.map_err(command_error)?;
    Ok(Json(SuggestionsResponse { suggestions }))
}

fn command_bridge(state: &AppState) -> Result<&CommandBridge, (StatusCode, String)> {
    state.bridge.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "Command channel is not configured".to_string(),
    ))
}

/// Prompt context from the live snapshot: lane names, task titles, and one
/// summary line per task.
fn board_context(snapshot: &BoardSnapshot) -> BoardContext {
    let column_name = |id: &str| {
        snapshot
            .columns
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };

    BoardContext {
        column_names: snapshot.columns.iter().map(|c| c.name.clone()).collect(),
        task_titles: snapshot.tasks.iter().map(|t| t.title.clone()).collect(),
        task_summaries: snapshot
            .tasks
            .iter()
            .map(|t| {
                format!(
                    "\"{}\" ({} priority, in {})",
                    t.title,
                    t.priority,
                    column_name(&t.column_id)
                )
            })
            .collect(),
    }
}

fn board_error(err: BoardError) -> (StatusCode, String) {
    let status = match err {
        BoardError::UnknownColumn(_) | BoardError::UnknownTask(_) => StatusCode::NOT_FOUND,
        BoardError::NoColumns | BoardError::NotLoaded => StatusCode::CONFLICT,
    };
    (status, err.to_string())
}

fn command_error(err: CommandError) -> (StatusCode, String) {
    (StatusCode::BAD_GATEWAY, err.to_string())
}
