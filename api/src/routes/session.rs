use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use sandbox_core::records::{AllRequestsResponse, ToolCallsResponse};
use sandbox_core::tools::ScenarioResponse;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/set_scenario/{scenario}", post(set_scenario))
        .route("/tool_calls", get(get_tool_calls))
        .route("/all_requests", get(get_all_requests))
}

/// Switch the active scenario and clear both logs.
///
/// Unknown scenario names are accepted; a missing fixture only shows up when
/// a tool later asks for it.
#[utoipa::path(
    post,
    path = "/set_scenario/{scenario}",
    params(("scenario" = String, Path, description = "Fixture directory to activate")),
    responses(
        (status = 200, description = "Scenario activated, logs cleared", body = ScenarioResponse)
    ),
    tag = "session"
)]
pub async fn set_scenario(
    State(state): State<AppState>,
    Path(scenario): Path<String>,
) -> Json<ScenarioResponse> {
    state.session.reset(&scenario).await;
    tracing::info!(scenario = %scenario, "Scenario reset (tool_calls and all_requests cleared)");
    Json(ScenarioResponse { scenario })
}

/// Successful tool calls since the last reset.
#[utoipa::path(
    get,
    path = "/tool_calls",
    responses((status = 200, description = "Logged tool calls", body = ToolCallsResponse)),
    tag = "session"
)]
pub async fn get_tool_calls(State(state): State<AppState>) -> Json<ToolCallsResponse> {
    Json(ToolCallsResponse {
        calls: state.session.tool_calls().await,
    })
}

/// Every tool request since the last reset, failures included.
#[utoipa::path(
    get,
    path = "/all_requests",
    responses((status = 200, description = "Logged requests with summary", body = AllRequestsResponse)),
    tag = "session"
)]
pub async fn get_all_requests(State(state): State<AppState>) -> Json<AllRequestsResponse> {
    Json(AllRequestsResponse::new(state.session.requests().await))
}
