use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trajectory Sandbox Mock Tools",
        version = "0.1.0",
        description = "Deterministic, fixture-backed tool endpoints for testing agent tool use."
    ),
    paths(
        routes::health::health_check,
        routes::session::set_scenario,
        routes::session::get_tool_calls,
        routes::session::get_all_requests,
        routes::tools::list_tools,
        routes::tools::inbox_list,
        routes::tools::email_draft,
        routes::tools::email_send,
        routes::tools::calendar_read,
        routes::tools::memory_read,
        routes::tools::memory_write,
    ),
    components(schemas(
        sandbox_core::error::ApiError,
        sandbox_core::records::ToolCallRecord,
        sandbox_core::records::RequestRecord,
        sandbox_core::records::RequestSummary,
        sandbox_core::records::ToolCallsResponse,
        sandbox_core::records::AllRequestsResponse,
        sandbox_core::tools::HealthResponse,
        sandbox_core::tools::ScenarioResponse,
        sandbox_core::tools::InboxMessage,
        sandbox_core::tools::InboxListResponse,
        sandbox_core::tools::EmailDraftResponse,
        sandbox_core::tools::EmailSendResponse,
        sandbox_core::tools::CalendarReadResponse,
        sandbox_core::tools::MemoryReadResponse,
        sandbox_core::tools::MemoryWriteResponse,
        sandbox_core::tools::ToolDescriptor,
        sandbox_core::tools::ToolCatalog,
    ))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api-doc/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
