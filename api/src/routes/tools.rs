use axum::extract::State;
use axum::http::Uri;
use axum::routing::{get, post};
use axum::{Json, Router};
use sandbox_core::args::{DRAFT_INSTRUCTIONS, DRAFT_MESSAGE_ID, MEMORY_PATH, SEND_DRAFT_ID, lookup};
use sandbox_core::records::ToolCallRecord;
use sandbox_core::tools::{
    self, CALENDAR_READ, CalendarReadResponse, EMAIL_DRAFT, EMAIL_SEND, EmailDraftResponse,
    EmailSendResponse, FixtureMessage, INBOX_LIST, InboxListResponse, InboxMessage, MEMORY_READ,
    MEMORY_WRITE, MemoryReadResponse, MemoryWriteResponse, ToolCatalog,
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::extract::ToolArgs;
use crate::fixtures::{CALENDAR_FIXTURE, FixtureError, INBOX_FIXTURE};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/inbox.list", post(inbox_list))
        .route("/tools/email.draft", post(email_draft))
        .route("/tools/email.send", post(email_send))
        .route("/tools/calendar.read", post(calendar_read))
        .route("/tools/memory.read", post(memory_read))
        .route("/tools/memory.write", post(memory_write))
}

async fn log_call(state: &AppState, tool: &str, args: Value, result: Value) {
    state
        .session
        .record_tool_call(ToolCallRecord::new(tool, args, &result))
        .await;
}

/// MCP-style listing of the available tools.
#[utoipa::path(
    get,
    path = "/tools",
    responses((status = 200, description = "Tool catalog", body = ToolCatalog)),
    tag = "tools"
)]
pub async fn list_tools() -> Json<ToolCatalog> {
    Json(tools::catalog())
}

/// List the active scenario's inbox. 404 when the scenario has no inbox.
#[utoipa::path(
    post,
    path = "/tools/inbox.list",
    responses(
        (status = 200, description = "Inbox messages in fixture order", body = InboxListResponse),
        (status = 404, description = "Scenario has no inbox.json", body = sandbox_core::error::ApiError)
    ),
    tag = "tools"
)]
pub async fn inbox_list(
    State(state): State<AppState>,
    ToolArgs(args): ToolArgs,
) -> Result<Json<InboxListResponse>, AppError> {
    tracing::info!(tool = INBOX_LIST, args = %args, "Tool call");

    let scenario = state.session.scenario().await;
    let inbox: Vec<FixtureMessage> = state.fixtures.load(&scenario, INBOX_FIXTURE).await?;
    let messages: Vec<InboxMessage> = inbox.into_iter().map(InboxMessage::from).collect();

    log_call(&state, INBOX_LIST, args, json!({ "count": messages.len() })).await;
    Ok(Json(InboxListResponse { messages }))
}

/// Draft a reply. Accepts any body; missing fields fall back to defaults.
#[utoipa::path(
    post,
    path = "/tools/email.draft",
    responses((status = 200, description = "Derived draft", body = EmailDraftResponse)),
    tag = "tools"
)]
pub async fn email_draft(
    State(state): State<AppState>,
    ToolArgs(args): ToolArgs,
) -> Json<EmailDraftResponse> {
    tracing::info!(tool = EMAIL_DRAFT, args = %args, "Tool call");

    let message_id = lookup(&args, &DRAFT_MESSAGE_ID);
    let instructions = lookup(&args, &DRAFT_INSTRUCTIONS);
    let draft = EmailDraftResponse::new(&message_id, &instructions);

    log_call(
        &state,
        EMAIL_DRAFT,
        json!({ "message_id": message_id, "instructions": instructions, "_raw": args }),
        json!({ "draft_id": draft.draft_id }),
    )
    .await;
    Json(draft)
}

/// "Send" a draft. Irreversible in the scenario's story; here it only logs.
#[utoipa::path(
    post,
    path = "/tools/email.send",
    responses((status = 200, description = "Draft reported as sent", body = EmailSendResponse)),
    tag = "tools"
)]
pub async fn email_send(
    State(state): State<AppState>,
    ToolArgs(args): ToolArgs,
) -> Json<EmailSendResponse> {
    tracing::info!(tool = EMAIL_SEND, args = %args, "Tool call");

    let draft_id = lookup(&args, &SEND_DRAFT_ID);

    log_call(
        &state,
        EMAIL_SEND,
        json!({ "draft_id": draft_id, "_raw": args }),
        json!({ "status": "sent" }),
    )
    .await;
    Json(EmailSendResponse {
        status: "sent".to_string(),
        draft_id,
    })
}

/// Calendar events for the active scenario; empty when there is no calendar.
#[utoipa::path(
    post,
    path = "/tools/calendar.read",
    responses((status = 200, description = "Calendar events", body = CalendarReadResponse)),
    tag = "tools"
)]
pub async fn calendar_read(
    State(state): State<AppState>,
    ToolArgs(args): ToolArgs,
) -> Result<Json<CalendarReadResponse>, AppError> {
    tracing::info!(tool = CALENDAR_READ, args = %args, "Tool call");

    let scenario = state.session.scenario().await;
    let events: Vec<Value> = match state.fixtures.load(&scenario, CALENDAR_FIXTURE).await {
        Ok(events) => events,
        Err(FixtureError::NotFound { .. }) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    log_call(&state, CALENDAR_READ, args, json!({ "count": events.len() })).await;
    Ok(Json(CalendarReadResponse { events }))
}

/// Read a file from the scenario's memory directory. Never fails.
#[utoipa::path(
    post,
    path = "/tools/memory.read",
    responses((status = 200, description = "File content, or exists=false", body = MemoryReadResponse)),
    tag = "tools"
)]
pub async fn memory_read(
    State(state): State<AppState>,
    ToolArgs(args): ToolArgs,
) -> Json<MemoryReadResponse> {
    tracing::info!(tool = MEMORY_READ, args = %args, "Tool call");

    let scenario = state.session.scenario().await;
    let path = lookup(&args, &MEMORY_PATH);
    let content = state.fixtures.read_memory(&scenario, &path).await;
    let exists = content.is_some();

    log_call(&state, MEMORY_READ, args, json!({ "exists": exists })).await;
    Json(MemoryReadResponse { content, exists })
}

/// Accept a memory write. Nothing is persisted.
#[utoipa::path(
    post,
    path = "/tools/memory.write",
    responses((status = 200, description = "Write acknowledged", body = MemoryWriteResponse)),
    tag = "tools"
)]
pub async fn memory_write(
    State(state): State<AppState>,
    ToolArgs(args): ToolArgs,
) -> Json<MemoryWriteResponse> {
    tracing::info!(tool = MEMORY_WRITE, args = %args, "Tool call");

    log_call(&state, MEMORY_WRITE, args, json!({ "success": true })).await;
    Json(MemoryWriteResponse { success: true })
}

/// Fallback for any path without a route, including unknown tool names.
pub async fn unknown_route(uri: Uri) -> AppError {
    AppError::UnknownTool {
        path: uri.path().to_string(),
    }
}
