use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

pub const INBOX_LIST: &str = "inbox.list";
pub const EMAIL_DRAFT: &str = "email.draft";
pub const EMAIL_SEND: &str = "email.send";
pub const CALENDAR_READ: &str = "calendar.read";
pub const MEMORY_READ: &str = "memory.read";
pub const MEMORY_WRITE: &str = "memory.write";

/// Characters of the message body kept in an inbox snippet.
pub const SNIPPET_MAX_CHARS: usize = 100;
/// Characters of the draft instructions kept in a draft preview.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Response for GET /health
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub scenario: String,
}

/// Response for POST /set_scenario/{scenario}
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScenarioResponse {
    pub scenario: String,
}

/// A message as stored in a scenario's `inbox.json`.
///
/// `id` is whatever JSON the fixture author wrote (usually a string, sometimes
/// a number) and is passed through to agents unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureMessage {
    pub id: Value,
    pub sender: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub received_ts: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub is_urgent: bool,
}

/// The public shape of an inbox message: the body is cut down to a snippet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct InboxMessage {
    pub id: Value,
    pub sender: String,
    pub subject: String,
    pub snippet: String,
    pub received_ts: String,
    pub labels: Vec<String>,
    pub is_urgent: bool,
}

impl From<FixtureMessage> for InboxMessage {
    fn from(msg: FixtureMessage) -> Self {
        let snippet = crate::records::truncate_chars(&msg.body, SNIPPET_MAX_CHARS).to_string();
        Self {
            id: msg.id,
            sender: msg.sender,
            subject: msg.subject,
            snippet,
            received_ts: msg.received_ts,
            labels: msg.labels,
            is_urgent: msg.is_urgent,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InboxListResponse {
    pub messages: Vec<InboxMessage>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailDraftResponse {
    pub draft_id: String,
    pub preview: String,
}

impl EmailDraftResponse {
    /// Drafts are never stored; the id is re-derivable from the message id.
    pub fn new(message_id: &str, instructions: &str) -> Self {
        let excerpt = crate::records::truncate_chars(instructions, PREVIEW_MAX_CHARS);
        Self {
            draft_id: format!("draft_{message_id}"),
            preview: format!("[Draft reply to {message_id}]: {excerpt}..."),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailSendResponse {
    pub status: String,
    pub draft_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalendarReadResponse {
    pub events: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemoryReadResponse {
    pub content: Option<String>,
    pub exists: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemoryWriteResponse {
    pub success: bool,
}

/// One entry of the MCP-style tool listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Response for GET /tools
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolCatalog {
    pub tools: Vec<ToolDescriptor>,
}

fn descriptor(name: &str, description: &str, input_schema: Value) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// The static catalog of mock tools, in MCP-compatible shape.
pub fn catalog() -> ToolCatalog {
    ToolCatalog {
        tools: vec![
            descriptor(
                INBOX_LIST,
                "List inbox messages with id, sender, subject, snippet",
                json!({"type": "object", "properties": {}}),
            ),
            descriptor(
                EMAIL_DRAFT,
                "Draft a reply to an email",
                json!({
                    "type": "object",
                    "properties": {
                        "message_id": {"type": "string", "description": "ID of email to reply to"},
                        "instructions": {"type": "string", "description": "Instructions for the draft"}
                    },
                    "required": ["message_id", "instructions"]
                }),
            ),
            descriptor(
                EMAIL_SEND,
                "Send a drafted email. IRREVERSIBLE - requires user approval first!",
                json!({
                    "type": "object",
                    "properties": {
                        "draft_id": {"type": "string", "description": "ID of draft to send"}
                    },
                    "required": ["draft_id"]
                }),
            ),
            descriptor(
                CALENDAR_READ,
                "Read calendar events",
                json!({
                    "type": "object",
                    "properties": {
                        "start_date": {"type": "string", "description": "Start date (YYYY-MM-DD)"},
                        "end_date": {"type": "string", "description": "End date (YYYY-MM-DD)"}
                    }
                }),
            ),
            descriptor(
                MEMORY_READ,
                "Read a file from memory",
                json!({
                    "type": "object",
                    "properties": {
                        "path": {"type": "string", "description": "Path to read"}
                    },
                    "required": ["path"]
                }),
            ),
            descriptor(
                MEMORY_WRITE,
                "Write a file to memory",
                json!({
                    "type": "object",
                    "properties": {
                        "path": {"type": "string", "description": "Path to write"},
                        "content": {"type": "string", "description": "Content to write"}
                    },
                    "required": ["path", "content"]
                }),
            ),
        ],
    }
}
