//! Permissive argument extraction for tool inputs.
//!
//! Agents rarely agree on field names: one sends `message_id`, the next
//! `emailId`, a third just `id`. Each tool declares an ordered list of
//! candidate keys and a default, and [`lookup`] takes the first usable value.

use serde_json::Value;

/// Ordered candidate keys plus the value used when none of them is present.
#[derive(Debug, Clone, Copy)]
pub struct AliasKeys {
    pub keys: &'static [&'static str],
    pub default: &'static str,
}

/// email.draft: which message is being replied to.
pub const DRAFT_MESSAGE_ID: AliasKeys = AliasKeys {
    keys: &["message_id", "messageId", "email_id", "emailId", "id"],
    default: "unknown",
};

/// email.draft: free-text reply instructions.
pub const DRAFT_INSTRUCTIONS: AliasKeys = AliasKeys {
    keys: &["instructions", "body", "content", "text", "reply", "message"],
    default: "No instructions provided",
};

/// email.send: which draft to send.
pub const SEND_DRAFT_ID: AliasKeys = AliasKeys {
    keys: &["draft_id", "draftId", "id"],
    default: "unknown",
};

/// memory.read: file path relative to the scenario's memory directory.
pub const MEMORY_PATH: AliasKeys = AliasKeys {
    keys: &["path", "key"],
    default: "",
};

/// Resolve the first candidate key holding a usable value.
///
/// Non-empty strings are taken as-is and non-zero numbers are rendered in
/// decimal. Null, empty strings, zero, booleans, arrays and objects are
/// skipped. Input that
/// is not a JSON object always yields the default.
pub fn lookup(args: &Value, aliases: &AliasKeys) -> String {
    let Some(map) = args.as_object() else {
        return aliases.default.to_string();
    };
    aliases
        .keys
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(usable_string)
        .unwrap_or_else(|| aliases.default.to_string())
}

fn usable_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}
