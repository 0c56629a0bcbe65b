//! Deterministic tool names.
//!
//! Names look like `task_<id>_<hash>` or `flow_<namespace>_<id>_<hash>`. The
//! readable part is sanitized and may be truncated; the hash suffix is the first
//! eight hex digits of SHA-256 over the unsanitized, kind-tagged identity, so
//! two distinct identities never share a name.

use sha2::{Digest, Sha256};

/// Maximum length of a tool name accepted by LLM providers.
pub const MAX_TOOL_NAME_LEN: usize = 64;

/// Name of the open-mode flow tool.
pub const OPEN_FLOW_TOOL_NAME: &str = "call_flow";

const HASH_LEN: usize = 8;

/// Returns the tool name of a task action.
pub fn task_tool_name(task_id: &str) -> String {
    compose("task", &[task_id])
}

/// Returns the tool name of an explicit-mode flow action.
pub fn flow_tool_name(namespace: &str, flow_id: &str) -> String {
    compose("flow", &[namespace, flow_id])
}

/// Returns whether `name` only uses `[A-Za-z0-9_-]` and fits provider limits.
pub fn is_valid_tool_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_TOOL_NAME_LEN && name.chars().all(is_allowed)
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect()
}

fn compose(kind: &str, parts: &[&str]) -> String {
    // A JSON array keeps part boundaries unambiguous.
    let identity = serde_json::json!([kind, parts]).to_string();
    let digest = hex::encode(Sha256::digest(identity.as_bytes()));
    let hash = &digest[..HASH_LEN];

    let readable_len = MAX_TOOL_NAME_LEN - kind.len() - HASH_LEN - 2;
    let mut readable = parts
        .iter()
        .map(|part| sanitize(part))
        .collect::<Vec<_>>()
        .join("_");
    readable.truncate(readable_len);

    format!("{kind}_{readable}_{hash}")
}
