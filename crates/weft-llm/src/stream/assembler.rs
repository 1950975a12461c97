//! Tool-call assembly
//!
//! Backends that fragment tool-call arguments key every fragment by a wire
//! index; the id arrives first, then the name, then successive argument-text
//! pieces. The assembler accumulates those fragments and emits one completed
//! call per logical invocation when the backend signals the end of the turn.
//! State is local to one streamed turn and cleared at flush.

use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;

use crate::types::ToolCall;

/// Per-index accumulation state for one fragmented tool call
#[derive(Debug, Default)]
struct PendingCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Accumulates fragmented tool-call deltas keyed by wire index
///
/// Entries are kept in first-observation order: at flush, calls are emitted
/// in the order their index was first seen on the wire, not the order their
/// arguments completed.
#[derive(Debug)]
pub struct ToolCallAssembler {
    provider: &'static str,
    pending: IndexMap<u32, PendingCall>,
    sequence: u32,
}

impl ToolCallAssembler {
    /// Create an assembler for one streamed turn
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            pending: IndexMap::new(),
            sequence: 0,
        }
    }

    /// Record a fragment for the call at `index`
    ///
    /// `id` and `name` overwrite only when present; `arguments` appends.
    pub fn fragment(&mut self, index: u32, id: Option<&str>, name: Option<&str>, arguments: Option<&str>) {
        let entry = self.pending.entry(index).or_default();
        if let Some(id) = id {
            entry.id = Some(id.to_owned());
        }
        if let Some(name) = name {
            entry.name = Some(name.to_owned());
        }
        if let Some(arguments) = arguments {
            entry.arguments.push_str(arguments);
        }
    }

    /// Whether any fragments are currently accumulating
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Complete every accumulating entry and clear state for the next turn
    ///
    /// Argument text that fails to parse as JSON is replaced with an empty
    /// object rather than failing the turn. An entry that never received a
    /// name is dropped; an entry missing only its id gets a synthesized one.
    pub fn flush(&mut self) -> Vec<ToolCall> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_values()
            .filter_map(|call| {
                let name = call.name?;
                let id = call.id.unwrap_or_else(|| self.next_call_id());
                let input = if call.arguments.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
                        tracing::debug!(provider = self.provider, error = %e, "tool arguments failed to parse, substituting empty object");
                        serde_json::json!({})
                    })
                };
                Some(ToolCall { id, name, input })
            })
            .collect()
    }

    /// Synthesize a call id unique within this streamed turn
    ///
    /// Used both for fragmented entries whose backend issued no id and by
    /// families whose calls arrive whole without ids.
    pub fn next_call_id(&mut self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let id = format!("{}_call_{}_{millis}", self.provider, self.sequence);
        self.sequence += 1;
        id
    }
}
