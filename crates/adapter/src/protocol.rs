//! Protocol module - JSON frames exchanged with game clients
//!
//! Every frame is one line of JSON shaped `{"op": <opcode>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Snapshot;
use crate::types::Variant;

// ============== Client -> Server ==============

/// Frames a client may send
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a game of the given variant
    Ready(Variant),
    Ping(Value),
    /// Liveness signal carrying the client timestamp
    Heartbeat(Value),
    /// Command symbol such as `moveLeft` or `hardDrop`
    Keydown(String),
    /// `true` pauses automatic ticks, `false` resumes them
    Toggle(bool),
}

// ============== Server -> Client ==============

/// Frames the server sends
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Greeting with the expected heartbeat interval in milliseconds
    Open(u64),
    Ready(Variant),
    Ping(Value),
    Heartbeat(Value),
    States(Snapshot),
    Toggle(bool),
    Error(String),
}

/// Parse one inbound line
pub fn parse_message(line: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(line)
}

/// Serialize a frame including its trailing newline
pub fn encode_message(msg: &ServerMessage) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    Ok(line)
}
