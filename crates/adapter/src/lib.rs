//! Adapter crate - drives game sessions over a TCP socket with JSON frames
//!
//! The engine never schedules anything itself. This crate owns the real-time
//! side: one task per connection keeps a session, issues `tickDown` after the
//! interval the last snapshot reported, and tracks heartbeats.
//!
//! # Protocol Overview
//!
//! Line-delimited JSON, every frame shaped `{"op": ..., "data": ...}`:
//!
//! | op | direction | data |
//! |----|-----------|------|
//! | `open` | server → client | heartbeat interval (ms) |
//! | `ready` | both | `"classic"` or `"extended"` |
//! | `ping` | both | echoed |
//! | `heartbeat` | both | client timestamp, echoed |
//! | `keydown` | client → server | command symbol |
//! | `states` | server → client | game snapshot |
//! | `toggle` | both | `true` pauses, `false` resumes |
//! | `error` | server → client | reason |
//!
//! # Environment Variables
//!
//! - `NEMEIN_HOST`: Bind address (default: "127.0.0.1")
//! - `NEMEIN_PORT`: Port number (default: 8080)
//! - `NEMEIN_HEARTBEAT_MS`, `NEMEIN_INACTIVE_MS`, `NEMEIN_SWEEP_MS`: liveness timing
//! - `NEMEIN_BOARD_WIDTH`, `NEMEIN_BOARD_HEIGHT`: board size
//! - `NEMEIN_DISABLED`: Set to "1" or "true" to keep the server idle
//!
//! # Example Protocol Flow
//!
//! ```text
//! Server -> Client: {"op":"open","data":5000}
//! Client -> Server: {"op":"ready","data":"classic"}
//! Server -> Client: {"op":"ready","data":"classic"}
//! Server -> Client: {"op":"states","data":{"variant":"classic","board":[[0,0,...]],...}}
//! Client -> Server: {"op":"keydown","data":"hardDrop"}
//! Server -> Client: {"op":"states","data":{...}}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 8080
//! {"op":"ready","data":"extended"}
//! ```

pub mod protocol;
pub mod server;

pub use nemein_core as core;
pub use nemein_types as types;

pub use protocol::{encode_message, parse_message, ClientMessage, ServerMessage};
pub use server::{handle_connection, run_server, GameInstance, Liveness, ServerConfig, ServerState};
