//! Low-level wire types and constants.
//!
//! Every frame is one JSON text message:
//!
//! ```text
//! {"event": "<name>", "data": { ... }}
//! ```
//!
//! This module defines the envelope and the closed set of inbound event
//! names. The actual validation lives in `json_codec`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sync_core::SyncAction;

/// Event names a client may send.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireInboundEvent {
    RegisterScreen,
    RegisterControlPanel,
    Sync(SyncAction),
    ScreenStatus,
}

impl WireInboundEvent {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "register_screen" => Some(WireInboundEvent::RegisterScreen),
            "register_control_panel" => Some(WireInboundEvent::RegisterControlPanel),
            "screen_status" => Some(WireInboundEvent::ScreenStatus),
            other => SyncAction::from_request_event(other).map(WireInboundEvent::Sync),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WireInboundEvent::RegisterScreen => "register_screen",
            WireInboundEvent::RegisterControlPanel => "register_control_panel",
            WireInboundEvent::Sync(action) => action.request_event(),
            WireInboundEvent::ScreenStatus => "screen_status",
        }
    }
}

/// Decoded envelope with an untyped payload.
///
/// `data` defaults to `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Borrowing envelope used on the encode path.
#[derive(Serialize)]
pub(crate) struct EnvelopeRef<'a, T: Serialize> {
    pub event: &'a str,
    pub data: &'a T,
}
