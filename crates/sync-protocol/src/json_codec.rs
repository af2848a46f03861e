//! JSON encoding/decoding for relay events.
//!
//! Inbound payloads are validated against a fixed shape per event name
//! before they become an [`InboundEvent`]; anything that does not fit is
//! a [`ProtocolError`] and is never handed to the relay.
//!
//! Inbound payloads (client → relay):
//!
//! ```text
//! register_screen          {"screenId": string?}
//! register_control_panel   {} (ignored)
//! sync_play|pause|stop     {"targetScreens": [string], "timestamp": number}
//! screen_status            {"screenId": string?, "status": any}
//! ```
//!
//! A missing `screenId` is *not* a codec error: the registration
//! protocol decides what to do with it. A `screenId` of the wrong type
//! is.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use sync_core::{
    InboundEvent,
    OutboundEvent,
    RegisterScreen,
    ScreenStatus,
    SyncCommand,
};

use crate::wire_types::{Envelope, EnvelopeRef, WireInboundEvent};

/// Errors returned by decode/encode.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame is not a JSON envelope.
    #[error("invalid frame: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Envelope names an event this relay does not accept.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    /// Known event, payload of the wrong shape.
    #[error("invalid `{event}` payload: {reason}")]
    InvalidPayload { event: &'static str, reason: String },

    /// Serialization failed on the encode path.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

// -----------------------------------------------------------------------------
// Wire payload shapes (inbound)
// -----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterScreenWire {
    #[serde(default)]
    screen_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncWire {
    target_screens: Vec<String>,
    timestamp: Number,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScreenStatusWire {
    #[serde(default)]
    screen_id: Option<String>,
    #[serde(default)]
    status: Value,
}

// -----------------------------------------------------------------------------
// Decode
// -----------------------------------------------------------------------------

/// Parse a raw frame into its envelope without interpreting `data`.
pub fn decode_envelope(text: &str) -> Result<Envelope, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::InvalidJson)
}

/// Parse and validate a client frame.
pub fn decode_inbound(text: &str) -> Result<InboundEvent, ProtocolError> {
    let Envelope { event, data } = decode_envelope(text)?;

    let kind = WireInboundEvent::from_name(&event).ok_or(ProtocolError::UnknownEvent(event))?;

    match kind {
        WireInboundEvent::RegisterScreen => {
            let wire: RegisterScreenWire = if data.is_null() {
                RegisterScreenWire::default()
            } else {
                payload(kind, data)?
            };
            Ok(InboundEvent::RegisterScreen(RegisterScreen {
                screen_id: wire.screen_id,
            }))
        }
        WireInboundEvent::RegisterControlPanel => Ok(InboundEvent::RegisterControlPanel),
        WireInboundEvent::Sync(action) => {
            let wire: SyncWire = payload(kind, data)?;
            Ok(InboundEvent::Sync(SyncCommand {
                action,
                target_screens: wire.target_screens,
                timestamp: wire.timestamp,
            }))
        }
        WireInboundEvent::ScreenStatus => {
            let wire: ScreenStatusWire = payload(kind, data)?;
            Ok(InboundEvent::ScreenStatus(ScreenStatus {
                screen_id: wire.screen_id,
                status: wire.status,
            }))
        }
    }
}

fn payload<T: DeserializeOwned>(kind: WireInboundEvent, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidPayload {
        event: kind.as_str(),
        reason: e.to_string(),
    })
}

// -----------------------------------------------------------------------------
// Encode
// -----------------------------------------------------------------------------

/// Encode a relay event as a text frame.
pub fn encode_outbound(msg: &OutboundEvent) -> Result<String, ProtocolError> {
    let event = msg.name();
    match msg {
        OutboundEvent::RegistrationSuccess(p) => envelope(event, p),
        OutboundEvent::ConnectedScreensUpdate(p) => envelope(event, p),
        OutboundEvent::Command(p) => envelope(event, p),
        OutboundEvent::SyncCommandAck(p) => envelope(event, p),
        OutboundEvent::ScreenStatusUpdate(p) => envelope(event, p),
    }
}

/// Encode a client event as a text frame (for clients and tests).
pub fn encode_inbound(msg: &InboundEvent) -> Result<String, ProtocolError> {
    let event = msg.name();
    match msg {
        InboundEvent::RegisterScreen(p) => envelope(event, p),
        InboundEvent::RegisterControlPanel => envelope(event, &serde_json::Map::new()),
        InboundEvent::Sync(p) => envelope(event, p),
        InboundEvent::ScreenStatus(p) => envelope(event, p),
    }
}

fn envelope<T: Serialize>(event: &str, data: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(&EnvelopeRef { event, data }).map_err(ProtocolError::Encode)
}
