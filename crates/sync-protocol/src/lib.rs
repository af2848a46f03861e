//! sync-protocol
//!
//! Wire-level encoding/decoding for the playback relay.
//!
//! This crate turns logical relay events
//! (`sync_core::InboundEvent` / `OutboundEvent`) into text frames and
//! back again.
//!
//! - [`wire_types`] : event names and the JSON envelope
//! - [`json_codec`] : validation + encode/decode

pub mod wire_types;
pub mod json_codec;

pub use wire_types::{Envelope, WireInboundEvent};

pub use json_codec::{
    ProtocolError,
    decode_envelope,
    decode_inbound,
    encode_inbound,
    encode_outbound,
};
