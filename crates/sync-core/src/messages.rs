//! Event types exchanged between clients and the relay.
//!
//! These are **transport-agnostic** logical events:
//! - [`InboundEvent`]: what the relay consumes.
//! - [`OutboundEvent`]: what the relay produces.
//!
//! Payload structs derive `Serialize` with camelCase field names so
//! they can be placed into a wire envelope as-is. The envelope itself
//! (event name + data) lives in the `sync-protocol` crate.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::identity::ScreenId;

/// A validated event from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Become a screen under the given id.
    RegisterScreen(RegisterScreen),

    /// Become a control panel.
    RegisterControlPanel,

    /// Play / pause / stop a set of screens.
    Sync(SyncCommand),

    /// Status report from a screen, relayed to control panels.
    ScreenStatus(ScreenStatus),
}

impl InboundEvent {
    /// Wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::RegisterScreen(_) => "register_screen",
            InboundEvent::RegisterControlPanel => "register_control_panel",
            InboundEvent::Sync(cmd) => cmd.action.request_event(),
            InboundEvent::ScreenStatus(_) => "screen_status",
        }
    }
}

/// Screen registration request.
///
/// `screen_id` stays raw here: deciding whether an id is acceptable
/// belongs to the registration protocol, not the codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterScreen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_id: Option<String>,
}

/// Playback action carried by a sync command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Play,
    Pause,
    Stop,
}

impl SyncAction {
    pub const ALL: [SyncAction; 3] = [SyncAction::Play, SyncAction::Pause, SyncAction::Stop];

    /// Name used in acks, e.g. `"play"`.
    pub fn as_str(self) -> &'static str {
        match self {
            SyncAction::Play => "play",
            SyncAction::Pause => "pause",
            SyncAction::Stop => "stop",
        }
    }

    /// Inbound event a control panel sends, e.g. `sync_play`.
    pub fn request_event(self) -> &'static str {
        match self {
            SyncAction::Play => "sync_play",
            SyncAction::Pause => "sync_pause",
            SyncAction::Stop => "sync_stop",
        }
    }

    /// Outbound event screens receive, e.g. `play_command`.
    pub fn command_event(self) -> &'static str {
        match self {
            SyncAction::Play => "play_command",
            SyncAction::Pause => "pause_command",
            SyncAction::Stop => "stop_command",
        }
    }

    pub fn from_request_event(name: &str) -> Option<Self> {
        SyncAction::ALL.into_iter().find(|a| a.request_event() == name)
    }

    pub fn from_command_event(name: &str) -> Option<Self> {
        SyncAction::ALL.into_iter().find(|a| a.command_event() == name)
    }
}

/// Sync command issued by a control panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCommand {
    #[serde(skip)]
    pub action: SyncAction,

    /// Screen ids to deliver to, in the order the panel listed them.
    pub target_screens: Vec<String>,

    /// Opaque client timestamp, passed through untouched.
    pub timestamp: Number,
}

/// Status report from a screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_id: Option<String>,

    /// Arbitrary client-defined status, forwarded verbatim.
    pub status: Value,
}

/// An event the relay sends to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Sent to a screen after it registers.
    RegistrationSuccess(RegistrationSuccess),

    /// Registry snapshot pushed to control panels.
    ConnectedScreensUpdate(ConnectedScreensUpdate),

    /// Playback command delivered to screen instances.
    Command(PlaybackCommand),

    /// Acknowledgement sent to the issuing control panel.
    SyncCommandAck(SyncCommandAck),

    /// A screen's status, relayed to control panels.
    ScreenStatusUpdate(ScreenStatusUpdate),
}

impl OutboundEvent {
    /// Wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::RegistrationSuccess(_) => "registration_success",
            OutboundEvent::ConnectedScreensUpdate(_) => "connected_screens_update",
            OutboundEvent::Command(cmd) => cmd.action.command_event(),
            OutboundEvent::SyncCommandAck(_) => "sync_command_ack",
            OutboundEvent::ScreenStatusUpdate(_) => "screen_status_update",
        }
    }
}

/// One entry of a registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenCount {
    pub screen_id: ScreenId,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSuccess {
    pub screen_id: ScreenId,

    /// Instances now registered under `screen_id`, this one included.
    pub instances: usize,

    /// Every screen id currently known to the relay.
    pub connected_screens: Vec<ScreenId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedScreensUpdate {
    pub screens: Vec<ScreenCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackCommand {
    #[serde(skip)]
    pub action: SyncAction,
    pub timestamp: Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCommandAck {
    pub action: SyncAction,
    pub target_screens: Vec<String>,
    pub timestamp: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenStatusUpdate {
    pub screen_id: ScreenId,
    pub status: Value,
}

// -----------------------------------------------------------------------------
// Convenience constructors
// -----------------------------------------------------------------------------

impl OutboundEvent {
    pub fn registration_success(
        screen_id: ScreenId,
        instances: usize,
        connected_screens: Vec<ScreenId>,
    ) -> Self {
        OutboundEvent::RegistrationSuccess(RegistrationSuccess {
            screen_id,
            instances,
            connected_screens,
        })
    }

    pub fn connected_screens_update(screens: Vec<ScreenCount>) -> Self {
        OutboundEvent::ConnectedScreensUpdate(ConnectedScreensUpdate { screens })
    }

    pub fn command(action: SyncAction, timestamp: Number) -> Self {
        OutboundEvent::Command(PlaybackCommand { action, timestamp })
    }

    pub fn sync_command_ack(cmd: &SyncCommand) -> Self {
        OutboundEvent::SyncCommandAck(SyncCommandAck {
            action: cmd.action,
            target_screens: cmd.target_screens.clone(),
            timestamp: cmd.timestamp.clone(),
        })
    }

    pub fn screen_status_update(screen_id: ScreenId, status: Value) -> Self {
        OutboundEvent::ScreenStatusUpdate(ScreenStatusUpdate { screen_id, status })
    }
}
