//! sync-core
//!
//! Pure playback-relay logic:
//! - identities and events (inbound/outbound types)
//! - connection registry with per-screen instance cap
//! - command router (fan-out per screen id)
//! - broadcast notifier for control panels
//! - relay orchestrator (registration protocol + dispatch)

pub mod identity;
pub mod messages;
pub mod connection;
pub mod registry;
pub mod router;
pub mod notifier;
pub mod relay;
pub mod error;

pub use identity::{ConnectionId, Identity, Role, ScreenId};

pub use messages::{
    ConnectedScreensUpdate,
    InboundEvent,
    OutboundEvent,
    PlaybackCommand,
    RegisterScreen,
    RegistrationSuccess,
    ScreenCount,
    ScreenStatus,
    ScreenStatusUpdate,
    SyncAction,
    SyncCommand,
    SyncCommandAck,
};

pub use connection::{CloseReason, Connection};
pub use registry::{RegistrationResult, Registry, ScreenGroup, DEFAULT_MAX_INSTANCES_PER_SCREEN};
pub use router::{Delivery, DeliveryReport, Router, TargetOutcome};
pub use notifier::Notifier;
pub use relay::{Handled, Relay, RelayConfig};
pub use error::RelayError;
