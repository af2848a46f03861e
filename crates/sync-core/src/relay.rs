//! Relay orchestrator.
//!
//! Owns the [`Registry`] and a table of live sessions, and dispatches
//! each [`InboundEvent`] to its handler:
//!
//! - `register_screen`        → registry insert (maybe evict), ack the
//!   screen, snapshot to all panels.
//! - `register_control_panel` → registry insert, snapshot to the new
//!   panel, snapshot to every other panel.
//! - `sync_*`                 → route to targets, ack the sender.
//! - `screen_status`          → relay to all panels.
//!
//! A session starts Unregistered and takes a role at most once. All
//! mutation goes through `&mut self`, so the owner (a single task in the
//! server) serializes everything.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::connection::{CloseReason, Connection};
use crate::error::RelayError;
use crate::identity::{ConnectionId, Identity, ScreenId};
use crate::messages::{
    InboundEvent, OutboundEvent, RegisterScreen, ScreenCount, ScreenStatus, SyncCommand,
};
use crate::notifier::Notifier;
use crate::registry::{RegistrationResult, Registry, DEFAULT_MAX_INSTANCES_PER_SCREEN};
use crate::router::{DeliveryReport, Router};

/// Relay tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// Cap on live instances per screen id. `1` gives single-instance
    /// behaviour: every new registration replaces the previous one.
    pub max_instances_per_screen: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            max_instances_per_screen: DEFAULT_MAX_INSTANCES_PER_SCREEN,
        }
    }
}

/// A live connection and the role it registered under, if any.
#[derive(Debug)]
struct Session<C> {
    conn: C,
    identity: Option<Identity>,
}

impl<C: Connection> Session<C> {
    fn assign(&mut self, identity: Identity) -> Result<(), RelayError> {
        if self.identity.is_some() {
            return Err(RelayError::AlreadyRegistered(self.conn.id()));
        }
        self.identity = Some(identity);
        Ok(())
    }
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    ScreenRegistered(RegistrationResult),
    ControlPanelRegistered,
    Routed(DeliveryReport),
    /// Status forwarded to this many panels.
    StatusRelayed(usize),
    /// Status with no resolvable screen id; nothing sent.
    StatusDropped,
}

#[derive(Debug)]
pub struct Relay<C> {
    config: RelayConfig,
    registry: Registry<C>,
    sessions: HashMap<ConnectionId, Session<C>>,
}

impl<C: Connection> Relay<C> {
    pub fn new(config: RelayConfig) -> Self {
        Relay {
            config,
            registry: Registry::new(config.max_instances_per_screen),
            sessions: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Track a freshly accepted connection. It starts Unregistered.
    pub fn connect(&mut self, conn: C) {
        let id = conn.id();
        self.sessions.insert(id, Session { conn, identity: None });
        debug!(conn_id = %id, "Session opened");
    }

    /// Dispatch a single inbound event from connection `id`.
    pub fn handle(&mut self, id: ConnectionId, event: InboundEvent) -> Result<Handled, RelayError> {
        if !self.sessions.contains_key(&id) {
            return Err(RelayError::UnknownConnection(id));
        }

        match event {
            InboundEvent::RegisterScreen(req) => self.register_screen(id, req),
            InboundEvent::RegisterControlPanel => self.register_control_panel(id),
            InboundEvent::Sync(cmd) => Ok(self.sync(id, cmd)),
            InboundEvent::ScreenStatus(status) => Ok(self.screen_status(id, status)),
        }
    }

    /// Drop connection `id` and clean the registry.
    ///
    /// Returns `true` if screen membership changed, in which case panels
    /// have already been notified. Unknown ids are a no-op.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        let Some(session) = self.sessions.remove(&id) else {
            return false;
        };

        let changed = self.registry.remove_connection(id, session.identity.as_ref());
        if changed {
            Notifier::new(&self.registry).notify_screens_changed();
        }

        debug!(
            conn_id = %id,
            role = session.identity.as_ref().map(|i| i.role().as_str()).unwrap_or("unregistered"),
            screens_changed = changed,
            "Session closed"
        );
        changed
    }

    /// Force every live session closed. Sessions stay tracked until
    /// their disconnects arrive. Returns how many were closed.
    pub fn shutdown(&mut self) -> usize {
        for session in self.sessions.values() {
            session.conn.close(CloseReason::Shutdown);
        }
        info!(sessions = self.sessions.len(), "Closing all sessions");
        self.sessions.len()
    }

    pub fn snapshot(&self) -> Vec<ScreenCount> {
        self.registry.snapshot()
    }

    pub fn control_panel_count(&self) -> usize {
        self.registry.control_panel_count()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Role of connection `id`, if it has registered.
    pub fn identity(&self, id: ConnectionId) -> Option<&Identity> {
        self.sessions.get(&id).and_then(|s| s.identity.as_ref())
    }

    /// Read-only registry access, for tests or admin queries.
    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    // -------------------------------------------------------------------------
    // Internal handlers
    // -------------------------------------------------------------------------

    fn register_screen(&mut self, id: ConnectionId, req: RegisterScreen) -> Result<Handled, RelayError> {
        let Some(screen_id) = req.screen_id.as_deref().and_then(ScreenId::parse) else {
            warn!(conn_id = %id, "register_screen without a screen id, ignoring");
            return Err(RelayError::InvalidScreenId);
        };

        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(RelayError::UnknownConnection(id))?;
        session.assign(Identity::Screen(screen_id.clone()))?;
        let conn = session.conn.clone();

        let result = self.registry.register_screen(conn.clone(), screen_id);
        info!(
            conn_id = %id,
            screen_id = %result.screen_id,
            instances = result.instances,
            "Screen registered"
        );

        conn.deliver(&OutboundEvent::registration_success(
            result.screen_id.clone(),
            result.instances,
            result.connected_screens.clone(),
        ));
        Notifier::new(&self.registry).notify_screens_changed();

        Ok(Handled::ScreenRegistered(result))
    }

    fn register_control_panel(&mut self, id: ConnectionId) -> Result<Handled, RelayError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(RelayError::UnknownConnection(id))?;
        session.assign(Identity::ControlPanel)?;
        let conn = session.conn.clone();

        self.registry.register_control_panel(conn.clone());
        info!(
            conn_id = %id,
            panels = self.registry.control_panel_count(),
            "Control panel registered"
        );

        let notifier = Notifier::new(&self.registry);
        notifier.push_snapshot_to(&conn);
        notifier.notify_screens_changed_except(id);

        Ok(Handled::ControlPanelRegistered)
    }

    fn sync(&mut self, id: ConnectionId, cmd: SyncCommand) -> Handled {
        let report = Router::new(&self.registry).route(cmd.action, &cmd.target_screens, &cmd.timestamp);

        info!(
            conn_id = %id,
            action = cmd.action.as_str(),
            targets = cmd.target_screens.len(),
            delivered = report.delivered_count(),
            not_connected = ?report.not_connected(),
            "Sync command routed"
        );

        if let Some(session) = self.sessions.get(&id) {
            session.conn.deliver(&OutboundEvent::sync_command_ack(&cmd));
        }

        Handled::Routed(report)
    }

    fn screen_status(&mut self, id: ConnectionId, status: ScreenStatus) -> Handled {
        // A registered screen always reports under its own id.
        let screen_id = self
            .identity(id)
            .and_then(Identity::screen_id)
            .cloned()
            .or_else(|| status.screen_id.as_deref().and_then(ScreenId::parse));

        let Some(screen_id) = screen_id else {
            debug!(conn_id = %id, "screen_status without a screen id, dropping");
            return Handled::StatusDropped;
        };

        let status: Value = status.status;
        let reached = Notifier::new(&self.registry).relay_status(screen_id, status);
        Handled::StatusRelayed(reached)
    }
}
