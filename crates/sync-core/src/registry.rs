//! Connection registry: screen id → live instances, plus control panels.
//!
//! - One [`ScreenGroup`] per screen id, created on first registration
//!   and dropped the moment its last member leaves.
//! - Groups are capped; past the cap the oldest member (by registration
//!   order) is evicted and closed before the newcomer is admitted.
//! - Control panels are an uncapped set.
//!
//! Both maps are insertion-ordered, so snapshots list screens in the
//! order they first appeared.
//!
//! The registry only stores state. Telling anyone about changes is the
//! caller's job (see `Relay` and `Notifier`).

use std::collections::VecDeque;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::connection::{CloseReason, Connection};
use crate::identity::{ConnectionId, Identity, ScreenId};
use crate::messages::ScreenCount;

/// Default per-screen instance cap.
pub const DEFAULT_MAX_INSTANCES_PER_SCREEN: usize = 3;

/// Connections registered under one screen id, oldest first.
#[derive(Debug)]
pub struct ScreenGroup<C> {
    members: VecDeque<C>,
}

impl<C: Connection> ScreenGroup<C> {
    fn new() -> Self {
        ScreenGroup {
            members: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in registration order.
    pub fn members(&self) -> impl Iterator<Item = &C> {
        self.members.iter()
    }

    fn remove(&mut self, id: ConnectionId) -> Option<C> {
        let pos = self.members.iter().position(|c| c.id() == id)?;
        self.members.remove(pos)
    }
}

/// Result of a screen registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResult {
    pub screen_id: ScreenId,

    /// Group size after admitting the new connection.
    pub instances: usize,

    /// Every screen id in the registry, in insertion order.
    pub connected_screens: Vec<ScreenId>,

    /// Connection pushed out to make room, already closed.
    pub evicted: Option<ConnectionId>,
}

/// Authoritative mapping from identities to live connections.
#[derive(Debug)]
pub struct Registry<C> {
    max_instances: usize,
    screens: IndexMap<ScreenId, ScreenGroup<C>>,
    control_panels: IndexMap<ConnectionId, C>,
}

impl<C: Connection> Registry<C> {
    /// Create an empty registry with the given per-screen cap.
    ///
    /// A cap of zero is treated as one.
    pub fn new(max_instances: usize) -> Self {
        Registry {
            max_instances: max_instances.max(1),
            screens: IndexMap::new(),
            control_panels: IndexMap::new(),
        }
    }

    pub fn max_instances(&self) -> usize {
        self.max_instances
    }

    /// Add `conn` to the group for `screen_id`, evicting the oldest
    /// member first if the group is full.
    pub fn register_screen(&mut self, conn: C, screen_id: ScreenId) -> RegistrationResult {
        let max = self.max_instances;
        let group = self
            .screens
            .entry(screen_id.clone())
            .or_insert_with(ScreenGroup::new);

        let mut evicted = None;
        if group.len() >= max {
            if let Some(oldest) = group.members.pop_front() {
                info!(
                    screen_id = %screen_id,
                    conn_id = %oldest.id(),
                    "Evicting oldest screen instance"
                );
                oldest.close(CloseReason::Evicted {
                    screen_id: screen_id.clone(),
                });
                evicted = Some(oldest.id());
            }
        }

        debug!(screen_id = %screen_id, conn_id = %conn.id(), "Screen instance added");
        group.members.push_back(conn);
        let instances = group.len();

        RegistrationResult {
            screen_id,
            instances,
            connected_screens: self.screen_ids(),
            evicted,
        }
    }

    pub fn register_control_panel(&mut self, conn: C) {
        self.control_panels.insert(conn.id(), conn);
    }

    /// Forget a connection.
    ///
    /// Returns `true` only if screen membership changed. Unknown
    /// connections, unregistered ones, and already-evicted screen
    /// instances are no-ops.
    pub fn remove_connection(&mut self, id: ConnectionId, identity: Option<&Identity>) -> bool {
        match identity {
            Some(Identity::Screen(screen_id)) => {
                let Some(group) = self.screens.get_mut(screen_id) else {
                    return false;
                };
                if group.remove(id).is_none() {
                    return false;
                }
                if group.is_empty() {
                    self.screens.shift_remove(screen_id);
                    debug!(screen_id = %screen_id, "Screen group emptied");
                }
                true
            }
            Some(Identity::ControlPanel) => {
                self.control_panels.shift_remove(&id);
                false
            }
            None => false,
        }
    }

    /// Screen ids with their live instance counts.
    pub fn snapshot(&self) -> Vec<ScreenCount> {
        self.screens
            .iter()
            .map(|(screen_id, group)| ScreenCount {
                screen_id: screen_id.clone(),
                count: group.len(),
            })
            .collect()
    }

    pub fn screen_ids(&self) -> Vec<ScreenId> {
        self.screens.keys().cloned().collect()
    }

    pub fn group(&self, screen_id: &str) -> Option<&ScreenGroup<C>> {
        self.screens.get(screen_id)
    }

    pub fn control_panels(&self) -> impl Iterator<Item = &C> {
        self.control_panels.values()
    }

    pub fn control_panel_count(&self) -> usize {
        self.control_panels.len()
    }

    /// Number of distinct screen ids.
    pub fn num_screens(&self) -> usize {
        self.screens.len()
    }
}
