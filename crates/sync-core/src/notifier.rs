//! Pushes registry snapshots and screen status to control panels.

use serde_json::Value;
use tracing::debug;

use crate::connection::Connection;
use crate::identity::{ConnectionId, ScreenId};
use crate::messages::OutboundEvent;
use crate::registry::Registry;

pub struct Notifier<'a, C> {
    registry: &'a Registry<C>,
}

impl<'a, C: Connection> Notifier<'a, C> {
    pub fn new(registry: &'a Registry<C>) -> Self {
        Notifier { registry }
    }

    /// Current snapshot as a `connected_screens_update` event.
    pub fn snapshot_event(&self) -> OutboundEvent {
        OutboundEvent::connected_screens_update(self.registry.snapshot())
    }

    /// Send the current snapshot to every control panel.
    ///
    /// Returns how many panels it was queued to.
    pub fn notify_screens_changed(&self) -> usize {
        self.broadcast(&self.snapshot_event(), None)
    }

    /// Like [`notify_screens_changed`](Self::notify_screens_changed), but
    /// skipping one panel.
    pub fn notify_screens_changed_except(&self, skip: ConnectionId) -> usize {
        self.broadcast(&self.snapshot_event(), Some(skip))
    }

    /// Send the current snapshot to a single connection.
    pub fn push_snapshot_to(&self, conn: &C) -> bool {
        conn.deliver(&self.snapshot_event())
    }

    /// Forward a screen's status to every control panel.
    pub fn relay_status(&self, screen_id: ScreenId, status: Value) -> usize {
        self.broadcast(&OutboundEvent::screen_status_update(screen_id, status), None)
    }

    fn broadcast(&self, event: &OutboundEvent, skip: Option<ConnectionId>) -> usize {
        let mut reached = 0;
        for panel in self.registry.control_panels() {
            if Some(panel.id()) == skip {
                continue;
            }
            if panel.deliver(event) {
                reached += 1;
            }
        }
        debug!(event = event.name(), panels = reached, "Broadcast to control panels");
        reached
    }
}
