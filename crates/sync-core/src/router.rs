//! Command routing: fan a playback command out to target screens.
//!
//! Each target is resolved independently. A target with no live
//! instances is recorded as [`Delivery::NotConnected`] and skipped; it
//! never stops delivery to the remaining targets. A target with live
//! instances gets the command on **every** instance.

use serde_json::Number;
use tracing::debug;

use crate::connection::Connection;
use crate::messages::{OutboundEvent, SyncAction};
use crate::registry::Registry;

/// Outcome for one requested target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// No group under this id.
    NotConnected,

    /// The group existed; `succeeded` of `attempted` enqueues went through.
    Delivered { attempted: usize, succeeded: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub screen_id: String,
    pub delivery: Delivery,
}

/// Per-target results, in the order targets were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl DeliveryReport {
    /// Total connections the command was successfully queued to.
    pub fn delivered_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.delivery {
                Delivery::Delivered { succeeded, .. } => succeeded,
                Delivery::NotConnected => 0,
            })
            .sum()
    }

    /// Targets that had no live instance.
    pub fn not_connected(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.delivery == Delivery::NotConnected)
            .map(|o| o.screen_id.as_str())
            .collect()
    }

    pub fn outcome(&self, screen_id: &str) -> Option<&Delivery> {
        self.outcomes
            .iter()
            .find(|o| o.screen_id == screen_id)
            .map(|o| &o.delivery)
    }
}

/// Read-only router over a borrowed registry.
pub struct Router<'a, C> {
    registry: &'a Registry<C>,
}

impl<'a, C: Connection> Router<'a, C> {
    pub fn new(registry: &'a Registry<C>) -> Self {
        Router { registry }
    }

    /// Deliver `action` with `timestamp` to every instance of each target.
    pub fn route(
        &self,
        action: SyncAction,
        targets: &[String],
        timestamp: &Number,
    ) -> DeliveryReport {
        let event = OutboundEvent::command(action, timestamp.clone());
        let mut report = DeliveryReport::default();

        for target in targets {
            let delivery = match self.registry.group(target) {
                Some(group) if !group.is_empty() => {
                    let mut succeeded = 0;
                    for conn in group.members() {
                        if conn.deliver(&event) {
                            succeeded += 1;
                        } else {
                            debug!(conn_id = %conn.id(), screen_id = %target, "Command not queued, transport closed");
                        }
                    }
                    debug!(
                        screen_id = %target,
                        action = action.as_str(),
                        instances = group.len(),
                        "Command delivered"
                    );
                    Delivery::Delivered {
                        attempted: group.len(),
                        succeeded,
                    }
                }
                _ => {
                    debug!(screen_id = %target, action = action.as_str(), "Screen not connected");
                    Delivery::NotConnected
                }
            };

            report.outcomes.push(TargetOutcome {
                screen_id: target.clone(),
                delivery,
            });
        }

        report
    }
}
