// crates/sync-core/tests/common/mod.rs
//! Recording `Connection` double shared by the relay tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sync_core::{CloseReason, Connection, ConnectionId, OutboundEvent, Relay, RelayConfig};

#[derive(Debug, Default)]
pub struct Log {
    pub events: Vec<OutboundEvent>,
    pub closed: Option<CloseReason>,
}

/// Connection that records what the relay sends it.
///
/// Once closed, further deliveries fail like a dead transport would.
#[derive(Debug, Clone)]
pub struct TestConn {
    id: ConnectionId,
    log: Rc<RefCell<Log>>,
}

impl TestConn {
    pub fn new(id: u64) -> Self {
        TestConn {
            id: ConnectionId(id),
            log: Rc::new(RefCell::new(Log::default())),
        }
    }

    pub fn events(&self) -> Vec<OutboundEvent> {
        self.log.borrow().events.clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.log.borrow().events.iter().map(|e| e.name()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.log.borrow().events.iter().filter(|e| e.name() == name).count()
    }

    pub fn last(&self, name: &str) -> Option<OutboundEvent> {
        self.log
            .borrow()
            .events
            .iter()
            .rev()
            .find(|e| e.name() == name)
            .cloned()
    }

    pub fn closed(&self) -> Option<CloseReason> {
        self.log.borrow().closed.clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().events.clear();
    }
}

impl Connection for TestConn {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn deliver(&self, event: &OutboundEvent) -> bool {
        let mut log = self.log.borrow_mut();
        if log.closed.is_some() {
            return false;
        }
        log.events.push(event.clone());
        true
    }

    fn close(&self, reason: CloseReason) {
        self.log.borrow_mut().closed = Some(reason);
    }
}

pub fn relay(max_instances_per_screen: usize) -> Relay<TestConn> {
    Relay::new(RelayConfig {
        max_instances_per_screen,
    })
}

/// Connect a new test connection and hand it back.
pub fn join(relay: &mut Relay<TestConn>, id: u64) -> TestConn {
    let conn = TestConn::new(id);
    relay.connect(conn.clone());
    conn
}
