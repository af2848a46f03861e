//! Connection identity: who a connection is, once it has said so.
//!
//! - [`ConnectionId`]: transport-assigned session handle.
//! - [`ScreenId`]: client-supplied logical screen label.
//! - [`Identity`]: the role a connection registered under.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

/// Identifier for a live transport session.
///
/// This is intentionally opaque; the server guarantees uniqueness
/// over the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical screen label, e.g. `"tv-1"` or `"lobby-left"`.
///
/// Never empty: the only way to build one is [`ScreenId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScreenId(String);

impl ScreenId {
    /// Accept a client-supplied label, rejecting empty or
    /// whitespace-only values.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(ScreenId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ScreenId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a connection can take.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    Screen,
    ControlPanel,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Screen => "screen",
            Role::ControlPanel => "control_panel",
        }
    }
}

/// What a connection registered as.
///
/// Attached once per connection and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Screen(ScreenId),
    ControlPanel,
}

impl Identity {
    pub fn role(&self) -> Role {
        match self {
            Identity::Screen(_) => Role::Screen,
            Identity::ControlPanel => Role::ControlPanel,
        }
    }

    /// The screen id, if this is a screen identity.
    pub fn screen_id(&self) -> Option<&ScreenId> {
        match self {
            Identity::Screen(id) => Some(id),
            Identity::ControlPanel => None,
        }
    }
}
