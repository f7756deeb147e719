// src/presence.rs
use tracing::info;
use uuid::Uuid;

use crate::joints::Handedness;
use crate::xr::{InputSource, InputSourceRegistry};

#[derive(Debug, Clone, PartialEq)]
pub enum PresenceChange {
    /// A hand-tracking source appeared, or was replaced by a new one.
    Connected(InputSource),
    Lost,
    Unchanged,
}

/// Watches the input source registry for a hand-tracking source of one
/// handedness.
#[derive(Debug, Clone)]
pub struct PresenceMonitor {
    hand: Handedness,
    current: Option<Uuid>,
}

impl PresenceMonitor {
    pub fn new(hand: Handedness) -> Self {
        Self {
            hand,
            current: None,
        }
    }

    pub fn poll(&mut self, registry: &dyn InputSourceRegistry) -> PresenceChange {
        match registry.find_hand(self.hand) {
            Some(source) if self.current == Some(source.id) => PresenceChange::Unchanged,
            Some(source) => {
                info!("Hand tracking source connected for {} hand ({})", self.hand, source.id);
                self.current = Some(source.id);
                PresenceChange::Connected(source.clone())
            }
            None if self.current.is_some() => {
                info!("Hand tracking source lost for {} hand", self.hand);
                self.current = None;
                PresenceChange::Lost
            }
            None => PresenceChange::Unchanged,
        }
    }

    /// Forget the current source so the next poll reports it again.
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn is_present(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<Uuid> {
        self.current
    }

    pub fn hand(&self) -> Handedness {
        self.hand
    }
}
