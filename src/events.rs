// src/events.rs
use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;

use crate::joints::Handedness;
use crate::retarget::ModelStyle;

/// Payload shared by all pinch events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinchDetail {
    /// Midpoint between thumb tip and index tip.
    pub position: Vector3<f32>,
    pub wrist_rotation: UnitQuaternion<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HandEvent {
    ModelAttached { hand: Handedness, style: ModelStyle },
    PinchStarted(PinchDetail),
    PinchMoved(PinchDetail),
    PinchEnded(PinchDetail),
}

impl HandEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ModelAttached { .. } => "model-attached",
            Self::PinchStarted(_) => "pinch-started",
            Self::PinchMoved(_) => "pinch-moved",
            Self::PinchEnded(_) => "pinch-ended",
        }
    }

    pub fn pinch_detail(&self) -> Option<&PinchDetail> {
        match self {
            Self::PinchStarted(detail) | Self::PinchMoved(detail) | Self::PinchEnded(detail) => {
                Some(detail)
            }
            Self::ModelAttached { .. } => None,
        }
    }
}

/// Events emitted during a frame, in emission order, until drained.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<HandEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: HandEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<HandEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending(&self) -> &[HandEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail() -> PinchDetail {
        PinchDetail {
            position: Vector3::new(0.0, 1.0, 0.0),
            wrist_rotation: UnitQuaternion::identity(),
        }
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = EventQueue::new();
        queue.emit(HandEvent::PinchStarted(detail()));
        queue.emit(HandEvent::PinchEnded(detail()));

        let names: Vec<_> = queue.drain().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["pinch-started", "pinch-ended"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_serialized_tag() {
        let event = HandEvent::ModelAttached {
            hand: Handedness::Left,
            style: ModelStyle::Dots,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "model-attached");
        assert_eq!(json["hand"], "left");
        assert_eq!(json["style"], "dots");
    }
}
