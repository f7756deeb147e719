// src/gesture.rs
//! Pinch detection between thumb tip and index tip.
//!
//! A pinch starts when the tips come closer than `start_distance`. It ends
//! only once they separate beyond the distance at which it started plus
//! `end_percentage`, so noise around a single threshold cannot toggle it.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{HandEvent, PinchDetail};
use crate::joints::HandJoint;
use crate::pose_buffer::PoseBuffer;

pub const PINCH_START_DISTANCE: f32 = 0.015;
pub const PINCH_END_PERCENTAGE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PinchConfig {
    /// Tip distance (meters) below which a pinch starts.
    pub start_distance: f32,
    /// Fraction above the starting distance at which a pinch ends.
    pub end_percentage: f32,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            start_distance: PINCH_START_DISTANCE,
            end_percentage: PINCH_END_PERCENTAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    pub is_pinched: bool,
    /// Tip distance captured when the current pinch started.
    pub pinch_distance: f32,
    pub position: Vector3<f32>,
    pub wrist_rotation: UnitQuaternion<f32>,
}

impl Default for PinchState {
    fn default() -> Self {
        Self {
            is_pinched: false,
            pinch_distance: 0.0,
            position: Vector3::zeros(),
            wrist_rotation: UnitQuaternion::identity(),
        }
    }
}

impl PinchState {
    fn detail(&self) -> PinchDetail {
        PinchDetail {
            position: self.position,
            wrist_rotation: self.wrist_rotation,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PinchDetector {
    pub config: PinchConfig,
    state: PinchState,
    last_distance: Option<f32>,
}

impl PinchDetector {
    pub fn new(config: PinchConfig) -> Self {
        Self {
            config,
            state: PinchState::default(),
            last_distance: None,
        }
    }

    /// Evaluate the pinch for this frame. Nothing happens without poses.
    pub fn update(&mut self, buffer: &PoseBuffer) -> Option<HandEvent> {
        if !buffer.has_poses() {
            return None;
        }
        self.evaluate(
            buffer.position(HandJoint::ThumbTip),
            buffer.position(HandJoint::IndexTip),
            buffer.orientation(HandJoint::Wrist),
        )
    }

    pub fn evaluate(
        &mut self,
        thumb_tip: Vector3<f32>,
        index_tip: Vector3<f32>,
        wrist_rotation: UnitQuaternion<f32>,
    ) -> Option<HandEvent> {
        let distance = (index_tip - thumb_tip).norm();
        self.last_distance = Some(distance);
        self.state.wrist_rotation = wrist_rotation;
        self.state.position = (index_tip + thumb_tip) * 0.5;

        if !self.state.is_pinched {
            if distance < self.config.start_distance {
                self.state.is_pinched = true;
                self.state.pinch_distance = distance;
                debug!("Pinch started at {:.4}m", distance);
                return Some(HandEvent::PinchStarted(self.state.detail()));
            }
            return None;
        }

        let end_distance = self.state.pinch_distance * (1.0 + self.config.end_percentage);
        if distance > end_distance {
            self.state.is_pinched = false;
            debug!("Pinch ended at {:.4}m (limit {:.4}m)", distance, end_distance);
            return Some(HandEvent::PinchEnded(self.state.detail()));
        }

        Some(HandEvent::PinchMoved(self.state.detail()))
    }

    /// Return to not-pinched without emitting anything.
    pub fn reset(&mut self) {
        self.state = PinchState::default();
        self.last_distance = None;
    }

    pub fn is_pinched(&self) -> bool {
        self.state.is_pinched
    }

    pub fn state(&self) -> &PinchState {
        &self.state
    }

    /// Tip distance from the most recent evaluated frame.
    pub fn last_distance(&self) -> Option<f32> {
        self.last_distance
    }
}
