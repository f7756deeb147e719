// src/xr.rs
//! Narrow interfaces to the XR device layer and asset loading.

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::TrackerError;
use crate::joints::{HandJoint, Handedness};
use crate::reference_space::{ReferenceSpace, ReferenceSpaceType, SpaceRequest};
use crate::scene::ModelAsset;

/// Session feature that enables articulated hand input.
pub const HAND_TRACKING_FEATURE: &str = "hand-tracking";

/// One frame of XR data.
pub trait XrFrame {
    /// Write one column-major 4x4 transform per joint into `out`
    /// (16 floats each). Returns false when any joint is untracked.
    fn fill_joint_transforms(
        &self,
        joints: &[HandJoint],
        space: &ReferenceSpace,
        out: &mut [f32],
    ) -> bool;

    /// Write one radius per joint into `out`.
    fn fill_joint_radii(&self, joints: &[HandJoint], out: &mut [f32]) -> bool;
}

/// A running XR session.
pub trait XrSession {
    /// Reference space type the session was configured with.
    fn reference_space_type(&self) -> ReferenceSpaceType;

    fn is_feature_requested(&self, feature: &str) -> bool;

    /// Begin acquiring a reference space; the answer arrives later.
    fn request_reference_space(&mut self, kind: ReferenceSpaceType) -> SpaceRequest;
}

/// A registered input source. Its identity is not stable across
/// reconnections.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSource {
    pub id: Uuid,
    pub handedness: Handedness,
    /// Whether the source exposes articulated hand joints.
    pub hand_tracking: bool,
    pub profiles: Vec<String>,
}

impl InputSource {
    pub fn hand(handedness: Handedness) -> Self {
        Self {
            id: Uuid::new_v4(),
            handedness,
            hand_tracking: true,
            profiles: vec!["generic-hand".to_string()],
        }
    }

    pub fn controller(handedness: Handedness) -> Self {
        Self {
            id: Uuid::new_v4(),
            handedness,
            hand_tracking: false,
            profiles: vec!["generic-trigger-squeeze".to_string()],
        }
    }
}

pub trait InputSourceRegistry {
    fn input_sources(&self) -> &[InputSource];

    fn find_hand(&self, handedness: Handedness) -> Option<&InputSource> {
        self.input_sources()
            .iter()
            .find(|source| source.handedness == handedness && source.hand_tracking)
    }
}

impl InputSourceRegistry for Vec<InputSource> {
    fn input_sources(&self) -> &[InputSource] {
        self
    }
}

pub type ModelRequest = oneshot::Receiver<Result<ModelAsset, TrackerError>>;

/// Loads hand model assets by URL.
pub trait ModelLoader {
    fn load(&mut self, url: &str) -> ModelRequest;
}

/// Optional features the session will be created with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFeatures {
    optional: Vec<String>,
}

impl SessionFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `feature` to the optional set. Returns true if it was missing.
    pub fn request_optional(&mut self, feature: &str) -> bool {
        if self.contains(feature) {
            return false;
        }
        self.optional.push(feature.to_string());
        true
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.optional.iter().any(|f| f == feature)
    }

    pub fn optional(&self) -> &[String] {
        &self.optional
    }
}
