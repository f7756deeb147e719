// src/simulation.rs
//! Simulated XR runtime used when no headset is attached, and by tests.

use std::f32::consts::TAU;

use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::TrackerError;
use crate::joints::{HandJoint, Handedness, JOINT_COUNT};
use crate::reference_space::{ReferenceSpace, ReferenceSpaceType, SpaceRequest};
use crate::scene::{Bone, ModelAsset, SceneNode, Skeleton, SkinnedMesh};
use crate::transform::{self, MATRIX_LEN};
use crate::xr::{ModelLoader, ModelRequest, SessionFeatures, XrFrame, XrSession};

// ── Frames ─────────────────────────────────────────────────

/// A frame with explicitly set joint transforms in tracking space.
#[derive(Debug, Clone)]
pub struct ScriptedFrame {
    pub transforms: Vec<Matrix4<f32>>,
    pub radii: Vec<f32>,
    /// When false, transform fill fails as if tracking were lost.
    pub tracked: bool,
    pub radii_available: bool,
}

impl ScriptedFrame {
    /// Every joint at the origin with identity orientation.
    pub fn identity() -> Self {
        Self {
            transforms: vec![Matrix4::identity(); JOINT_COUNT],
            radii: vec![0.01; JOINT_COUNT],
            tracked: true,
            radii_available: true,
        }
    }

    /// Identity frame with the index tip well away from the thumb tip.
    pub fn open_hand() -> Self {
        let mut frame = Self::identity();
        frame.set_position(HandJoint::IndexTip, Vector3::new(0.0, 0.05, -0.05));
        frame
    }

    pub fn set_position(&mut self, joint: HandJoint, position: Vector3<f32>) {
        self.set_pose(joint, position, UnitQuaternion::identity());
    }

    pub fn set_pose(
        &mut self,
        joint: HandJoint,
        position: Vector3<f32>,
        orientation: UnitQuaternion<f32>,
    ) {
        self.transforms[joint.index()] =
            transform::compose(&position, &orientation, &Vector3::new(1.0, 1.0, 1.0));
    }

    pub fn set_radius(&mut self, joint: HandJoint, radius: f32) {
        self.radii[joint.index()] = radius;
    }
}

impl XrFrame for ScriptedFrame {
    fn fill_joint_transforms(
        &self,
        joints: &[HandJoint],
        space: &ReferenceSpace,
        out: &mut [f32],
    ) -> bool {
        if !self.tracked || out.len() < joints.len() * MATRIX_LEN {
            return false;
        }
        let to_space = space.origin.inverse().to_homogeneous();
        for (i, joint) in joints.iter().enumerate() {
            let local = to_space * self.transforms[joint.index()];
            transform::matrix_to_slice(&local, out, i * MATRIX_LEN);
        }
        true
    }

    fn fill_joint_radii(&self, joints: &[HandJoint], out: &mut [f32]) -> bool {
        if !self.radii_available || out.len() < joints.len() {
            return false;
        }
        for (i, joint) in joints.iter().enumerate() {
            out[i] = self.radii[joint.index()];
        }
        true
    }
}

// ── Hand motion ────────────────────────────────────────────

/// A hand held in front of the user, repeatedly pinching while the wrist
/// sways.
#[derive(Debug, Clone)]
pub struct SimulatedHand {
    pub handedness: Handedness,
    pub wrist: Vector3<f32>,
    /// Seconds per pinch cycle.
    pub pinch_period: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    /// Peak wrist yaw in radians.
    pub sway: f32,
}

impl SimulatedHand {
    pub fn new(handedness: Handedness) -> Self {
        let side = match handedness {
            Handedness::Left => -0.2,
            Handedness::Right => 0.2,
        };
        Self {
            handedness,
            wrist: Vector3::new(side, 1.2, -0.4),
            pinch_period: 2.0,
            min_gap: 0.004,
            max_gap: 0.05,
            sway: 0.3,
        }
    }

    /// Thumb-index tip distance at time `t`; fully open at `t = 0`.
    pub fn gap_at(&self, t: f32) -> f32 {
        let phase = (t / self.pinch_period * TAU).cos();
        self.min_gap + (self.max_gap - self.min_gap) * 0.5 * (1.0 + phase)
    }

    pub fn frame_at(&self, t: f32) -> ScriptedFrame {
        let mirror = match self.handedness {
            Handedness::Left => -1.0,
            Handedness::Right => 1.0,
        };
        let rotation = UnitQuaternion::from_euler_angles(0.0, self.sway * (t * 0.5).sin(), 0.0);

        let mut frame = ScriptedFrame::identity();
        for joint in HandJoint::ALL {
            let local = joint_offset(joint, mirror);
            frame.set_pose(joint, self.wrist + rotation * local, rotation);
            frame.set_radius(joint, joint_radius(joint));
        }

        let thumb_tip = joint_offset(HandJoint::IndexTip, mirror)
            + Vector3::new(-mirror * self.gap_at(t), 0.0, 0.0);
        frame.set_pose(HandJoint::ThumbTip, self.wrist + rotation * thumb_tip, rotation);
        frame
    }
}

/// Rest position of `joint` relative to the wrist.
fn joint_offset(joint: HandJoint, mirror: f32) -> Vector3<f32> {
    let index = joint.index();
    if index == 0 {
        return Vector3::zeros();
    }
    if index <= 4 {
        let segment = (index - 1) as f32;
        return Vector3::new(mirror * (-0.03 - 0.01 * segment), 0.0, -0.02 - 0.02 * segment);
    }
    let finger = ((index - 5) / 5) as f32;
    let segment = ((index - 5) % 5) as f32;
    Vector3::new(mirror * (-0.02 + 0.015 * finger), 0.0, -0.03 - 0.02 * segment)
}

fn joint_radius(joint: HandJoint) -> f32 {
    if joint == HandJoint::Wrist {
        0.02
    } else if joint.is_tip() {
        0.008
    } else {
        0.01
    }
}

// ── Session ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Immediate,
    Deferred,
    Failing,
}

/// A session whose reference space requests resolve immediately, on
/// demand, or fail.
pub struct SimulatedSession {
    kind: ReferenceSpaceType,
    resolution: Resolution,
    pub features: SessionFeatures,
    pending: Vec<oneshot::Sender<Result<ReferenceSpace, TrackerError>>>,
}

impl SimulatedSession {
    fn new(kind: ReferenceSpaceType, resolution: Resolution) -> Self {
        let mut features = SessionFeatures::new();
        if resolution != Resolution::Failing {
            features.request_optional(kind.as_str());
        }
        Self {
            kind,
            resolution,
            features,
            pending: Vec::new(),
        }
    }

    pub fn immediate(kind: ReferenceSpaceType) -> Self {
        Self::new(kind, Resolution::Immediate)
    }

    pub fn deferred(kind: ReferenceSpaceType) -> Self {
        Self::new(kind, Resolution::Deferred)
    }

    /// Requests fail, and the space type was never declared as a feature.
    pub fn failing(kind: ReferenceSpaceType) -> Self {
        Self::new(kind, Resolution::Failing)
    }

    /// Resolve every outstanding request. Requests whose receiver is gone
    /// are dropped silently.
    pub fn resolve_pending(&mut self) {
        for sender in self.pending.drain(..) {
            let _ = sender.send(Ok(ReferenceSpace::new(self.kind)));
        }
    }
}

impl XrSession for SimulatedSession {
    fn reference_space_type(&self) -> ReferenceSpaceType {
        self.kind
    }

    fn is_feature_requested(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    fn request_reference_space(&mut self, kind: ReferenceSpaceType) -> SpaceRequest {
        let (sender, receiver) = oneshot::channel();
        match self.resolution {
            Resolution::Immediate => {
                let _ = sender.send(Ok(ReferenceSpace::new(kind)));
            }
            Resolution::Deferred => self.pending.push(sender),
            Resolution::Failing => {
                let _ = sender.send(Err(TrackerError::ReferenceSpaceUnavailable(kind)));
            }
        }
        receiver
    }
}

// ── Model loading ──────────────────────────────────────────

/// Loader producing a rigged hand whose bones carry the joint names, plus
/// an armature root bone that no joint maps to.
#[derive(Debug, Default)]
pub struct SimulatedModelLoader {
    /// Serve a model without a skinned mesh.
    pub without_skin: bool,
    /// Fail every load.
    pub failing: bool,
}

impl SimulatedModelLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelLoader for SimulatedModelLoader {
    fn load(&mut self, url: &str) -> ModelRequest {
        let (sender, receiver) = oneshot::channel();
        let result = if self.failing {
            Err(TrackerError::ModelLoad {
                url: url.to_string(),
                reason: "simulated failure".to_string(),
            })
        } else {
            debug!("Serving simulated hand model for {}", url);
            Ok(rigged_hand(url, !self.without_skin))
        };
        let _ = sender.send(result);
        receiver
    }
}

pub fn rigged_hand(url: &str, skinned: bool) -> ModelAsset {
    let mut hand = SceneNode::new("hand");
    hand.position = Vector3::new(0.0, -1.0, 0.5);
    if skinned {
        let mut bones = vec![Bone::new("armature-root")];
        bones.extend(HandJoint::ALL.iter().map(|joint| Bone::new(joint.name())));
        hand = hand.with_skinned_mesh(SkinnedMesh::new(Skeleton { bones }));
    }
    ModelAsset {
        url: url.to_string(),
        root: SceneNode::new("scene").with_child(hand),
    }
}
