// src/pose_buffer.rs
use nalgebra::{Matrix4, UnitQuaternion, Vector3};

use crate::joints::{HandJoint, JOINT_COUNT};
use crate::reference_space::ReferenceSpace;
use crate::transform::{self, Pose, MATRIX_LEN};
use crate::xr::XrFrame;

/// Per-joint transforms and radii for one hand, refilled every frame.
///
/// Storage is sized once for [`JOINT_COUNT`] joints and reused in place.
/// When the last fill failed the contents are stale and `has_poses` is false.
pub struct PoseBuffer {
    transforms: [f32; JOINT_COUNT * MATRIX_LEN],
    radii: [f32; JOINT_COUNT],
    has_poses: bool,
}

impl Default for PoseBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseBuffer {
    pub fn new() -> Self {
        Self {
            transforms: [0.0; JOINT_COUNT * MATRIX_LEN],
            radii: [0.0; JOINT_COUNT],
            has_poses: false,
        }
    }

    /// Fill transforms then radii from `frame`. A failed transform fill skips
    /// the radii.
    pub fn refresh(&mut self, frame: &dyn XrFrame, space: &ReferenceSpace) -> bool {
        self.has_poses = frame.fill_joint_transforms(&HandJoint::ALL, space, &mut self.transforms)
            && frame.fill_joint_radii(&HandJoint::ALL, &mut self.radii);
        self.has_poses
    }

    /// Mark the contents stale without touching them.
    pub fn invalidate(&mut self) {
        self.has_poses = false;
    }

    pub fn has_poses(&self) -> bool {
        self.has_poses
    }

    pub fn matrix(&self, joint: HandJoint) -> Matrix4<f32> {
        transform::matrix_from_slice(&self.transforms, joint.index() * MATRIX_LEN)
    }

    pub fn pose(&self, joint: HandJoint) -> Pose {
        transform::decompose(&self.matrix(joint))
    }

    pub fn position(&self, joint: HandJoint) -> Vector3<f32> {
        transform::position_of(&self.matrix(joint))
    }

    pub fn orientation(&self, joint: HandJoint) -> UnitQuaternion<f32> {
        transform::orientation_of(&self.matrix(joint))
    }

    pub fn radius(&self, joint: HandJoint) -> f32 {
        self.radii[joint.index()]
    }

    pub fn transforms(&self) -> &[f32] {
        &self.transforms
    }

    pub fn radii(&self) -> &[f32] {
        &self.radii
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_space::ReferenceSpaceType;
    use crate::simulation::ScriptedFrame;

    fn space() -> ReferenceSpace {
        ReferenceSpace::new(ReferenceSpaceType::Local)
    }

    #[test]
    fn test_new_buffer_has_no_poses() {
        let buffer = PoseBuffer::new();
        assert!(!buffer.has_poses());
        assert_eq!(buffer.transforms().len(), 16 * 25);
        assert_eq!(buffer.radii().len(), 25);
    }

    #[test]
    fn test_refresh_reads_frame() {
        let mut frame = ScriptedFrame::identity();
        frame.set_position(HandJoint::IndexTip, Vector3::new(0.1, 0.2, 0.3));
        frame.set_radius(HandJoint::IndexTip, 0.008);

        let mut buffer = PoseBuffer::new();
        assert!(buffer.refresh(&frame, &space()));
        assert!(buffer.has_poses());
        assert!((buffer.position(HandJoint::IndexTip) - Vector3::new(0.1, 0.2, 0.3)).norm() < 1e-6);
        assert_eq!(buffer.radius(HandJoint::IndexTip), 0.008);
        assert_eq!(buffer.position(HandJoint::Wrist), Vector3::zeros());
    }

    #[test]
    fn test_failed_transform_fill() {
        let mut frame = ScriptedFrame::identity();
        frame.tracked = false;

        let mut buffer = PoseBuffer::new();
        assert!(!buffer.refresh(&frame, &space()));
        assert!(!buffer.has_poses());
    }

    #[test]
    fn test_failed_radii_fill() {
        let mut frame = ScriptedFrame::identity();
        frame.radii_available = false;

        let mut buffer = PoseBuffer::new();
        assert!(!buffer.refresh(&frame, &space()));
    }

    #[test]
    fn test_storage_is_reused() {
        let frame = ScriptedFrame::identity();
        let mut buffer = PoseBuffer::new();
        let before = buffer.transforms().as_ptr();
        buffer.refresh(&frame, &space());
        buffer.refresh(&frame, &space());
        assert_eq!(before, buffer.transforms().as_ptr());
    }

    #[test]
    fn test_invalidate() {
        let frame = ScriptedFrame::identity();
        let mut buffer = PoseBuffer::new();
        buffer.refresh(&frame, &space());
        buffer.invalidate();
        assert!(!buffer.has_poses());
    }
}
