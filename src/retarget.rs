// src/retarget.rs
//! Skeleton retargeting: tracked joints onto marker spheres or the bones of
//! a skinned hand mesh.
//!
//! Bone orientation is a direct copy of the tracked joint transform. Bones
//! are matched to joints by name once, when the mesh is attached.

use std::fmt;

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::color::Color;
use crate::joints::{HandJoint, JOINT_COUNT};
use crate::pose_buffer::PoseBuffer;
use crate::scene::{Marker, Material, ModelAsset, SceneNode, Skeleton, SkinnedMesh};
use crate::transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStyle {
    Dots,
    #[default]
    Mesh,
}

impl ModelStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dots => "dots",
            Self::Mesh => "mesh",
        }
    }
}

impl fmt::Display for ModelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Dots ───────────────────────────────────────────────────

/// One marker sphere per joint.
#[derive(Debug, Clone, Default)]
pub struct DotsModel {
    markers: Vec<Marker>,
    color: Color,
}

impl DotsModel {
    pub fn new(color: Color) -> Self {
        Self {
            markers: Vec::new(),
            color,
        }
    }

    /// Create the markers. Does nothing if they already exist; returns
    /// whether markers were created.
    pub fn init(&mut self) -> bool {
        if !self.markers.is_empty() {
            return false;
        }
        self.markers = (0..JOINT_COUNT).map(|_| Marker::new(self.color)).collect();
        true
    }

    /// Position each marker at its joint and scale it to the joint radius.
    /// Visibility follows `has_poses`; stale poses are never copied.
    pub fn update(&mut self, buffer: &PoseBuffer) {
        let has_poses = buffer.has_poses();
        for (joint, marker) in HandJoint::ALL.iter().zip(self.markers.iter_mut()) {
            marker.visible = has_poses;
            if !has_poses {
                continue;
            }
            let mut pose = buffer.pose(*joint);
            pose.scale = Vector3::repeat(buffer.radius(*joint));
            marker.pose = pose;
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        for marker in &mut self.markers {
            marker.visible = visible;
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        for marker in &mut self.markers {
            marker.material.color = color;
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, joint: HandJoint) -> Option<&Marker> {
        self.markers.get(joint.index())
    }
}

// ── Mesh ───────────────────────────────────────────────────

/// Joint index to bone index, `None` where the mesh has no such bone.
pub type BoneMap = [Option<usize>; JOINT_COUNT];

/// Match bones to joints by name in one pass. When two bones carry the same
/// joint name the first one wins.
pub fn resolve_bone_map(skeleton: &Skeleton) -> BoneMap {
    let mut map = [None; JOINT_COUNT];
    for (bone_index, bone) in skeleton.bones.iter().enumerate() {
        let Some(joint) = HandJoint::from_name(&bone.name) else {
            continue;
        };
        map[joint.index()].get_or_insert(bone_index);
    }
    map
}

/// Skinned hand mesh driven by tracked joints.
#[derive(Debug, Clone)]
pub struct MeshModel {
    root: SceneNode,
    skinned: SkinnedMesh,
    bone_map: BoneMap,
    bound_source: Option<Uuid>,
}

impl MeshModel {
    /// Prepare a loaded asset for display. Returns `None` when the asset has
    /// no skinned mesh.
    ///
    /// The model root is the asset root's first child (or the root itself).
    /// It is recentered, culling is disabled because tracked hands can sit
    /// outside the frustum computed from the model origin, and the material
    /// is replaced with a tinted skinning material. The mesh stays hidden
    /// until the first successful pose fill.
    pub fn attach(asset: ModelAsset, color: Color) -> Option<Self> {
        let mut scene = asset.root;
        let mut root = if scene.children.is_empty() {
            scene
        } else {
            scene.children.remove(0)
        };

        let Some(mut skinned) = root.take_skinned_mesh() else {
            debug!("Model {} has no skinned mesh, skipping", asset.url);
            return None;
        };

        root.position = Vector3::zeros();
        root.orientation = UnitQuaternion::identity();
        skinned.frustum_culled = false;
        skinned.material = Material {
            color,
            skinning: true,
        };
        skinned.visible = false;

        let bone_map = resolve_bone_map(&skinned.skeleton);
        let unmatched = bone_map.iter().filter(|b| b.is_none()).count();
        if unmatched > 0 {
            debug!("{} of {} joints have no bone in {}", unmatched, JOINT_COUNT, asset.url);
        }

        Some(Self {
            root,
            skinned,
            bone_map,
            bound_source: None,
        })
    }

    /// Copy joint position and orientation onto matched bones. The mesh is
    /// hidden when there are no poses or no bone matched.
    pub fn update(&mut self, buffer: &PoseBuffer) {
        self.skinned.visible = false;
        if !buffer.has_poses() {
            return;
        }

        let mut matched = false;
        for joint in HandJoint::ALL {
            let Some(bone_index) = self.bone_map[joint.index()] else {
                continue;
            };
            let matrix = buffer.matrix(joint);
            let bone = &mut self.skinned.skeleton.bones[bone_index];
            bone.position = transform::position_of(&matrix);
            bone.orientation = transform::orientation_of(&matrix);
            matched = true;
        }
        self.skinned.visible = matched;
    }

    /// Associate the mesh with an input source. Safe to repeat; returns
    /// whether the binding changed.
    pub fn bind(&mut self, source: Uuid) -> bool {
        if self.bound_source == Some(source) {
            return false;
        }
        self.bound_source = Some(source);
        true
    }

    pub fn unbind(&mut self) {
        self.bound_source = None;
    }

    pub fn bound_source(&self) -> Option<Uuid> {
        self.bound_source
    }

    pub fn hide(&mut self) {
        self.skinned.visible = false;
    }

    pub fn set_color(&mut self, color: Color) {
        self.skinned.material.color = color;
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn skinned_mesh(&self) -> &SkinnedMesh {
        &self.skinned
    }

    pub fn bone_map(&self) -> &BoneMap {
        &self.bone_map
    }
}

// ── Model ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum HandModel {
    Dots(DotsModel),
    Mesh(MeshModel),
}

impl HandModel {
    pub fn style(&self) -> ModelStyle {
        match self {
            Self::Dots(_) => ModelStyle::Dots,
            Self::Mesh(_) => ModelStyle::Mesh,
        }
    }

    pub fn update(&mut self, buffer: &PoseBuffer) {
        match self {
            Self::Dots(dots) => dots.update(buffer),
            Self::Mesh(mesh) => mesh.update(buffer),
        }
    }

    pub fn hide(&mut self) {
        match self {
            Self::Dots(dots) => dots.set_visible(false),
            Self::Mesh(mesh) => mesh.hide(),
        }
    }

    pub fn set_color(&mut self, color: Color) {
        match self {
            Self::Dots(dots) => dots.set_color(color),
            Self::Mesh(mesh) => mesh.set_color(color),
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Self::Dots(dots) => dots.markers().iter().any(|m| m.visible),
            Self::Mesh(mesh) => mesh.skinned_mesh().visible,
        }
    }

    pub fn as_dots(&self) -> Option<&DotsModel> {
        match self {
            Self::Dots(dots) => Some(dots),
            Self::Mesh(_) => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshModel> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            Self::Dots(_) => None,
        }
    }
}
