// src/scene.rs
//! Typed scene objects mutated by the retargeter.

use nalgebra::{UnitQuaternion, Vector3};

use crate::color::Color;
use crate::transform::Pose;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub skinning: bool,
}

/// Unit sphere marking one joint; scaled to the joint radius each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub pose: Pose,
    pub visible: bool,
    pub material: Material,
}

impl Marker {
    pub fn new(color: Color) -> Self {
        Self {
            pose: Pose::identity(),
            visible: false,
            material: Material {
                color,
                skinning: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|bone| bone.name == name)
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bone_index(name).map(|i| &self.bones[i])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedMesh {
    pub skeleton: Skeleton,
    pub material: Material,
    pub frustum_culled: bool,
    pub visible: bool,
}

impl SkinnedMesh {
    pub fn new(skeleton: Skeleton) -> Self {
        Self {
            skeleton,
            material: Material {
                color: Color::WHITE,
                skinning: true,
            },
            frustum_culled: true,
            visible: true,
        }
    }
}

/// Node of a loaded model hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub skinned_mesh: Option<SkinnedMesh>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            skinned_mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_skinned_mesh(mut self, mesh: SkinnedMesh) -> Self {
        self.skinned_mesh = Some(mesh);
        self
    }

    /// Depth-first search for the first skinned mesh in this subtree,
    /// detaching it from its node.
    pub fn take_skinned_mesh(&mut self) -> Option<SkinnedMesh> {
        if let Some(mesh) = self.skinned_mesh.take() {
            return Some(mesh);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.take_skinned_mesh())
    }
}

/// A loaded model file: the scene root as delivered by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset {
    pub url: String,
    pub root: SceneNode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nested_skinned_mesh() {
        let skeleton = Skeleton {
            bones: vec![Bone::new("wrist")],
        };
        let mut root = SceneNode::new("scene").with_child(
            SceneNode::new("armature")
                .with_child(SceneNode::new("hand").with_skinned_mesh(SkinnedMesh::new(skeleton))),
        );

        let mesh = root.take_skinned_mesh().expect("skinned mesh");
        assert_eq!(mesh.skeleton.bones.len(), 1);
        assert!(root.take_skinned_mesh().is_none());
    }

    #[test]
    fn test_bone_lookup() {
        let skeleton = Skeleton {
            bones: vec![Bone::new("root"), Bone::new("wrist")],
        };
        assert_eq!(skeleton.bone_index("wrist"), Some(1));
        assert!(skeleton.bone("thumb-tip").is_none());
    }
}
