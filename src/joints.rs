// src/joints.rs
//! Tracked hand joints in WebXR order.
//!
//! The order of [`HandJoint::ALL`] defines pose buffer indices and never
//! changes between frames.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Number of joints reported per hand.
pub const JOINT_COUNT: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    ThumbMetacarpal,
    ThumbPhalanxProximal,
    ThumbPhalanxDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexPhalanxProximal,
    IndexPhalanxIntermediate,
    IndexPhalanxDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddlePhalanxProximal,
    MiddlePhalanxIntermediate,
    MiddlePhalanxDistal,
    MiddleTip,
    RingMetacarpal,
    RingPhalanxProximal,
    RingPhalanxIntermediate,
    RingPhalanxDistal,
    RingTip,
    PinkyMetacarpal,
    PinkyPhalanxProximal,
    PinkyPhalanxIntermediate,
    PinkyPhalanxDistal,
    PinkyTip,
}

static JOINTS_BY_NAME: Lazy<HashMap<&'static str, HandJoint>> = Lazy::new(|| {
    HandJoint::ALL
        .iter()
        .map(|joint| (joint.name(), *joint))
        .collect()
});

impl HandJoint {
    pub const ALL: [HandJoint; JOINT_COUNT] = [
        Self::Wrist,
        Self::ThumbMetacarpal,
        Self::ThumbPhalanxProximal,
        Self::ThumbPhalanxDistal,
        Self::ThumbTip,
        Self::IndexMetacarpal,
        Self::IndexPhalanxProximal,
        Self::IndexPhalanxIntermediate,
        Self::IndexPhalanxDistal,
        Self::IndexTip,
        Self::MiddleMetacarpal,
        Self::MiddlePhalanxProximal,
        Self::MiddlePhalanxIntermediate,
        Self::MiddlePhalanxDistal,
        Self::MiddleTip,
        Self::RingMetacarpal,
        Self::RingPhalanxProximal,
        Self::RingPhalanxIntermediate,
        Self::RingPhalanxDistal,
        Self::RingTip,
        Self::PinkyMetacarpal,
        Self::PinkyPhalanxProximal,
        Self::PinkyPhalanxIntermediate,
        Self::PinkyPhalanxDistal,
        Self::PinkyTip,
    ];

    /// Buffer index of this joint (0-24).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Joint name as reported by the XR runtime and used for bone names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbMetacarpal => "thumb-metacarpal",
            Self::ThumbPhalanxProximal => "thumb-phalanx-proximal",
            Self::ThumbPhalanxDistal => "thumb-phalanx-distal",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMetacarpal => "index-finger-metacarpal",
            Self::IndexPhalanxProximal => "index-finger-phalanx-proximal",
            Self::IndexPhalanxIntermediate => "index-finger-phalanx-intermediate",
            Self::IndexPhalanxDistal => "index-finger-phalanx-distal",
            Self::IndexTip => "index-finger-tip",
            Self::MiddleMetacarpal => "middle-finger-metacarpal",
            Self::MiddlePhalanxProximal => "middle-finger-phalanx-proximal",
            Self::MiddlePhalanxIntermediate => "middle-finger-phalanx-intermediate",
            Self::MiddlePhalanxDistal => "middle-finger-phalanx-distal",
            Self::MiddleTip => "middle-finger-tip",
            Self::RingMetacarpal => "ring-finger-metacarpal",
            Self::RingPhalanxProximal => "ring-finger-phalanx-proximal",
            Self::RingPhalanxIntermediate => "ring-finger-phalanx-intermediate",
            Self::RingPhalanxDistal => "ring-finger-phalanx-distal",
            Self::RingTip => "ring-finger-tip",
            Self::PinkyMetacarpal => "pinky-finger-metacarpal",
            Self::PinkyPhalanxProximal => "pinky-finger-phalanx-proximal",
            Self::PinkyPhalanxIntermediate => "pinky-finger-phalanx-intermediate",
            Self::PinkyPhalanxDistal => "pinky-finger-phalanx-distal",
            Self::PinkyTip => "pinky-finger-tip",
        }
    }

    pub fn from_name(name: &str) -> Option<HandJoint> {
        JOINTS_BY_NAME.get(name).copied()
    }

    pub fn is_tip(self) -> bool {
        matches!(
            self,
            Self::ThumbTip | Self::IndexTip | Self::MiddleTip | Self::RingTip | Self::PinkyTip
        )
    }
}

impl fmt::Display for HandJoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

impl Handedness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_defines_indices() {
        for (i, joint) in HandJoint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
        assert_eq!(HandJoint::Wrist.index(), 0);
        assert_eq!(HandJoint::ThumbTip.index(), 4);
        assert_eq!(HandJoint::IndexTip.index(), 9);
        assert_eq!(HandJoint::PinkyTip.index(), JOINT_COUNT - 1);
    }

    #[test]
    fn test_name_lookup() {
        for joint in HandJoint::ALL {
            assert_eq!(HandJoint::from_name(joint.name()), Some(joint));
        }
        assert_eq!(HandJoint::from_name("palm"), None);
    }

    #[test]
    fn test_tips() {
        let tips: Vec<_> = HandJoint::ALL.iter().filter(|j| j.is_tip()).collect();
        assert_eq!(tips.len(), 5);
    }

    #[test]
    fn test_handedness_serde() {
        let hand: Handedness = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(hand, Handedness::Left);
        assert_eq!(serde_json::to_string(&Handedness::Right).unwrap(), "\"right\"");
    }
}
