//! # hand_tracker
//!
//! Per-frame hand tracking: joint poses from an XR runtime are buffered,
//! retargeted onto a visible hand, and watched for pinch gestures.
//!
//! ## Frame pipeline
//!
//! | Step | Module |
//! |---|---|
//! | Is a hand-tracking input source present for this hand? | [`presence`] |
//! | Is the reference space resolved? | [`reference_space`] |
//! | Fill 25 joint transforms and radii | [`pose_buffer`] |
//! | Decompose into position, orientation and scale | [`transform`] |
//! | Drive marker spheres or mesh bones | [`retarget`] |
//! | Pinch started / moved / ended | [`gesture`] |
//!
//! [`controls::HandTrackingControls`] ties the steps together and is driven
//! by an external frame scheduler. Events are drained after every frame.
//!
//! The XR device layer and asset loading are reached only through the
//! traits in [`xr`]; [`simulation`] implements them without hardware.

pub mod color;
pub mod config;
pub mod controls;
pub mod data;
pub mod error;
pub mod events;
pub mod gesture;
pub mod joints;
pub mod pose_buffer;
pub mod presence;
pub mod reference_space;
pub mod retarget;
pub mod scene;
pub mod simulation;
pub mod transform;
pub mod xr;

pub use config::HandTrackingConfig;
pub use controls::{FrameContext, HandTrackingControls};
pub use error::TrackerError;
pub use events::HandEvent;
pub use joints::{HandJoint, Handedness};
