// src/reference_space.rs
//! Reference space acquisition.
//!
//! The space is requested whenever the session enters or leaves VR. The
//! request resolves on a later frame; until then there is no space and the
//! frame is treated as having no pose. A resolution that belongs to an
//! earlier session is dropped.

use std::fmt;

use nalgebra::{Isometry3, Point3};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::error::TrackerError;
use crate::xr::XrSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpaceType {
    Viewer,
    Local,
    #[default]
    LocalFloor,
    BoundedFloor,
    Unbounded,
}

impl ReferenceSpaceType {
    /// Session feature name that has to be requested for this space type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Local => "local",
            Self::LocalFloor => "local-floor",
            Self::BoundedFloor => "bounded-floor",
            Self::Unbounded => "unbounded",
        }
    }
}

impl fmt::Display for ReferenceSpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a resolved reference space.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSpace {
    pub kind: ReferenceSpaceType,
    /// Pose of the space origin in tracking coordinates.
    pub origin: Isometry3<f32>,
}

impl ReferenceSpace {
    pub fn new(kind: ReferenceSpaceType) -> Self {
        Self {
            kind,
            origin: Isometry3::identity(),
        }
    }

    pub fn with_origin(kind: ReferenceSpaceType, origin: Isometry3<f32>) -> Self {
        Self { kind, origin }
    }

    /// Express a tracking-space point in this space.
    pub fn to_local(&self, point: &Point3<f32>) -> Point3<f32> {
        self.origin.inverse_transform_point(point)
    }
}

pub type SpaceRequest = oneshot::Receiver<Result<ReferenceSpace, TrackerError>>;

struct PendingRequest {
    kind: ReferenceSpaceType,
    feature_requested: bool,
    receiver: SpaceRequest,
}

/// Owns the current reference space and any in-flight request for it.
#[derive(Default)]
pub struct ReferenceSpaceTracker {
    space: Option<ReferenceSpace>,
    pending: Option<PendingRequest>,
}

impl ReferenceSpaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the current space and, when a session is running, request a
    /// new one. Called on every session enter/exit. An in-flight request is
    /// dropped with its receiver, so it can never resolve into this tracker.
    pub fn reacquire(&mut self, session: Option<&mut dyn XrSession>) {
        self.space = None;
        if let Some(stale) = self.pending.take() {
            debug!("Dropping pending {} reference space request", stale.kind);
        }

        let Some(session) = session else {
            return;
        };

        let kind = session.reference_space_type();
        let feature_requested = session.is_feature_requested(kind.as_str());
        let receiver = session.request_reference_space(kind);
        debug!("Requested {} reference space", kind);
        self.pending = Some(PendingRequest {
            kind,
            feature_requested,
            receiver,
        });
    }

    /// Observe a resolved request, if any. Never blocks.
    pub fn poll(&mut self) -> Option<&ReferenceSpace> {
        if let Some(mut pending) = self.pending.take() {
            match pending.receiver.try_recv() {
                Err(TryRecvError::Empty) => self.pending = Some(pending),
                Err(TryRecvError::Closed) => {
                    warn!("Reference space request for {} was abandoned", pending.kind);
                }
                Ok(resolved) => self.resolve(pending, resolved),
            }
        }
        self.space.as_ref()
    }

    pub fn space(&self) -> Option<&ReferenceSpace> {
        self.space.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn resolve(&mut self, pending: PendingRequest, resolved: Result<ReferenceSpace, TrackerError>) {
        match resolved {
            Ok(space) => {
                info!("Reference space {} acquired", space.kind);
                self.space = Some(space);
            }
            Err(e) if !pending.feature_requested => {
                warn!(
                    "{}; hand-tracking-controls uses reference space {} ({})",
                    TrackerError::FeatureNotRequested(pending.kind.to_string()),
                    pending.kind,
                    e
                );
            }
            Err(e) => {
                warn!("Failed to acquire reference space {}: {}", pending.kind, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulatedSession;

    #[test]
    fn test_no_space_until_resolved() {
        let mut session = SimulatedSession::deferred(ReferenceSpaceType::LocalFloor);
        let mut tracker = ReferenceSpaceTracker::new();

        tracker.reacquire(Some(&mut session));
        assert!(tracker.poll().is_none());
        assert!(tracker.is_pending());

        session.resolve_pending();
        let space = tracker.poll().expect("space resolved");
        assert_eq!(space.kind, ReferenceSpaceType::LocalFloor);
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_stale_resolution_after_exit_is_ignored() {
        let mut session = SimulatedSession::deferred(ReferenceSpaceType::Local);
        let mut tracker = ReferenceSpaceTracker::new();

        tracker.reacquire(Some(&mut session));
        // Session ends before the request resolves.
        tracker.reacquire(None);
        session.resolve_pending();

        assert!(tracker.poll().is_none());
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_failed_request_leaves_no_space() {
        let mut session = SimulatedSession::failing(ReferenceSpaceType::BoundedFloor);
        let mut tracker = ReferenceSpaceTracker::new();

        tracker.reacquire(Some(&mut session));
        assert!(tracker.poll().is_none());
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_reacquire_replaces_space() {
        let mut session = SimulatedSession::immediate(ReferenceSpaceType::Local);
        let mut tracker = ReferenceSpaceTracker::new();

        tracker.reacquire(Some(&mut session));
        assert!(tracker.poll().is_some());

        tracker.reacquire(Some(&mut session));
        assert!(tracker.space().is_none());
        assert!(tracker.poll().is_some());
    }

    #[test]
    fn test_to_local_applies_origin() {
        let origin = Isometry3::translation(0.0, 1.5, 0.0);
        let space = ReferenceSpace::with_origin(ReferenceSpaceType::LocalFloor, origin);
        let local = space.to_local(&Point3::new(0.0, 1.5, -0.3));
        assert!((local.coords - nalgebra::Vector3::new(0.0, 0.0, -0.3)).norm() < 1e-6);
    }
}
