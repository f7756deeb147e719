// src/controls.rs
//! Hand tracking controls: the per-frame pipeline for one hand.
//!
//! An external scheduler drives the component through [`init`],
//! [`on_session_change`], [`on_config_change`], [`on_activate`],
//! [`on_deactivate`] and [`on_frame`], and drains events after each frame.
//!
//! Per frame: presence check, pose buffer refresh in the current reference
//! space, model retargeting, then pinch detection.
//!
//! [`init`]: HandTrackingControls::init
//! [`on_session_change`]: HandTrackingControls::on_session_change
//! [`on_config_change`]: HandTrackingControls::on_config_change
//! [`on_activate`]: HandTrackingControls::on_activate
//! [`on_deactivate`]: HandTrackingControls::on_deactivate
//! [`on_frame`]: HandTrackingControls::on_frame

use std::time::Duration;

use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::HandTrackingConfig;
use crate::error::Result;
use crate::events::{EventQueue, HandEvent};
use crate::gesture::PinchDetector;
use crate::pose_buffer::PoseBuffer;
use crate::presence::{PresenceChange, PresenceMonitor};
use crate::reference_space::ReferenceSpaceTracker;
use crate::retarget::{DotsModel, HandModel, MeshModel, ModelStyle};
use crate::xr::{
    InputSourceRegistry, ModelLoader, ModelRequest, SessionFeatures, XrFrame, XrSession,
    HAND_TRACKING_FEATURE,
};

/// What the scheduler hands the component each frame.
pub struct FrameContext<'a> {
    /// Current XR frame, absent outside of a running session.
    pub frame: Option<&'a dyn XrFrame>,
    pub input_sources: &'a dyn InputSourceRegistry,
}

struct PendingModel {
    url: String,
    receiver: ModelRequest,
}

pub struct HandTrackingControls {
    config: HandTrackingConfig,
    loader: Box<dyn ModelLoader>,
    active: bool,
    presence: PresenceMonitor,
    reference_space: ReferenceSpaceTracker,
    buffer: PoseBuffer,
    model: Option<HandModel>,
    /// Dropping this abandons the load, so a model requested for an older
    /// configuration is never attached.
    pending_model: Option<PendingModel>,
    pinch: PinchDetector,
    events: EventQueue,
    elapsed: Duration,
}

impl HandTrackingControls {
    pub fn new(config: HandTrackingConfig, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            presence: PresenceMonitor::new(config.hand),
            pinch: PinchDetector::new(config.pinch),
            config,
            loader,
            active: false,
            reference_space: ReferenceSpaceTracker::new(),
            buffer: PoseBuffer::new(),
            model: None,
            pending_model: None,
            events: EventQueue::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Declare hand tracking as an optional feature of the session to come.
    pub fn init(&mut self, features: &mut SessionFeatures) {
        if features.request_optional(HAND_TRACKING_FEATURE) {
            info!("Requested optional session feature '{}'", HAND_TRACKING_FEATURE);
        }
    }

    /// Called on VR enter and exit. The previous reference space is dropped
    /// immediately; a new one arrives on a later frame.
    pub fn on_session_change(&mut self, session: Option<&mut dyn XrSession>) {
        self.reference_space.reacquire(session);
    }

    pub fn on_config_change(&mut self, config: HandTrackingConfig) -> Result<()> {
        config.validate()?;
        let previous = std::mem::replace(&mut self.config, config);

        if previous.model_color != self.config.model_color {
            if let Some(model) = &mut self.model {
                model.set_color(self.config.model_color);
            }
        }
        self.pinch.config = self.config.pinch;

        let hand_changed = previous.hand != self.config.hand;
        if hand_changed {
            self.presence = PresenceMonitor::new(self.config.hand);
            self.pinch.reset();
            self.buffer.invalidate();
        }

        if hand_changed
            || previous.model_style != self.config.model_style
            || previous.model_base_url != self.config.model_base_url
        {
            info!(
                "Replacing {} hand model with {} style",
                self.config.hand, self.config.model_style
            );
            self.drop_model();
            if let Some(source) = self.presence.current() {
                self.inject_model(source);
            }
        }
        Ok(())
    }

    pub fn on_activate(&mut self) {
        self.active = true;
        // Report the current source again on the next frame so the model
        // is (re)attached.
        self.presence.reset();
    }

    pub fn on_deactivate(&mut self) {
        self.active = false;
        self.pinch.reset();
        self.buffer.invalidate();
        if let Some(model) = &mut self.model {
            model.hide();
        }
    }

    pub fn on_frame(&mut self, dt: Duration, ctx: &FrameContext<'_>) {
        if !self.active {
            return;
        }
        self.elapsed += dt;

        self.poll_model();
        self.reference_space.poll();

        match self.presence.poll(ctx.input_sources) {
            PresenceChange::Connected(source) => {
                // A new source may replace the old one without a lost frame.
                self.forget_hand();
                self.inject_model(source.id);
            }
            PresenceChange::Lost => self.on_presence_lost(),
            PresenceChange::Unchanged => {}
        }
        if !self.presence.is_present() {
            return;
        }

        match (ctx.frame, self.reference_space.space()) {
            (Some(frame), Some(space)) => {
                self.buffer.refresh(frame, space);
            }
            _ => self.buffer.invalidate(),
        }

        if let Some(model) = &mut self.model {
            model.update(&self.buffer);
        }
        if let Some(event) = self.pinch.update(&self.buffer) {
            self.events.emit(event);
        }
    }

    /// Events emitted since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<HandEvent> {
        self.events.drain()
    }

    pub fn config(&self) -> &HandTrackingConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&HandModel> {
        self.model.as_ref()
    }

    pub fn is_model_loading(&self) -> bool {
        self.pending_model.is_some()
    }

    pub fn buffer(&self) -> &PoseBuffer {
        &self.buffer
    }

    pub fn has_poses(&self) -> bool {
        self.buffer.has_poses()
    }

    pub fn pinch(&self) -> &PinchDetector {
        &self.pinch
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_present(&self) -> bool {
        self.presence.is_present()
    }

    pub fn reference_space(&self) -> &ReferenceSpaceTracker {
        &self.reference_space
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn inject_model(&mut self, source: Uuid) {
        if self.model.is_none() {
            self.init_default_model();
            return;
        }
        if let Some(HandModel::Mesh(mesh)) = &mut self.model {
            if mesh.bind(source) {
                debug!("Hand mesh bound to input source {}", source);
            }
        }
    }

    fn init_default_model(&mut self) {
        match self.config.model_style {
            ModelStyle::Dots => {
                let mut dots = DotsModel::new(self.config.model_color);
                dots.init();
                self.model = Some(HandModel::Dots(dots));
                self.emit_attached(ModelStyle::Dots);
            }
            ModelStyle::Mesh => {
                if self.pending_model.is_some() {
                    return;
                }
                let url = self.config.model_url();
                info!("Loading {} hand model from {}", self.config.hand, url);
                let receiver = self.loader.load(&url);
                self.pending_model = Some(PendingModel {
                    url,
                    receiver,
                });
            }
        }
    }

    fn poll_model(&mut self) {
        let Some(mut pending) = self.pending_model.take() else {
            return;
        };

        let asset = match pending.receiver.try_recv() {
            Err(TryRecvError::Empty) => {
                self.pending_model = Some(pending);
                return;
            }
            Err(TryRecvError::Closed) => {
                warn!("Hand model load for {} was abandoned", pending.url);
                return;
            }
            Ok(Err(e)) => {
                warn!("{}", e);
                return;
            }
            Ok(Ok(asset)) => asset,
        };

        let Some(mut mesh) = MeshModel::attach(asset, self.config.model_color) else {
            return;
        };
        if let Some(source) = self.presence.current() {
            mesh.bind(source);
        }
        info!("Hand model {} attached", pending.url);
        self.model = Some(HandModel::Mesh(mesh));
        self.emit_attached(ModelStyle::Mesh);
    }

    fn emit_attached(&mut self, style: ModelStyle) {
        self.events.emit(HandEvent::ModelAttached {
            hand: self.config.hand,
            style,
        });
    }

    fn drop_model(&mut self) {
        self.model = None;
        if let Some(pending) = self.pending_model.take() {
            debug!("Abandoning hand model load {}", pending.url);
        }
    }

    /// Forget any pinch in progress and the poses of the previous source.
    /// No `pinch-ended` is emitted for it.
    fn forget_hand(&mut self) {
        self.pinch.reset();
        self.buffer.invalidate();
    }

    /// Stop feeding the model.
    fn on_presence_lost(&mut self) {
        self.forget_hand();
        match &mut self.model {
            Some(HandModel::Mesh(mesh)) => {
                mesh.hide();
                mesh.unbind();
            }
            Some(model) => model.hide(),
            None => {}
        }
    }
}
