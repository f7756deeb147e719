use std::time::Duration;

use nalgebra::Vector3;

use hand_tracker::color::Color;
use hand_tracker::config::HandTrackingConfig;
use hand_tracker::controls::{FrameContext, HandTrackingControls};
use hand_tracker::events::HandEvent;
use hand_tracker::joints::{HandJoint, Handedness};
use hand_tracker::reference_space::ReferenceSpaceType;
use hand_tracker::retarget::ModelStyle;
use hand_tracker::simulation::{ScriptedFrame, SimulatedHand, SimulatedModelLoader, SimulatedSession};
use hand_tracker::xr::{InputSource, XrFrame};

const DT: Duration = Duration::from_millis(14);

fn controls_with(style: ModelStyle) -> HandTrackingControls {
    let config = HandTrackingConfig {
        model_style: style,
        ..HandTrackingConfig::default()
    };
    let mut controls = HandTrackingControls::new(config, Box::new(SimulatedModelLoader::new()));
    let mut session = SimulatedSession::immediate(ReferenceSpaceType::LocalFloor);
    controls.on_session_change(Some(&mut session));
    controls.on_activate();
    controls
}

fn step(controls: &mut HandTrackingControls, frame: Option<&ScriptedFrame>, sources: &Vec<InputSource>) -> Vec<HandEvent> {
    let ctx = FrameContext {
        frame: frame.map(|f| f as &dyn XrFrame),
        input_sources: sources,
    };
    controls.on_frame(DT, &ctx);
    controls.drain_events()
}

fn pinch_events(events: &[HandEvent]) -> Vec<&'static str> {
    events
        .iter()
        .filter(|e| e.pinch_detail().is_some())
        .map(|e| e.name())
        .collect()
}

fn pinching_frame() -> ScriptedFrame {
    let mut frame = ScriptedFrame::identity();
    frame.set_position(HandJoint::ThumbTip, Vector3::new(0.0, 0.0, 0.0));
    frame.set_position(HandJoint::IndexTip, Vector3::new(0.01, 0.0, 0.0));
    frame
}

#[test]
fn test_dots_pinch_end_to_end() {
    let mut controls = controls_with(ModelStyle::Dots);
    let sources = vec![InputSource::hand(Handedness::Right)];

    let events = step(&mut controls, Some(&pinching_frame()), &sources);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name(), "model-attached");
    assert_eq!(events[1].name(), "pinch-started");

    let detail = events[1].pinch_detail().unwrap();
    assert!((detail.position - Vector3::new(0.005, 0.0, 0.0)).norm() < 1e-6);

    let dots = controls.model().and_then(|m| m.as_dots()).unwrap();
    let tip = dots.marker(HandJoint::IndexTip).unwrap();
    assert!(tip.visible);
    assert!((tip.pose.position - Vector3::new(0.01, 0.0, 0.0)).norm() < 1e-6);
    assert!((tip.pose.scale.x - 0.01).abs() < 1e-6);

    let events = step(&mut controls, Some(&pinching_frame()), &sources);
    assert_eq!(pinch_events(&events), vec!["pinch-moved"]);
}

#[test]
fn test_untracked_frame_emits_nothing() {
    let mut controls = controls_with(ModelStyle::Dots);
    let sources = vec![InputSource::hand(Handedness::Right)];
    step(&mut controls, Some(&ScriptedFrame::open_hand()), &sources);

    let mut frame = pinching_frame();
    frame.tracked = false;
    let events = step(&mut controls, Some(&frame), &sources);

    assert!(events.is_empty());
    assert!(!controls.has_poses());
    assert!(!controls.pinch().is_pinched());
    assert!(!controls.model().unwrap().is_visible());

    let events = step(&mut controls, None, &sources);
    assert!(events.is_empty());
    assert!(!controls.has_poses());
}

#[test]
fn test_presence_lost_mid_pinch() {
    let mut controls = controls_with(ModelStyle::Dots);
    let mut sources = vec![InputSource::hand(Handedness::Right)];
    step(&mut controls, Some(&pinching_frame()), &sources);
    assert!(controls.pinch().is_pinched());

    sources.clear();
    let events = step(&mut controls, Some(&pinching_frame()), &sources);
    assert!(events.is_empty());
    assert!(!controls.is_present());
    assert!(!controls.pinch().is_pinched());
    let dots = controls.model().and_then(|m| m.as_dots()).unwrap();
    assert!(dots.markers().iter().all(|m| !m.visible));

    // Keeps running without a source.
    assert!(step(&mut controls, Some(&pinching_frame()), &sources).is_empty());

    sources.push(InputSource::hand(Handedness::Right));
    let events = step(&mut controls, Some(&pinching_frame()), &sources);
    assert_eq!(pinch_events(&events), vec!["pinch-started"]);
    assert!(controls.model().unwrap().is_visible());
}

#[test]
fn test_color_change_keeps_model() {
    let mut controls = controls_with(ModelStyle::Dots);
    let sources = vec![InputSource::hand(Handedness::Right)];
    step(&mut controls, Some(&ScriptedFrame::open_hand()), &sources);

    let red: Color = "red".parse().unwrap();
    controls
        .on_config_change(HandTrackingConfig {
            model_style: ModelStyle::Dots,
            model_color: red,
            ..HandTrackingConfig::default()
        })
        .unwrap();

    let events = step(&mut controls, Some(&ScriptedFrame::open_hand()), &sources);
    assert!(events.is_empty());
    let dots = controls.model().and_then(|m| m.as_dots()).unwrap();
    assert!(dots.markers().iter().all(|m| m.material.color == red));
}

#[test]
fn test_mesh_rebinds_after_reconnect() {
    let mut controls = controls_with(ModelStyle::Mesh);
    let mut sources = vec![InputSource::hand(Handedness::Right)];
    let frame = ScriptedFrame::open_hand();

    assert!(step(&mut controls, Some(&frame), &sources).is_empty());
    let events = step(&mut controls, Some(&frame), &sources);
    assert_eq!(
        events,
        vec![HandEvent::ModelAttached {
            hand: Handedness::Right,
            style: ModelStyle::Mesh
        }]
    );

    let mesh = controls.model().and_then(|m| m.as_mesh()).unwrap();
    assert!(mesh.skinned_mesh().visible);
    assert!(!mesh.skinned_mesh().frustum_culled);
    assert_eq!(mesh.bound_source(), Some(sources[0].id));

    sources.clear();
    step(&mut controls, Some(&frame), &sources);
    let mesh = controls.model().and_then(|m| m.as_mesh()).unwrap();
    assert!(!mesh.skinned_mesh().visible);
    assert_eq!(mesh.bound_source(), None);

    let replacement = InputSource::hand(Handedness::Right);
    sources.push(replacement.clone());
    let events = step(&mut controls, Some(&frame), &sources);
    assert!(events.is_empty());
    let mesh = controls.model().and_then(|m| m.as_mesh()).unwrap();
    assert_eq!(mesh.bound_source(), Some(replacement.id));
    assert!(mesh.skinned_mesh().visible);
}

#[test]
fn test_failed_model_load_keeps_running() {
    let loader = SimulatedModelLoader {
        failing: true,
        ..SimulatedModelLoader::default()
    };
    let mut controls = HandTrackingControls::new(HandTrackingConfig::default(), Box::new(loader));
    let mut session = SimulatedSession::immediate(ReferenceSpaceType::Local);
    controls.on_session_change(Some(&mut session));
    controls.on_activate();

    let sources = vec![InputSource::hand(Handedness::Right)];
    step(&mut controls, Some(&pinching_frame()), &sources);
    let events = step(&mut controls, Some(&pinching_frame()), &sources);

    assert!(controls.model().is_none());
    assert!(!controls.is_model_loading());
    assert_eq!(pinch_events(&events), vec!["pinch-moved"]);
}

#[test]
fn test_simulated_hand_alternates_pinches() {
    let mut controls = controls_with(ModelStyle::Dots);
    let sources = vec![InputSource::hand(Handedness::Right)];
    let hand = SimulatedHand::new(Handedness::Right);

    let mut names = Vec::new();
    for i in 0..300 {
        let frame = hand.frame_at(i as f32 / 72.0);
        let events = step(&mut controls, Some(&frame), &sources);
        names.extend(
            pinch_events(&events)
                .into_iter()
                .filter(|name| *name != "pinch-moved"),
        );
    }

    assert!(names.len() >= 4);
    for pair in names.chunks(2) {
        assert_eq!(pair[0], "pinch-started");
        if pair.len() == 2 {
            assert_eq!(pair[1], "pinch-ended");
        }
    }
}

#[test]
fn test_stale_space_after_exit_is_ignored() {
    let config = HandTrackingConfig {
        model_style: ModelStyle::Dots,
        ..HandTrackingConfig::default()
    };
    let mut controls = HandTrackingControls::new(config, Box::new(SimulatedModelLoader::new()));
    let mut session = SimulatedSession::deferred(ReferenceSpaceType::LocalFloor);
    controls.on_session_change(Some(&mut session));
    controls.on_activate();
    controls.on_session_change(None);
    session.resolve_pending();

    let sources = vec![InputSource::hand(Handedness::Right)];
    step(&mut controls, Some(&ScriptedFrame::open_hand()), &sources);
    assert!(controls.reference_space().space().is_none());
    assert!(!controls.has_poses());
}

#[test]
fn test_deactivate_resets_pinch() {
    let mut controls = controls_with(ModelStyle::Dots);
    let sources = vec![InputSource::hand(Handedness::Right)];
    step(&mut controls, Some(&pinching_frame()), &sources);
    assert!(controls.pinch().is_pinched());

    controls.on_deactivate();
    assert!(!controls.pinch().is_pinched());
    assert!(!controls.model().unwrap().is_visible());
    assert!(step(&mut controls, Some(&pinching_frame()), &sources).is_empty());
}
