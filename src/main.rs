// src/main.rs
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hand_tracker::config::AppConfig;
use hand_tracker::controls::{FrameContext, HandTrackingControls};
use hand_tracker::data::SessionRecorder;
use hand_tracker::events::HandEvent;
use hand_tracker::simulation::{SimulatedHand, SimulatedModelLoader, SimulatedSession};
use hand_tracker::xr::{InputSource, SessionFeatures, XrSession};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path.as_deref())
        .context("loading configuration")?;

    info!(
        "Simulating {} frames at {} fps ({} hand, {} model)",
        config.frames, config.fps, config.controls.hand, config.controls.model_style
    );

    let mut controls =
        HandTrackingControls::new(config.controls.clone(), Box::new(SimulatedModelLoader::new()));

    let mut features = SessionFeatures::new();
    controls.init(&mut features);

    let mut session = SimulatedSession::immediate(config.reference_space);
    for feature in features.optional() {
        session.features.request_optional(feature);
    }
    controls.on_session_change(Some(&mut session as &mut dyn XrSession));
    controls.on_activate();

    let hand = SimulatedHand::new(config.controls.hand);
    let mut recorder = SessionRecorder::new(&config.output_dir, config.session_name.clone());

    let dt = Duration::from_secs_f32(1.0 / config.fps);
    let mut ticker = tokio::time::interval(dt);
    let mut source = InputSource::hand(config.controls.hand);
    let mut connected = true;

    for frame_index in 0..config.frames {
        ticker.tick().await;

        let in_dropout = config
            .dropout
            .map_or(false, |(start, end)| (start..end).contains(&frame_index));
        if in_dropout && connected {
            warn!("Hand tracking dropped at frame {}", frame_index);
            connected = false;
        } else if !in_dropout && !connected {
            // Runtimes hand out a fresh source after reconnecting.
            source = InputSource::hand(config.controls.hand);
            connected = true;
        }

        let t = frame_index as f32 * dt.as_secs_f32();
        let xr_frame = hand.frame_at(t);
        let sources = if connected { vec![source.clone()] } else { Vec::new() };

        let ctx = FrameContext {
            frame: Some(&xr_frame),
            input_sources: &sources,
        };
        controls.on_frame(dt, &ctx);

        let events = controls.drain_events();
        for event in &events {
            log_event(frame_index, event);
        }
        recorder.record(frame_index, t as f64, &controls, &events);
    }

    controls.on_deactivate();
    controls.on_session_change(None);

    let summary = recorder.summary();
    info!(
        "Session {}: {} frames, {:.1}% tracked, {} pinches",
        recorder.session_name(),
        summary.frames,
        summary.tracking_ratio() * 100.0,
        summary.pinches
    );

    let csv_path = recorder.export_csv()?;
    info!("Frames exported to {}", csv_path.display());
    let report_path = recorder.generate_report()?;
    info!("Report written to {}", report_path.display());

    Ok(())
}

fn log_event(frame: u32, event: &HandEvent) {
    match event {
        HandEvent::ModelAttached { hand, style } => {
            info!(frame, "{} hand attached as {}", hand, style);
        }
        HandEvent::PinchMoved(_) => {}
        _ => {
            if let Some(detail) = event.pinch_detail() {
                info!(
                    frame,
                    "{} at ({:.3}, {:.3}, {:.3})",
                    event.name(),
                    detail.position.x,
                    detail.position.y,
                    detail.position.z
                );
            }
        }
    }
}
