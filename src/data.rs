// src/data.rs
use crate::controls::HandTrackingControls;
use crate::events::HandEvent;
use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub frame: u32,
    pub timestamp: f64,
    pub present: bool,
    pub has_poses: bool,
    pub pinched: bool,
    pub distance: Option<f32>,
    /// Event names emitted this frame, `;`-separated.
    pub events: String,

    // Pinch midpoint while pinched
    pub midpoint_x: Option<f32>,
    pub midpoint_y: Option<f32>,
    pub midpoint_z: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub frames: usize,
    pub tracked_frames: usize,
    pub pinches: usize,
    pub pinched_frames: usize,
}

impl SessionSummary {
    pub fn tracking_ratio(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.tracked_frames as f64 / self.frames as f64
    }
}

/// Collects one row per frame and writes it out at the end of a session.
pub struct SessionRecorder {
    output_dir: PathBuf,
    session_name: String,
    records: Vec<FrameRecord>,
}

impl SessionRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            records: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        frame: u32,
        timestamp: f64,
        controls: &HandTrackingControls,
        events: &[HandEvent],
    ) {
        let pinch = controls.pinch();
        let midpoint = pinch.is_pinched().then(|| pinch.state().position);
        let distance = if controls.has_poses() {
            pinch.last_distance()
        } else {
            None
        };

        self.records.push(FrameRecord {
            frame,
            timestamp,
            present: controls.is_present(),
            has_poses: controls.has_poses(),
            pinched: pinch.is_pinched(),
            distance,
            events: events
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join(";"),
            midpoint_x: midpoint.map(|p| p.x),
            midpoint_y: midpoint.map(|p| p.y),
            midpoint_z: midpoint.map(|p| p.z),
        });
    }

    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            frames: self.records.len(),
            tracked_frames: self.records.iter().filter(|r| r.has_poses).count(),
            pinches: self
                .records
                .iter()
                .filter(|r| r.events.split(';').any(|e| e == "pinch-started"))
                .count(),
            pinched_frames: self.records.iter().filter(|r| r.pinched).count(),
        }
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("frames.csv");

        // Create directory if it doesn't exist
        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let file = File::create(&csv_path)
            .with_context(|| format!("creating {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);
        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(csv_path)
    }

    pub fn generate_report(&self) -> Result<PathBuf> {
        let report_path = self.session_dir().join("report.html");

        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        std::fs::write(&report_path, self.create_html_report())
            .with_context(|| format!("writing {}", report_path.display()))?;

        Ok(report_path)
    }

    fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    fn create_html_report(&self) -> String {
        let summary = self.summary();

        format!(r#"
<!DOCTYPE html>
<html>
<head>
    <title>Hand Tracking Report - {}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .stat-item {{ margin: 10px 0; }}
        .stat-label {{ font-weight: bold; color: #666; }}
        .stat-value {{ color: #4682EA; font-size: 1.2em; }}
    </style>
</head>
<body>
    <h1>Hand Tracking Session Report</h1>
    <div class="stats">
        <h2>Session: {}</h2>
        <div class="stat-item">
            <span class="stat-label">Total Frames:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Tracked Frames:</span>
            <span class="stat-value">{:.1}%</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Pinches:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Frames Pinched:</span>
            <span class="stat-value">{}</span>
        </div>
    </div>
</body>
</html>
        "#,
            self.session_name,
            self.session_name,
            summary.frames,
            summary.tracking_ratio() * 100.0,
            summary.pinches,
            summary.pinched_frames
        )
    }
}
