//! `gazemetric score` — replays recorded detector output through the engine.
//!
//! Input is JSON Lines: each line one detection result with the detector's
//! own field names (`landmarks`, `transformMatrix`, `blendShapes`). Blank
//! lines are skipped; an empty object is a frame with no face.

use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use gazemetric_core::{
    EngineConfig, EnginePhase, FeedbackPresenter, FrameObservation, ScoringSession,
};

pub fn run(input: &str, adaptive_frames: Option<u32>, json: bool, quiet: bool) -> Result<()> {
    let mut config = EngineConfig::from_env();
    if let Some(frames) = adaptive_frames {
        config.adaptive_frames = frames;
    }
    let display_window = Duration::from_secs(config.feedback_display_secs);

    let mut session = ScoringSession::new(config).context("invalid engine configuration")?;
    session.start();

    let reader: Box<dyn Read> = if input == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(fs::File::open(input).with_context(|| format!("failed to open {input}"))?)
    };
    tracing::debug!(input, "replaying detection records");

    let mut presenter = FeedbackPresenter::new(display_window);
    let mut last_displayed = String::new();

    for (line_no, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let observation: FrameObservation = serde_json::from_str(&line)
            .with_context(|| format!("malformed detection record on line {}", line_no + 1))?;

        let report = session.process_frame(&observation);
        let now = Instant::now();
        presenter.submit(report.feedback.clone(), now);

        if quiet {
            continue;
        }

        let frame = session.total_frames();
        match report.phase {
            EnginePhase::Calibrating {
                frames_observed,
                frames_required,
            } => {
                println!("frame {frame:>5}  calibrating {frames_observed}/{frames_required}");
            }
            EnginePhase::Scoring => {
                let p = report.percentages;
                let face = if report.face_detected { "    " } else { "miss" };
                println!(
                    "frame {frame:>5}  {face}  eye {:5.1}%  head {:5.1}%  overall {:5.1}%",
                    p.eye_contact, p.head_posture, p.overall
                );
            }
        }

        let displayed = presenter
            .active(now)
            .map(|hints| {
                hints
                    .iter()
                    .map(|h| h.message())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .unwrap_or_default();
        if !displayed.is_empty() && displayed != last_displayed {
            println!("  hint: {displayed}");
        }
        last_displayed = displayed;
    }

    let frames = session.total_frames();
    let percentages = session.percentages();
    let calibrated = session.phase() == EnginePhase::Scoring;
    session.end();

    if json {
        let summary = serde_json::json!({
            "frames": frames,
            "calibrated": calibrated,
            "eyeContactPercent": percentages.eye_contact,
            "headPosturePercent": percentages.head_posture,
            "overallPercent": percentages.overall,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("frames processed: {frames}");
        if calibrated {
            println!("eye contact:  {:5.1}%", percentages.eye_contact);
            println!("head posture: {:5.1}%", percentages.head_posture);
            println!("overall:      {:5.1}%", percentages.overall);
        } else {
            println!("calibration never completed — no scores to report");
        }
    }

    Ok(())
}
