use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bytetrack_eval::evaluation::write_results;
use bytetrack_eval::{
    BYTETracker, BoxFilter, DetectionTable, SequenceMeta, TrackerConfig, TrackingDriver,
};

/// Tracker only evaluation: run ByteTrack over a MOTChallenge detection file.
#[derive(Parser, Debug)]
#[command(name = "track_only", version)]
struct Args {
    /// MOTChallenge seqinfo.ini file
    sequence: PathBuf,
    /// Detection results (frame,id,left,top,width,height,conf,x,y,z)
    det: PathBuf,
    /// Output tracking results path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Tracking confidence threshold
    #[arg(long = "track_thresh", default_value_t = 0.5)]
    track_thresh: f64,
    /// The frames for keep lost tracks
    #[arg(long = "track_buffer", default_value_t = 30)]
    track_buffer: u32,
    /// Matching threshold for tracking
    #[arg(long = "match_thresh", default_value_t = 0.8)]
    match_thresh: f64,
    /// Filter out boxes whose aspect ratio (w/h) is above this value
    #[arg(long = "aspect_ratio_thresh", default_value_t = 1.6)]
    aspect_ratio_thresh: f64,
    /// Filter out tiny boxes
    #[arg(long = "min_box_area", default_value_t = 10.0)]
    min_box_area: f64,
    /// Test MOT20 (match without score fusion)
    #[arg(long)]
    mot20: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    let meta = SequenceMeta::load(&args.sequence)
        .with_context(|| format!("loading sequence info {}", args.sequence.display()))?;

    let config = TrackerConfig {
        track_thresh: args.track_thresh,
        track_buffer: args.track_buffer,
        match_thresh: args.match_thresh,
        mot20: args.mot20,
    };
    let tracker = BYTETracker::new(config, meta.frame_rate);

    let table = DetectionTable::load(&args.det)
        .with_context(|| format!("loading detections {}", args.det.display()))?;

    let filter = BoxFilter {
        aspect_ratio_thresh: args.aspect_ratio_thresh,
        min_box_area: args.min_box_area,
    };
    let mut driver = TrackingDriver::new(tracker, filter);
    driver.run(&meta, &table).context("tracking failed")?;

    match write_results(driver.records(), args.output.as_deref())? {
        Some(path) => info!(path = %path.display(), "done"),
        None => info!(
            records = driver.records().len(),
            "done, results not saved (no --output given)"
        ),
    }
    Ok(())
}
