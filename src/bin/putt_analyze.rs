//! putt_analyze - run the batch pipeline over a detections dump.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use putt_kernel::{analyze, Detection, EngineConfig, Stimp, VideoMeta};

/// One recording's detector output, as dumped by the capture app.
#[derive(Debug, Deserialize)]
struct RecordingDump {
    video: VideoMeta,
    detections: Vec<Detection>,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Detections JSON file ({"video": {...}, "detections": [...]}).
    input: PathBuf,
    /// Green speed preset; overrides config and PUTT_STIMP.
    #[arg(long, value_enum)]
    stimp: Option<Stimp>,
    /// Emit the full estimate as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cfg = EngineConfig::load()?;
    let stimp = args.stimp.unwrap_or(cfg.stimp);

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let dump: RecordingDump = serde_json::from_str(&raw)
        .with_context(|| format!("invalid detections dump {}", args.input.display()))?;

    let estimate = analyze(&dump.detections, &dump.video, stimp, &cfg.analysis)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    println!("distance:      {:.2} m", estimate.distance_m);
    println!("ball speed:    {:.2} m/s", estimate.ball_speed_mps);
    match estimate.putter_speed_mps {
        Some(speed) => println!("putter speed:  {:.2} m/s", speed),
        None => println!("putter speed:  n/a"),
    }
    match estimate.smash_factor {
        Some(smash) => println!("smash factor:  {:.2}", smash),
        None => println!("smash factor:  n/a"),
    }
    println!("impact frame:  {}", estimate.impact_frame);
    println!(
        "frame size:    {:.1} x {:.1} cm",
        estimate.world_size.width_cm(),
        estimate.world_size.height_cm()
    );
    if estimate.stroke.inferred {
        println!("backswing:     {:.2} cm", estimate.stroke.backswing_mm / 10.0);
        println!("tempo:         {:.2}", estimate.stroke.tempo);
    } else if let Some(reason) = estimate.stroke.failure {
        println!("stroke:        not inferred ({})", reason);
    }
    match estimate.straightness {
        Some(s) => println!("straightness:  {:.2} deg", s.display_degrees()),
        None => println!("straightness:  n/a"),
    }
    Ok(())
}
