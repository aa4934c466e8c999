//! putt_demo - end-to-end synthetic run of the putting-stroke kernel.
//!
//! Generates a plausible noisy stroke (stationary ball, putter address,
//! backswing, downswing, impact, roll-out) and feeds it through the
//! batch pipeline.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use putt_kernel::{analyze, BBox, Detection, EngineConfig, ObjectClass, Stimp, VideoMeta};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Frames per second of the synthetic recording.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
    /// Green speed preset.
    #[arg(long, value_enum, default_value_t = Stimp::Average)]
    stimp: Stimp,
    /// Deterministic seed for the detection jitter.
    #[arg(long)]
    seed: Option<u64>,
    /// Detector jitter amplitude in pixels.
    #[arg(long, default_value_t = 0.3)]
    jitter: f64,
}

fn boxed(class: ObjectClass, frame: u64, fps: f64, cx: f64, cy: f64, size: f64) -> Detection {
    Detection {
        frame,
        time_s: frame as f64 / fps,
        class,
        bbox: BBox {
            x1: cx - size / 2.0,
            y1: cy - size / 2.0,
            x2: cx + size / 2.0,
            y2: cy + size / 2.0,
        },
        confidence: 0.9,
    }
}

fn synthesize(args: &Args, rng: &mut StdRng) -> Vec<Detection> {
    let mut jitter = |v: f64| v + rng.gen_range(-args.jitter..=args.jitter);
    let mut detections = Vec::new();

    // Ball sits at (320, 240) with a 40 px (~42.7 mm) box until impact
    // at frame 140, then rolls out in +x, decelerating under friction.
    let ball_size = 40.0;
    for f in 0..=139u64 {
        detections.push(boxed(ObjectClass::Ball, f, args.fps, jitter(320.0), jitter(240.0), ball_size));
    }
    let mut x = 320.0;
    for f in 140..=160u64 {
        let step = (45.0 - 2.0 * (f - 140) as f64).max(5.0);
        x += step;
        detections.push(boxed(ObjectClass::Ball, f, args.fps, jitter(x), jitter(240.0), ball_size));
    }

    // Putter: address below the ball for frames 100..=110, backswing to
    // frame 125, downswing through impact at frame 140.
    for f in 100..=110u64 {
        detections.push(boxed(ObjectClass::Putter, f, args.fps, jitter(320.0), jitter(300.0), 90.0));
    }
    for f in 111..=125u64 {
        let y = 300.0 + (f - 110) as f64 * 14.0;
        detections.push(boxed(ObjectClass::Putter, f, args.fps, jitter(320.0), jitter(y), 90.0));
    }
    for f in 126..=140u64 {
        let y = 510.0 - (f - 125) as f64 * 17.0;
        detections.push(boxed(ObjectClass::Putter, f, args.fps, jitter(320.0), jitter(y), 90.0));
    }

    detections
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let detections = synthesize(&args, &mut rng);
    let video = VideoMeta {
        width_px: 640,
        height_px: 480,
        frame_rate: args.fps,
    };

    let cfg = EngineConfig::load()?;
    let estimate = analyze(&detections, &video, args.stimp, &cfg.analysis)?;

    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}
