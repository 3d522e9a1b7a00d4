use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use blinktrack_core::capture::infrastructure::raw_frame_capturer::RawFrameCapturer;
use blinktrack_core::detection::infrastructure::scripted_detector::ScriptedDetector;
use blinktrack_core::pipeline::events::BlinkNotification;
use blinktrack_core::pipeline::frame_processor::FrameProcessor;
use blinktrack_core::shared::config::DetectionConfig;
use blinktrack_core::shared::constants::RGB_CHANNELS;
use blinktrack_core::shared::frame::Frame;

/// Replay a recorded face-observation trace through the blink pipeline.
///
/// The trace is JSONL: one `{"faces": [...]}` object per line, one line per
/// video frame, as captured from a live detector session.
#[derive(Parser)]
#[command(name = "blinktrack")]
struct Cli {
    /// Trace file (JSONL).
    trace: PathBuf,

    /// Configuration file (JSON object with sampleStride, blinkThreshold, ...).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the eye open-probability threshold (0.0-1.0, exclusive).
    #[arg(long)]
    threshold: Option<f32>,

    /// Override the frame sampling stride (1 = every frame).
    #[arg(long)]
    stride: Option<usize>,

    /// Pair confirmed blinks with a captured still.
    #[arg(long)]
    capture_on_blink: bool,

    /// Synthetic frame width.
    #[arg(long, default_value = "640")]
    width: u32,

    /// Synthetic frame height.
    #[arg(long, default_value = "480")]
    height: u32,

    /// Frame rate used to derive frame timestamps.
    #[arg(long, default_value = "30.0")]
    fps: f64,

    /// Print blink events as JSON lines instead of text.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let detector = ScriptedDetector::from_jsonl(BufReader::new(File::open(&cli.trace)?))?;
    let total_frames = detector.frame_count();
    let config = build_config(&cli)?;

    let mut processor =
        FrameProcessor::new(Box::new(detector)).with_capturer(Box::new(RawFrameCapturer::new()));
    processor.set_config(config)?;

    let (blink_tx, blink_rx) = crossbeam_channel::unbounded();
    let (face_tx, face_rx) = crossbeam_channel::unbounded();
    processor.set_blink_sink(blink_tx);
    processor.set_face_sink(face_tx);

    let frame_interval_ns = (1e9 / cli.fps) as i64;
    let frame_bytes = (cli.width * cli.height * u32::from(RGB_CHANNELS)) as usize;
    let mut processed = 0usize;

    for index in 0..total_frames {
        let frame = Frame::new(
            vec![0u8; frame_bytes],
            cli.width,
            cli.height,
            RGB_CHANNELS,
            index,
            index as i64 * frame_interval_ns,
        );
        if processor.process_frame(&frame)? {
            processed += 1;
        }
        for notification in blink_rx.try_iter() {
            print_blink(&notification, cli.json)?;
        }
    }
    processor.dispose();

    for notification in blink_rx.try_iter() {
        print_blink(&notification, cli.json)?;
    }
    let max_faces = face_rx.try_iter().map(|e| e.faces.len()).max().unwrap_or(0);

    log::info!("replayed {total_frames} frames ({processed} processed), up to {max_faces} faces");
    Ok(())
}

fn build_config(cli: &Cli) -> Result<DetectionConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let value: serde_json::Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            let map = value
                .as_object()
                .ok_or("configuration file must contain a JSON object")?;
            DetectionConfig::from_map(map)?
        }
        None => DetectionConfig::default(),
    };

    if let Some(threshold) = cli.threshold {
        config.blink_threshold = threshold;
    }
    if let Some(stride) = cli.stride {
        config.sample_stride = stride;
    }
    if cli.capture_on_blink {
        config.capture_on_blink = true;
    }
    config.validate()?;
    Ok(config)
}

fn print_blink(
    notification: &BlinkNotification,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        println!("{}", serde_json::to_string(notification)?);
    } else {
        let capture = match &notification.capture {
            Some(still) => format!(" capture={}x{}", still.width(), still.height()),
            None => String::new(),
        };
        println!(
            "blink track={} left={} right={} t={:.3}s{capture}",
            notification.tracking_id,
            notification.left_blink_count,
            notification.right_blink_count,
            notification.timestamp_ns as f64 / 1e9,
        );
    }
    Ok(())
}
