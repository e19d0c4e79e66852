use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use landmarker::capture::{FrameSource, ImageSequence, WebcamCapture};
use landmarker::output::{OutputSink, V4L2Output, WindowOutput};
use landmarker::variant::VariantKind;
use landmarker::{Landmarker, LandmarkerConfig};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    /// Local preview window (Esc or Q to quit)
    Window,
    /// v4l2loopback virtual camera
    Loopback,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Landmark detector variant
    #[arg(long, value_enum, default_value_t = VariantKind::Pose)]
    variant: VariantKind,

    /// Path to the landmark model (ONNX file)
    #[arg(long)]
    model: PathBuf,

    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Read frames from a directory of images instead of a webcam
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Capture resolution width
    #[arg(long, default_value_t = 1280)]
    capture_width: u32,

    /// Capture resolution height
    #[arg(long, default_value_t = 720)]
    capture_height: u32,

    /// Where annotated frames go
    #[arg(long, value_enum, default_value_t = OutputKind::Window)]
    output: OutputKind,

    /// Output v4l2loopback device path
    #[arg(short, long, default_value = "/dev/video10")]
    output_device: String,

    /// Output resolution width
    #[arg(long, default_value_t = 1280)]
    output_width: u32,

    /// Output resolution height
    #[arg(long, default_value_t = 720)]
    output_height: u32,

    /// Target frames per second (0 = unlimited)
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Do not keep a per-frame landmark history
    #[arg(long)]
    no_history: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Landmarker starting");
    tracing::info!("Variant: {:?}, model: {}", args.variant, args.model.display());

    let config = LandmarkerConfig {
        record_history: !args.no_history,
        max_fps: (args.fps > 0).then_some(args.fps),
        ..LandmarkerConfig::default()
    };

    let variant = args.variant.variant();
    let mut landmarker = Landmarker::from_variant(variant.as_ref(), &args.model, config)
        .context("Failed to build landmarker")?;

    let mut source: Box<dyn FrameSource> = match &args.input_dir {
        Some(dir) => Box::new(
            ImageSequence::new(dir).context("Failed to open image sequence")?,
        ),
        None => Box::new(
            WebcamCapture::new(args.input_device, args.capture_width, args.capture_height)
                .context("Failed to initialize webcam capture")?,
        ),
    };

    let mut sink: Box<dyn OutputSink> = match args.output {
        OutputKind::Window => {
            let (width, height) = source.resolution();
            Box::new(
                WindowOutput::new("Landmarker", width, height)
                    .context("Failed to open preview window")?,
            )
        }
        OutputKind::Loopback => Box::new(
            V4L2Output::new(&args.output_device, args.output_width, args.output_height)
                .context("Failed to initialize v4l2loopback output")?,
        ),
    };

    let summary = landmarker.run(source.as_mut(), sink.as_mut())?;

    let history = landmarker.history();
    let detected = history
        .entries()
        .iter()
        .filter(|entry| !entry.landmarks.is_empty())
        .count();
    tracing::info!(
        "Processed {} frames ({:?}); subject found in {} of {} recorded",
        summary.frames,
        summary.reason,
        detected,
        history.len()
    );

    Ok(())
}
