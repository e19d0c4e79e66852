use crate::annotate::{annotate, validate_overlays, Overlay};
use crate::capture::FrameSource;
use crate::clock::Clock;
use crate::config::LandmarkerConfig;
use crate::detection::{normalize, LandmarkDetector, LandmarkSnapshot};
use crate::error::LandmarkError;
use crate::history::History;
use crate::output::OutputSink;
use crate::variant::LandmarkVariant;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;
use std::time::{Duration, Instant};

/// Why a blocking run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    SourceExhausted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub reason: StopReason,
}

/// Detect, annotate and deliver frames for one detector variant
///
/// Frames are handled strictly one at a time. Two delivery modes share the
/// same per-frame work:
/// - [`Landmarker::run`] pulls from a [`FrameSource`] and pushes to an
///   [`OutputSink`] until the source ends or the sink asks to stop; elapsed
///   time is measured from the start of the run.
/// - [`Landmarker::process`] is called by an external transport once per
///   inbound frame and hands the annotated frame back; elapsed time is
///   measured from construction.
pub struct Landmarker {
    detector: Box<dyn LandmarkDetector>,
    overlays: Box<[Overlay]>,
    config: LandmarkerConfig,
    clock: Clock,
    created_at: Duration,
    history: History,
}

impl Landmarker {
    /// Build a pipeline around an already loaded detector
    ///
    /// Fails if any overlay references a point outside the detector's schema.
    pub fn new(
        detector: Box<dyn LandmarkDetector>,
        overlays: Vec<Overlay>,
        config: LandmarkerConfig,
    ) -> Result<Self> {
        validate_overlays(&overlays, detector.point_count())?;

        let clock = Clock::new();
        let created_at = clock.now();

        Ok(Self {
            detector,
            overlays: overlays.into_boxed_slice(),
            config,
            clock,
            created_at,
            history: History::new(),
        })
    }

    /// Load the variant's detector from `model_path` and build a pipeline
    pub fn from_variant(
        variant: &dyn LandmarkVariant,
        model_path: &Path,
        config: LandmarkerConfig,
    ) -> Result<Self> {
        tracing::info!("Building {} landmarker", variant.name());
        let detector = variant.load_detector(model_path)?;
        Self::new(detector, variant.overlays(), config)
    }

    /// Replace the time source; the construction instant is re-read from it
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.created_at = clock.now();
        self.clock = clock;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Annotate one inbound frame and return it to the caller
    pub fn process(&mut self, mut frame: RgbImage) -> Result<RgbImage> {
        let elapsed = self.clock.elapsed_secs(self.created_at);
        self.process_frame(&mut frame, elapsed)?;
        Ok(frame)
    }

    /// Pull frames from `source` and deliver them to `sink` until either ends
    ///
    /// The source is released and the sink closed however the run ends,
    /// including on error.
    pub fn run<S, O>(&mut self, source: &mut S, sink: &mut O) -> Result<RunSummary>
    where
        S: FrameSource + ?Sized,
        O: OutputSink + ?Sized,
    {
        let session = Session { source, sink };

        let frame_budget = self
            .config
            .max_fps
            .filter(|fps| *fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / fps as f64));
        let mut stats = StageStats::default();
        let started = self.clock.now();

        tracing::info!("Starting landmark loop");

        let reason = loop {
            let loop_start = Instant::now();

            let capture_start = Instant::now();
            let Some(mut frame) = session
                .source
                .next_frame()
                .context("Failed to capture frame")?
            else {
                break StopReason::SourceExhausted;
            };
            stats.capture += capture_start.elapsed();

            let elapsed = self.clock.elapsed_secs(started);

            let process_start = Instant::now();
            self.process_frame(&mut frame, elapsed)?;
            stats.process += process_start.elapsed();

            let output_start = Instant::now();
            session
                .sink
                .write_frame(&frame)
                .context("Failed to write frame")?;
            stats.output += output_start.elapsed();

            stats.frames += 1;
            if self.config.stats_interval > 0 && stats.frames % self.config.stats_interval == 0 {
                stats.log();
            }

            if session.sink.stop_requested() {
                break StopReason::Cancelled;
            }

            if let Some(budget) = frame_budget {
                let spent = loop_start.elapsed();
                if spent < budget {
                    std::thread::sleep(budget - spent);
                }
            }
        };

        tracing::info!("Landmark loop ended after {} frames ({:?})", stats.frames, reason);

        Ok(RunSummary {
            frames: stats.frames,
            reason,
        })
    }

    /// detect -> normalize -> record -> annotate, in place
    fn process_frame(&mut self, frame: &mut RgbImage, elapsed: f64) -> Result<LandmarkSnapshot> {
        let _span = tracing::debug_span!("process_frame", elapsed).entered();

        if frame.width() == 0 || frame.height() == 0 {
            return Err(LandmarkError::EmptyFrame.into());
        }

        let result = self
            .detector
            .detect(frame)
            .context("Landmark detection failed")?;
        let snapshot = normalize(&result);
        tracing::trace!("{} landmarks at {:.3}s", snapshot.len(), elapsed);

        if self.config.record_history {
            self.history.record(elapsed, snapshot.clone());
        }

        annotate(frame, &snapshot, &self.overlays, elapsed);

        Ok(snapshot)
    }
}

/// Source and sink borrowed for one run; handed back on drop
struct Session<'a, S: FrameSource + ?Sized, O: OutputSink + ?Sized> {
    source: &'a mut S,
    sink: &'a mut O,
}

impl<S: FrameSource + ?Sized, O: OutputSink + ?Sized> Drop for Session<'_, S, O> {
    fn drop(&mut self) {
        self.source.release();
        self.sink.close();
    }
}

#[derive(Default)]
struct StageStats {
    frames: u64,
    capture: Duration,
    process: Duration,
    output: Duration,
}

impl StageStats {
    fn log(&self) {
        let per_frame = |total: Duration| total.as_secs_f64() * 1000.0 / self.frames as f64;
        let (capture_ms, process_ms, output_ms) =
            (per_frame(self.capture), per_frame(self.process), per_frame(self.output));
        let total_ms = capture_ms + process_ms + output_ms;

        tracing::info!(
            "Frame {}: capture={:.1}ms, landmarks={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}",
            self.frames,
            capture_ms,
            process_ms,
            output_ms,
            total_ms,
            if total_ms > 0.0 { 1000.0 / total_ms } else { 0.0 }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{DrawingSpec, DrawingStyle};
    use crate::detection::{DetectionResult, RawLandmark};

    struct FixedDetector {
        points: usize,
        result: DetectionResult,
    }

    impl LandmarkDetector for FixedDetector {
        fn detect(&mut self, _frame: &RgbImage) -> Result<DetectionResult> {
            Ok(self.result.clone())
        }

        fn point_count(&self) -> usize {
            self.points
        }
    }

    fn overlay(connections: &'static [(usize, usize)]) -> Overlay {
        Overlay::new(
            "test",
            connections,
            DrawingStyle {
                landmark: None,
                connection: DrawingSpec::new([255, 0, 0], 1, 1),
            },
        )
    }

    fn detector(subjects: Vec<Vec<RawLandmark>>) -> Box<dyn LandmarkDetector> {
        Box::new(FixedDetector {
            points: 2,
            result: DetectionResult { subjects },
        })
    }

    #[test]
    fn rejects_overlay_outside_schema() {
        let result = Landmarker::new(
            detector(vec![]),
            vec![overlay(&[(0, 2)])],
            LandmarkerConfig::default(),
        );
        let err = result.err().expect("index 2 is outside a 2-point schema");
        assert!(matches!(
            err.downcast_ref::<LandmarkError>(),
            Some(LandmarkError::ConnectionOutOfSchema { .. })
        ));
    }

    #[test]
    fn process_measures_from_construction() {
        let (clock, mock) = Clock::mock();
        mock.set(Duration::from_secs(10));
        let mut landmarker = Landmarker::new(
            detector(vec![]),
            vec![overlay(&[(0, 1)])],
            LandmarkerConfig::default(),
        )
        .unwrap()
        .with_clock(clock);

        mock.increment(Duration::from_millis(1500));
        landmarker.process(RgbImage::new(32, 32)).unwrap();

        assert_eq!(landmarker.history().len(), 1);
        assert!((landmarker.history().entries()[0].elapsed_secs - 1.5).abs() < 1e-9);
    }

    #[test]
    fn history_can_be_disabled() {
        let config = LandmarkerConfig {
            record_history: false,
            ..LandmarkerConfig::default()
        };
        let mut landmarker =
            Landmarker::new(detector(vec![]), vec![overlay(&[(0, 1)])], config).unwrap();

        landmarker.process(RgbImage::new(16, 16)).unwrap();

        assert!(landmarker.history().is_empty());
    }

    #[test]
    fn empty_frame_fails_fast() {
        let mut landmarker = Landmarker::new(
            detector(vec![]),
            vec![overlay(&[(0, 1)])],
            LandmarkerConfig::default(),
        )
        .unwrap();

        let err = landmarker.process(RgbImage::new(0, 0)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LandmarkError>(),
            Some(LandmarkError::EmptyFrame)
        ));
        assert!(landmarker.history().is_empty());
    }
}
