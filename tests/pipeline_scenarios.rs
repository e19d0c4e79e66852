use anyhow::{bail, Result};
use image::{Rgb, RgbImage};
use landmarker::annotate::{annotate, Canvas, DrawingSpec, DrawingStyle, Overlay, TextStyle};
use landmarker::capture::FrameSource;
use landmarker::clock::{Clock, ClockMock};
use landmarker::detection::{normalize, DetectionResult, LandmarkDetector, RawLandmark};
use landmarker::output::OutputSink;
use landmarker::{Landmarker, LandmarkerConfig, StopReason};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const LINE: DrawingSpec = DrawingSpec::new([255, 0, 0], 1, 1);

/// Replays a fixed list of detection results, then repeats the last one
struct ScriptedDetector {
    points: usize,
    script: VecDeque<DetectionResult>,
    last: DetectionResult,
}

impl ScriptedDetector {
    fn new(points: usize, script: Vec<DetectionResult>) -> Self {
        Self {
            points,
            script: script.into(),
            last: DetectionResult::empty(),
        }
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<DetectionResult> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        Ok(self.last.clone())
    }

    fn point_count(&self) -> usize {
        self.points
    }
}

struct FailingDetector;

impl LandmarkDetector for FailingDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<DetectionResult> {
        bail!("model crashed")
    }

    fn point_count(&self) -> usize {
        2
    }
}

/// Frames stamped with the time at which the source reports them
struct TimedSource {
    frames: VecDeque<Duration>,
    clock: ClockMock,
    released: bool,
}

impl TimedSource {
    fn new(clock: ClockMock, stamps: &[f64]) -> Self {
        Self {
            frames: stamps.iter().map(|s| Duration::from_secs_f64(*s)).collect(),
            clock,
            released: false,
        }
    }
}

impl FrameSource for TimedSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(stamp) = self.frames.pop_front() else {
            return Ok(None);
        };
        self.clock.set(stamp);
        Ok(Some(RgbImage::from_pixel(64, 64, WHITE)))
    }

    fn resolution(&self) -> (u32, u32) {
        (64, 64)
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[derive(Default)]
struct CollectingSink {
    frames: Vec<RgbImage>,
    stop_after: Option<usize>,
    closed: bool,
}

impl OutputSink for CollectingSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn stop_requested(&mut self) -> bool {
        self.stop_after.is_some_and(|n| self.frames.len() >= n)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[derive(Default)]
struct CountingCanvas {
    lines: Vec<((i32, i32), (i32, i32))>,
    texts: Vec<String>,
}

impl Canvas for CountingCanvas {
    fn dimensions(&self) -> (u32, u32) {
        (200, 100)
    }

    fn draw_line(&mut self, start: (i32, i32), end: (i32, i32), _spec: &DrawingSpec) {
        self.lines.push((start, end));
    }

    fn draw_point(&mut self, _center: (i32, i32), _spec: &DrawingSpec) {}

    fn draw_text(&mut self, text: &str, _origin: (i32, i32), _style: &TextStyle) {
        self.texts.push(text.to_string());
    }
}

fn point(x: f32, y: f32) -> RawLandmark {
    RawLandmark {
        x,
        y,
        z: 0.0,
        ..Default::default()
    }
}

fn pair_overlay() -> Overlay {
    Overlay::new(
        "pair",
        &[(0, 1)],
        DrawingStyle {
            landmark: None,
            connection: LINE,
        },
    )
}

fn two_point_result() -> DetectionResult {
    DetectionResult {
        subjects: vec![vec![point(0.5, 0.5), point(0.6, 0.4)]],
    }
}

#[test]
fn two_points_and_one_connection_draw_one_line() {
    let snapshot = normalize(&two_point_result());
    assert_eq!(snapshot.len(), 2);

    let mut canvas = CountingCanvas::default();
    annotate(&mut canvas, &snapshot, &[pair_overlay()], 0.25);

    assert_eq!(canvas.lines, vec![((100, 50), (120, 40))]);
    assert_eq!(canvas.texts, vec!["0.250s".to_string()]);
    assert_eq!(snapshot.len(), 2);
}

#[test]
fn no_subject_draws_only_timestamp() {
    let snapshot = normalize(&DetectionResult { subjects: vec![] });
    assert!(snapshot.is_empty());

    let mut canvas = CountingCanvas::default();
    annotate(&mut canvas, &snapshot, &[pair_overlay()], 3.0);

    assert!(canvas.lines.is_empty());
    assert_eq!(canvas.texts, vec!["3.000s".to_string()]);
}

#[test]
fn second_subject_is_ignored() {
    let result = DetectionResult {
        subjects: vec![
            vec![point(0.1, 0.1), point(0.2, 0.2)],
            vec![point(0.9, 0.9), point(0.8, 0.8), point(0.7, 0.7)],
        ],
    };

    let snapshot = normalize(&result);

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].x, 0.1);
    assert_eq!(snapshot[1].y, 0.2);
}

#[test]
fn blocking_run_records_history_in_frame_order() {
    let (clock, mock) = Clock::mock();
    let detector = ScriptedDetector::new(2, vec![two_point_result()]);
    let mut landmarker = Landmarker::new(
        Box::new(detector),
        vec![pair_overlay()],
        LandmarkerConfig::default(),
    )
    .unwrap()
    .with_clock(clock);

    let mut source = TimedSource::new(mock, &[0.0, 0.1, 0.2, 0.3, 0.4]);
    let mut sink = CollectingSink::default();

    let summary = landmarker.run(&mut source, &mut sink).unwrap();

    assert_eq!(summary.frames, 5);
    assert_eq!(summary.reason, StopReason::SourceExhausted);
    assert_eq!(sink.frames.len(), 5);

    let times: Vec<f64> = landmarker
        .history()
        .entries()
        .iter()
        .map(|entry| entry.elapsed_secs)
        .collect();
    assert_eq!(times.len(), 5);
    for (got, want) in times.iter().zip([0.0, 0.1, 0.2, 0.3, 0.4]) {
        assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
    }
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    assert!(landmarker
        .history()
        .entries()
        .iter()
        .all(|entry| entry.landmarks.len() == 2));

    assert!(source.released);
    assert!(sink.closed);
}

#[test]
fn blocking_run_elapsed_starts_at_loop_start() {
    let (clock, mock) = Clock::mock();
    let mut landmarker = Landmarker::new(
        Box::new(ScriptedDetector::new(2, vec![])),
        vec![pair_overlay()],
        LandmarkerConfig::default(),
    )
    .unwrap()
    .with_clock(clock);

    // The pipeline has been alive for a while before the run starts.
    mock.set(Duration::from_secs(5));
    let mut source = TimedSource::new(mock, &[5.0, 5.5]);
    let mut sink = CollectingSink::default();

    landmarker.run(&mut source, &mut sink).unwrap();

    let times: Vec<f64> = landmarker
        .history()
        .entries()
        .iter()
        .map(|entry| entry.elapsed_secs)
        .collect();
    assert_eq!(times, vec![0.0, 0.5]);
}

#[test]
fn sink_cancellation_stops_run_and_cleans_up() {
    let (clock, mock) = Clock::mock();
    let mut landmarker = Landmarker::new(
        Box::new(ScriptedDetector::new(2, vec![two_point_result()])),
        vec![pair_overlay()],
        LandmarkerConfig::default(),
    )
    .unwrap()
    .with_clock(clock);

    let mut source = TimedSource::new(mock, &[0.0, 0.1, 0.2, 0.3, 0.4]);
    let mut sink = CollectingSink {
        stop_after: Some(2),
        ..CollectingSink::default()
    };

    let summary = landmarker.run(&mut source, &mut sink).unwrap();

    assert_eq!(summary.frames, 2);
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(landmarker.history().len(), 2);
    assert!(source.released);
    assert!(sink.closed);
}

#[test]
fn detector_failure_ends_run_and_still_cleans_up() {
    let (clock, mock) = Clock::mock();
    let mut landmarker = Landmarker::new(
        Box::new(FailingDetector),
        vec![pair_overlay()],
        LandmarkerConfig::default(),
    )
    .unwrap()
    .with_clock(clock);

    let mut source = TimedSource::new(mock, &[0.0, 0.1]);
    let mut sink = CollectingSink::default();

    let err = landmarker.run(&mut source, &mut sink).unwrap_err();

    assert!(format!("{err:#}").contains("model crashed"));
    assert!(sink.frames.is_empty());
    assert!(landmarker.history().is_empty());
    assert!(source.released);
    assert!(sink.closed);
}

#[test]
fn streaming_process_returns_annotated_frame() {
    let (clock, mock) = Clock::mock();
    let mut landmarker = Landmarker::new(
        Box::new(ScriptedDetector::new(2, vec![two_point_result()])),
        vec![pair_overlay()],
        LandmarkerConfig::default(),
    )
    .unwrap()
    .with_clock(clock);

    mock.increment(Duration::from_millis(40));
    let frame = RgbImage::from_pixel(200, 100, WHITE);
    let annotated = landmarker.process(frame).unwrap();

    assert_eq!(annotated.dimensions(), (200, 100));
    // Both endpoints of the connection are painted in the line colour.
    assert_eq!(*annotated.get_pixel(100, 50), LINE.color);
    assert_eq!(*annotated.get_pixel(120, 40), LINE.color);
    // The timestamp puts dark strokes in the top-left corner.
    let stamped = (10..60)
        .flat_map(|x| (18..61).map(move |y| (x, y)))
        .any(|(x, y)| annotated.get_pixel(x, y)[1] < 128);
    assert!(stamped);

    assert_eq!(landmarker.history().len(), 1);
    assert!((landmarker.history().entries()[0].elapsed_secs - 0.04).abs() < 1e-9);
}

#[test]
fn streaming_without_subject_only_stamps_time() {
    let mut landmarker = Landmarker::new(
        Box::new(ScriptedDetector::new(2, vec![])),
        vec![pair_overlay()],
        LandmarkerConfig::default(),
    )
    .unwrap();

    let annotated = landmarker
        .process(RgbImage::from_pixel(200, 100, WHITE))
        .unwrap();

    assert!(annotated.pixels().all(|p| *p != LINE.color));
    assert_eq!(*annotated.get_pixel(199, 99), WHITE);
}

#[test]
fn frame_rate_cap_paces_the_loop() {
    let config = LandmarkerConfig {
        max_fps: Some(50),
        ..LandmarkerConfig::default()
    };
    let mut landmarker = Landmarker::new(
        Box::new(ScriptedDetector::new(2, vec![])),
        vec![pair_overlay()],
        config,
    )
    .unwrap();

    // Frame stamps only drive the unused mock; the run itself uses real time.
    let (_, unused) = Clock::mock();
    let mut source = TimedSource::new(unused, &[0.0, 0.0, 0.0, 0.0, 0.0]);
    let mut sink = CollectingSink::default();

    let started = Instant::now();
    let summary = landmarker.run(&mut source, &mut sink).unwrap();
    let took = started.elapsed();

    assert_eq!(summary.frames, 5);
    // Four full frame budgets of 20 ms separate five frames.
    assert!(took >= Duration::from_millis(80), "run took {took:?}");
}
