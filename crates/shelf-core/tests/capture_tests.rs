//! Scan loop behaviour over fake devices and detectors

use async_trait::async_trait;
use shelf_core::capture::{
    BarcodeDetector, BarcodeFormat, CancelFlag, CaptureDevice, DetectedBarcode, Facing, Frame,
    MediaStream, ScanEvent, ScanOutcome, ScanState, Scanner, TextBarcodeDetector, WedgeCamera,
};
use shelf_core::{CaptureError, DetectionError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(16);

/// Camera whose streams produce a frame on every poll and count live tracks.
struct FakeCamera {
    tracks: Arc<AtomicUsize>,
    deny: bool,
    frames_before_end: Option<u64>,
}

impl FakeCamera {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let tracks = Arc::new(AtomicUsize::new(0));
        (
            Self {
                tracks: tracks.clone(),
                deny: false,
                frames_before_end: None,
            },
            tracks,
        )
    }
}

#[async_trait]
impl CaptureDevice for FakeCamera {
    type Stream = FakeStream;

    async fn acquire(&mut self, _facing: Facing) -> Result<FakeStream, CaptureError> {
        if self.deny {
            return Err(CaptureError::Camera("Permission denied".into()));
        }
        self.tracks.fetch_add(2, Ordering::SeqCst);
        Ok(FakeStream {
            tracks: self.tracks.clone(),
            live: 2,
            sequence: 0,
            frames_before_end: self.frames_before_end,
        })
    }
}

struct FakeStream {
    tracks: Arc<AtomicUsize>,
    live: usize,
    sequence: u64,
    frames_before_end: Option<u64>,
}

impl MediaStream for FakeStream {
    fn is_active(&self) -> bool {
        self.live > 0 && self.frames_before_end.map_or(true, |n| self.sequence < n)
    }

    fn current_frame(&mut self) -> Option<Frame> {
        self.sequence += 1;
        Some(Frame {
            sequence: self.sequence,
            payload: Vec::new(),
        })
    }

    fn active_tracks(&self) -> usize {
        self.live
    }

    fn stop_tracks(&mut self) {
        self.tracks.fetch_sub(self.live, Ordering::SeqCst);
        self.live = 0;
    }

    fn detach(&mut self) {}
}

#[derive(Clone)]
enum Step {
    Nothing,
    Fail,
    Found(&'static str),
    /// Cancel the scan while this detection is in flight, then report a code
    CancelAndFind(&'static str),
}

/// Detector that answers from a script, one step per frame, then nothing.
struct ScriptedDetector {
    steps: Mutex<Vec<Step>>,
    cancel: CancelFlag,
    calls: AtomicUsize,
    formats: Vec<BarcodeFormat>,
}

impl ScriptedDetector {
    fn new(steps: Vec<Step>, cancel: &CancelFlag) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().rev().collect()),
            cancel: cancel.clone(),
            calls: AtomicUsize::new(0),
            formats: vec![BarcodeFormat::Ean13],
        }
    }
}

#[async_trait]
impl BarcodeDetector for ScriptedDetector {
    fn supported_formats(&self) -> Vec<BarcodeFormat> {
        self.formats.clone()
    }

    async fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop().unwrap_or(Step::Nothing);
        let code = |v: &str| DetectedBarcode {
            format: BarcodeFormat::Ean13,
            raw_value: v.to_string(),
        };
        match step {
            Step::Nothing => Ok(Vec::new()),
            Step::Fail => Err(DetectionError("blurry frame".into())),
            Step::Found(v) => Ok(vec![code(v)]),
            Step::CancelAndFind(v) => {
                self.cancel.cancel();
                Ok(vec![code(v)])
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_detection_releases_the_stream() {
    let cancel = CancelFlag::new();
    let (camera, tracks) = FakeCamera::new();
    let detector = ScriptedDetector::new(
        vec![Step::Nothing, Step::Nothing, Step::Found("9780134685991")],
        &cancel,
    );
    let mut scanner = Scanner::new(camera, detector, TICK);

    let mut states = Vec::new();
    let outcome = scanner
        .run(&cancel, |event| {
            if let ScanEvent::State(s) = event {
                states.push(s);
            }
        })
        .await
        .unwrap();

    match outcome {
        ScanOutcome::Detected(code) => assert_eq!(code.raw_value, "9780134685991"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(tracks.load(Ordering::SeqCst), 0);
    assert_eq!(scanner.state(), ScanState::Idle);
    assert_eq!(
        states,
        vec![ScanState::RequestingCamera, ScanState::Scanning, ScanState::Idle]
    );
    assert_eq!(scanner.detector().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_detection_suppresses_result() {
    let cancel = CancelFlag::new();
    let (camera, tracks) = FakeCamera::new();
    let detector = ScriptedDetector::new(
        vec![Step::Nothing, Step::CancelAndFind("9780134685991")],
        &cancel,
    );
    let mut scanner = Scanner::new(camera, detector, TICK);

    let outcome = scanner.run(&cancel, |_| {}).await.unwrap();

    assert_eq!(outcome, ScanOutcome::Cancelled);
    assert_eq!(tracks.load(Ordering::SeqCst), 0);
    assert_eq!(scanner.state(), ScanState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_from_another_task() {
    let cancel = CancelFlag::new();
    let (camera, tracks) = FakeCamera::new();
    let detector = ScriptedDetector::new(Vec::new(), &cancel);
    let mut scanner = Scanner::new(camera, detector, TICK);

    let remote = cancel.clone();
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(TICK * 10).await;
        remote.cancel();
    });

    let outcome = scanner.run(&cancel, |_| {}).await.unwrap();
    canceller.await.unwrap();

    assert_eq!(outcome, ScanOutcome::Cancelled);
    assert_eq!(tracks.load(Ordering::SeqCst), 0);
    assert!(scanner.detector().calls.load(Ordering::SeqCst) >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_detection_errors_keep_polling() {
    let cancel = CancelFlag::new();
    let (camera, _tracks) = FakeCamera::new();
    let detector = ScriptedDetector::new(
        vec![Step::Fail, Step::Fail, Step::Found("9780441013593")],
        &cancel,
    );
    let mut scanner = Scanner::new(camera, detector, TICK);

    let mut transient = 0;
    let outcome = scanner
        .run(&cancel, |event| {
            if let ScanEvent::TransientError(_) = event {
                transient += 1;
            }
        })
        .await
        .unwrap();

    assert_eq!(transient, 2);
    assert!(matches!(outcome, ScanOutcome::Detected(_)));
}

#[tokio::test(start_paused = true)]
async fn test_camera_denied_returns_to_idle() {
    let cancel = CancelFlag::new();
    let (mut camera, tracks) = FakeCamera::new();
    camera.deny = true;
    let detector = ScriptedDetector::new(Vec::new(), &cancel);
    let mut scanner = Scanner::new(camera, detector, TICK);

    let err = scanner.run(&cancel, |_| {}).await.unwrap_err();

    assert!(matches!(err, CaptureError::Camera(_)));
    assert_eq!(scanner.state(), ScanState::Idle);
    assert_eq!(tracks.load(Ordering::SeqCst), 0);
    assert_eq!(scanner.detector().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stream_end_stops_the_loop() {
    let cancel = CancelFlag::new();
    let (mut camera, tracks) = FakeCamera::new();
    camera.frames_before_end = Some(3);
    let detector = ScriptedDetector::new(Vec::new(), &cancel);
    let mut scanner = Scanner::new(camera, detector, TICK);

    let outcome = scanner.run(&cancel, |_| {}).await.unwrap();

    assert_eq!(outcome, ScanOutcome::StreamEnded);
    assert_eq!(tracks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_supported_formats_is_unsupported() {
    let cancel = CancelFlag::new();
    let (camera, tracks) = FakeCamera::new();
    let mut detector = ScriptedDetector::new(Vec::new(), &cancel);
    detector.formats.clear();
    let mut scanner = Scanner::new(camera, detector, TICK);

    let err = scanner.run(&cancel, |_| {}).await.unwrap_err();

    assert_eq!(err, CaptureError::Unsupported);
    assert_eq!(tracks.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_wedge_scan_end_to_end() {
    let (camera, feed) = WedgeCamera::new();
    let mut scanner = Scanner::new(camera, TextBarcodeDetector::default(), TICK);
    let cancel = CancelFlag::new();

    feed.submit("");
    feed.submit("0-13-468599-7");

    let outcome = scanner.run(&cancel, |_| {}).await.unwrap();
    match outcome {
        ScanOutcome::Detected(code) => {
            assert_eq!(code.format, BarcodeFormat::Ean13);
            assert_eq!(code.raw_value, "9780134685991");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!feed.submit("9780441013593"));
}

#[tokio::test(start_paused = true)]
async fn test_wedge_feed_dropped_ends_stream() {
    let (camera, feed) = WedgeCamera::new();
    let mut scanner = Scanner::new(camera, TextBarcodeDetector::default(), TICK);
    drop(feed);

    let outcome = scanner.run(&CancelFlag::new(), |_| {}).await.unwrap();
    assert_eq!(outcome, ScanOutcome::StreamEnded);
}
