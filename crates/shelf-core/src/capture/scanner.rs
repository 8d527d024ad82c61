//! The scan loop

use super::{
    BarcodeDetector, CancelFlag, CaptureDevice, DetectedBarcode, Facing, MediaStream, StreamGuard,
};
use crate::config::ScannerConfig;
use crate::error::{CaptureError, DetectionError};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Scanner lifecycle. A scan always ends back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    RequestingCamera,
    Scanning,
}

/// Progress reported while a scan runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    State(ScanState),
    /// One detection call failed; polling continues
    TransientError(DetectionError),
}

/// How a scan that acquired the camera ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Detected(DetectedBarcode),
    Cancelled,
    /// The device stopped delivering frames
    StreamEnded,
}

pub struct Scanner<D: CaptureDevice, B: BarcodeDetector> {
    device: D,
    detector: B,
    frame_interval: Duration,
    state: ScanState,
}

impl<D: CaptureDevice, B: BarcodeDetector> Scanner<D, B> {
    pub fn new(device: D, detector: B, frame_interval: Duration) -> Self {
        Self {
            device,
            detector,
            frame_interval,
            state: ScanState::Idle,
        }
    }

    pub fn from_config(device: D, detector: B, config: &ScannerConfig) -> Self {
        Self::new(device, detector, config.frame_interval())
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn detector(&self) -> &B {
        &self.detector
    }

    /// Run one scan: open the stream, poll frames until a barcode is found,
    /// the stream ends, or `cancel` is set.
    ///
    /// Camera failures return `CaptureError::Camera`. Detection failures are
    /// reported through `on_event` and do not stop the loop. No barcode is
    /// reported after cancellation.
    pub async fn run<F>(
        &mut self,
        cancel: &CancelFlag,
        mut on_event: F,
    ) -> Result<ScanOutcome, CaptureError>
    where
        F: FnMut(ScanEvent) + Send,
    {
        if self.detector.supported_formats().is_empty() {
            return Err(CaptureError::Unsupported);
        }

        self.transition(ScanState::RequestingCamera, &mut on_event);
        let stream = match self.device.acquire(Facing::Environment).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "camera acquisition failed");
                self.transition(ScanState::Idle, &mut on_event);
                return Err(e);
            }
        };
        let mut stream = StreamGuard::new(stream);

        self.transition(ScanState::Scanning, &mut on_event);
        let outcome = poll_frames(
            &self.detector,
            self.frame_interval,
            &mut stream,
            cancel,
            &mut on_event,
        )
        .await;
        stream.release();

        match &outcome {
            ScanOutcome::Detected(code) => info!(value = %code.raw_value, "barcode detected"),
            ScanOutcome::Cancelled => info!("scan cancelled"),
            ScanOutcome::StreamEnded => info!("capture stream ended"),
        }
        self.transition(ScanState::Idle, &mut on_event);
        Ok(outcome)
    }

    fn transition<F: FnMut(ScanEvent)>(&mut self, next: ScanState, on_event: &mut F) {
        debug!(from = ?self.state, to = ?next, "scanner state");
        self.state = next;
        on_event(ScanEvent::State(next));
    }
}

/// One detection in flight at a time: the next tick is only awaited after
/// the previous `detect` resolves.
async fn poll_frames<S, B, F>(
    detector: &B,
    frame_interval: Duration,
    stream: &mut StreamGuard<S>,
    cancel: &CancelFlag,
    on_event: &mut F,
) -> ScanOutcome
where
    S: MediaStream,
    B: BarcodeDetector,
    F: FnMut(ScanEvent) + Send,
{
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if cancel.is_cancelled() {
            return ScanOutcome::Cancelled;
        }
        if !stream.is_active() {
            return ScanOutcome::StreamEnded;
        }
        let Some(frame) = stream.current_frame() else {
            continue;
        };

        match detector.detect(&frame).await {
            Ok(codes) => {
                if let Some(first) = codes.into_iter().next() {
                    if cancel.is_cancelled() {
                        return ScanOutcome::Cancelled;
                    }
                    return ScanOutcome::Detected(first);
                }
            }
            Err(e) => {
                warn!(error = %e, frame = frame.sequence, "barcode detection failed");
                on_event(ScanEvent::TransientError(e));
            }
        }
    }
}
