//! Barcode capture
//!
//! A capture device yields a live stream of frames; a detector looks for
//! barcodes in one frame at a time. [`Scanner`] drives the two through a
//! fixed-rate poll loop until a code is found, the stream ends, or the scan
//! is cancelled. The stream is released on every exit path.
//!
//! [`wedge`] provides a device for keyboard-wedge barcode readers, which
//! deliver each scanned code as a line of text.

pub mod scanner;
pub mod wedge;

pub use scanner::*;
pub use wedge::*;

use crate::config::ScannerConfig;
use crate::error::{CaptureError, DetectionError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Symbologies a detector can be asked to recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeFormat {
    /// EAN-13, the symbology printed on book covers (Bookland 978/979)
    #[serde(rename = "ean_13")]
    Ean13,
    #[serde(rename = "qr_code")]
    QrCode,
}

/// Which camera to prefer when several are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera
    #[default]
    Environment,
    User,
}

/// One captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub sequence: u64,
    pub payload: Vec<u8>,
}

/// A barcode found in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedBarcode {
    pub format: BarcodeFormat,
    pub raw_value: String,
}

/// Source of live frame streams.
#[async_trait]
pub trait CaptureDevice: Send {
    type Stream: MediaStream;

    /// Open a stream. Fails with `CaptureError::Camera` when access is
    /// denied or no device is present.
    async fn acquire(&mut self, facing: Facing) -> Result<Self::Stream, CaptureError>;
}

/// A live stream attached to a capture device.
pub trait MediaStream: Send {
    /// False once the stream has ended or been stopped.
    fn is_active(&self) -> bool;

    /// The frame currently available, if any.
    fn current_frame(&mut self) -> Option<Frame>;

    /// Number of tracks still running.
    fn active_tracks(&self) -> usize;

    /// Stop every track of the stream.
    fn stop_tracks(&mut self);

    /// Detach the stream from its source.
    fn detach(&mut self);
}

/// Finds barcodes in frames.
#[async_trait]
pub trait BarcodeDetector: Send + Sync {
    fn supported_formats(&self) -> Vec<BarcodeFormat>;

    async fn detect(&self, frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectionError>;
}

/// Shared cancellation flag for a running scan.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What this environment can do, probed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub barcode_detection: bool,
    /// Formats both enabled in config and supported by the detector
    pub formats: Vec<BarcodeFormat>,
}

impl Capabilities {
    pub fn probe<B: BarcodeDetector + ?Sized>(detector: &B, config: &ScannerConfig) -> Self {
        let supported = detector.supported_formats();
        let formats: Vec<BarcodeFormat> = config
            .formats
            .iter()
            .copied()
            .filter(|f| supported.contains(f))
            .collect();

        Self {
            barcode_detection: config.enabled && !formats.is_empty(),
            formats,
        }
    }
}

/// Owns a stream for the duration of a scan and releases it on drop.
pub struct StreamGuard<S: MediaStream> {
    stream: S,
    released: bool,
}

impl<S: MediaStream> StreamGuard<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            released: false,
        }
    }

    /// Stop all tracks and detach the source. Idempotent.
    pub fn release(&mut self) {
        if !self.released {
            self.stream.stop_tracks();
            self.stream.detach();
            self.released = true;
        }
    }
}

impl<S: MediaStream> std::ops::Deref for StreamGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.stream
    }
}

impl<S: MediaStream> std::ops::DerefMut for StreamGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: MediaStream> Drop for StreamGuard<S> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullDetector(Vec<BarcodeFormat>);

    #[async_trait]
    impl BarcodeDetector for NullDetector {
        fn supported_formats(&self) -> Vec<BarcodeFormat> {
            self.0.clone()
        }

        async fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectionError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_probe_intersects_formats() {
        let detector = NullDetector(vec![BarcodeFormat::Ean13]);
        let caps = Capabilities::probe(&detector, &ScannerConfig::default());
        assert!(caps.barcode_detection);
        assert_eq!(caps.formats, vec![BarcodeFormat::Ean13]);
    }

    #[test]
    fn test_probe_without_support_is_unsupported() {
        let detector = NullDetector(vec![]);
        assert!(!Capabilities::probe(&detector, &ScannerConfig::default()).barcode_detection);

        let detector = NullDetector(vec![BarcodeFormat::Ean13]);
        let config = ScannerConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(!Capabilities::probe(&detector, &config).barcode_detection);
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(serde_json::to_string(&BarcodeFormat::Ean13).unwrap(), "\"ean_13\"");
        assert_eq!(serde_json::to_string(&BarcodeFormat::QrCode).unwrap(), "\"qr_code\"");
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
