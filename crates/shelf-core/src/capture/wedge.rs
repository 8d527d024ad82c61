//! Keyboard-wedge capture backend
//!
//! Hand-held barcode readers in keyboard-wedge mode "type" each decoded code
//! followed by Enter. Here every submitted line is one frame: a
//! [`WedgeFeed`] pushes lines in, a [`WedgeCamera`] hands them to the scan
//! loop, and [`TextBarcodeDetector`] recognises the code in the text.
//! Dropping every feed ends the stream.

use super::{
    BarcodeDetector, BarcodeFormat, CaptureDevice, DetectedBarcode, Facing, Frame, MediaStream,
};
use crate::error::{CaptureError, DetectionError};
use crate::identifiers::{first_isbn, is_valid_ean13, isbn10_to_isbn13};
use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Sending half: submit scanned lines.
#[derive(Debug, Clone)]
pub struct WedgeFeed {
    tx: UnboundedSender<String>,
}

impl WedgeFeed {
    /// Submit one line. Returns false when the stream is no longer listening.
    pub fn submit(&self, line: impl Into<String>) -> bool {
        self.tx.send(line.into()).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Capture device backed by a line feed. It can be acquired once.
#[derive(Debug)]
pub struct WedgeCamera {
    rx: Option<UnboundedReceiver<String>>,
}

impl WedgeCamera {
    pub fn new() -> (Self, WedgeFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx: Some(rx) }, WedgeFeed { tx })
    }
}

#[async_trait]
impl CaptureDevice for WedgeCamera {
    type Stream = WedgeStream;

    async fn acquire(&mut self, _facing: Facing) -> Result<WedgeStream, CaptureError> {
        let rx = self
            .rx
            .take()
            .ok_or_else(|| CaptureError::Camera("scanner input is already in use".to_string()))?;
        Ok(WedgeStream {
            rx: Some(rx),
            sequence: 0,
            active: true,
        })
    }
}

/// Live stream over submitted lines. One line per frame.
#[derive(Debug)]
pub struct WedgeStream {
    rx: Option<UnboundedReceiver<String>>,
    sequence: u64,
    active: bool,
}

impl MediaStream for WedgeStream {
    fn is_active(&self) -> bool {
        self.active && self.rx.is_some()
    }

    fn current_frame(&mut self) -> Option<Frame> {
        let rx = self.rx.as_mut()?;
        match rx.try_recv() {
            Ok(line) => {
                self.sequence += 1;
                Some(Frame {
                    sequence: self.sequence,
                    payload: line.into_bytes(),
                })
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.active = false;
                None
            }
        }
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.is_active())
    }

    fn stop_tracks(&mut self) {
        self.active = false;
        if let Some(rx) = self.rx.as_mut() {
            rx.close();
        }
    }

    fn detach(&mut self) {
        self.rx = None;
    }
}

/// Recognises barcodes in text frames.
///
/// EAN-13 values must pass the check digit; an ISBN-10 in the text is
/// reported as its EAN-13 form. With QR enabled, any other non-empty text is
/// taken as a QR payload.
#[derive(Debug, Clone)]
pub struct TextBarcodeDetector {
    formats: Vec<BarcodeFormat>,
}

impl TextBarcodeDetector {
    pub fn new(formats: Vec<BarcodeFormat>) -> Self {
        Self { formats }
    }

    fn decode(&self, text: &str) -> Option<DetectedBarcode> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        if self.formats.contains(&BarcodeFormat::Ean13) {
            let compact: String = trimmed.chars().filter(|c| !matches!(c, '-' | ' ')).collect();
            if is_valid_ean13(&compact) {
                return Some(ean13(compact));
            }
            if let Some(isbn) = first_isbn(trimmed) {
                let value = if isbn.len() == 10 {
                    isbn10_to_isbn13(&isbn).unwrap_or(isbn)
                } else {
                    isbn
                };
                return Some(ean13(value));
            }
        }

        if self.formats.contains(&BarcodeFormat::QrCode) {
            return Some(DetectedBarcode {
                format: BarcodeFormat::QrCode,
                raw_value: trimmed.to_string(),
            });
        }
        None
    }
}

impl Default for TextBarcodeDetector {
    fn default() -> Self {
        Self::new(vec![BarcodeFormat::Ean13, BarcodeFormat::QrCode])
    }
}

fn ean13(value: String) -> DetectedBarcode {
    DetectedBarcode {
        format: BarcodeFormat::Ean13,
        raw_value: value,
    }
}

#[async_trait]
impl BarcodeDetector for TextBarcodeDetector {
    fn supported_formats(&self) -> Vec<BarcodeFormat> {
        self.formats.clone()
    }

    async fn detect(&self, frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectionError> {
        let text = std::str::from_utf8(&frame.payload)
            .map_err(|_| DetectionError("frame is not valid text".to_string()))?;
        if text.chars().any(|c| c.is_control() && !matches!(c, '\r' | '\n' | '\t')) {
            return Err(DetectionError("frame contains control characters".to_string()));
        }
        Ok(self.decode(text).into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> Frame {
        Frame {
            sequence: 1,
            payload: text.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_ean13_line_is_detected() {
        let detector = TextBarcodeDetector::default();
        let codes = detector.detect(&frame("9780134685991\r\n")).await.unwrap();
        assert_eq!(codes, vec![ean13("9780134685991".to_string())]);
    }

    #[tokio::test]
    async fn test_isbn10_text_is_reported_as_ean13() {
        let detector = TextBarcodeDetector::new(vec![BarcodeFormat::Ean13]);
        let codes = detector.detect(&frame("ISBN 0-306-40615-2")).await.unwrap();
        assert_eq!(codes[0].raw_value, "9780306406157");
    }

    #[tokio::test]
    async fn test_bad_checksum_without_qr_is_nothing() {
        let detector = TextBarcodeDetector::new(vec![BarcodeFormat::Ean13]);
        assert!(detector.detect(&frame("9780134685992")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_text_is_qr_payload() {
        let detector = TextBarcodeDetector::default();
        let codes = detector.detect(&frame("https://example.org/book")).await.unwrap();
        assert_eq!(codes[0].format, BarcodeFormat::QrCode);
    }

    #[tokio::test]
    async fn test_control_characters_are_a_detection_error() {
        let detector = TextBarcodeDetector::default();
        assert!(detector.detect(&frame("97801\u{1b}[A")).await.is_err());
        let invalid = Frame {
            sequence: 1,
            payload: vec![0xff, 0xfe],
        };
        assert!(detector.detect(&invalid).await.is_err());
    }

    #[tokio::test]
    async fn test_wedge_stream_delivers_lines_then_ends() {
        let (mut camera, feed) = WedgeCamera::new();
        let mut stream = camera.acquire(Facing::Environment).await.unwrap();
        assert!(camera.acquire(Facing::Environment).await.is_err());

        assert!(feed.submit("first"));
        assert_eq!(stream.current_frame().unwrap().payload, b"first");
        assert_eq!(stream.current_frame(), None);
        assert!(stream.is_active());

        drop(feed);
        assert_eq!(stream.current_frame(), None);
        assert!(!stream.is_active());
    }

    #[tokio::test]
    async fn test_stop_tracks_closes_feed() {
        let (mut camera, feed) = WedgeCamera::new();
        let mut stream = camera.acquire(Facing::Environment).await.unwrap();
        assert_eq!(stream.active_tracks(), 1);
        stream.stop_tracks();
        stream.detach();
        assert_eq!(stream.active_tracks(), 0);
        assert!(!feed.submit("late"));
    }
}
