use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Corner point of a detected code in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned box around a detected code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Decoded QR text as handed over by a scanner, plus where and when it was seen.
///
/// The analysis only ever reads `text`; capture metadata is carried through for
/// callers that correlate results with frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrPayload {
    pub text: String,
    pub captured_at_ms: u64,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub corner_points: Vec<Point>,
}

impl QrPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            captured_at_ms: now_unix_ms(),
            bounding_box: None,
            corner_points: Vec::new(),
        }
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn with_corner_points(mut self, points: Vec<Point>) -> Self {
        self.corner_points = points;
        self
    }

    pub fn with_captured_at(mut self, captured_at_ms: u64) -> Self {
        self.captured_at_ms = captured_at_ms;
        self
    }
}

pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
