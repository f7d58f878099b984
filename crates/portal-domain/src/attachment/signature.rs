//! E-signature capture.
//!
//! A [`SignaturePad`] collects pointer strokes the way a drawing canvas
//! does: press starts a stroke, moves extend it, release ends it. A
//! finished pad becomes an immutable [`Signature`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// A point on the signature canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One continuous pen-down path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A captured signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub signer: String,
    pub strokes: Vec<Stroke>,
    pub signed_at: DateTime<Utc>,
}

impl Signature {
    /// Whether the signature has any ink.
    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(Stroke::is_empty)
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }
}

/// Stroke collector for an in-progress signature.
#[derive(Debug, Clone, Default)]
pub struct SignaturePad {
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
}

impl SignaturePad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pen down. An unfinished stroke is ended first.
    pub fn begin_stroke(&mut self, at: Point) {
        self.end_stroke();
        self.current = Some(Stroke { points: vec![at] });
    }

    /// Pen move. Ignored while the pen is up.
    pub fn add_point(&mut self, at: Point) {
        if let Some(stroke) = self.current.as_mut() {
            stroke.points.push(at);
        }
    }

    /// Pen up (or pointer left the canvas).
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.current.take() {
            if !stroke.is_empty() {
                self.strokes.push(stroke);
            }
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    /// Nothing drawn yet, including the stroke in progress.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.current.as_ref().map_or(true, Stroke::is_empty)
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
    }

    /// Close the pad into a signature. Empty pads cannot be finished.
    pub fn finish(mut self, signer: impl Into<String>, now: DateTime<Utc>) -> Result<Signature> {
        self.end_stroke();
        if self.strokes.is_empty() {
            return Err(DomainError::EmptySignature);
        }

        Ok(Signature {
            signer: signer.into(),
            strokes: self.strokes,
            signed_at: now,
        })
    }
}
