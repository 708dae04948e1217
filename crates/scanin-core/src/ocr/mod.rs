//! OCR input contract and line normalization.
//!
//! The OCR service itself is external. It returns regions of lines of words,
//! each line carrying a `"x,y,width,height"` bounding box string. This module
//! decodes that payload and flattens it into positioned [`TextLine`]s.

mod layout;

pub use layout::{
    Page, Zone, ZoneMetrics, BOTTOM_ZONE_RATIO, HALF_RATIO, TOP_ZONE_RATIO,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::OcrError;

/// One OCR-recognized line of text with its bounding box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    /// Space-joined words of the line, trimmed.
    pub text: String,
    /// Left edge in image pixels.
    pub x: i32,
    /// Top edge in image pixels (grows downward).
    pub y: i32,
    /// Box width.
    pub width: i32,
    /// Box height.
    pub height: i32,
}

impl TextLine {
    /// Create a line from text and position.
    pub fn new(text: impl Into<String>, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Lowercased text, for keyword checks.
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    /// Whether the lowercased text contains any of `keywords`.
    pub fn contains_any(&self, keywords: &[&str]) -> bool {
        let lower = self.lower();
        keywords.iter().any(|k| lower.contains(k))
    }
}

/// Raw result of the printed-text OCR service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    /// Text regions in service order.
    #[serde(default)]
    pub regions: Vec<OcrRegion>,
}

/// A block of lines detected by the OCR service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRegion {
    #[serde(default)]
    pub lines: Vec<OcrLine>,
}

/// A single recognized line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrLine {
    /// Bounding box as `"x,y,width,height"`.
    #[serde(default)]
    pub bounding_box: Option<String>,

    #[serde(default)]
    pub words: Vec<OcrWord>,
}

/// A recognized word.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrWord {
    #[serde(default)]
    pub text: String,
}

impl OcrResult {
    /// Decode an OCR service JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, OcrError> {
        serde_json::from_str(payload).map_err(|e| OcrError::Decode(e.to_string()))
    }

    /// Flatten regions into positioned lines, in service order.
    ///
    /// Lines whose bounding box yields fewer than four integers are dropped.
    pub fn text_lines(&self) -> Vec<TextLine> {
        let mut lines = Vec::new();

        for region in &self.regions {
            for line in &region.lines {
                match line.to_text_line() {
                    Some(text_line) => lines.push(text_line),
                    None => trace!("Dropping line without a usable bounding box"),
                }
            }
        }

        debug!("Normalized {} OCR lines", lines.len());
        lines
    }

    /// Like [`text_lines`](Self::text_lines), but an empty result is an error.
    pub fn require_text_lines(&self) -> Result<Vec<TextLine>, OcrError> {
        let lines = self.text_lines();
        if lines.is_empty() {
            return Err(OcrError::NoText);
        }
        Ok(lines)
    }

    /// Line texts joined with newlines, in service order.
    pub fn raw_text(&self) -> String {
        self.regions
            .iter()
            .flat_map(|r| r.lines.iter())
            .map(OcrLine::joined_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OcrLine {
    /// Words joined with single spaces, trailing whitespace removed.
    pub fn joined_text(&self) -> String {
        let mut text = String::new();
        for word in &self.words {
            text.push_str(&word.text);
            text.push(' ');
        }
        text.trim().to_string()
    }

    fn to_text_line(&self) -> Option<TextLine> {
        let bbox = parse_bounding_box(self.bounding_box.as_deref()?);
        if bbox.len() < 4 {
            return None;
        }

        Some(TextLine {
            text: self.joined_text(),
            x: bbox[0],
            y: bbox[1],
            width: bbox[2],
            height: bbox[3],
        })
    }
}

/// Split a bounding box string on commas; unparseable parts become 0.
fn parse_bounding_box(raw: &str) -> Vec<i32> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',')
        .map(|part| part.parse::<i32>().unwrap_or(0))
        .collect()
}
