//! Document zones derived from line positions.
//!
//! There is no page size in the OCR payload, so zones are measured against
//! the largest `x`/`y` seen among the lines themselves.

use super::TextLine;

/// Fraction of the height that counts as the top (and, mirrored, bottom) band.
pub const TOP_ZONE_RATIO: f64 = 0.3;

/// Fraction splitting the page into halves, both vertically and horizontally.
pub const HALF_RATIO: f64 = 0.5;

/// Lines below this fraction of the height are in the bottom band.
pub const BOTTOM_ZONE_RATIO: f64 = 0.7;

/// Named regions of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// `y < maxY * 0.3`.
    Top,
    /// `y < maxY * 0.5`.
    TopHalf,
    /// `y > maxY * 0.7`.
    Bottom,
    /// `x < maxX * 0.5`.
    LeftHalf,
    /// `x > maxX * 0.5`.
    RightHalf,
    /// Top band, left half: where logos and company names usually sit.
    Logo,
    /// Top band, right half: where invoice metadata usually sits.
    TopRight,
}

/// Extents of a document, recomputed for every resolver call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoneMetrics {
    /// Largest `x` among all lines (0 for an empty document).
    pub max_x: i32,
    /// Largest `y` among all lines (0 for an empty document).
    pub max_y: i32,
}

impl ZoneMetrics {
    /// Measure a line list.
    pub fn from_lines(lines: &[TextLine]) -> Self {
        lines.iter().fold(Self::default(), |acc, line| Self {
            max_x: acc.max_x.max(line.x),
            max_y: acc.max_y.max(line.y),
        })
    }

    pub fn top_threshold(&self) -> f64 {
        f64::from(self.max_y) * TOP_ZONE_RATIO
    }

    pub fn top_half_threshold(&self) -> f64 {
        f64::from(self.max_y) * HALF_RATIO
    }

    pub fn bottom_threshold(&self) -> f64 {
        f64::from(self.max_y) * BOTTOM_ZONE_RATIO
    }

    pub fn vertical_midline(&self) -> f64 {
        f64::from(self.max_x) * HALF_RATIO
    }

    /// Whether `line` falls inside `zone`.
    pub fn contains(&self, zone: Zone, line: &TextLine) -> bool {
        let x = f64::from(line.x);
        let y = f64::from(line.y);

        match zone {
            Zone::Top => y < self.top_threshold(),
            Zone::TopHalf => y < self.top_half_threshold(),
            Zone::Bottom => y > self.bottom_threshold(),
            Zone::LeftHalf => x < self.vertical_midline(),
            Zone::RightHalf => x > self.vertical_midline(),
            Zone::Logo => self.contains(Zone::Top, line) && self.contains(Zone::LeftHalf, line),
            Zone::TopRight => {
                self.contains(Zone::Top, line) && self.contains(Zone::RightHalf, line)
            }
        }
    }
}

/// A line list paired with its freshly computed zone metrics.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub lines: &'a [TextLine],
    pub zones: ZoneMetrics,
}

impl<'a> Page<'a> {
    pub fn new(lines: &'a [TextLine]) -> Self {
        Self {
            lines,
            zones: ZoneMetrics::from_lines(lines),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines inside `zone`, in list order.
    pub fn in_zone(&self, zone: Zone) -> impl Iterator<Item = &'a TextLine> + '_ {
        self.lines
            .iter()
            .filter(move |line| self.zones.contains(zone, line))
    }

    /// Lines inside `zone`, sorted top to bottom (stable for equal `y`).
    pub fn in_zone_sorted(&self, zone: Zone) -> Vec<&'a TextLine> {
        let mut lines: Vec<&TextLine> = self.in_zone(zone).collect();
        lines.sort_by_key(|line| line.y);
        lines
    }

    /// Lines whose lowercased text contains any of `keywords`.
    pub fn with_keywords(
        &self,
        keywords: &'static [&'static str],
    ) -> impl Iterator<Item = &'a TextLine> + '_ {
        self.lines
            .iter()
            .filter(move |line| line.contains_any(keywords))
    }
}
