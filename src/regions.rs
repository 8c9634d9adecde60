// Named rectangular regions of the canvas, in fractions of its size.
// A consumer asks which regions an active grid touches and uses the names as
// coarse shape features.

use std::fmt;

use crate::grid::PixelGrid;

/// Closed interval of canvas fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Pixel bounds on an axis of length `side`, fractions truncated.
    fn pixels(&self, side: usize) -> (i32, i32) {
        ((self.min * side as f64) as i32, (self.max * side as f64) as i32)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}...{})", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectangleRegion {
    pub name: String,
    pub x: Range,
    pub y: Range,
}

impl RectangleRegion {
    pub fn new(name: impl Into<String>, x: Range, y: Range) -> Self {
        Self { name: name.into(), x, y }
    }

    /// Whether pixel `(px, py)` of a `width x height` canvas lies inside, edges included.
    pub fn contains(&self, px: i32, py: i32, width: usize, height: usize) -> bool {
        let (x0, x1) = self.x.pixels(width);
        let (y0, y1) = self.y.pixels(height);
        x0 <= px && px <= x1 && y0 <= py && py <= y1
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegionLayout {
    regions: Vec<RectangleRegion>,
}

impl RegionLayout {
    pub fn new(regions: Vec<RectangleRegion>) -> Self {
        Self { regions }
    }

    /// 5x5 cells of 0.20 named `grid5 a b`, then the 4x4 cells offset by
    /// 0.10 named `grid4 a b` (`a` is the column, `b` the row, from 1).
    pub fn standard() -> Self {
        let mut regions = Vec::with_capacity(25 + 16);
        for a in 1..=5 {
            for b in 1..=5 {
                regions.push(RectangleRegion::new(
                    format!("grid5 {a} {b}"),
                    Range::new((a - 1) as f64 * 0.20, a as f64 * 0.20),
                    Range::new((b - 1) as f64 * 0.20, b as f64 * 0.20),
                ));
            }
        }
        for a in 1..=4 {
            for b in 1..=4 {
                regions.push(RectangleRegion::new(
                    format!("grid4 {a} {b}"),
                    Range::new(0.10 + (a - 1) as f64 * 0.20, 0.10 + a as f64 * 0.20),
                    Range::new(0.10 + (b - 1) as f64 * 0.20, 0.10 + b as f64 * 0.20),
                ));
            }
        }
        Self { regions }
    }

    pub fn regions(&self) -> &[RectangleRegion] {
        &self.regions
    }

    pub fn get(&self, name: &str) -> Option<&RectangleRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Names of the regions holding at least one active pixel, in layout order.
    pub fn activated(&self, grid: &PixelGrid) -> Vec<&str> {
        let (width, height) = grid.size();
        let active: Vec<_> = grid.active_coordinates().collect();
        self.regions
            .iter()
            .filter(|r| active.iter().any(|c| r.contains(c.x, c.y, width, height)))
            .map(|r| r.name.as_str())
            .collect()
    }
}
