// Turns raw pointer motion into stamped strokes on a PixelGrid.
// Every recorded point is stamped together with its 8-neighborhood, and
// consecutive samples are joined by straight-line interpolation so fast
// drags leave no gaps.

use std::iter;

use log::{debug, trace};

use crate::config::CaptureConfig;
use crate::error::Result;
use crate::grid::PixelGrid;
use crate::types::{Coordinate, PointerSample};

#[derive(Debug, Clone)]
pub struct StrokeRasterizer {
    /// Last point of the current stroke; `None` between strokes.
    previous: Option<Coordinate>,
    max_jump: f64,
}

impl Default for StrokeRasterizer {
    fn default() -> Self {
        Self::new(&CaptureConfig::default())
    }
}

impl StrokeRasterizer {
    pub fn new(config: &CaptureConfig) -> Self {
        Self { previous: None, max_jump: config.max_jump }
    }

    pub fn previous(&self) -> Option<Coordinate> {
        self.previous
    }

    /// Pointer released: the next press begins a new stroke.
    pub fn end_stroke(&mut self) {
        self.previous = None;
    }

    /// Handles one pointer sample. Button-up ends the stroke; button-down draws.
    /// Returns how many cells were newly set.
    pub fn feed(&mut self, grid: &mut PixelGrid, sample: PointerSample) -> Result<usize> {
        if sample.primary_down {
            self.stroke_to(grid, sample.x, sample.y)
        } else {
            self.end_stroke();
            Ok(0)
        }
    }

    /// Extends the current stroke to `(x, y)` in canvas pixels.
    pub fn stroke_to(&mut self, grid: &mut PixelGrid, x: i32, y: i32) -> Result<usize> {
        let point = grid.coordinate(x, y);
        if !point.valid() {
            if self.previous.take().is_some() {
                debug!(target: "stroke", "stroke left the canvas at {point}");
            }
            return Ok(0);
        }

        let Some(prev) = self.previous.replace(point) else {
            debug!(target: "stroke", "stroke starts at {point}");
            return stamp(grid, point);
        };

        let distance = point.distance(&prev);
        if distance >= self.max_jump {
            debug!(
                target: "stroke",
                "jump of {distance:.1}px from {prev} to {point}, starting a new stroke"
            );
            return stamp(grid, point);
        }

        let dx = point.x - prev.x;
        let dy = point.y - prev.y;
        let steps = dx.abs().max(dy.abs());
        let mut changed = 0;

        for step in 0..steps {
            let t = step as f64 / steps as f64;
            let inter = grid.coordinate(
                prev.x + (dx as f64 * t).round_ties_even() as i32,
                prev.y + (dy as f64 * t).round_ties_even() as i32,
            );
            if !inter.valid() {
                debug!(target: "stroke", "interpolation left the canvas at {inter}");
                self.previous = None;
                break;
            }
            trace!(target: "stroke", "interpolated {inter} between {prev} and {point}");
            changed += stamp(grid, inter)?;
        }

        changed += stamp(grid, point)?;
        Ok(changed)
    }
}

/// Marks `point` and its valid neighbors active, as one batch.
fn stamp(grid: &mut PixelGrid, point: Coordinate) -> Result<usize> {
    grid.add_many(iter::once(point).chain(point.neighbors()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(grid: &PixelGrid, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
        (y0..=y1).all(|y| (x0..=x1).all(|x| grid.get(x, y).unwrap()))
    }

    #[test_log::test]
    fn first_sample_stamps_three_by_three() {
        let mut grid = PixelGrid::new(10, 10);
        let mut raster = StrokeRasterizer::default();
        raster.feed(&mut grid, PointerSample::down(5, 5)).unwrap();

        assert_eq!(grid.count_active(), 9);
        assert!(block(&grid, 4, 4, 6, 6));
        assert_eq!(raster.previous(), Some(grid.coordinate(5, 5)));
    }

    #[test]
    fn stamp_near_border_skips_invalid_neighbors() {
        let mut grid = PixelGrid::new(10, 10);
        let mut raster = StrokeRasterizer::default();
        raster.stroke_to(&mut grid, 1, 1).unwrap();
        // Centre plus (1,2), (2,1), (2,2); row and column 0 are never stamped.
        assert_eq!(grid.count_active(), 4);
        assert!(!grid.get(0, 0).unwrap());
        assert!(block(&grid, 1, 1, 2, 2));
    }

    #[test_log::test]
    fn samples_are_joined_by_interpolation() {
        let mut grid = PixelGrid::new(40, 40);
        let mut raster = StrokeRasterizer::default();
        raster.feed(&mut grid, PointerSample::down(5, 10)).unwrap();
        raster.feed(&mut grid, PointerSample::down(25, 10)).unwrap();

        // A solid band three rows tall from x=4 to x=26.
        assert!(block(&grid, 4, 9, 26, 11));
        assert_eq!(grid.count_active(), 23 * 3);
    }

    #[test]
    fn pointer_up_splits_strokes() {
        let mut grid = PixelGrid::new(40, 40);
        let mut raster = StrokeRasterizer::default();
        raster.feed(&mut grid, PointerSample::down(5, 10)).unwrap();
        raster.feed(&mut grid, PointerSample::up(5, 10)).unwrap();
        assert_eq!(raster.previous(), None);
        raster.feed(&mut grid, PointerSample::down(25, 10)).unwrap();

        assert!(block(&grid, 4, 9, 6, 11));
        assert!(block(&grid, 24, 9, 26, 11));
        assert!(!grid.get(15, 10).unwrap());
        assert_eq!(grid.count_active(), 18);
    }

    #[test]
    fn diagonal_drag_has_no_gaps() {
        let mut grid = PixelGrid::new(50, 50);
        let mut raster = StrokeRasterizer::default();
        raster.stroke_to(&mut grid, 5, 5).unwrap();
        raster.stroke_to(&mut grid, 35, 20).unwrap();
        // Every column on the dominant axis has a stamped cell.
        for x in 5..=35 {
            assert!(grid.count_in_column(x, 0, 49) >= 3, "column {x} has a gap");
        }
    }

    #[test]
    fn long_jump_starts_a_new_stroke() {
        let mut grid = PixelGrid::new(700, 50);
        let mut raster = StrokeRasterizer::default();
        raster.stroke_to(&mut grid, 10, 10).unwrap();
        raster.stroke_to(&mut grid, 600, 10).unwrap();

        assert_eq!(grid.count_active(), 18);
        assert!(!grid.get(300, 10).unwrap());
        assert_eq!(raster.previous(), Some(grid.coordinate(600, 10)));
    }

    #[test]
    fn jump_just_under_limit_is_interpolated() {
        let mut grid = PixelGrid::new(700, 50);
        let mut raster = StrokeRasterizer::default();
        raster.stroke_to(&mut grid, 10, 10).unwrap();
        raster.stroke_to(&mut grid, 509, 10).unwrap();
        assert!(grid.get(300, 10).unwrap());
    }

    #[test]
    fn leaving_the_canvas_cancels_the_stroke() {
        let mut grid = PixelGrid::new(20, 20);
        let mut raster = StrokeRasterizer::default();
        raster.stroke_to(&mut grid, 5, 5).unwrap();
        let counter = grid.change_counter();

        assert_eq!(raster.stroke_to(&mut grid, 25, 5).unwrap(), 0);
        assert_eq!(raster.previous(), None);
        assert_eq!(grid.change_counter(), counter);

        // Coming back in starts fresh: no line back to (5,5).
        raster.stroke_to(&mut grid, 15, 5).unwrap();
        assert!(!grid.get(10, 5).unwrap());
    }

    #[test]
    fn border_sample_is_outside_the_canvas() {
        let mut grid = PixelGrid::new(20, 20);
        let mut raster = StrokeRasterizer::default();
        raster.stroke_to(&mut grid, 0, 5).unwrap();
        assert!(grid.is_empty());
        assert_eq!(raster.previous(), None);
    }

    #[test]
    fn repeated_sample_adds_nothing() {
        let mut grid = PixelGrid::new(20, 20);
        let mut raster = StrokeRasterizer::default();
        raster.stroke_to(&mut grid, 8, 8).unwrap();
        let counter = grid.change_counter();
        assert_eq!(raster.stroke_to(&mut grid, 8, 8).unwrap(), 0);
        assert_eq!(grid.change_counter(), counter);
    }
}
