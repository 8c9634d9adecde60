// Fixed-size binary bitmap: one bit per cell, row-major (index = y * width + x).
//
// The change counter is a cheap dirty flag for consumers: it moves once per
// call that actually altered the bitmap, never per pixel.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::Coordinate;

const WORD_BITS: usize = 64;

#[derive(Debug, Clone)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    words: Vec<u64>,
    change_counter: u64,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize) -> Self {
        let cells = width * height;
        Self {
            width,
            height,
            words: vec![0; cells.div_ceil(WORD_BITS)],
            change_counter: 0,
        }
    }

    /// Builds a grid with the given cells set; out-of-range cells are an error.
    pub fn from_coordinates<I>(width: usize, height: usize, cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut grid = Self::new(width, height);
        for (x, y) in cells {
            grid.set(x, y, true)?;
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn change_counter(&self) -> u64 {
        self.change_counter
    }

    /// A coordinate bound to this grid's size.
    pub fn coordinate(&self, x: i32, y: i32) -> Coordinate {
        Coordinate::new(x, y, self.width, self.height)
    }

    fn index(&self, x: i32, y: i32) -> Result<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(Error::OutOfRange {
                x: x as i64,
                y: y as i64,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width + x as usize)
    }

    #[inline]
    fn bit(&self, idx: usize) -> bool {
        self.words[idx / WORD_BITS] & (1 << (idx % WORD_BITS)) != 0
    }

    /// Writes one bit, returning whether it changed. Does not touch the counter.
    #[inline]
    fn write_bit(&mut self, idx: usize, value: bool) -> bool {
        let word = &mut self.words[idx / WORD_BITS];
        let mask = 1u64 << (idx % WORD_BITS);
        let before = *word & mask != 0;
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        before != value
    }

    pub fn get(&self, x: i32, y: i32) -> Result<bool> {
        let idx = self.index(x, y)?;
        Ok(self.bit(idx))
    }

    /// Returns whether the bit changed.
    pub fn set(&mut self, x: i32, y: i32, value: bool) -> Result<bool> {
        let idx = self.index(x, y)?;
        let changed = self.write_bit(idx, value);
        if changed {
            self.change_counter += 1;
        }
        Ok(changed)
    }

    /// Sets a cell the caller already knows is inside the grid.
    pub(crate) fn mark(&mut self, x: usize, y: usize) {
        debug_assert!(x < self.width && y < self.height);
        if self.write_bit(y * self.width + x, true) {
            self.change_counter += 1;
        }
    }

    pub fn add(&mut self, coord: Coordinate) -> Result<bool> {
        self.set(coord.x, coord.y, true)
    }

    pub fn remove(&mut self, coord: Coordinate) -> Result<bool> {
        self.set(coord.x, coord.y, false)
    }

    /// Sets every coordinate. The whole batch is bounds-checked before any bit
    /// is written, and the counter moves at most once. Returns how many bits changed.
    pub fn add_many<I>(&mut self, coords: I) -> Result<usize>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let indices = coords
            .into_iter()
            .map(|c| self.index(c.x, c.y))
            .collect::<Result<Vec<_>>>()?;

        let changed = indices
            .into_iter()
            .filter(|&idx| self.write_bit(idx, true))
            .count();
        if changed > 0 {
            self.change_counter += 1;
        }
        Ok(changed)
    }

    /// Clears every cell in place. The counter keeps advancing so an observer
    /// never sees an old value come back.
    pub fn reset(&mut self) {
        if !self.is_empty() {
            self.words.fill(0);
            self.change_counter += 1;
        }
    }

    pub fn count(&self, value: bool) -> usize {
        let active = self.count_active();
        if value { active } else { self.width * self.height - active }
    }

    pub fn count_active(&self) -> usize {
        // Trailing bits past width*height are never written, so whole-word counts are exact.
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Active cells in row-major order (y ascending, then x ascending).
    pub fn active_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .filter(move |&x| self.bit(y * self.width + x))
                .map(move |x| self.coordinate(x as i32, y as i32))
        })
    }

    /// Active cells in row `y` with x inside `[x0, x1]`. Out-of-grid parts count as empty.
    pub fn count_in_row(&self, y: i32, x0: i32, x1: i32) -> usize {
        if y < 0 || y as usize >= self.height {
            return 0;
        }
        let lo = x0.max(0);
        let hi = x1.min(self.width as i32 - 1);
        (lo..=hi)
            .filter(|&x| self.bit(y as usize * self.width + x as usize))
            .count()
    }

    /// Active cells in column `x` with y inside `[y0, y1]`. Out-of-grid parts count as empty.
    pub fn count_in_column(&self, x: i32, y0: i32, y1: i32) -> usize {
        if x < 0 || x as usize >= self.width {
            return 0;
        }
        let lo = y0.max(0);
        let hi = y1.min(self.height as i32 - 1);
        (lo..=hi)
            .filter(|&y| self.bit(y as usize * self.width + x as usize))
            .count()
    }
}

/// Grids are equal when they hold the same bits; the change counter is history.
impl PartialEq for PixelGrid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.words == other.words
    }
}

impl Eq for PixelGrid {}

/// `#` for active cells, `.` for inactive, one line per row.
impl fmt::Display for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = if self.bit(y * self.width + x) { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
