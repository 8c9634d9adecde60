// Core value types shared by the capture engine and the window demo.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Integer grid position that remembers the size of the grid it was made for.
///
/// Equality and hashing only look at `(x, y)`; the remembered size is what
/// makes `valid()`, `neighbors()` and `scale_to()` meaningful.
#[derive(Debug, Clone, Copy)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    width: usize,
    height: usize,
}

impl Coordinate {
    pub fn new(x: i32, y: i32, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// Size of the grid this coordinate belongs to.
    pub fn bounds(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Strict interior: the outermost row and column never count as valid.
    pub fn valid(&self) -> bool {
        self.x > 0
            && self.y > 0
            && (self.x as i64) < self.width as i64
            && (self.y as i64) < self.height as i64
    }

    /// The valid members of the 8-neighborhood, dx outer then dy inner,
    /// both ascending. Each call builds a fresh sequence.
    pub fn neighbors(self) -> impl Iterator<Item = Coordinate> {
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .map(move |(dx, dy)| Coordinate::new(self.x + dx, self.y + dy, self.width, self.height))
            .filter(Coordinate::valid)
    }

    /// Maps this position from its own grid onto a `target_width x target_height` grid:
    /// `floor(x / W * target_width)`, evaluated exactly in integers.
    pub fn scale_to(&self, target_width: usize, target_height: usize) -> Coordinate {
        let sx = scale_axis(self.x, self.width, target_width);
        let sy = scale_axis(self.y, self.height, target_height);
        Coordinate::new(sx, sy, target_width, target_height)
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }
}

fn scale_axis(v: i32, from: usize, to: usize) -> i32 {
    if from == 0 {
        return 0;
    }
    (v as i64 * to as i64).div_euclid(from as i64) as i32
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// One pointer observation delivered by the host, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSample {
    pub x: i32,
    pub y: i32,
    pub primary_down: bool,
}

impl PointerSample {
    pub fn down(x: i32, y: i32) -> Self {
        Self { x, y, primary_down: true }
    }

    pub fn up(x: i32, y: i32) -> Self {
        Self { x, y, primary_down: false }
    }
}

/// What the host feeds a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pointer(PointerSample),
    Reset,
}

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the window is (pixels)
    pub height: usize,     // how tall the window is (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, fill: u32) -> Self {
        Self { width, height, pixels: vec![fill; width * height] }
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}
