// Bounding-box cropping of a capture grid.
//
// The plain crop keeps exactly the tight box around the active pixels. The
// conditioned crop additionally pads spans that are too thin to give the
// classifier any margin, and erodes sparse stray pixels off the box edges.

use log::debug;

use crate::config::TrimConfig;
use crate::grid::PixelGrid;

/// Inclusive box `[min_x, max_x] x [min_y, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    /// Tight box around the active pixels, `None` for an empty grid.
    pub fn of(grid: &PixelGrid) -> Option<Self> {
        grid.active_coordinates().fold(None, |acc, c| {
            Some(match acc {
                None => Bounds { min_x: c.x, min_y: c.y, max_x: c.x, max_y: c.y },
                Some(b) => Bounds {
                    min_x: b.min_x.min(c.x),
                    min_y: b.min_y.min(c.y),
                    max_x: b.max_x.max(c.x),
                    max_y: b.max_y.max(c.y),
                },
            })
        })
    }

    pub fn span_x(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn span_y(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Width over height, undefined for a box with no vertical extent.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.span_y() != 0).then(|| self.span_x() as f64 / self.span_y() as f64)
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }
}

#[derive(Debug, Clone, Default)]
pub struct Trimmer {
    config: TrimConfig,
}

impl Trimmer {
    pub fn new(config: TrimConfig) -> Self {
        Self { config }
    }

    /// Crops `grid` to its active pixels. With `apply_clutter_filter` the box is
    /// padded when thin and swept for edge clutter when roughly square.
    /// The source is never modified; an empty source yields a 0x0 grid.
    pub fn trim(&self, grid: &PixelGrid, apply_clutter_filter: bool) -> PixelGrid {
        let Some(tight) = Bounds::of(grid) else {
            return PixelGrid::new(0, 0);
        };
        debug!(target: "trim", "tight box {tight:?} in {}x{}", grid.width(), grid.height());

        if !apply_clutter_filter {
            return crop(grid, tight);
        }

        let (min_x, max_x) = self.pad_axis(tight.min_x, tight.max_x, grid.width());
        let (min_y, max_y) = self.pad_axis(tight.min_y, tight.max_y, grid.height());
        let padded = Bounds { min_x, min_y, max_x, max_y };
        if padded != tight {
            debug!(target: "trim", "padded thin box to {padded:?}");
        }

        let bounds = match tight.aspect_ratio() {
            Some(ratio) if (self.config.min_aspect..=self.config.max_aspect).contains(&ratio) => {
                self.remove_clutter(grid, padded, tight)
            }
            ratio => {
                debug!(target: "trim", "aspect ratio {ratio:?} outside range, no clutter sweep");
                padded
            }
        };
        crop(grid, bounds)
    }

    /// Widens `[min, max]` by the padding ratio on both sides when it is thinner
    /// than the thin ratio of `side`, clamped to `[0, side]`.
    fn pad_axis(&self, min: i32, max: i32, side: usize) -> (i32, i32) {
        let side_f = side as f64;
        if ((max - min) as f64) < self.config.thin_ratio * side_f {
            let pad = (self.config.padding_ratio * side_f) as i32;
            let limit = side as i32;
            ((min - pad).clamp(0, limit), (max + pad).clamp(0, limit))
        } else {
            (min, max)
        }
    }

    fn remove_clutter(&self, grid: &PixelGrid, padded: Bounds, tight: Bounds) -> Bounds {
        let total = grid.count_active();
        let box_width = padded.max_x - padded.min_x + 1;
        let box_height = padded.max_y - padded.min_y + 1;

        let column = |x| grid.count_in_column(x, padded.min_y, padded.max_y);
        let row = |y| grid.count_in_row(y, padded.min_x, padded.max_x);

        let swept = Bounds {
            min_x: self.sweep(total, padded.min_x, padded.max_x, tight.span_x(), box_height, column),
            max_x: self.sweep(total, padded.max_x, padded.min_x, tight.span_x(), box_height, column),
            min_y: self.sweep(total, padded.min_y, padded.max_y, tight.span_y(), box_width, row),
            max_y: self.sweep(total, padded.max_y, padded.min_y, tight.span_y(), box_width, row),
        };
        debug!(target: "trim", "clutter sweep {padded:?} -> {swept:?}");

        if swept.min_x > swept.max_x || swept.min_y > swept.max_y {
            return padded;
        }
        swept
    }

    /// Moves one edge from `start` toward `opposite`, line by line, while the
    /// discarded lines stay sparse. Returns the first line that is kept.
    fn sweep(
        &self,
        total: usize,
        start: i32,
        opposite: i32,
        span: i32,
        cross_len: i32,
        count_line: impl Fn(i32) -> usize,
    ) -> i32 {
        let cfg = &self.config;
        let total_limit = total as f64 / cfg.clutter_total_divisor;
        let line_limit = cfg.clutter_line_max.min(cfg.clutter_line_ratio * cross_len as f64);
        let shrink_limit = cfg.clutter_max_shrink * span as f64;
        let step = if opposite >= start { 1 } else { -1 };

        let mut edge = start;
        let mut cumulative = 0;
        let mut advanced = 0;
        while edge != opposite {
            let count = count_line(edge);
            cumulative += count;
            if cumulative as f64 > total_limit
                || count as f64 > line_limit
                || advanced as f64 >= shrink_limit
            {
                break;
            }
            edge += step;
            advanced += 1;
        }
        edge
    }
}

/// Copies the active pixels inside `bounds` into a fresh grid the size of `bounds`.
fn crop(grid: &PixelGrid, bounds: Bounds) -> PixelGrid {
    let width = (bounds.max_x - bounds.min_x + 1) as usize;
    let height = (bounds.max_y - bounds.min_y + 1) as usize;
    let mut out = PixelGrid::new(width, height);
    for c in grid.active_coordinates().filter(|c| bounds.contains(c.x, c.y)) {
        out.mark((c.x - bounds.min_x) as usize, (c.y - bounds.min_y) as usize);
    }
    out
}

/// Crops with the default thresholds.
pub fn trim(grid: &PixelGrid, apply_clutter_filter: bool) -> PixelGrid {
    Trimmer::default().trim(grid, apply_clutter_filter)
}

impl PixelGrid {
    pub fn trim(&self, apply_clutter_filter: bool) -> PixelGrid {
        trim(self, apply_clutter_filter)
    }
}
