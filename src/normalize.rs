// Density-weighted downsampling of a trimmed grid to a fixed feature size.
//
// Each source pixel votes for the target cell it scales onto. A target cell
// lights up when its vote count is strong relative to the average populated
// cell, or moderately strong and backed by populated neighbors.

use log::debug;

use crate::config::NormalizeConfig;
use crate::grid::PixelGrid;

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Normalizes to the configured target size.
    pub fn normalize(&self, grid: &PixelGrid) -> PixelGrid {
        self.normalize_to(grid, self.config.width, self.config.height)
    }

    pub fn normalize_to(&self, grid: &PixelGrid, width: usize, height: usize) -> PixelGrid {
        if grid.size() == (width, height) {
            return grid.clone();
        }
        let mut out = PixelGrid::new(width, height);
        if grid.is_empty() || width == 0 || height == 0 {
            return out;
        }

        let density = density_map(grid, width, height);
        let populated: Vec<u32> = density.iter().copied().filter(|&d| d > 0).collect();
        let average = if populated.is_empty() {
            0.0
        } else {
            populated.iter().map(|&d| d as f64).sum::<f64>() / populated.len() as f64
        };
        debug!(
            target: "normalize",
            "{}x{} -> {width}x{height}: {} populated cells, average density {average:.2}",
            grid.width(),
            grid.height(),
            populated.len()
        );

        let strong = self.config.strong_ratio * average;
        let weak = self.config.weak_ratio * average;
        for y in 0..height {
            for x in 0..width {
                let d = density[y * width + x] as f64;
                let neighbors = out
                    .coordinate(x as i32, y as i32)
                    .neighbors()
                    .filter(|n| density[n.y as usize * width + n.x as usize] > 0)
                    .count();
                if d >= strong || (d >= weak && neighbors > self.config.min_neighbors) {
                    out.mark(x, y);
                }
            }
        }
        out
    }
}

/// How many source pixels land on each target cell, row-major.
pub fn density_map(grid: &PixelGrid, width: usize, height: usize) -> Vec<u32> {
    let mut density = vec![0u32; width * height];
    if density.is_empty() {
        return density;
    }
    for c in grid.active_coordinates() {
        let t = c.scale_to(width, height);
        density[t.y as usize * width + t.x as usize] += 1;
    }
    density
}

/// Normalizes with the default thresholds.
pub fn normalize(grid: &PixelGrid, width: usize, height: usize) -> PixelGrid {
    Normalizer::default().normalize_to(grid, width, height)
}

impl PixelGrid {
    pub fn normalize(&self, width: usize, height: usize) -> PixelGrid {
        normalize(self, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(width: usize, height: usize) -> PixelGrid {
        let cells = (0..height as i32).flat_map(|y| (0..width as i32).map(move |x| (x, y)));
        PixelGrid::from_coordinates(width, height, cells).unwrap()
    }

    fn active(grid: &PixelGrid) -> Vec<(i32, i32)> {
        grid.active_coordinates().map(|c| (c.x, c.y)).collect()
    }

    #[test]
    fn same_size_passes_through() {
        let grid = PixelGrid::from_coordinates(10, 10, [(0, 0), (9, 9), (4, 5)]).unwrap();
        let out = grid.normalize(10, 10);
        assert_eq!(active(&out), active(&grid));
    }

    #[test]
    fn empty_source_gives_empty_target() {
        let out = PixelGrid::new(37, 12).normalize(10, 10);
        assert_eq!(out.size(), (10, 10));
        assert!(out.is_empty());

        let out = PixelGrid::new(0, 0).normalize(10, 10);
        assert_eq!(out.size(), (10, 10));
        assert!(out.is_empty());
    }

    #[test]
    fn small_full_grid_spreads_out() {
        let out = full(4, 4).normalize(10, 10);
        // x,y in 0..4 land on 0, 2, 5, 7.
        let spots = [0, 2, 5, 7];
        let expected: Vec<(i32, i32)> = spots
            .iter()
            .flat_map(|&y| spots.iter().map(move |&x| (x, y)))
            .collect();
        assert_eq!(active(&out), expected);
    }

    #[test]
    fn large_full_grid_fills_target() {
        // 20x20 onto 10x10: four pixels per cell, all equal to the average.
        let grid = full(20, 20);
        let density = density_map(&grid, 10, 10);
        assert!(density.iter().all(|&d| d == 4));
        assert_eq!(grid.normalize(10, 10).count_active(), 100);
    }

    #[test]
    fn non_square_source() {
        let out = full(30, 5).normalize(10, 10);
        assert_eq!(out.size(), (10, 10));
        // Rows 0, 2, 4, 6, 8 get votes; every column does.
        assert_eq!(out.count_active(), 50);
        assert!(out.get(9, 8).unwrap());
        assert!(!out.get(9, 9).unwrap());
    }

    #[test_log::test]
    fn isolated_faint_cell_is_dropped() {
        // A dense 10x10 block maps onto target (0..5, 0..5) with density 4 each.
        // One stray pixel far away gives a density-1 cell with no neighbors.
        let mut grid = PixelGrid::new(20, 20);
        for y in 0..10 {
            for x in 0..10 {
                grid.set(x, y, true).unwrap();
            }
        }
        grid.set(17, 17, true).unwrap();

        let out = grid.normalize(10, 10);
        assert_eq!(out.count_active(), 25);
        assert!(!out.get(8, 8).unwrap());
    }

    #[test]
    fn faint_cell_with_neighbors_is_kept() {
        // Target row 2 gets densities 4,4,4,2 and cell (3,3) gets 2.
        // average = 16/5 = 3.2, so 2 misses the strong cut (2.24) but clears
        // the weak one (1.12), and both faint cells have two or more populated neighbors.
        let mut grid = PixelGrid::new(20, 20);
        for x in 2..8 {
            grid.set(x, 4, true).unwrap();
            grid.set(x, 5, true).unwrap();
        }
        grid.set(8, 4, true).unwrap();
        grid.set(8, 5, true).unwrap();
        grid.set(6, 6, true).unwrap();
        grid.set(7, 6, true).unwrap();

        let density = density_map(&grid, 10, 10);
        assert_eq!(&density[20..25], &[0, 4, 4, 4, 2]);
        assert_eq!(density[33], 2);

        let out = grid.normalize(10, 10);
        assert_eq!(active(&out), vec![(1, 2), (2, 2), (3, 2), (4, 2), (3, 3)]);
    }

    #[test]
    fn faint_cell_with_one_neighbor_is_dropped() {
        let mut grid = PixelGrid::new(20, 20);
        for x in 2..8 {
            grid.set(x, 4, true).unwrap();
            grid.set(x, 5, true).unwrap();
        }
        grid.set(8, 4, true).unwrap();
        grid.set(8, 5, true).unwrap();
        // average 3.5: cell (4,2) at 2 has only (3,2) beside it.
        let out = grid.normalize(10, 10);
        assert_eq!(active(&out), vec![(1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn custom_thresholds() {
        let strict = Normalizer::new(NormalizeConfig {
            strong_ratio: 1.5,
            weak_ratio: 1.5,
            ..NormalizeConfig::default()
        });
        let mut grid = PixelGrid::new(20, 20);
        for x in 2..8 {
            grid.set(x, 4, true).unwrap();
            grid.set(x, 5, true).unwrap();
        }
        grid.set(8, 4, true).unwrap();
        // densities 4,4,4,1 -> average 3.25 -> threshold 4.875: nothing survives.
        assert!(strict.normalize(&grid).is_empty());
    }

    #[test]
    fn zero_sized_target_is_empty() {
        let grid = PixelGrid::from_coordinates(5, 5, [(2, 2)]).unwrap();
        for (w, h) in [(0, 10), (10, 0), (0, 0)] {
            let out = grid.normalize(w, h);
            assert_eq!(out.size(), (w, h));
            assert!(out.is_empty());
        }
        assert!(density_map(&grid, 0, 10).is_empty());
    }
}
