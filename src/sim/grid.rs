//! Driveway snow-depth grid
//!
//! Row 0 sits against the house, the last row against the street.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::consts::*;
use crate::{DRIVEWAY, Rect};

/// Spill chance is `1 - SPILL_DRAW` (roughly a third)
const SPILL_DRAW: f32 = 0.68;
/// Fraction of an addition that drifts one row down
const SPILL_FRACTION: f32 = 0.2;
/// Rows averaged for the frenzy check
const TOP_ROWS: usize = 2;

/// A grid cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Row-major grid of snow depths in [0, MAX_SNOW_DEPTH]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowGrid {
    cols: usize,
    rows: usize,
    bounds: Rect,
    depths: Vec<f32>,
}

impl Default for SnowGrid {
    fn default() -> Self {
        Self::driveway()
    }
}

impl SnowGrid {
    /// Grid of at least one cell in each direction
    pub fn new(cols: usize, rows: usize, bounds: Rect, initial_depth: f32) -> Self {
        let (cols, rows) = (cols.max(1), rows.max(1));
        Self {
            cols,
            rows,
            bounds,
            depths: vec![initial_depth.clamp(0.0, MAX_SNOW_DEPTH); cols * rows],
        }
    }

    /// The standard 8x9 driveway, lightly dusted
    pub fn driveway() -> Self {
        Self::new(GRID_COLS, GRID_ROWS, DRIVEWAY, INITIAL_SNOW_DEPTH)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn depths(&self) -> &[f32] {
        &self.depths
    }

    /// Last row, next to the street
    pub fn street_row(&self) -> usize {
        self.rows - 1
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    pub fn depth(&self, cell: Cell) -> f32 {
        self.depths[self.index(cell)]
    }

    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.bounds.width / self.cols as f32,
            self.bounds.height / self.rows as f32,
        )
    }

    /// Map a world point to its cell, `None` outside the driveway
    pub fn world_to_cell(&self, p: Vec2) -> Option<Cell> {
        if !self.bounds.contains(p) {
            return None;
        }
        let local = (p - Vec2::new(self.bounds.x, self.bounds.y)) / self.cell_size();
        Some(self.clamp_cell(local.x.floor() as isize, local.y.floor() as isize))
    }

    /// Column under a world x coordinate, clamped to the grid
    pub fn column_at(&self, x: f32) -> usize {
        let col = ((x - self.bounds.x) / self.cell_size().x).floor() as isize;
        col.clamp(0, self.cols as isize - 1) as usize
    }

    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        let size = self.cell_size();
        Vec2::new(
            self.bounds.x + (cell.col as f32 + 0.5) * size.x,
            self.bounds.y + (cell.row as f32 + 0.5) * size.y,
        )
    }

    pub fn clamp_cell(&self, col: isize, row: isize) -> Cell {
        Cell::new(
            col.clamp(0, self.cols as isize - 1) as usize,
            row.clamp(0, self.rows as isize - 1) as usize,
        )
    }

    /// The 3x3 block around `center`, clamped at the edges
    ///
    /// Edge cells repeat, so a corner gets hit more than once.
    pub fn neighborhood(&self, center: Cell) -> impl Iterator<Item = Cell> + '_ {
        (-1..=1).flat_map(move |dr| {
            (-1..=1).map(move |dc| {
                self.clamp_cell(center.col as isize + dc, center.row as isize + dr)
            })
        })
    }

    /// Add snow to a cell, clamped; sometimes drifts a little into the row below
    pub fn add_snow(&mut self, cell: Cell, amount: f32, rng: &mut impl RandomSource) {
        self.deposit(cell, amount);
        if cell.row + 1 < self.rows && rng.next_unit() > SPILL_DRAW {
            self.deposit(Cell::new(cell.col, cell.row + 1), amount * SPILL_FRACTION);
        }
    }

    /// Add snow to a cell without drift
    pub fn deposit(&mut self, cell: Cell, amount: f32) {
        let i = self.index(cell);
        self.depths[i] = (self.depths[i] + amount).clamp(0.0, MAX_SNOW_DEPTH);
    }

    /// Scoop up to `max_amount` from a cell, returning what was taken
    pub fn remove_at(&mut self, cell: Cell, max_amount: f32) -> f32 {
        let i = self.index(cell);
        let depth = self.depths[i];
        let taken = depth.min(max_amount.max(0.0));
        self.depths[i] = (depth - taken).max(0.0);
        taken
    }

    /// Mean depth of the two rows by the house
    pub fn top_rows_average(&self) -> f32 {
        let count = (TOP_ROWS.min(self.rows) * self.cols).max(1);
        let total: f32 = self.depths[..TOP_ROWS.min(self.rows) * self.cols].iter().sum();
        total / count as f32
    }

    pub fn is_frenzy(&self) -> bool {
        self.top_rows_average() > FRENZY_THRESHOLD
    }

    /// Deepest cell, first in row-major order on ties
    pub fn deepest(&self) -> Option<(Cell, f32)> {
        self.depths
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, &d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((i, d)),
            })
            .map(|(i, d)| (Cell::new(i % self.cols, i / self.cols), d))
    }

    pub fn total(&self) -> f32 {
        self.depths.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{ScriptedRandom, seeded};
    use proptest::prelude::*;

    #[test]
    fn test_empty_dimensions_become_one_cell() {
        let grid = SnowGrid::new(0, 0, DRIVEWAY, 3.0);
        assert_eq!((grid.cols(), grid.rows()), (1, 1));
        assert_eq!(grid.street_row(), 0);
        assert_eq!(grid.depth(Cell::new(0, 0)), 3.0);
    }

    #[test]
    fn test_new_grid_is_uniform() {
        let grid = SnowGrid::driveway();
        assert_eq!(grid.depths().len(), GRID_COLS * GRID_ROWS);
        assert!(grid.depths().iter().all(|&d| d == INITIAL_SNOW_DEPTH));
        assert!((grid.top_rows_average() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_add_snow_clamps_and_spills() {
        let mut grid = SnowGrid::driveway();
        let mut spill = ScriptedRandom::constant(0.9);
        grid.add_snow(Cell::new(3, 2), 20.0, &mut spill);
        assert_eq!(grid.depth(Cell::new(3, 2)), MAX_SNOW_DEPTH);
        assert_eq!(grid.depth(Cell::new(3, 3)), 6.0);

        let mut no_spill = ScriptedRandom::constant(0.1);
        grid.add_snow(Cell::new(0, 0), 1.0, &mut no_spill);
        assert_eq!(grid.depth(Cell::new(0, 0)), 3.0);
        assert_eq!(grid.depth(Cell::new(0, 1)), 2.0);
    }

    #[test]
    fn test_street_row_never_spills() {
        let mut grid = SnowGrid::driveway();
        let row = grid.street_row();
        let mut spill = ScriptedRandom::constant(0.99);
        grid.add_snow(Cell::new(1, row), 1.0, &mut spill);
        assert_eq!(grid.depth(Cell::new(1, row)), 3.0);
        assert!((grid.total() - (2.0 * 72.0 + 1.0)).abs() < 1e-4);
    }

    #[test]
    fn test_remove_at_reports_scoop() {
        let mut grid = SnowGrid::driveway();
        let cell = Cell::new(4, 4);
        assert_eq!(grid.remove_at(cell, 1.25), 1.25);
        assert_eq!(grid.remove_at(cell, 1.25), 0.75);
        assert_eq!(grid.remove_at(cell, 1.25), 0.0);
        assert_eq!(grid.depth(cell), 0.0);
    }

    #[test]
    fn test_world_to_cell_mapping() {
        let grid = SnowGrid::driveway();
        assert_eq!(grid.world_to_cell(Vec2::new(10.0, 300.0)), None);
        assert_eq!(
            grid.world_to_cell(Vec2::new(DRIVEWAY.x, DRIVEWAY.y)),
            Some(Cell::new(0, 0))
        );
        // Far edges clamp into the last cell
        assert_eq!(
            grid.world_to_cell(Vec2::new(DRIVEWAY.right(), DRIVEWAY.bottom())),
            Some(Cell::new(GRID_COLS - 1, GRID_ROWS - 1))
        );
        let cell = Cell::new(5, 6);
        assert_eq!(grid.world_to_cell(grid.cell_center(cell)), Some(cell));
    }

    #[test]
    fn test_neighborhood_clamps_corners() {
        let grid = SnowGrid::driveway();
        let cells: Vec<Cell> = grid.neighborhood(Cell::new(0, 0)).collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells.iter().filter(|c| **c == Cell::new(0, 0)).count(), 4);
    }

    #[test]
    fn test_frenzy_threshold() {
        let mut grid = SnowGrid::driveway();
        for col in 0..GRID_COLS {
            for row in 0..2 {
                grid.deposit(Cell::new(col, row), 2.3);
            }
        }
        assert!(grid.is_frenzy());
        grid.remove_at(Cell::new(0, 0), 10.0);
        assert!(!grid.is_frenzy());
    }

    #[test]
    fn test_deepest_cell() {
        let mut grid = SnowGrid::driveway();
        grid.deposit(Cell::new(6, 7), 3.0);
        assert_eq!(grid.deepest(), Some((Cell::new(6, 7), 5.0)));
    }

    proptest! {
        #[test]
        fn prop_depth_stays_in_bounds(
            ops in proptest::collection::vec(
                (0usize..GRID_COLS, 0usize..GRID_ROWS, -15.0f32..15.0, any::<bool>()),
                1..200
            ),
            seed in any::<u64>()
        ) {
            let mut grid = SnowGrid::driveway();
            let mut rng = seeded(seed);
            for (col, row, amount, add) in ops {
                let cell = Cell::new(col, row);
                if add {
                    grid.add_snow(cell, amount, &mut rng);
                } else {
                    let taken = grid.remove_at(cell, amount);
                    prop_assert!(taken >= 0.0);
                }
                prop_assert!(grid.depths().iter().all(|d| (0.0..=MAX_SNOW_DEPTH).contains(d)));
            }
        }
    }
}
