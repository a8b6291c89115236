//! Regular latitude/longitude search grid.
//!
//! Cells are addressed by signed row/column offsets from the start point. The grid is
//! never materialised; cells are generated on demand while the search expands.

use serde::Serialize;

use crate::geo::{lon_delta, normalize_lon, GeoPosition};

/// Nodes beyond this latitude are not generated.
pub const MAX_GRID_LAT: f64 = 85.0;

/// Row/column offset of a cell from the start point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridCell {
    pub row: i32,
    pub col: i32,
}

impl GridCell {
    pub const ORIGIN: GridCell = GridCell { row: 0, col: 0 };

    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Search state for one cell. Owned by a single search call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridNode {
    /// Accumulated edge cost from the start.
    pub cost: f64,
    /// Lower bound on the remaining cost to the goal.
    pub heuristic: f64,
    pub parent: Option<GridCell>,
    /// Speed through the water on the edge that reached this node.
    pub speed_kts: f64,
    pub elapsed_hours: f64,
    pub fuel_mt: f64,
    pub distance_nm: f64,
    pub closed: bool,
}

impl GridNode {
    pub fn start(heuristic: f64) -> Self {
        Self {
            cost: 0.0,
            heuristic,
            parent: None,
            speed_kts: 0.0,
            elapsed_hours: 0.0,
            fuel_mt: 0.0,
            distance_nm: 0.0,
            closed: false,
        }
    }
}

/// Grid spanning the start/end box plus a margin.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGrid {
    start: GeoPosition,
    end: GeoPosition,
    lat_step: f64,
    lon_step: f64,
    goal: GridCell,
    min_row: i32,
    max_row: i32,
    min_col: i32,
    max_col: i32,
}

impl SearchGrid {
    /// Anchor a grid on `start` with steps no larger than `resolution_deg`, chosen so
    /// that `end` falls exactly on a node.
    pub fn new(start: GeoPosition, end: GeoPosition, resolution_deg: f64, margin_deg: f64) -> Self {
        let (lat_step, goal_row) = fit_axis(end.lat - start.lat, resolution_deg);
        let (lon_step, goal_col) = fit_axis(lon_delta(start.lon, end.lon), resolution_deg);

        let row_margin = (margin_deg / lat_step).ceil() as i32;
        let col_margin = (margin_deg / lon_step).ceil() as i32;

        Self {
            start,
            end,
            lat_step,
            lon_step,
            goal: GridCell::new(goal_row, goal_col),
            min_row: goal_row.min(0) - row_margin,
            max_row: goal_row.max(0) + row_margin,
            min_col: goal_col.min(0) - col_margin,
            max_col: goal_col.max(0) + col_margin,
        }
    }

    pub fn start_cell(&self) -> GridCell {
        GridCell::ORIGIN
    }

    pub fn goal_cell(&self) -> GridCell {
        self.goal
    }

    pub fn steps(&self) -> (f64, f64) {
        (self.lat_step, self.lon_step)
    }

    /// Upper bound on the number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        let rows = (self.max_row - self.min_row + 1) as usize;
        let cols = (self.max_col - self.min_col + 1) as usize;
        rows * cols
    }

    /// Position of a cell. The start and goal cells return the exact input points.
    pub fn position(&self, cell: GridCell) -> GeoPosition {
        if cell == GridCell::ORIGIN {
            return self.start;
        }
        if cell == self.goal {
            return self.end;
        }
        GeoPosition {
            lat: self.start.lat + f64::from(cell.row) * self.lat_step,
            lon: normalize_lon(self.start.lon + f64::from(cell.col) * self.lon_step),
        }
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        if cell == GridCell::ORIGIN || cell == self.goal {
            return true;
        }
        if !(self.min_row..=self.max_row).contains(&cell.row)
            || !(self.min_col..=self.max_col).contains(&cell.col)
        {
            return false;
        }
        let lat = self.start.lat + f64::from(cell.row) * self.lat_step;
        lat.abs() <= MAX_GRID_LAT
    }

    /// The up to eight in-grid neighbours of `cell`.
    pub fn neighbours(&self, cell: GridCell) -> impl Iterator<Item = GridCell> + '_ {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(move |(d_row, d_col)| GridCell::new(cell.row + d_row, cell.col + d_col))
            .filter(move |candidate| self.contains(*candidate))
    }
}

/// Step size and signed goal offset along one axis.
fn fit_axis(delta: f64, resolution: f64) -> (f64, i32) {
    if delta == 0.0 {
        return (resolution, 0);
    }
    let steps = (delta.abs() / resolution).ceil().max(1.0);
    let step = delta.abs() / steps;
    (step, steps as i32 * delta.signum() as i32)
}
