//! Rectangular grid of weather samples
//!
//! Cells are stored row-major. A cell is either a [`WeatherSample`] or
//! explicitly missing (`None`) when the fetch for that grid point failed;
//! missing cells are skipped by every scan and never read as zero.

use crate::core_types::WeatherSample;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// (row, column) index into a [`WeatherGrid`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    /// Row index (0 = first row)
    pub row: usize,
    /// Column index (0 = first column)
    pub col: usize,
}

impl GridCoord {
    /// Create a coordinate
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// 8-connected neighbour offsets, row-major
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Geographic bounding box in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Northern latitude
    pub north: f64,
    /// Southern latitude
    pub south: f64,
    /// Western longitude
    pub west: f64,
    /// Eastern longitude
    pub east: f64,
}

impl GeoBounds {
    /// Bounding box covering Great Britain and its offshore wind zones
    pub const UK: GeoBounds = GeoBounds {
        north: 59.0,
        south: 49.5,
        west: -8.0,
        east: 2.0,
    };

    /// Evenly spaced `grid_size × grid_size` lattice of (lat, lon) points.
    ///
    /// Rows run south to north, columns west to east, matching the order in
    /// which grid points are fetched. A `grid_size` of 1 yields the south-west
    /// corner only.
    #[must_use]
    pub fn grid_points(&self, grid_size: usize) -> Vec<(f64, f64)> {
        let lats = linspace(self.south, self.north, grid_size);
        let lons = linspace(self.west, self.east, grid_size);
        lats.iter()
            .flat_map(|&lat| lons.iter().map(move |&lon| (lat, lon)))
            .collect()
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Row-major rectangular arrangement of optional weather samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid", into = "RawGrid")]
pub struct WeatherGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<WeatherSample>>,
}

impl WeatherGrid {
    /// Build a grid from row-major cells.
    ///
    /// # Errors
    /// [`AnalysisError::Configuration`] when either dimension is zero or the
    /// cell count does not equal `rows * cols`.
    pub fn new(rows: usize, cols: usize, cells: Vec<Option<WeatherSample>>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(AnalysisError::configuration(format!(
                "malformed grid dimensions {rows}x{cols}"
            )));
        }
        let Some(expected) = rows.checked_mul(cols) else {
            return Err(AnalysisError::configuration(format!(
                "malformed grid dimensions {rows}x{cols}: cell count overflows"
            )));
        };
        if cells.len() != expected {
            return Err(AnalysisError::configuration(format!(
                "malformed grid: {rows}x{cols} needs {expected} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self { rows, cols, cells })
    }

    /// Build a grid from nested rows.
    ///
    /// # Errors
    /// [`AnalysisError::Configuration`] when there are no rows, the first row
    /// is empty, or the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<Option<WeatherSample>>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(AnalysisError::configuration(format!(
                "malformed grid: row {i} has {} cells, expected {n_cols}",
                row.len()
            )));
        }
        Self::new(n_rows, n_cols, rows.into_iter().flatten().collect())
    }

    /// Number of rows
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Sample at a coordinate, `None` if out of range or missing
    #[must_use]
    pub fn get(&self, coord: GridCoord) -> Option<&WeatherSample> {
        if coord.row >= self.rows || coord.col >= self.cols {
            return None;
        }
        self.cells[coord.row * self.cols + coord.col].as_ref()
    }

    /// Number of cells holding a sample
    #[must_use]
    pub fn populated_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Populated cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (GridCoord, &WeatherSample)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref()
                .map(|s| (GridCoord::new(i / self.cols, i % self.cols), s))
        })
    }

    /// True when the cell has a full ring of 8 in-bounds positions around it
    #[must_use]
    pub fn is_interior(&self, coord: GridCoord) -> bool {
        coord.row > 0 && coord.col > 0 && coord.row + 1 < self.rows && coord.col + 1 < self.cols
    }

    /// The 8-connected neighbour positions that fall inside the grid, each
    /// paired with its sample (`None` if missing)
    pub fn neighbors8(
        &self,
        coord: GridCoord,
    ) -> impl Iterator<Item = (GridCoord, Option<&WeatherSample>)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let row = coord.row.checked_add_signed(dr)?;
            let col = coord.col.checked_add_signed(dc)?;
            if row >= self.rows || col >= self.cols {
                return None;
            }
            let n = GridCoord::new(row, col);
            Some((n, self.get(n)))
        })
    }

    /// Every horizontally or vertically adjacent pair of populated cells,
    /// each pair once: row-major, right neighbour before the one below
    pub fn adjacent_pairs(
        &self,
    ) -> impl Iterator<Item = ((GridCoord, &WeatherSample), (GridCoord, &WeatherSample))> + '_ {
        self.iter_cells().flat_map(move |(coord, sample)| {
            [
                GridCoord::new(coord.row, coord.col + 1),
                GridCoord::new(coord.row + 1, coord.col),
            ]
            .into_iter()
            .filter_map(move |n| self.get(n).map(|other| ((coord, sample), (n, other))))
        })
    }

    /// Fail unless the grid is at least `min_size × min_size` and holds at
    /// least `min_size²` samples.
    ///
    /// # Errors
    /// [`AnalysisError::Configuration`] ("grid too small").
    pub fn ensure_min_size(&self, min_size: usize) -> Result<()> {
        if self.rows < min_size || self.cols < min_size {
            return Err(AnalysisError::configuration(format!(
                "grid too small: {}x{}, need at least {min_size}x{min_size}",
                self.rows, self.cols
            )));
        }
        let populated = self.populated_count();
        if populated < min_size * min_size {
            return Err(AnalysisError::configuration(format!(
                "grid too small: {populated} populated cells, need at least {}",
                min_size * min_size
            )));
        }
        Ok(())
    }
}

/// Serialized form: dimensions plus flat row-major cells
#[derive(Serialize, Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<WeatherSample>>,
}

impl TryFrom<RawGrid> for WeatherGrid {
    type Error = AnalysisError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        WeatherGrid::new(raw.rows, raw.cols, raw.cells)
    }
}

impl From<WeatherGrid> for RawGrid {
    fn from(grid: WeatherGrid) -> Self {
        RawGrid {
            rows: grid.rows,
            cols: grid.cols,
            cells: grid.cells,
        }
    }
}
