use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("{axis} boundaries are empty")]
    Empty { axis: &'static str },
    #[error("{axis} boundary {index} is {value}, outside [0, 1]")]
    OutOfRange { axis: &'static str, index: usize, value: f64 },
    #[error("{axis} boundaries decrease at index {index}")]
    NotMonotonic { axis: &'static str, index: usize },
    #[error("{axis} boundaries must start at 0.0 and end at 1.0")]
    MissingEndpoint { axis: &'static str },
    #[error("cell for group {group} references boundaries outside the grid")]
    CellOutOfBounds { group: usize },
    #[error("group {group} does not exist, window has {groups} groups")]
    NoSuchGroup { group: usize, groups: usize },
}

/// A group's rectangle, as indices into the column and row boundaries.
///
/// Serialized as `[x1, y1, x2, y2]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 4]", into = "[usize; 4]")]
pub struct Cell {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl Cell {
    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self { Cell { x1, y1, x2, y2 } }
}

impl From<[usize; 4]> for Cell {
    fn from([x1, y1, x2, y2]: [usize; 4]) -> Self { Cell { x1, y1, x2, y2 } }
}

impl From<Cell> for [usize; 4] {
    fn from(cell: Cell) -> Self { [cell.x1, cell.y1, cell.x2, cell.y2] }
}

/// Grid geometry of a window: boundary fractions for each axis plus one cell
/// per group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowLayout {
    pub cols: Vec<f64>,
    pub rows: Vec<f64>,
    pub cells: Vec<Cell>,
}

impl WindowLayout {
    /// A single group filling the whole window.
    pub fn single() -> Self {
        WindowLayout {
            cols: vec![0.0, 1.0],
            rows: vec![0.0, 1.0],
            cells: vec![Cell::new(0, 0, 1, 1)],
        }
    }

    /// `n` groups side by side, evenly sized.
    pub fn columns(n: usize) -> Self {
        let n = n.max(1);
        WindowLayout {
            cols: distribute(n + 1),
            rows: vec![0.0, 1.0],
            cells: (0..n).map(|i| Cell::new(i, 0, i + 1, 1)).collect(),
        }
    }

    /// `n` groups stacked vertically, evenly sized.
    pub fn rows(n: usize) -> Self {
        let n = n.max(1);
        WindowLayout {
            cols: vec![0.0, 1.0],
            rows: distribute(n + 1),
            cells: (0..n).map(|i| Cell::new(0, i, 1, i + 1)).collect(),
        }
    }

    pub fn num_groups(&self) -> usize { self.cells.len() }

    pub fn cell(&self, group: usize) -> Result<Cell, LayoutError> {
        self.cells.get(group).copied().ok_or(LayoutError::NoSuchGroup {
            group,
            groups: self.cells.len(),
        })
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        validate_axis("cols", &self.cols)?;
        validate_axis("rows", &self.rows)?;
        for (group, cell) in self.cells.iter().enumerate() {
            if cell.x1 > cell.x2
                || cell.y1 > cell.y2
                || cell.x2 >= self.cols.len()
                || cell.y2 >= self.rows.len()
            {
                return Err(LayoutError::CellOutOfBounds { group });
            }
        }
        Ok(())
    }

    /// Collapses the grid so that `group`'s cell spans the whole window.
    ///
    /// Every boundary before the cell's right (bottom) edge moves to 0.0 and
    /// every other boundary to 1.0. Cells are untouched, so the other groups
    /// keep existing with zero extent.
    pub fn maximized(&self, group: usize) -> Result<WindowLayout, LayoutError> {
        let cell = self.cell(group)?;
        if cell.x2 >= self.cols.len() || cell.y2 >= self.rows.len() {
            return Err(LayoutError::CellOutOfBounds { group });
        }
        let collapse = |len: usize, edge: usize| -> Vec<f64> {
            (0..len).map(|i| if i < edge { 0.0 } else { 1.0 }).collect()
        };
        Ok(WindowLayout {
            cols: collapse(self.cols.len(), cell.x2),
            rows: collapse(self.rows.len(), cell.y2),
            cells: self.cells.clone(),
        })
    }

    /// Same cells, with boundaries spread evenly along each axis.
    pub fn distributed(&self) -> WindowLayout {
        WindowLayout {
            cols: distribute(self.cols.len()),
            rows: distribute(self.rows.len()),
            cells: self.cells.clone(),
        }
    }

    /// Whether the grid has collapsed onto a single visible cell.
    ///
    /// Only a heuristic: it is used when no saved layout says otherwise.
    pub fn looks_maximized(&self) -> bool {
        if self.num_groups() <= 1 {
            return false;
        }
        let mut seen_zero = false;
        let mut seen_one = false;
        for &value in self.cols.iter().chain(self.rows.iter()) {
            if value == 0.0 {
                seen_zero = true;
            } else if value == 1.0 {
                seen_one = true;
            } else {
                return false;
            }
        }
        seen_zero && seen_one
    }
}

fn validate_axis(axis: &'static str, values: &[f64]) -> Result<(), LayoutError> {
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        return Err(LayoutError::Empty { axis });
    };
    for (index, &value) in values.iter().enumerate() {
        if !(0.0..=1.0).contains(&value) {
            return Err(LayoutError::OutOfRange { axis, index, value });
        }
        if index > 0 && value < values[index - 1] {
            return Err(LayoutError::NotMonotonic { axis, index });
        }
    }
    if first != 0.0 || last != 1.0 {
        return Err(LayoutError::MissingEndpoint { axis });
    }
    Ok(())
}

/// `len` evenly spaced boundaries from 0.0 to 1.0.
///
/// A single boundary has no span to divide and comes back as `[0.0]`.
pub fn distribute(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let last = (len - 1) as f64;
            (0..len).map(|i| i as f64 / last).collect()
        }
    }
}
