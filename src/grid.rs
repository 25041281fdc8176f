use std::fmt;

use crate::canvas::Color;

/// Integer cell coordinate; `x` is the column, `y` the row.
/// Signed so that cells just outside the grid are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

impl Cell {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    Empty,
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Empty => write!(f, "grid has no cells"),
            GridError::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "grid row {row} has {found} cells, expected {expected}"),
        }
    }
}

impl std::error::Error for GridError {}

/// Fixed-size table of cells. `None` is empty space, `Some(color)` a wall
/// carrying its surface color.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Option<Color>>, // row-major
}

impl Grid {
    /// All-empty grid of `cols` x `rows`.
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![None; cols * rows],
        }
    }

    /// Build from a table indexed `[row][col]`. Every row must have the same length.
    pub fn from_rows(table: Vec<Vec<Option<Color>>>) -> Result<Self, GridError> {
        let rows = table.len();
        let cols = table.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(cols * rows);
        for (row, line) in table.into_iter().enumerate() {
            if line.len() != cols {
                return Err(GridError::RaggedRow {
                    row,
                    expected: cols,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }

        Ok(Self { cols, rows, cells })
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// (cols, rows)
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    #[inline]
    pub fn inside(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as u64) < self.cols as u64
            && (cell.y as u64) < self.rows as u64
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        self.inside(cell)
            .then(|| cell.y as usize * self.cols + cell.x as usize)
    }

    /// `None` outside the grid, `Some(None)` for an empty cell.
    #[inline]
    pub fn get(&self, cell: Cell) -> Option<Option<Color>> {
        self.index(cell).map(|i| self.cells[i])
    }

    /// Surface of an occupied in-bounds cell.
    #[inline]
    pub fn surface(&self, cell: Cell) -> Option<Color> {
        self.get(cell).flatten()
    }

    #[inline]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.surface(cell).is_some()
    }

    /// Returns false (and changes nothing) when `cell` is outside the grid.
    pub fn set(&mut self, cell: Cell, value: Option<Color>) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Cell, Color)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, c)| {
            c.map(|color| {
                (
                    Cell::new((i % self.cols) as i64, (i / self.cols) as i64),
                    color,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(7, 8);
        assert_eq!(grid.size(), (7, 8));
        for y in 0..8 {
            for x in 0..7 {
                assert_eq!(grid.get(Cell::new(x, y)), Some(None));
            }
        }
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(3, 2);
        assert!(grid.inside(Cell::new(0, 0)));
        assert!(grid.inside(Cell::new(2, 1)));
        assert!(!grid.inside(Cell::new(3, 0)));
        assert!(!grid.inside(Cell::new(0, 2)));
        assert!(!grid.inside(Cell::new(-1, 0)));
        assert!(!grid.inside(Cell::new(0, -1)));
        assert_eq!(grid.get(Cell::new(-1, -1)), None);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(4, 4);
        assert!(grid.set(Cell::new(1, 2), Some(RED)));
        assert_eq!(grid.surface(Cell::new(1, 2)), Some(RED));
        assert!(grid.is_occupied(Cell::new(1, 2)));
        assert!(!grid.is_occupied(Cell::new(2, 1)));
        assert_eq!(grid.occupied().collect::<Vec<_>>(), vec![(Cell::new(1, 2), RED)]);

        assert!(grid.set(Cell::new(1, 2), None));
        assert!(!grid.is_occupied(Cell::new(1, 2)));
        assert!(!grid.set(Cell::new(4, 0), Some(RED)));
    }

    #[test]
    fn test_from_rows_indexes_row_then_col() {
        let grid = Grid::from_rows(vec![vec![None, Some(RED), None], vec![None, None, None]])
            .unwrap();
        assert_eq!(grid.size(), (3, 2));
        assert!(grid.is_occupied(Cell::new(1, 0)));
        assert!(!grid.is_occupied(Cell::new(0, 1)));
    }

    #[test]
    fn test_from_rows_rejects_bad_tables() {
        assert_eq!(Grid::from_rows(vec![]), Err(GridError::Empty));
        assert_eq!(Grid::from_rows(vec![vec![]]), Err(GridError::Empty));
        assert_eq!(
            Grid::from_rows(vec![vec![None, None], vec![None]]),
            Err(GridError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }
}
