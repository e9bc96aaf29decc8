use serde::Serialize;

/// Fixed grid dimensions, known before any sampling starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridSize {
    pub rows: u32,
    pub cols: u32,
}

impl GridSize {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Row-major matrix of active flags produced by one sampling pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PixelGrid {
    rows: u32,
    cols: u32,
    cells: Vec<bool>,
}

impl PixelGrid {
    pub fn new(size: GridSize, cells: Vec<bool>) -> Self {
        assert_eq!(size.cell_count(), cells.len());
        Self { rows: size.rows, cols: size.cols, cells }
    }

    /// Grid with every cell inactive.
    pub fn blank(size: GridSize) -> Self {
        Self::new(size, vec![false; size.cell_count()])
    }

    pub fn size(&self) -> GridSize {
        GridSize::new(self.rows, self.cols)
    }

    pub fn row_count(&self) -> u32 {
        self.rows
    }

    pub fn col_count(&self) -> u32 {
        self.cols
    }

    pub fn is_active(&self, row: u32, col: u32) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.cells[(row * self.cols + col) as usize]
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|&&active| active).count()
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        // `chunks` panics on zero, and a zero-column grid has no rows anyway.
        self.cells.chunks(self.cols.max(1) as usize)
    }

    /// One string per row, `on` for active cells and `off` for the rest.
    pub fn text_rows<'a>(&'a self, on: &'a str, off: &'a str) -> impl Iterator<Item = String> + 'a {
        self.rows()
            .map(move |row| row.iter().map(|&active| if active { on } else { off }).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_grid_has_requested_shape() {
        let grid = PixelGrid::blank(GridSize::new(9, 30));
        assert_eq!(grid.row_count(), 9);
        assert_eq!(grid.col_count(), 30);
        assert_eq!(grid.rows().count(), 9);
        assert!(grid.rows().all(|row| row.len() == 30));
        assert_eq!(grid.active_count(), 0);
    }

    #[test]
    fn lookup_is_row_major() {
        let grid =
            PixelGrid::new(GridSize::new(2, 3), vec![false, true, false, false, false, true]);
        assert!(grid.is_active(0, 1));
        assert!(grid.is_active(1, 2));
        assert!(!grid.is_active(1, 1));
        assert!(!grid.is_active(2, 0));
        assert_eq!(grid.text_rows("#", ".").collect::<Vec<_>>(), vec![".#.", "..#"]);
    }

    #[test]
    #[should_panic]
    fn rejects_mismatched_cells() {
        PixelGrid::new(GridSize::new(2, 2), vec![true; 3]);
    }
}
