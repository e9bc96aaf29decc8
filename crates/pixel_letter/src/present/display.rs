use serde::Serialize;

use crate::grid::cells::{GridSize, PixelGrid};
use crate::grid::style::{CellShape, CellStyle, Rgb};

/// Padding around the grid and gap between cells, in pixels.
pub const DEFAULT_GAP: u32 = 2;

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Physical geometry of a displayed grid: fixed width, square cells, uniform gaps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DisplayLayout {
    size: GridSize,
    width: u32,
    padding: u32,
    gap: u32,
    cell: f32,
}

impl DisplayLayout {
    /// Layout `width` pixels wide with the default padding and gap.
    pub fn new(size: GridSize, width: u32) -> Self {
        Self::with_spacing(size, width, DEFAULT_GAP, DEFAULT_GAP)
    }

    pub fn with_spacing(size: GridSize, width: u32, padding: u32, gap: u32) -> Self {
        let cols = size.cols.max(1);
        let chrome = 2 * padding + gap * (cols - 1);
        let cell = width.saturating_sub(chrome) as f32 / cols as f32;
        Self { size, width, padding, gap, cell }
    }

    pub fn grid_size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height implied by square cells.
    pub fn height(&self) -> u32 {
        let rows = self.size.rows.max(1);
        2 * self.padding + self.gap * (rows - 1) + self.offset(rows)
    }

    pub fn cell_rect(&self, row: u32, col: u32) -> CellRect {
        let x = self.padding + col * self.gap + self.offset(col);
        let y = self.padding + row * self.gap + self.offset(row);
        CellRect {
            x,
            y,
            width: self.offset(col + 1) - self.offset(col),
            height: self.offset(row + 1) - self.offset(row),
        }
    }

    /// Pixels taken by the first `index` cells along an axis, gaps excluded.
    fn offset(&self, index: u32) -> u32 {
        (index as f32 * self.cell).round() as u32
    }
}

/// One cell of a presented grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayCell {
    pub row: u32,
    pub col: u32,
    pub active: bool,
    pub rect: CellRect,
    pub color: Rgb,
    pub shape: CellShape,
}

/// Map a grid onto colored cells in row-major order.
pub fn present(grid: &PixelGrid, style: &CellStyle, layout: &DisplayLayout) -> Vec<DisplayCell> {
    let size = grid.size();
    let mut cells = Vec::with_capacity(size.cell_count());
    for row in 0..size.rows {
        for col in 0..size.cols {
            let active = grid.is_active(row, col);
            cells.push(DisplayCell {
                row,
                col,
                active,
                rect: layout.cell_rect(row, col),
                color: style.color_for(active),
                shape: style.shape,
            });
        }
    }
    cells
}

/// Grid rows as 24-bit ANSI colored text, two terminal columns per cell.
pub fn ansi_rows<'a>(
    grid: &'a PixelGrid,
    style: &'a CellStyle,
) -> impl Iterator<Item = String> + 'a {
    let glyph = match style.shape {
        CellShape::Square => "██",
        CellShape::Circle => "● ",
    };
    let back = style.grid_line;

    grid.rows().map(move |row| {
        let mut line = String::new();
        for &active in row {
            let fore = style.color_for(active);
            line.push_str(&format!(
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{glyph}",
                fore.r(),
                fore.g(),
                fore.b(),
                back.r(),
                back.g(),
                back.b()
            ));
        }
        line.push_str("\x1b[0m");
        line
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_layout_fills_its_width() {
        let layout = DisplayLayout::new(GridSize::new(9, 9), 360);
        let last = layout.cell_rect(8, 8);
        assert_eq!(last.x + last.width + DEFAULT_GAP, 360);
        assert_eq!(layout.height(), 360);
        assert_eq!(layout.cell_rect(0, 0), CellRect { x: 2, y: 2, width: 38, height: 38 });
    }

    #[test]
    fn word_layout_keeps_square_cells() {
        let layout = DisplayLayout::new(GridSize::new(9, 30), 720);
        let last = layout.cell_rect(8, 29);
        assert_eq!(last.x + last.width + DEFAULT_GAP, 720);
        assert_eq!(last.y + last.height + DEFAULT_GAP, layout.height());
        assert!((216..=218).contains(&layout.height()));
    }

    #[test]
    fn cells_do_not_overlap() {
        let layout = DisplayLayout::new(GridSize::new(4, 7), 101);
        for col in 0..6 {
            let left = layout.cell_rect(0, col);
            let right = layout.cell_rect(0, col + 1);
            assert_eq!(left.x + left.width + DEFAULT_GAP, right.x);
        }
    }

    #[test]
    fn presentation_is_row_major_with_style_colors() {
        let grid = PixelGrid::new(GridSize::new(2, 2), vec![true, false, false, true]);
        let style = CellStyle { shape: CellShape::Circle, ..CellStyle::default() };
        let cells = present(&grid, &style, &DisplayLayout::new(grid.size(), 100));
        let order: Vec<_> = cells.iter().map(|cell| (cell.row, cell.col)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(cells[0].color, style.active);
        assert_eq!(cells[1].color, style.background);
        assert!(cells.iter().all(|cell| cell.shape == CellShape::Circle));
    }

    #[test]
    fn ansi_rows_cover_every_cell() {
        let grid = PixelGrid::new(GridSize::new(1, 3), vec![true, false, true]);
        let rows: Vec<_> = ansi_rows(&grid, &CellStyle::default()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].matches("██").count(), 3);
        assert!(rows[0].contains("\x1b[38;2;217;70;239m"));
        assert!(rows[0].ends_with("\x1b[0m"));
    }
}
