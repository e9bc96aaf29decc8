use log::debug;
use serde::Serialize;

use super::cells::{GridSize, PixelGrid};
use crate::raster::surface::Surface;
use crate::PixelError;

/// Classifies grid cells by the share of dark pixels they contain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GridSampler {
    /// A cell is active when its coverage is strictly greater than this fraction.
    ///
    /// `0.0` marks any cell touched by the glyph, anti-aliased edges included. `0.95` only keeps
    /// cells the glyph nearly fills.
    pub coverage_threshold: f32,
    /// Pixels whose red channel is below this value count as dark.
    pub dark_level: u8,
}

impl Default for GridSampler {
    fn default() -> Self {
        Self { coverage_threshold: 0.0, dark_level: 128 }
    }
}

impl GridSampler {
    pub fn with_threshold(coverage_threshold: f32) -> Self {
        Self { coverage_threshold, ..Self::default() }
    }

    /// Sample every cell of `surface` once and return the complete grid.
    pub fn sample<S: Surface + ?Sized>(
        &self,
        surface: &S,
        size: GridSize,
    ) -> Result<PixelGrid, PixelError> {
        if size.is_empty() {
            return Err(PixelError::InvalidDimensions { rows: size.rows, cols: size.cols });
        }

        let (width, height) = surface.dimensions();
        let mut cells = Vec::with_capacity(size.cell_count());

        for row in 0..size.rows {
            let (top, bottom) = cell_span(height, size.rows, row);
            for col in 0..size.cols {
                let (left, right) = cell_span(width, size.cols, col);
                let pixels = surface.read_pixels(left, top, right - left, bottom - top);
                cells.push(self.classify(coverage(&pixels, self.dark_level)));
            }
        }

        let grid = PixelGrid::new(size, cells);
        debug!(
            "sampled {}x{} surface into {}x{} grid, {} active",
            width,
            height,
            size.rows,
            size.cols,
            grid.active_count()
        );
        Ok(grid)
    }

    pub fn classify(&self, coverage: f32) -> bool {
        coverage > self.coverage_threshold
    }
}

/// Pixel range `[start, end)` of cell `index` when `extent` pixels are split into `parts` cells.
///
/// Boundaries are rounded down, so consecutive cells tile the extent exactly even when the cell
/// size is fractional.
pub fn cell_span(extent: u32, parts: u32, index: u32) -> (u32, u32) {
    if parts == 0 {
        return (0, 0);
    }
    let bound = |i: u32| ((u64::from(i) * u64::from(extent)) / u64::from(parts)) as u32;
    (bound(index.min(parts)), bound((index + 1).min(parts)))
}

/// Fraction of dark pixels in an RGBA buffer; zero for an empty buffer.
pub fn coverage(rgba: &[u8], dark_level: u8) -> f32 {
    let total = rgba.len() / 4;
    if total == 0 {
        return 0.0;
    }
    let dark = rgba.chunks_exact(4).filter(|pixel| pixel[0] < dark_level).count();
    dark as f32 / total as f32
}
