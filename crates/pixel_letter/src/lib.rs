mod grid;
mod present;
mod preset;
mod raster;

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

pub use grid::{
    cells::{GridSize, PixelGrid},
    sampler::{cell_span, coverage, GridSampler},
    style::{CellShape, CellStyle, ColorParseError, Rgb},
};
pub use present::{
    display::{ansi_rows, present, CellRect, DisplayCell, DisplayLayout, DEFAULT_GAP},
    export::{encode_png, export_file_name, export_png, render_image},
};
pub use preset::{Preset, HEBREW_ALPHABET};
pub use raster::{
    font::{FontCatalog, FontFileError},
    layout::{visual_order, TextAlign, TextBaseline},
    rasterize_onto,
    surface::{ImageSurface, Surface},
};

#[derive(Debug, thiserror::Error)]
pub enum PixelError {
    #[error("rendering unavailable: {0}")]
    RenderUnavailable(String),
    #[error("invalid grid dimensions {rows}x{cols}, rows and columns must be at least 1")]
    InvalidDimensions { rows: u32, cols: u32 },
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
    #[error("failed to export grid image to {}", path.display())]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Everything needed to rasterize one string. Immutable for the duration of a render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderRequest {
    pub text: String,
    /// CSS style family list, most preferred first.
    pub font_family: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Em size of the font in pixels.
    pub glyph_size_px: f32,
    pub baseline_offset_px: f32,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    /// Requested weight, 100 to 900.
    pub font_weight: u16,
    /// Text color on the offscreen canvas.
    pub ink: Rgb,
    /// Canvas color behind the text. Independent of the displayed cell background.
    pub raster_background: Rgb,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "sans-serif".into(),
            canvas_width: 360,
            canvas_height: 360,
            glyph_size_px: 400.0,
            baseline_offset_px: 60.0,
            text_align: TextAlign::Center,
            text_baseline: TextBaseline::Middle,
            font_weight: 700,
            ink: Rgb::BLACK,
            raster_background: Rgb::WHITE,
        }
    }
}

/// Result of a render pass, with what is needed to display or export it again.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderOutput {
    pub grid: PixelGrid,
    pub request: RenderRequest,
    pub style: CellStyle,
}

impl RenderOutput {
    pub fn present(&self, layout: &DisplayLayout) -> Vec<DisplayCell> {
        present(&self.grid, &self.style, layout)
    }

    pub fn export_png(&self, layout: &DisplayLayout, dir: &Path) -> Result<PathBuf, PixelError> {
        export_png(&self.grid, &self.style, layout, dir, &self.request.text)
    }
}

/// Rasterize-then-sample pipeline.
#[derive(Clone, Debug)]
pub struct PixelRenderer {
    catalog: FontCatalog,
    sampler: GridSampler,
}

impl Default for PixelRenderer {
    fn default() -> Self {
        Self::new(FontCatalog::embedded())
    }
}

impl PixelRenderer {
    pub fn new(catalog: FontCatalog) -> Self {
        Self { catalog, sampler: GridSampler::default() }
    }

    pub fn with_sampler(mut self, sampler: GridSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn catalog(&self) -> &FontCatalog {
        &self.catalog
    }

    pub fn sampler(&self) -> &GridSampler {
        &self.sampler
    }

    /// Rasterize `request`, sample it into `size` cells and attach `style`.
    pub fn render(
        &self,
        request: &RenderRequest,
        size: GridSize,
        style: CellStyle,
    ) -> Result<RenderOutput, PixelError> {
        validate(request, size)?;
        let mut surface = ImageSurface::new(
            request.canvas_width,
            request.canvas_height,
            request.raster_background,
        );
        let grid = self.render_with(&mut surface, request, size)?;
        Ok(RenderOutput { grid, request: request.clone(), style })
    }

    /// Same pass on a caller provided surface. The request's canvas size is ignored in favor of
    /// the surface's own dimensions.
    pub fn render_with<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        request: &RenderRequest,
        size: GridSize,
    ) -> Result<PixelGrid, PixelError> {
        if size.is_empty() {
            return Err(PixelError::InvalidDimensions { rows: size.rows, cols: size.cols });
        }
        let (width, height) = surface.dimensions();
        if width == 0 || height == 0 {
            return Err(PixelError::InvalidCanvas { width, height });
        }

        let font = self.catalog.resolve(&request.font_family, request.font_weight)?;
        rasterize_onto(surface, request, &font);
        let grid = self.sampler.sample(surface, size)?;

        debug!(
            "rendered {:?} into {}x{} grid with {} active cells",
            request.text,
            size.rows,
            size.cols,
            grid.active_count()
        );
        Ok(grid)
    }

    /// Only the rasterize stage, for inspecting the offscreen canvas.
    pub fn rasterize(&self, request: &RenderRequest) -> Result<ImageSurface, PixelError> {
        validate(request, GridSize::new(1, 1))?;
        let font = self.catalog.resolve(&request.font_family, request.font_weight)?;
        let mut surface = ImageSurface::new(
            request.canvas_width,
            request.canvas_height,
            request.raster_background,
        );
        rasterize_onto(&mut surface, request, &font);
        Ok(surface)
    }
}

fn validate(request: &RenderRequest, size: GridSize) -> Result<(), PixelError> {
    if size.is_empty() {
        return Err(PixelError::InvalidDimensions { rows: size.rows, cols: size.cols });
    }
    if request.canvas_width == 0 || request.canvas_height == 0 {
        return Err(PixelError::InvalidCanvas {
            width: request.canvas_width,
            height: request.canvas_height,
        });
    }
    Ok(())
}
