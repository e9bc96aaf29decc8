use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError, ImageOutputFormat, Rgba, RgbaImage};
use log::debug;
use tempfile::NamedTempFile;

use super::display::{present, DisplayCell, DisplayLayout};
use crate::grid::cells::PixelGrid;
use crate::grid::style::{CellShape, CellStyle};
use crate::PixelError;

const FILE_PREFIX: &str = "pixel-letter-";

/// Paint a grid the way it is displayed: grid-line color behind, one shape per cell.
pub fn render_image(grid: &PixelGrid, style: &CellStyle, layout: &DisplayLayout) -> RgbaImage {
    let mut image =
        RgbaImage::from_pixel(layout.width(), layout.height(), Rgba(style.grid_line.to_rgba()));
    for cell in present(grid, style, layout) {
        paint_cell(&mut image, &cell);
    }
    image
}

fn paint_cell(image: &mut RgbaImage, cell: &DisplayCell) {
    let rect = cell.rect;
    let color = Rgba(cell.color.to_rgba());
    let center_x = rect.x as f32 + rect.width as f32 / 2.0;
    let center_y = rect.y as f32 + rect.height as f32 / 2.0;
    let radius = rect.width.min(rect.height) as f32 / 2.0;

    for y in rect.y..(rect.y + rect.height).min(image.height()) {
        for x in rect.x..(rect.x + rect.width).min(image.width()) {
            let inside = match cell.shape {
                CellShape::Square => true,
                CellShape::Circle => {
                    let dx = x as f32 + 0.5 - center_x;
                    let dy = y as f32 + 0.5 - center_y;
                    dx * dx + dy * dy <= radius * radius
                },
            };
            if inside {
                image.put_pixel(x, y, color);
            }
        }
    }
}

/// PNG bytes of an image.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone()).write_to(&mut bytes, ImageOutputFormat::Png)?;
    Ok(bytes.into_inner())
}

/// `pixel-letter-<text>.png`, keeping letters and digits of any script.
pub fn export_file_name(text: &str) -> String {
    let slug: String = text
        .trim()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '-' })
        .collect();
    let slug = if slug.is_empty() { "blank" } else { slug.as_str() };
    format!("{FILE_PREFIX}{slug}.png")
}

/// Render the grid and write it as PNG into `dir`, named after `text`.
///
/// The image goes to a temporary file in `dir` that is renamed into place once fully written, so
/// a failed export leaves no file behind.
pub fn export_png(
    grid: &PixelGrid,
    style: &CellStyle,
    layout: &DisplayLayout,
    dir: &Path,
    text: &str,
) -> Result<PathBuf, PixelError> {
    let path = dir.join(export_file_name(text));
    let image = render_image(grid, style, layout);
    write_png(&image, dir, &path)
        .map_err(|source| PixelError::ExportFailed { path: path.clone(), source })?;
    debug!("exported {}x{} grid to {}", grid.row_count(), grid.col_count(), path.display());
    Ok(path)
}

fn write_png(image: &RgbaImage, dir: &Path, path: &Path) -> Result<(), ImageError> {
    let bytes = encode_png(image)?;

    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| ImageError::IoError(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::grid::cells::GridSize;
    use crate::grid::style::Rgb;

    fn checker() -> PixelGrid {
        PixelGrid::new(GridSize::new(2, 2), vec![true, false, false, true])
    }

    #[test]
    fn file_names_keep_letters_of_any_script() {
        assert_eq!(export_file_name("A"), "pixel-letter-A.png");
        assert_eq!(export_file_name("א"), "pixel-letter-א.png");
        assert_eq!(export_file_name("a/b c"), "pixel-letter-a-b-c.png");
        assert_eq!(export_file_name("  "), "pixel-letter-blank.png");
    }

    #[test]
    fn image_matches_layout_geometry() {
        let grid = checker();
        let layout = DisplayLayout::new(grid.size(), 100);
        let image = render_image(&grid, &CellStyle::default(), &layout);
        assert_eq!(image.dimensions(), (layout.width(), layout.height()));

        for cell in present(&grid, &CellStyle::default(), &layout) {
            let center = image.get_pixel(
                cell.rect.x + cell.rect.width / 2,
                cell.rect.y + cell.rect.height / 2,
            );
            assert_eq!(center.0, cell.color.to_rgba());
        }
        assert_eq!(image.get_pixel(0, 0).0, Rgb::GRAY_200.to_rgba());
    }

    #[test]
    fn circles_round_off_active_corners() {
        let grid = checker();
        let layout = DisplayLayout::new(grid.size(), 100);
        let rect = layout.cell_rect(0, 0);

        let square = render_image(&grid, &CellStyle::default(), &layout);
        let round_style = CellStyle { shape: CellShape::Circle, ..CellStyle::default() };
        let round = render_image(&grid, &round_style, &layout);

        assert_eq!(square.get_pixel(rect.x, rect.y).0, Rgb::FUCHSIA.to_rgba());
        assert_eq!(round.get_pixel(rect.x, rect.y).0, Rgb::GRAY_200.to_rgba());
        let (cx, cy) = (rect.x + rect.width / 2, rect.y + rect.height / 2);
        assert_eq!(round.get_pixel(cx, cy).0, Rgb::FUCHSIA.to_rgba());
        assert_ne!(square, round);
    }

    #[test]
    fn png_bytes_decode_to_the_same_image() {
        let grid = checker();
        let layout = DisplayLayout::new(grid.size(), 60);
        let rendered = render_image(&grid, &CellStyle::default(), &layout);
        let bytes = encode_png(&rendered).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded, rendered);
    }
}
