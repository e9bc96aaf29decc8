use crate::grid::cells::GridSize;
use crate::raster::layout::{TextAlign, TextBaseline};
use crate::RenderRequest;

/// The 22 base letters of the Hebrew alphabet, in order.
pub const HEBREW_ALPHABET: [char; 22] = [
    'א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט', 'י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ', 'ק',
    'ר', 'ש', 'ת',
];

/// Canvas, glyph and grid settings for the two kinds of pixel art.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    /// One glyph on a square canvas sampled into 9x9 cells.
    #[default]
    Letter,
    /// A word on a wide canvas sampled into 9x30 cells.
    Word,
}

impl Preset {
    pub fn grid_size(self) -> GridSize {
        match self {
            Preset::Letter => GridSize::new(9, 9),
            Preset::Word => GridSize::new(9, 30),
        }
    }

    /// Width of the displayed or exported grid in pixels.
    pub fn display_width(self) -> u32 {
        match self {
            Preset::Letter => 360,
            Preset::Word => 720,
        }
    }

    pub fn font_family(self) -> &'static str {
        match self {
            Preset::Letter => "sans-serif",
            Preset::Word => "Heebo, Arial Hebrew, sans-serif",
        }
    }

    pub fn request(self, text: impl Into<String>) -> RenderRequest {
        let (canvas_width, canvas_height, glyph_size_px, baseline_offset_px) = match self {
            Preset::Letter => (360, 360, 400.0, 60.0),
            Preset::Word => (720, 216, 350.0, 50.0),
        };

        RenderRequest {
            text: text.into(),
            font_family: self.font_family().to_owned(),
            canvas_width,
            canvas_height,
            glyph_size_px,
            baseline_offset_px,
            text_align: TextAlign::Center,
            text_baseline: TextBaseline::Middle,
            ..RenderRequest::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_cells_are_square() {
        for preset in [Preset::Letter, Preset::Word] {
            let request = preset.request("x");
            let size = preset.grid_size();
            assert_eq!(request.canvas_width / size.cols, request.canvas_height / size.rows);
            assert_eq!(request.canvas_width % size.cols, 0);
            assert_eq!(request.canvas_height % size.rows, 0);
        }
    }

    #[test]
    fn alphabet_is_hebrew_block() {
        assert!(HEBREW_ALPHABET.iter().all(|ch| ('\u{05d0}'..='\u{05ea}').contains(ch)));
        assert_eq!(HEBREW_ALPHABET.first(), Some(&'א'));
        assert_eq!(HEBREW_ALPHABET.last(), Some(&'ת'));
    }
}
