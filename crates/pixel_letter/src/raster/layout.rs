use ab_glyph::{point, Font, Glyph, Point, PxScale, ScaleFont};
use serde::Serialize;
use unicode_bidi::{bidi_class, BidiClass, BidiInfo};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Advance width centered on the horizontal midpoint of the canvas.
    #[default]
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    /// Middle of the em box sits on the anchor line.
    #[default]
    Middle,
    /// Top of the em box sits on the anchor line.
    Top,
}

/// Where a run of text lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub align: TextAlign,
    pub baseline: TextBaseline,
    /// Vertical shift of the anchor line. For `Middle` it is relative to the canvas center,
    /// for `Top` to the top edge.
    pub offset_px: f32,
}

impl Placement {
    /// Left end of the baseline for text of `advance` pixels.
    pub fn origin<F: Font>(
        &self,
        font: &F,
        em_px: f32,
        advance: f32,
        canvas: (u32, u32),
    ) -> Point {
        let scaled = font.as_scaled(px_scale(font, em_px));
        let (width, height) = (canvas.0 as f32, canvas.1 as f32);

        let x = match self.align {
            TextAlign::Center => width / 2.0 - advance / 2.0,
        };

        // Descent is negative in ab_glyph.
        let y = match self.baseline {
            TextBaseline::Middle => {
                height / 2.0 + self.offset_px + (scaled.ascent() + scaled.descent()) / 2.0
            },
            TextBaseline::Top => self.offset_px + scaled.ascent(),
        };

        point(x, y)
    }
}

/// Scale at which one em of `font` measures `em_px` pixels.
///
/// `PxScale` is expressed in line height (ascent - descent), not in em units.
pub fn px_scale<F: Font>(font: &F, em_px: f32) -> PxScale {
    let height = font.height_unscaled();
    let units_per_em = font.units_per_em().unwrap_or(height);
    if units_per_em <= 0.0 {
        return PxScale::from(em_px);
    }
    PxScale::from(em_px * height / units_per_em)
}

/// Characters in drawing order, left to right.
///
/// Runs are resolved with the Unicode bidirectional algorithm, the paragraph direction coming
/// from the first strong character. Right-to-left runs are reversed one base character at a
/// time so nonspacing marks stay after the letter they belong to. No mirroring or shaping.
pub fn visual_order(text: &str) -> String {
    let bidi = BidiInfo::new(text, None);
    if !bidi.has_rtl() {
        return text.to_owned();
    }

    let mut visual = String::with_capacity(text.len());
    for para in &bidi.paragraphs {
        let (levels, runs) = bidi.visual_runs(para, para.range.clone());
        for run in runs {
            let slice = &text[run.clone()];
            if levels[run.start].is_rtl() {
                for cluster in mark_clusters(slice).into_iter().rev() {
                    visual.push_str(cluster);
                }
            } else {
                visual.push_str(slice);
            }
        }
    }
    visual
}

/// Splits `text` into base characters each followed by their nonspacing marks.
fn mark_clusters(text: &str) -> Vec<&str> {
    let mut clusters = Vec::new();
    let mut start = 0;
    for (index, ch) in text.char_indices().skip(1) {
        if bidi_class(ch) != BidiClass::NSM {
            clusters.push(&text[start..index]);
            start = index;
        }
    }
    if start < text.len() {
        clusters.push(&text[start..]);
    }
    clusters
}

/// Positioned glyphs for `text` starting at the baseline `origin`, kerning applied.
pub fn layout_glyphs<F: Font>(font: &F, em_px: f32, text: &str, origin: Point) -> Vec<Glyph> {
    let scale = px_scale(font, em_px);
    let scaled = font.as_scaled(scale);

    let mut glyphs = Vec::with_capacity(text.len());
    let mut caret = origin;
    let mut previous = None;

    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }

        let id = scaled.glyph_id(ch);
        if let Some(previous) = previous {
            caret.x += scaled.kern(previous, id);
        }

        glyphs.push(id.with_scale_and_position(scale, caret));
        caret.x += scaled.h_advance(id);
        previous = Some(id);
    }

    glyphs
}

/// Total advance of `text`, kerning included.
pub fn advance_width<F: Font>(font: &F, em_px: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(px_scale(font, em_px));
    match layout_glyphs(font, em_px, text, point(0.0, 0.0)).last() {
        Some(last) => last.position.x + scaled.h_advance(last.id),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::FontCatalog;

    #[test]
    fn hebrew_runs_are_reversed() {
        assert_eq!(visual_order("שלום"), "םולש");
        assert_eq!(visual_order("Hello"), "Hello");
        assert_eq!(visual_order("12"), "12");
        assert_eq!(visual_order(""), "");
    }

    #[test]
    fn numbers_keep_their_order_inside_hebrew() {
        assert_eq!(visual_order("שלום 2024"), "2024 םולש");
        assert_eq!(visual_order("123 אב"), "בא 123");
        assert_eq!(visual_order("abc אב"), "abc בא");
    }

    #[test]
    fn marks_stay_on_their_letter() {
        let visual: Vec<char> = visual_order("בּא").chars().collect();
        assert_eq!(visual, vec!['א', 'ב', '\u{5bc}']);
        assert_eq!(mark_clusters("בּא"), vec!["בּ", "א"]);
    }

    #[test]
    fn advance_grows_with_text() {
        let font = FontCatalog::embedded().resolve("sans-serif", 700).unwrap();
        let one = advance_width(&font, 400.0, "A");
        let two = advance_width(&font, 400.0, "AA");
        assert!(one > 0.0);
        assert!(two > one);
        assert_eq!(advance_width(&font, 400.0, ""), 0.0);
    }

    #[test]
    fn em_scale_matches_font_size() {
        let font = FontCatalog::embedded().resolve("sans-serif", 700).unwrap();
        let scale = px_scale(&font, 400.0);
        let scaled = font.as_scaled(scale);
        let em = scaled.ascent() - scaled.descent();
        // Line height of the bundled face is a little over one em.
        assert!(em >= 400.0 && em < 500.0, "unexpected line height {em}");
    }

    #[test]
    fn centered_text_is_symmetric() {
        let font = FontCatalog::embedded().resolve("sans-serif", 700).unwrap();
        let placement =
            Placement { align: TextAlign::Center, baseline: TextBaseline::Middle, offset_px: 0.0 };
        let origin = placement.origin(&font, 100.0, 60.0, (200, 200));
        assert_eq!(origin.x, 70.0);
        // Baseline below the center line by half of (ascent + descent).
        assert!(origin.y > 100.0 && origin.y < 150.0);

        let top = Placement { baseline: TextBaseline::Top, offset_px: -10.0, ..placement };
        let origin = top.origin(&font, 100.0, 60.0, (200, 200));
        assert!(origin.y > 70.0 && origin.y < 100.0);
    }
}
