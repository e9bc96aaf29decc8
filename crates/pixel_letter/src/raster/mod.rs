pub mod font;
pub mod layout;
pub mod surface;

use ab_glyph::FontArc;
use log::trace;

use crate::RenderRequest;
use layout::Placement;
use surface::Surface;

/// Clear `surface` to the raster background and draw the request's text in its ink color.
///
/// Empty text leaves a blank surface.
pub fn rasterize_onto<S: Surface + ?Sized>(
    surface: &mut S,
    request: &RenderRequest,
    font: &FontArc,
) {
    surface.fill(request.raster_background);

    let text = layout::visual_order(&request.text);
    if text.trim().is_empty() {
        return;
    }

    let advance = layout::advance_width(font, request.glyph_size_px, &text);
    let placement = Placement {
        align: request.text_align,
        baseline: request.text_baseline,
        offset_px: request.baseline_offset_px,
    };
    let origin = placement.origin(font, request.glyph_size_px, advance, surface.dimensions());
    trace!("drawing {text:?} at ({:.1}, {:.1}), advance {advance:.1}", origin.x, origin.y);

    surface.draw_text(&text, font, request.glyph_size_px, origin, request.ink);
}
