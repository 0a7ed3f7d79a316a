//! Drawing surface used by the pipeline.
//!
//! The layout engine only needs text measurement; the pipeline additionally
//! needs pages, images and text. `PdfBuilder` implements both.

use crate::asset::DecodedImage;
use crate::config::pt_to_mm;
use crate::error::Result;
use crate::model::Rect;

/// Measures rendered text width.
pub trait TextMetrics {
    /// Width of `text` in millimetres at `font_size` points.
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// A paginated document being assembled. Lengths are millimetres from the
/// page's top-left corner; the first page exists before any call.
pub trait DocumentBuilder: TextMetrics {
    /// Start a new page; subsequent drawing goes there.
    fn add_page(&mut self) -> Result<()>;
    /// Draw `image` stretched to `frame`.
    fn add_image(&mut self, image: &DecodedImage<'_>, frame: &Rect) -> Result<()>;
    /// Font size (pt) for subsequent `add_text` calls.
    fn set_font_size(&mut self, size: f32);
    /// Draw `text` with its baseline starting at (`x`, `y`).
    fn add_text(&mut self, text: &str, x: f32, y: f32) -> Result<()>;
    /// Finalize and export the document bytes.
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Glyph advance widths (1/1000 em) of the base-14 Helvetica font for ASCII 0x20..=0x7E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 222, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Fallback advance for characters outside the table.
const HELVETICA_DEFAULT_WIDTH: u16 = 556;

/// Metrics of the standard Helvetica font, which every PDF viewer provides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    /// Advance of one character in 1/1000 em.
    pub fn advance(c: char) -> u16 {
        match c as u32 {
            0x20..=0x7E => HELVETICA_WIDTHS[(c as u32 - 0x20) as usize],
            _ => HELVETICA_DEFAULT_WIDTH,
        }
    }
}

impl TextMetrics for Helvetica {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| Helvetica::advance(c) as u32).sum();
        pt_to_mm(units as f32 / 1000.0 * font_size)
    }
}
