//! `lopdf` implementation of [`DocumentBuilder`].

use crate::asset::DecodedImage;
use crate::config::{LayoutConfig, mm_to_pt};
use crate::document::{DocumentBuilder, Helvetica, TextMetrics};
use crate::error::Result;
use crate::model::Rect;
use image::ImageFormat;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

const FONT_RESOURCE: &str = "F1";

fn real(v: f32) -> Object {
    v.into()
}

fn name(v: &str) -> Object {
    Object::Name(v.as_bytes().to_vec())
}

/// Drawing operations and image resources of one page.
struct PageBuf {
    ops: Vec<Operation>,
    xobjects: Dictionary,
}

impl PageBuf {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            xobjects: Dictionary::new(),
        }
    }
}

/// Builds a PDF with fixed-size portrait pages, base-14 Helvetica labels and embedded images.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    /// Page (width, height) in mm.
    page_size: (f32, f32),
    finished: Vec<PageBuf>,
    current: PageBuf,
    font_size: f32,
    image_count: usize,
}

impl PdfBuilder {
    /// New document with its first page already open.
    pub fn new(page_size: (f32, f32)) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_id,
            page_size,
            finished: Vec::new(),
            current: PageBuf::new(),
            font_size: 12.0,
            image_count: 0,
        }
    }

    pub fn for_config(cfg: &LayoutConfig) -> Self {
        Self::new(cfg.page_dimensions())
    }

    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    /// Page y (mm, from top) to PDF y (pt, from bottom).
    fn y_pt(&self, y_mm: f32) -> f32 {
        mm_to_pt(self.page_size.1 - y_mm)
    }

    fn embed_image(&mut self, image: &DecodedImage<'_>) -> ObjectId {
        let (w, h) = image.dimensions();
        if image.format == Some(ImageFormat::Jpeg) {
            if let Some(color_space) = jpeg_color_space(&image.asset.bytes) {
                let stream = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => w as i64,
                        "Height" => h as i64,
                        "ColorSpace" => color_space,
                        "BitsPerComponent" => 8i64,
                        "Filter" => "DCTDecode",
                    },
                    image.asset.bytes.clone(),
                )
                .with_compression(false);
                debug!(name = image.name(), color_space, "embedded jpeg as-is");
                return self.doc.add_object(stream);
            }
        }

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w as i64,
            "Height" => h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        };
        if image.pixels.color().has_alpha() {
            let alpha: Vec<u8> = image.pixels.to_rgba8().pixels().map(|p| p[3]).collect();
            let smask_id = self.doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => w as i64,
                    "Height" => h as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8i64,
                },
                alpha,
            ));
            dict.set("SMask", smask_id);
        }
        let rgb = image.pixels.to_rgb8().into_raw();
        debug!(name = image.name(), bytes = rgb.len(), "embedded raw rgb");
        self.doc.add_object(Stream::new(dict, rgb))
    }
}

impl TextMetrics for PdfBuilder {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        Helvetica.text_width(text, font_size)
    }
}

impl DocumentBuilder for PdfBuilder {
    fn add_page(&mut self) -> Result<()> {
        let done = std::mem::replace(&mut self.current, PageBuf::new());
        self.finished.push(done);
        Ok(())
    }

    fn add_image(&mut self, image: &DecodedImage<'_>, frame: &Rect) -> Result<()> {
        let id = self.embed_image(image);
        let res = format!("Im{}", self.image_count);
        self.image_count += 1;

        let x = mm_to_pt(frame.x);
        let y = self.y_pt(frame.bottom());
        let ops = &mut self.current.ops;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                real(mm_to_pt(frame.w)),
                real(0.0),
                real(0.0),
                real(mm_to_pt(frame.h)),
                real(x),
                real(y),
            ],
        ));
        ops.push(Operation::new("Do", vec![name(&res)]));
        ops.push(Operation::new("Q", vec![]));
        self.current.xobjects.set(res, Object::Reference(id));
        Ok(())
    }

    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn add_text(&mut self, text: &str, x: f32, y: f32) -> Result<()> {
        let y = self.y_pt(y);
        let ops = &mut self.current.ops;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![name(FONT_RESOURCE), real(self.font_size)],
        ));
        ops.push(Operation::new("Td", vec![real(mm_to_pt(x)), real(y)]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        ops.push(Operation::new("ET", vec![]));
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let last = std::mem::replace(&mut self.current, PageBuf::new());
        self.finished.push(last);

        let mut kids: Vec<Object> = Vec::with_capacity(self.finished.len());
        for page in std::mem::take(&mut self.finished) {
            let content = Content {
                operations: page.ops,
            };
            let content_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, content.encode()?));
            let resources = dictionary! {
                "Font" => dictionary! { FONT_RESOURCE => self.font_id },
                "XObject" => page.xobjects,
            };
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "Contents" => content_id,
                "Resources" => resources,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        let (w, h) = self.page_size;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(mm_to_pt(w)), real(mm_to_pt(h))],
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal(format!("snapbox {}", env!("CARGO_PKG_VERSION"))),
        });
        self.doc.trailer.set("Info", info_id);

        self.doc.compress();
        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        debug!(pages = count, bytes = out.len(), "pdf finalized");
        Ok(out)
    }
}

/// PDF colour space for a baseline/progressive 8-bit JPEG, read from its SOF header.
/// `None` when the stream should be re-encoded instead (CMYK, 12-bit, malformed).
fn jpeg_color_space(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        match marker {
            // fill byte
            0xFF => {
                i += 1;
                continue;
            }
            // standalone markers
            0x01 | 0xD0..=0xD8 => {
                i += 2;
                continue;
            }
            // start of scan before any frame header
            0xDA | 0xD9 => return None,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                // FF Cn | length(2) | precision(1) | height(2) | width(2) | components(1)
                let precision = *bytes.get(i + 4)?;
                let components = *bytes.get(i + 9)?;
                return match (precision, components) {
                    (8, 1) => Some("DeviceGray"),
                    (8, 3) => Some("DeviceRGB"),
                    _ => None,
                };
            }
            _ => {}
        }
        let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        i += 2 + len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sof(precision: u8, components: u8) -> Vec<u8> {
        let mut v = vec![0xFF, 0xD8];
        // APP0 with 2 payload bytes
        v.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        // SOF0
        v.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, precision, 0x00, 0x10, 0x00, 0x10, components]);
        v
    }

    #[test]
    fn jpeg_header_selects_color_space() {
        assert_eq!(jpeg_color_space(&sof(8, 3)), Some("DeviceRGB"));
        assert_eq!(jpeg_color_space(&sof(8, 1)), Some("DeviceGray"));
        assert_eq!(jpeg_color_space(&sof(8, 4)), None);
        assert_eq!(jpeg_color_space(&sof(12, 3)), None);
        assert_eq!(jpeg_color_space(b"\x89PNG\r\n"), None);
    }

    #[test]
    fn empty_document_still_has_one_page() {
        let builder = PdfBuilder::new((210.0, 297.0));
        assert_eq!(builder.page_count(), 1);
        let bytes = builder.finish().expect("finish");
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).expect("reload");
        assert_eq!(doc.get_pages().len(), 1);
    }
}
