#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use snapbox_core::prelude::*;
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

pub fn png_asset(name: &str, w: u32, h: u32) -> ImageAsset {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 128])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
    ImageAsset::new(name, "image/png", buf.into_inner())
}

pub fn jpeg_asset(name: &str, w: u32, h: u32) -> ImageAsset {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, image::Rgb([200, 100, 50])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).expect("encode jpeg");
    ImageAsset::new(name, "image/jpeg", buf.into_inner())
}

/// Drawing call captured by `RecordingBuilder`.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Page,
    Image { name: String, frame: Rect },
    FontSize(f32),
    Text { text: String, x: f32, y: f32 },
}

/// Records drawing calls; `finish` returns an empty byte vector.
#[derive(Default, Clone)]
pub struct RecordingBuilder {
    pub ops: Rc<RefCell<Vec<Op>>>,
}

impl TextMetrics for RecordingBuilder {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        Helvetica.text_width(text, font_size)
    }
}

impl DocumentBuilder for RecordingBuilder {
    fn add_page(&mut self) -> snapbox_core::Result<()> {
        self.ops.borrow_mut().push(Op::Page);
        Ok(())
    }
    fn add_image(&mut self, image: &DecodedImage<'_>, frame: &Rect) -> snapbox_core::Result<()> {
        self.ops.borrow_mut().push(Op::Image {
            name: image.name().to_string(),
            frame: *frame,
        });
        Ok(())
    }
    fn set_font_size(&mut self, size: f32) {
        self.ops.borrow_mut().push(Op::FontSize(size));
    }
    fn add_text(&mut self, text: &str, x: f32, y: f32) -> snapbox_core::Result<()> {
        self.ops.borrow_mut().push(Op::Text {
            text: text.to_string(),
            x,
            y,
        });
        Ok(())
    }
    fn finish(self) -> snapbox_core::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

pub fn items(sizes: &[(u32, u32)]) -> Vec<LayoutItem<String>> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| LayoutItem {
            key: format!("img_{}", i),
            w,
            h,
        })
        .collect()
}
