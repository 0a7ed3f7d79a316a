//! Core library for SnapBox: four-up image sheets as PDF.
//!
//! - Layout: a fixed 2x2 grid per page, contain-scaled and centred images, optional `#n` labels
//!   numbered by one running counter across pages
//! - Pipeline: `generate` decodes in-memory image files and returns PDF bytes + the layout used
//! - Data model is serde-serializable; `to_json` exports a layout without rendering
//!
//! Quick example:
//! ```ignore
//! use snapbox_core::{ImageAsset, LayoutConfig, generate};
//! use std::path::Path;
//! # fn main() -> anyhow::Result<()> {
//! let assets = vec![
//!   ImageAsset::from_path(Path::new("a.jpg"))?,
//!   ImageAsset::from_path(Path::new("b.png"))?,
//! ];
//! let cfg = LayoutConfig::builder().start_number(10).build();
//! let doc = generate(&assets, &cfg, |pct| println!("{pct}%"))?;
//! std::fs::write(&doc.file_name, &doc.bytes)?;
//! # Ok(()) }
//! ```

pub mod asset;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod pipeline;
pub mod templates;

pub use asset::*;
pub use config::*;
pub use document::*;
pub use error::*;
pub use export::*;
pub use layout::*;
pub use model::*;
pub use pdf::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `snapbox_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::asset::{DecodedImage, ImageAsset, decode, decode_all, filter_images};
    pub use crate::config::{LayoutConfig, LayoutConfigBuilder, Numbering, PageSize};
    pub use crate::document::{DocumentBuilder, Helvetica, TextMetrics};
    pub use crate::error::SnapBoxError;
    pub use crate::layout::{LayoutItem, SLOTS_PER_PAGE, SlotGrid};
    pub use crate::model::{
        DocumentLayout, Label, LayoutStats, Meta, PageLayout, PageSlot, Placement, Rect,
        SlotPosition,
    };
    pub use crate::pdf::PdfBuilder;
    pub use crate::templates::{TemplateKind, TemplateStore, UploadedTemplate};
    pub use crate::{GeneratedDocument, OUTPUT_FILE_NAME, generate, generate_with, layout_items};
}
