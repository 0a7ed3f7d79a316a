use crate::asset::{ImageAsset, decode_all};
use crate::config::LayoutConfig;
use crate::document::DocumentBuilder;
use crate::error::{Result, SnapBoxError};
use crate::layout::{SlotGrid, document_meta, page_count, place_item, progress_percent, push_placement};
use crate::model::{DocumentLayout, PageLayout};
use crate::pdf::PdfBuilder;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// File name of every generated document.
pub const OUTPUT_FILE_NAME: &str = "snapbox.pdf";

/// A finished document: bytes ready to write plus the layout they were drawn from.
pub struct GeneratedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub layout: DocumentLayout,
}

impl GeneratedDocument {
    /// Computes layout statistics for this document.
    /// This is a convenience method that delegates to `layout.stats()`.
    pub fn stats(&self) -> crate::model::LayoutStats {
        self.layout.stats()
    }

    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }
}

/// Lays out `assets` four per page and renders them into a PDF.
///
/// Notes:
/// - All images are decoded before anything is drawn; one failure aborts with no output.
/// - `on_progress` receives `round(100 * placed / total)` after every placement, ending at 100.
/// - An empty selection is rejected with `SnapBoxError::Empty`.
#[instrument(skip_all, fields(images = assets.len()))]
pub fn generate<F>(assets: &[ImageAsset], cfg: &LayoutConfig, on_progress: F) -> Result<GeneratedDocument>
where
    F: FnMut(u8),
{
    let builder = PdfBuilder::for_config(cfg);
    let (layout, bytes) = generate_with(assets, cfg, builder, on_progress)?;
    Ok(GeneratedDocument {
        file_name: OUTPUT_FILE_NAME.to_string(),
        bytes,
        layout,
    })
}

/// Same as [`generate`], drawing through any [`DocumentBuilder`].
pub fn generate_with<B, F>(
    assets: &[ImageAsset],
    cfg: &LayoutConfig,
    mut builder: B,
    mut on_progress: F,
) -> Result<(DocumentLayout, Vec<u8>)>
where
    B: DocumentBuilder,
    F: FnMut(u8),
{
    cfg.validate()?;
    if assets.is_empty() {
        return Err(SnapBoxError::Empty);
    }

    let start = Instant::now();
    let decoded = decode_all(assets, cfg.parallel)?;
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "decoded inputs");

    let total = decoded.len();
    let grid = SlotGrid::new(cfg);
    let mut pages: Vec<PageLayout> = Vec::with_capacity(page_count(total));
    if cfg.numbering.enabled {
        builder.set_font_size(cfg.font_size);
    }

    for (index, image) in decoded.iter().enumerate() {
        let (w, h) = image.dimensions();
        let placement = place_item(index, image.name().to_string(), w, h, &grid, cfg, &builder)?;
        if placement.page > 0 && pages.len() == placement.page {
            builder.add_page()?;
        }
        builder.add_image(image, &placement.frame)?;
        if let Some(label) = &placement.label {
            builder.add_text(&label.text, label.x, label.y)?;
        }
        debug!(
            name = image.name(),
            page = placement.page,
            slot = ?placement.slot,
            label = placement.label.as_ref().map(|l| l.text.as_str()),
            "placed"
        );
        push_placement(&mut pages, placement, cfg);
        on_progress(progress_percent(index + 1, total));
    }

    let bytes = builder.finish()?;
    info!(
        pages = pages.len(),
        images = total,
        bytes = bytes.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "document generated"
    );
    let layout = DocumentLayout {
        pages,
        meta: document_meta(cfg),
    };
    Ok((layout, bytes))
}
