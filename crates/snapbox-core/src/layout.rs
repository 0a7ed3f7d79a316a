//! Four-up page layout.
//!
//! Images fill a fixed 2x2 grid page by page in input order. Each image is
//! scaled uniformly to the largest size that fits its slot ("contain"),
//! centred in the slot, and optionally labelled `#n` with a running number
//! that continues across pages.

use crate::config::LayoutConfig;
use crate::document::TextMetrics;
use crate::error::{Result, SnapBoxError};
use crate::model::{DocumentLayout, Label, Meta, PageLayout, PageSlot, Placement, Rect, SlotPosition};
use tracing::instrument;

pub const SLOTS_PER_PAGE: usize = 4;

/// Slot geometry of a page. Identical for every page of a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGrid {
    slots: [PageSlot; SLOTS_PER_PAGE],
}

impl SlotGrid {
    /// Each slot is half the content width by half the content height minus half the row spacing.
    pub fn new(cfg: &LayoutConfig) -> Self {
        let max_w = cfg.content_width() / 2.0;
        let max_h = cfg.content_height() / 2.0 - cfg.row_spacing / 2.0;
        let slots = SlotPosition::ALL.map(|position| {
            let x = cfg.margin_x + position.column() as f32 * max_w;
            let y = cfg.margin_top + position.row() as f32 * (max_h + cfg.row_spacing);
            PageSlot {
                position,
                bounds: Rect::new(x, y, max_w, max_h),
            }
        });
        Self { slots }
    }

    pub fn slot(&self, position: SlotPosition) -> &PageSlot {
        &self.slots[position.index()]
    }

    pub fn slots(&self) -> &[PageSlot; SLOTS_PER_PAGE] {
        &self.slots
    }

    /// Maximum content box (width, height) shared by all slots.
    pub fn max_size(&self) -> (f32, f32) {
        let b = self.slots[0].bounds;
        (b.w, b.h)
    }
}

/// Largest uniform scale that fits `src_w` x `src_h` into `max_w` x `max_h`.
/// Returns `(scale, scaled_w, scaled_h)`. Small images are scaled up.
pub fn fit_contain(src_w: u32, src_h: u32, max_w: f32, max_h: f32) -> (f32, f32, f32) {
    let scale = (max_w / src_w as f32).min(max_h / src_h as f32);
    (scale, src_w as f32 * scale, src_h as f32 * scale)
}

/// Centres a `w` x `h` box inside `slot`.
pub fn center_in(slot: &Rect, w: f32, h: f32) -> Rect {
    Rect::new(
        slot.x + (slot.w - w) / 2.0,
        slot.y + (slot.h - h) / 2.0,
        w,
        h,
    )
}

/// Pages needed for `n` images.
pub fn page_count(n: usize) -> usize {
    n.div_ceil(SLOTS_PER_PAGE)
}

/// `round(100 * placed / total)`, halves rounded up. `total == 0` reports 100.
pub fn progress_percent(placed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let placed = placed.min(total) as u64;
    let total = total as u64;
    ((placed * 200 + total) / (total * 2)) as u8
}

/// Label text for a running number.
pub fn label_text(number: i64) -> String {
    format!("#{}", number)
}

/// Places the `index`-th image of the document.
///
/// Page and slot follow from the index; the label number is `start + index`.
pub fn place_item<K, M: TextMetrics + ?Sized>(
    index: usize,
    key: K,
    src_w: u32,
    src_h: u32,
    grid: &SlotGrid,
    cfg: &LayoutConfig,
    metrics: &M,
) -> Result<Placement<K>> {
    if src_w == 0 || src_h == 0 {
        return Err(SnapBoxError::InvalidInput(format!(
            "image #{} has zero size ({}x{})",
            index, src_w, src_h
        )));
    }
    let page = index / SLOTS_PER_PAGE;
    let slot = SlotPosition::from_index(index);
    let bounds = grid.slot(slot).bounds;
    let (scale, w, h) = fit_contain(src_w, src_h, bounds.w, bounds.h);
    let frame = center_in(&bounds, w, h);

    let label = if cfg.numbering.enabled {
        let number = i64::try_from(index)
            .ok()
            .and_then(|i| cfg.numbering.start.checked_add(i))
            .ok_or_else(|| {
                SnapBoxError::InvalidInput(format!(
                    "running number overflows at image #{} (start {})",
                    index, cfg.numbering.start
                ))
            })?;
        let text = label_text(number);
        let width = metrics.text_width(&text, cfg.font_size);
        Some(Label {
            x: frame.center_x() - width / 2.0,
            y: frame.bottom() + cfg.label_offset,
            text,
            number,
            font_size: cfg.font_size,
            width,
        })
    } else {
        None
    };

    Ok(Placement {
        key,
        index,
        page,
        slot,
        frame,
        scale,
        source_size: (src_w, src_h),
        label,
    })
}

/// Layout-only input (no pixels).
#[derive(Debug, Clone)]
pub struct LayoutItem<K = String> {
    pub key: K,
    pub w: u32,
    pub h: u32,
}

#[instrument(skip_all)]
/// Lays out `items` in order and reports progress after each placement.
///
/// Produces the same geometry `generate` draws, without decoding or writing anything.
pub fn layout_items<K, M, F>(
    items: Vec<LayoutItem<K>>,
    cfg: &LayoutConfig,
    metrics: &M,
    mut on_progress: F,
) -> Result<DocumentLayout<K>>
where
    M: TextMetrics + ?Sized,
    F: FnMut(u8),
{
    cfg.validate()?;
    if items.is_empty() {
        return Err(SnapBoxError::Empty);
    }

    let total = items.len();
    let grid = SlotGrid::new(cfg);
    let mut pages: Vec<PageLayout<K>> = Vec::with_capacity(page_count(total));
    for (index, item) in items.into_iter().enumerate() {
        let placement = place_item(index, item.key, item.w, item.h, &grid, cfg, metrics)?;
        push_placement(&mut pages, placement, cfg);
        on_progress(progress_percent(index + 1, total));
    }

    Ok(DocumentLayout {
        pages,
        meta: document_meta(cfg),
    })
}

/// Appends `placement`, opening its page first when needed.
pub(crate) fn push_placement<K>(pages: &mut Vec<PageLayout<K>>, placement: Placement<K>, cfg: &LayoutConfig) {
    if pages.len() <= placement.page {
        let (width, height) = cfg.page_dimensions();
        pages.push(PageLayout {
            id: placement.page,
            width,
            height,
            placements: Vec::with_capacity(SLOTS_PER_PAGE),
        });
    }
    if let Some(page) = pages.last_mut() {
        page.placements.push(placement);
    }
}

pub(crate) fn document_meta(cfg: &LayoutConfig) -> Meta {
    Meta {
        schema_version: "1".into(),
        app: "snapbox".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        unit: "mm".into(),
        page_size: cfg.page_dimensions(),
        slots_per_page: SLOTS_PER_PAGE,
        numbering: cfg.numbering.enabled,
        start_number: cfg.numbering.enabled.then_some(cfg.numbering.start),
    }
}
