use serde::{Deserialize, Serialize};

/// Tolerance used when comparing layout geometry (mm).
pub const GEOMETRY_EPSILON: f32 = 1e-3;

/// Axis-aligned rectangle (millimetres). `x,y` is top-left with y growing down; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
    /// Right edge coordinate (`x + w`).
    pub fn right(&self) -> f32 {
        self.x + self.w
    }
    /// Bottom edge coordinate (`y + h`).
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
    /// Horizontal centre.
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }
    /// Returns true if `r` is fully inside `self`, allowing `GEOMETRY_EPSILON` of float slack.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x - GEOMETRY_EPSILON
            && r.y >= self.y - GEOMETRY_EPSILON
            && r.right() <= self.right() + GEOMETRY_EPSILON
            && r.bottom() <= self.bottom() + GEOMETRY_EPSILON
    }
    pub fn area(&self) -> f64 {
        self.w as f64 * self.h as f64
    }
}

/// The four fixed slots of a page, in fill order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SlotPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl SlotPosition {
    /// Fill order: left-to-right, top-to-bottom.
    pub const ALL: [SlotPosition; 4] = [
        SlotPosition::TopLeft,
        SlotPosition::TopRight,
        SlotPosition::BottomLeft,
        SlotPosition::BottomRight,
    ];

    /// Slot for the `i`-th image of a page (`i % 4`).
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % Self::ALL.len()]
    }
    pub fn index(self) -> usize {
        match self {
            SlotPosition::TopLeft => 0,
            SlotPosition::TopRight => 1,
            SlotPosition::BottomLeft => 2,
            SlotPosition::BottomRight => 3,
        }
    }
    pub fn row(self) -> usize {
        self.index() / 2
    }
    pub fn column(self) -> usize {
        self.index() % 2
    }
}

/// One of the four regions of a page: anchor plus maximum content box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageSlot {
    pub position: SlotPosition,
    pub bounds: Rect,
}

/// Running-number label for a placed image. `x,y` is the text baseline start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub text: String,
    pub number: i64,
    pub x: f32,
    pub y: f32,
    /// Font size in points.
    pub font_size: f32,
    /// Measured text width (mm).
    pub width: f32,
}

/// A placed image within a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement<K = String> {
    /// User-specified key (e.g., filename).
    pub key: K,
    /// Position in the input sequence.
    pub index: usize,
    /// Page the image lands on.
    pub page: usize,
    pub slot: SlotPosition,
    /// Scaled, centred draw rectangle.
    pub frame: Rect,
    /// Uniform scale applied to the source (mm per pixel).
    pub scale: f32,
    /// Decoded image size in pixels.
    pub source_size: (u32, u32),
    pub label: Option<Label>,
}

/// A single document page (logical record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout<K = String> {
    pub id: usize,
    pub width: f32,
    pub height: f32,
    pub placements: Vec<Placement<K>>,
}

/// Document-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version of the exported layout JSON; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    /// Unit of every length in the layout.
    pub unit: String,
    pub page_size: (f32, f32),
    pub slots_per_page: usize,
    pub numbering: bool,
    pub start_number: Option<i64>,
}

/// Pages of placements plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLayout<K = String> {
    pub pages: Vec<PageLayout<K>>,
    pub meta: Meta,
}

/// Statistics about page usage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutStats {
    pub num_pages: usize,
    pub num_images: usize,
    /// Sum of page areas (mm²).
    pub total_page_area: f64,
    /// Sum of drawn image areas (mm²).
    pub used_image_area: f64,
    /// used_image_area / total_page_area (0.0 to 1.0).
    pub coverage: f64,
    /// Slots left empty on the last page.
    pub empty_slots: usize,
    pub num_labeled: usize,
    /// Images drawn larger than one pixel per point would give.
    pub num_upscaled: usize,
}

impl<K> DocumentLayout<K> {
    pub fn placements(&self) -> impl Iterator<Item = &Placement<K>> {
        self.pages.iter().flat_map(|p| p.placements.iter())
    }

    /// Computes usage statistics for this layout.
    pub fn stats(&self) -> LayoutStats {
        let num_pages = self.pages.len();
        let mut num_images = 0;
        let mut total_page_area = 0f64;
        let mut used_image_area = 0f64;
        let mut num_labeled = 0;
        let mut num_upscaled = 0;

        for page in &self.pages {
            total_page_area += page.width as f64 * page.height as f64;
            for p in &page.placements {
                num_images += 1;
                used_image_area += p.frame.area();
                if p.label.is_some() {
                    num_labeled += 1;
                }
                if crate::config::mm_to_pt(p.scale) > 1.0 {
                    num_upscaled += 1;
                }
            }
        }

        let coverage = if total_page_area > 0.0 {
            used_image_area / total_page_area
        } else {
            0.0
        };

        LayoutStats {
            num_pages,
            num_images,
            total_page_area,
            used_image_area,
            coverage,
            empty_slots: (num_pages * self.meta.slots_per_page).saturating_sub(num_images),
            num_labeled,
            num_upscaled,
        }
    }
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Images: {}, Coverage: {:.2}%, Empty slots: {}, Labeled: {}, Upscaled: {}",
            self.num_pages,
            self.num_images,
            self.coverage * 100.0,
            self.empty_slots,
            self.num_labeled,
            self.num_upscaled,
        )
    }
}
