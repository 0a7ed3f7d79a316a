use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Points per millimetre (1 in = 72 pt = 25.4 mm).
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimetres to PDF points.
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert PDF points to millimetres.
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

/// Portrait page sizes. All dimensions are in millimetres.
///
/// Serialized as the same string the CLI accepts: `a4`, `letter`, `100x150`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(into = "String", try_from = "String")]
pub enum PageSize {
    A4,
    A5,
    Letter,
    Legal,
    /// Arbitrary portrait page, `width` x `height` mm.
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// (width, height) in millimetres.
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

impl FromStr for PageSize {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            other => {
                // "WIDTHxHEIGHT" in mm
                let (w, h) = other.split_once('x').ok_or(())?;
                let width: f32 = w.trim().parse().map_err(|_| ())?;
                let height: f32 = h.trim().parse().map_err(|_| ())?;
                Ok(Self::Custom { width, height })
            }
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::A4 => f.write_str("a4"),
            PageSize::A5 => f.write_str("a5"),
            PageSize::Letter => f.write_str("letter"),
            PageSize::Legal => f.write_str("legal"),
            PageSize::Custom { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

impl From<PageSize> for String {
    fn from(v: PageSize) -> Self {
        v.to_string()
    }
}

impl TryFrom<String> for PageSize {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map_err(|_| format!("unknown page size: {}", s))
    }
}

/// Running-number labels drawn under each image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Numbering {
    pub enabled: bool,
    /// Number given to the first image; every following image gets the next integer.
    pub start: i64,
}

impl Default for Numbering {
    fn default() -> Self {
        Self {
            enabled: true,
            start: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    #[serde(default = "default_page_size")]
    pub page_size: PageSize,
    /// Top page margin (mm).
    pub margin_top: f32,
    /// Bottom page margin (mm).
    pub margin_bottom: f32,
    /// Left and right page margin (mm).
    pub margin_x: f32,
    /// Vertical gap between the two slot rows (mm). Labels of the top row live here.
    pub row_spacing: f32,
    /// Distance from an image's bottom edge to its label baseline (mm).
    pub label_offset: f32,
    /// Label font size (pt).
    pub font_size: f32,

    #[serde(default)]
    pub numbering: Numbering,

    /// Decode inputs in parallel when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            margin_top: 15.0,
            margin_bottom: 15.0,
            margin_x: 10.0,
            row_spacing: 15.0,
            label_offset: 6.0,
            font_size: 12.0,
            numbering: Numbering::default(),
            parallel: default_parallel(),
        }
    }
}

impl LayoutConfig {
    /// Page (width, height) in millimetres.
    pub fn page_dimensions(&self) -> (f32, f32) {
        self.page_size.dimensions()
    }

    /// Width available for the two slot columns.
    pub fn content_width(&self) -> f32 {
        self.page_dimensions().0 - 2.0 * self.margin_x
    }

    /// Height available for the two slot rows, spacing included.
    pub fn content_height(&self) -> f32 {
        self.page_dimensions().1 - self.margin_top - self.margin_bottom
    }

    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - The page size is not strictly positive
    /// - A margin, spacing or offset is negative or not finite
    /// - Margins and spacing leave no room for a slot
    /// - The font size is not strictly positive
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SnapBoxError;

        let (width, height) = self.page_dimensions();
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SnapBoxError::InvalidPageSize { width, height });
        }

        let lengths = [
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("margin_x", self.margin_x),
            ("row_spacing", self.row_spacing),
            ("label_offset", self.label_offset),
        ];
        for (name, v) in lengths {
            if !v.is_finite() || v < 0.0 {
                return Err(SnapBoxError::InvalidConfig(format!(
                    "{} must be a non-negative length, got {}",
                    name, v
                )));
            }
        }

        if self.content_width() <= 0.0 {
            return Err(SnapBoxError::InvalidConfig(format!(
                "margin_x ({}) * 2 leaves no usable width on a {}mm page",
                self.margin_x, width
            )));
        }
        let slot_height = self.content_height() / 2.0 - self.row_spacing / 2.0;
        if slot_height <= 0.0 {
            return Err(SnapBoxError::InvalidConfig(format!(
                "No usable slot height: {}mm page - {} top - {} bottom - {} spacing",
                height, self.margin_top, self.margin_bottom, self.row_spacing
            )));
        }

        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(SnapBoxError::InvalidConfig(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }

        Ok(())
    }
}

fn default_page_size() -> PageSize {
    PageSize::A4
}
fn default_parallel() -> bool {
    false
}

/// Builder for `LayoutConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct LayoutConfigBuilder {
    cfg: LayoutConfig,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: LayoutConfig::default(),
        }
    }
    pub fn page_size(mut self, v: PageSize) -> Self {
        self.cfg.page_size = v;
        self
    }
    pub fn margins(mut self, top: f32, bottom: f32, horizontal: f32) -> Self {
        self.cfg.margin_top = top;
        self.cfg.margin_bottom = bottom;
        self.cfg.margin_x = horizontal;
        self
    }
    pub fn row_spacing(mut self, v: f32) -> Self {
        self.cfg.row_spacing = v;
        self
    }
    pub fn label_offset(mut self, v: f32) -> Self {
        self.cfg.label_offset = v;
        self
    }
    pub fn font_size(mut self, v: f32) -> Self {
        self.cfg.font_size = v;
        self
    }
    pub fn numbering(mut self, enabled: bool) -> Self {
        self.cfg.numbering.enabled = enabled;
        self
    }
    pub fn start_number(mut self, v: i64) -> Self {
        self.cfg.numbering.start = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> LayoutConfig {
        self.cfg
    }
}

impl LayoutConfig {
    /// Create a fluent builder for `LayoutConfig`.
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::new()
    }
}
