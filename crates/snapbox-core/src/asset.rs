use crate::error::{Result, SnapBoxError};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const UNKNOWN_MIME: &str = "application/octet-stream";

/// A user-selected file: raw bytes plus the MIME type and display name it was selected with.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Reads `path`; the MIME type is derived from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self::new(name, mime_from_path(path), bytes))
    }

    /// True for any `image/*` MIME type.
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// MIME type for a file name by extension; unknown extensions map to `application/octet-stream`.
pub fn mime_from_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MIME.to_string())
}

/// Keeps only image assets, in order. Anything else is dropped without error.
pub fn filter_images(assets: Vec<ImageAsset>) -> Vec<ImageAsset> {
    assets
        .into_iter()
        .filter(|a| {
            let keep = a.is_image();
            if !keep {
                debug!(name = %a.name, mime = %a.mime, "not an image, skipped");
            }
            keep
        })
        .collect()
}

/// An asset together with its decoded pixels.
pub struct DecodedImage<'a> {
    pub asset: &'a ImageAsset,
    /// Container format detected from the bytes.
    pub format: Option<ImageFormat>,
    pub pixels: DynamicImage,
}

impl DecodedImage<'_> {
    pub fn name(&self) -> &str {
        &self.asset.name
    }
    pub fn dimensions(&self) -> (u32, u32) {
        (self.pixels.width(), self.pixels.height())
    }
}

/// Decodes one asset. The format is sniffed from the content, not trusted from the MIME type.
pub fn decode(asset: &ImageAsset) -> Result<DecodedImage<'_>> {
    let to_err = |source: image::ImageError| SnapBoxError::Decode {
        name: asset.name.clone(),
        source,
    };
    let reader = ImageReader::new(Cursor::new(asset.bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| to_err(image::ImageError::IoError(e)))?;
    let format = reader.format();
    let pixels = reader.decode().map_err(to_err)?;
    debug!(name = %asset.name, w = pixels.width(), h = pixels.height(), ?format, "decoded");
    Ok(DecodedImage {
        asset,
        format,
        pixels,
    })
}

/// Decodes every asset, returning results in input order. Any failure aborts the batch.
///
/// With the `parallel` feature and `parallel = true` the work is spread over the rayon pool;
/// results are still collected in input order.
pub fn decode_all(assets: &[ImageAsset], parallel: bool) -> Result<Vec<DecodedImage<'_>>> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return assets.par_iter().map(decode).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    assets.iter().map(decode).collect()
}
