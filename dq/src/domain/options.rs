//! Typed per-kind operation options
//!
//! Each operation kind carries its own options struct. The enum is tagged
//! by `kind`, so a manifest entry like
//!
//! ```yaml
//! kind: rotate
//! degrees: 90
//! ```
//!
//! deserializes straight into [`OperationOptions::Rotate`]. Options are
//! validated when an operation is built, never at execution time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::OperationError;
use super::kind::OperationKind;

/// Inclusive, 1-based page range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A range covering a single page
    pub fn single(page: u32) -> Self {
        Self { start: page, end: page }
    }

    fn validate(&self, kind: OperationKind) -> Result<(), OperationError> {
        if self.start == 0 {
            return Err(OperationError::invalid(kind, "page numbers start at 1"));
        }
        if self.start > self.end {
            return Err(OperationError::invalid(
                kind,
                format!("page range {}-{} is reversed", self.start, self.end),
            ));
        }
        Ok(())
    }
}

fn validate_ranges(kind: OperationKind, ranges: &[PageRange]) -> Result<(), OperationError> {
    ranges.iter().try_for_each(|range| range.validate(kind))
}

fn validate_dpi(kind: OperationKind, dpi: u32) -> Result<(), OperationError> {
    if dpi == 0 || dpi > MAX_DPI {
        return Err(OperationError::invalid(
            kind,
            format!("dpi {} is outside 1..={}", dpi, MAX_DPI),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MergeOptions {
    /// Add one outline entry per input document
    pub add_bookmarks: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SplitOptions {
    /// Output one document per range; empty means one per page
    pub ranges: Vec<PageRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WatermarkOptions {
    pub text: String,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f32,
    pub font_size: f32,
    /// Counter-clockwise rotation of the text, in degrees
    pub rotation: f32,
    /// Pages to stamp; empty means all
    pub pages: Vec<PageRange>,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            opacity: 0.3,
            font_size: 48.0,
            rotation: 45.0,
            pages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RotateOptions {
    /// Clockwise, multiple of 90 (negative values rotate counter-clockwise)
    pub degrees: i32,
    /// Pages to rotate; empty means all
    pub pages: Vec<PageRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompressOptions {
    /// Image quality, 0 to 100
    pub quality: u8,
    pub remove_metadata: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: 75,
            remove_metadata: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractOptions {
    pub pages: Vec<PageRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReorderOptions {
    /// New page order, 1-based
    pub order: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GrayscaleOptions {
    /// Also convert embedded raster images, not just vector content
    pub convert_images: bool,
}

impl Default for GrayscaleOptions {
    fn default() -> Self {
        Self { convert_images: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Permissions {
    pub print: bool,
    pub copy: bool,
    pub modify: bool,
    pub annotate: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            print: true,
            copy: true,
            modify: false,
            annotate: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EncryptOptions {
    pub user_password: String,
    pub owner_password: Option<String>,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DecryptOptions {
    /// May be empty for documents with only an owner password
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SanitizeOptions {
    pub remove_javascript: bool,
    pub remove_metadata: bool,
    pub remove_embedded_files: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            remove_javascript: true,
            remove_metadata: true,
            remove_embedded_files: true,
        }
    }
}

/// A value written into a form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Checkbox or radio state
    Flag(bool),
    Number(f64),
    Text(String),
    /// Multi-select list boxes
    Choices(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FillFormsOptions {
    /// Field name to value
    pub fields: BTreeMap<String, FormValue>,
    /// Flatten the form so the values are no longer editable
    pub flatten: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageSize {
    /// Page matches the image dimensions
    #[default]
    Fit,
    A4,
    Letter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ImageToPdfOptions {
    pub page_size: PageSize,
    /// Margin around the image, in points
    pub margin: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PageToImageOptions {
    /// 1-based page to render
    pub page: u32,
    pub format: ImageFormat,
    pub dpi: u32,
}

impl Default for PageToImageOptions {
    fn default() -> Self {
        Self {
            page: 1,
            format: ImageFormat::Png,
            dpi: 150,
        }
    }
}

/// Highest render resolution the engine accepts
const MAX_DPI: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OcrOptions {
    /// Recognition language code, e.g. `eng` or `deu`
    pub language: String,
    /// Resolution pages are rasterized at before recognition
    pub dpi: u32,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: 300,
        }
    }
}

/// Options for one operation, tagged by its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OperationOptions {
    Merge(MergeOptions),
    Split(SplitOptions),
    Watermark(WatermarkOptions),
    Rotate(RotateOptions),
    Compress(CompressOptions),
    Extract(ExtractOptions),
    Reorder(ReorderOptions),
    Grayscale(GrayscaleOptions),
    Encrypt(EncryptOptions),
    Decrypt(DecryptOptions),
    Sanitize(SanitizeOptions),
    FillForms(FillFormsOptions),
    ImageToPdf(ImageToPdfOptions),
    PageToImage(PageToImageOptions),
    Ocr(OcrOptions),
}

impl OperationOptions {
    /// Default options for a kind
    pub fn defaults_for(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Merge => Self::Merge(MergeOptions::default()),
            OperationKind::Split => Self::Split(SplitOptions::default()),
            OperationKind::Watermark => Self::Watermark(WatermarkOptions::default()),
            OperationKind::Rotate => Self::Rotate(RotateOptions::default()),
            OperationKind::Compress => Self::Compress(CompressOptions::default()),
            OperationKind::Extract => Self::Extract(ExtractOptions::default()),
            OperationKind::Reorder => Self::Reorder(ReorderOptions::default()),
            OperationKind::Grayscale => Self::Grayscale(GrayscaleOptions::default()),
            OperationKind::Encrypt => Self::Encrypt(EncryptOptions::default()),
            OperationKind::Decrypt => Self::Decrypt(DecryptOptions::default()),
            OperationKind::Sanitize => Self::Sanitize(SanitizeOptions::default()),
            OperationKind::FillForms => Self::FillForms(FillFormsOptions::default()),
            OperationKind::ImageToPdf => Self::ImageToPdf(ImageToPdfOptions::default()),
            OperationKind::PageToImage => Self::PageToImage(PageToImageOptions::default()),
            OperationKind::Ocr => Self::Ocr(OcrOptions::default()),
        }
    }

    /// The kind these options belong to
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Merge(_) => OperationKind::Merge,
            Self::Split(_) => OperationKind::Split,
            Self::Watermark(_) => OperationKind::Watermark,
            Self::Rotate(_) => OperationKind::Rotate,
            Self::Compress(_) => OperationKind::Compress,
            Self::Extract(_) => OperationKind::Extract,
            Self::Reorder(_) => OperationKind::Reorder,
            Self::Grayscale(_) => OperationKind::Grayscale,
            Self::Encrypt(_) => OperationKind::Encrypt,
            Self::Decrypt(_) => OperationKind::Decrypt,
            Self::Sanitize(_) => OperationKind::Sanitize,
            Self::FillForms(_) => OperationKind::FillForms,
            Self::ImageToPdf(_) => OperationKind::ImageToPdf,
            Self::PageToImage(_) => OperationKind::PageToImage,
            Self::Ocr(_) => OperationKind::Ocr,
        }
    }

    /// Check option values. Input documents are not looked at here.
    pub fn validate(&self) -> Result<(), OperationError> {
        let kind = self.kind();
        match self {
            Self::Merge(_) | Self::Grayscale(_) | Self::Decrypt(_) | Self::Sanitize(_) => Ok(()),
            Self::Split(opts) => validate_ranges(kind, &opts.ranges),
            Self::Watermark(opts) => {
                if opts.text.trim().is_empty() {
                    return Err(OperationError::invalid(kind, "watermark text is empty"));
                }
                if !(0.0..=1.0).contains(&opts.opacity) {
                    return Err(OperationError::invalid(
                        kind,
                        format!("opacity {} is outside 0.0..=1.0", opts.opacity),
                    ));
                }
                if !opts.font_size.is_finite() || opts.font_size <= 0.0 {
                    return Err(OperationError::invalid(kind, "font size must be positive"));
                }
                if !opts.rotation.is_finite() {
                    return Err(OperationError::invalid(kind, "rotation must be a finite angle"));
                }
                validate_ranges(kind, &opts.pages)
            }
            Self::Rotate(opts) => {
                if opts.degrees % 90 != 0 {
                    return Err(OperationError::invalid(
                        kind,
                        format!("{} degrees is not a multiple of 90", opts.degrees),
                    ));
                }
                validate_ranges(kind, &opts.pages)
            }
            Self::Compress(opts) => {
                if opts.quality > 100 {
                    return Err(OperationError::invalid(
                        kind,
                        format!("quality {} is above 100", opts.quality),
                    ));
                }
                Ok(())
            }
            Self::Extract(opts) => {
                if opts.pages.is_empty() {
                    return Err(OperationError::invalid(kind, "no pages selected"));
                }
                validate_ranges(kind, &opts.pages)
            }
            Self::Reorder(opts) => {
                if opts.order.is_empty() {
                    return Err(OperationError::invalid(kind, "page order is empty"));
                }
                if opts.order.contains(&0) {
                    return Err(OperationError::invalid(kind, "page numbers start at 1"));
                }
                let mut seen = opts.order.clone();
                seen.sort_unstable();
                if seen.windows(2).any(|w| w[0] == w[1]) {
                    return Err(OperationError::invalid(kind, "page order lists a page twice"));
                }
                Ok(())
            }
            Self::Encrypt(opts) => {
                if opts.user_password.is_empty() {
                    return Err(OperationError::invalid(kind, "user password is empty"));
                }
                Ok(())
            }
            Self::FillForms(opts) => {
                if opts.fields.is_empty() {
                    return Err(OperationError::invalid(kind, "no form fields given"));
                }
                if opts.fields.keys().any(|name| name.trim().is_empty()) {
                    return Err(OperationError::invalid(kind, "form field name is empty"));
                }
                Ok(())
            }
            Self::ImageToPdf(opts) => {
                if !opts.margin.is_finite() || opts.margin < 0.0 {
                    return Err(OperationError::invalid(
                        kind,
                        format!("margin {} must be zero or more", opts.margin),
                    ));
                }
                Ok(())
            }
            Self::PageToImage(opts) => {
                if opts.page == 0 {
                    return Err(OperationError::invalid(kind, "page numbers start at 1"));
                }
                validate_dpi(kind, opts.dpi)
            }
            Self::Ocr(opts) => {
                if opts.language.trim().is_empty() {
                    return Err(OperationError::invalid(kind, "recognition language is empty"));
                }
                validate_dpi(kind, opts.dpi)
            }
        }
    }
}
