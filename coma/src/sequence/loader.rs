//! Decoding image files into intensity grids.

use std::path::{Path, PathBuf};

use anyhow::Context;
use common::Buffer2;
use common::file_utils::{has_extension, FITS_EXTENSIONS, RASTER_EXTENSIONS};

/// Decoded pixels plus whatever exposure metadata the file carried.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub pixels: Buffer2<u16>,
    /// Seconds, if the file format records it.
    pub exposure_time: Option<f64>,
}

/// Errors that can occur when loading a frame from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Unsupported file extension: '{}'", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("Unsupported pixel layout in '{}': {detail}", path.display())]
    UnsupportedLayout { path: PathBuf, detail: String },

    #[error("FITS support not compiled in, cannot load '{}'", path.display())]
    FitsDisabled { path: PathBuf },
}

pub trait FrameLoader: Send + Sync {
    fn load(&self, path: &Path) -> anyhow::Result<RawImage>;
}

/// PNG and TIFF via the `image` crate. Color images are converted to luma;
/// 8-bit data is widened to the 16-bit range.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileLoader;

impl FrameLoader for ImageFileLoader {
    fn load(&self, path: &Path) -> anyhow::Result<RawImage> {
        if !has_extension(path, RASTER_EXTENSIONS) {
            return Err(LoadError::UnsupportedExtension {
                path: path.to_path_buf(),
            }
            .into());
        }

        let decoded = image::open(path)
            .with_context(|| format!("Failed to decode image: {}", path.display()))?;
        let luma = decoded.into_luma16();
        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return Err(LoadError::UnsupportedLayout {
                path: path.to_path_buf(),
                detail: format!("empty image {width}x{height}"),
            }
            .into());
        }

        Ok(RawImage {
            pixels: Buffer2::new(width as usize, height as usize, luma.into_raw()),
            exposure_time: None,
        })
    }
}

/// Primary HDU of a FITS file. Rows keep their storage order, which is the
/// frame the metadata labels are given in; values are rounded and clamped
/// into `u16`.
#[cfg(feature = "fits")]
#[derive(Debug, Default, Clone, Copy)]
pub struct FitsLoader;

#[cfg(feature = "fits")]
impl FrameLoader for FitsLoader {
    fn load(&self, path: &Path) -> anyhow::Result<RawImage> {
        use fitsio::hdu::HduInfo;
        use fitsio::FitsFile;

        let mut fptr = FitsFile::open(path)
            .with_context(|| format!("Failed to open FITS file: {}", path.display()))?;
        let hdu = fptr.primary_hdu().context("Failed to access primary HDU")?;

        let shape = match &hdu.info {
            HduInfo::ImageInfo { shape, .. } => shape.clone(),
            HduInfo::TableInfo { .. } => anyhow::bail!("Primary HDU is a table, not an image"),
            HduInfo::AnyInfo => anyhow::bail!("Unknown HDU type"),
        };

        // Shape is in reverse NAXIS order: [height, width].
        let (width, height) = match shape.as_slice() {
            &[height, width] if width > 0 && height > 0 => (width, height),
            other => {
                return Err(LoadError::UnsupportedLayout {
                    path: path.to_path_buf(),
                    detail: format!("expected a 2-D image, got shape {other:?}"),
                }
                .into());
            }
        };

        let values: Vec<f64> = hdu
            .read_image(&mut fptr)
            .context("Failed to read image data")?;
        let pixels: Vec<u16> = values
            .into_iter()
            .map(|v| v.round().clamp(0.0, u16::MAX as f64) as u16)
            .collect();

        let pixels = Buffer2::new(width, height, pixels);
        let exposure_time = hdu.read_key::<f64>(&mut fptr, "EXPTIME").ok();

        Ok(RawImage {
            pixels,
            exposure_time,
        })
    }
}

/// Picks the decoder by file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLoader;

impl FrameLoader for DefaultLoader {
    fn load(&self, path: &Path) -> anyhow::Result<RawImage> {
        if has_extension(path, FITS_EXTENSIONS) {
            return load_fits(path);
        }
        if has_extension(path, RASTER_EXTENSIONS) {
            return ImageFileLoader.load(path);
        }
        Err(LoadError::UnsupportedExtension {
            path: path.to_path_buf(),
        }
        .into())
    }
}

#[cfg(feature = "fits")]
fn load_fits(path: &Path) -> anyhow::Result<RawImage> {
    FitsLoader.load(path)
}

#[cfg(not(feature = "fits"))]
fn load_fits(path: &Path) -> anyhow::Result<RawImage> {
    Err(LoadError::FitsDisabled {
        path: path.to_path_buf(),
    }
    .into())
}
