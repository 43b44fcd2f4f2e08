//! Text recognition on a cropped page region.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

use crate::config::OcrConfig;
use crate::error::{RoiError, RoiResult};
use crate::geometry::Region;

/// OCR backend seam
pub trait TextRecognizer {
    fn recognize(&self, image: &DynamicImage) -> RoiResult<String>;
}

/// Crop `image` to `region` and enlarge it by `factor`. Returns `None` when
/// nothing of the region lies on the bitmap.
pub fn prepare_region(image: &DynamicImage, region: &Region, factor: u32) -> Option<DynamicImage> {
    let cropped = image.crop_imm(region.x, region.y, region.width, region.height);
    if cropped.width() == 0 || cropped.height() == 0 {
        return None;
    }

    let factor = factor.max(1);
    if factor == 1 {
        return Some(cropped);
    }

    Some(cropped.resize_exact(
        cropped.width() * factor,
        cropped.height() * factor,
        FilterType::CatmullRom,
    ))
}

/// Runs the `tesseract` executable once per image
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
    language: String,
    page_segmentation_mode: u8,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>, language: impl Into<String>, page_segmentation_mode: u8) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
            page_segmentation_mode,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            config.tesseract_cmd.clone(),
            config.language.clone(),
            config.page_segmentation_mode,
        )
    }

    fn args(&self) -> Vec<String> {
        vec![
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
            "--psm".to_string(),
            self.page_segmentation_mode.to_string(),
        ]
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, image: &DynamicImage) -> RoiResult<String> {
        let input_path = std::env::temp_dir().join(format!("pdfroi_ocr_{}.png", uuid::Uuid::new_v4()));

        image.save_with_format(&input_path, ImageFormat::Png)?;

        let output = Command::new(&self.command).arg(&input_path).args(self.args()).output();

        if let Err(e) = std::fs::remove_file(&input_path) {
            warn!("Failed to clean up temp file {}: {}", input_path.display(), e);
        }

        let output = output.map_err(|source| RoiError::OcrEngineUnavailable {
            command: self.command.display().to_string(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RoiError::ocr(format!("Tesseract failed ({}): {}", output.status, stderr.trim())));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Recognized {} characters", text.len());
        Ok(text)
    }
}
