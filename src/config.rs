use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{RoiError, RoiResult};
use crate::logging::LoggingConfig;

/// Config file picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "pdfroi.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiConfig {
    pub render: RenderConfig,
    pub ocr: OcrConfig,
    pub upscale: UpscaleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Resolution of the page shown for region selection; regions are in these pixels
    pub dpi: f32,

    /// Directory searched for the PDFium shared library before the system paths
    pub pdfium_library_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub tesseract_cmd: PathBuf,
    pub language: String,

    /// Tesseract `--psm`; 6 treats the crop as one uniform block of text
    pub page_segmentation_mode: u8,

    /// Integer upscale applied to the crop before recognition
    pub upscale_factor: u32,

    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpscaleConfig {
    pub scale_factor: f32,

    /// Margin in points added on every side, before scaling
    pub margin: f32,

    /// Resolution the source pages are rasterized at
    pub dpi: f32,

    /// Show a message box once the file is written
    pub notify: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 72.0,
            pdfium_library_dir: PathBuf::from("./lib/"),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            page_segmentation_mode: 6,
            upscale_factor: 6,
            output_path: PathBuf::from("ROI_result.csv"),
        }
    }
}

impl Default for UpscaleConfig {
    fn default() -> Self {
        Self {
            scale_factor: 2.0,
            margin: 10.0,
            dpi: 300.0,
            notify: true,
        }
    }
}

impl RoiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RoiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RoiError::file_io(path.to_string_lossy().to_string(), e))?;

        toml::from_str(&content)
            .map_err(|e| RoiError::configuration(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Explicit file, else `./pdfroi.toml` if present, else defaults; env overrides last
    pub fn load(explicit: Option<&Path>) -> RoiResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                debug!("Using {}", DEFAULT_CONFIG_FILE);
                Self::load_from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dpi) = lookup("PDFROI_RENDER_DPI") {
            match dpi.parse::<f32>() {
                Ok(value) => self.render.dpi = value,
                Err(_) => warn!("Ignoring PDFROI_RENDER_DPI={}: not a number", dpi),
            }
        }

        if let Some(dir) = lookup("PDFROI_PDFIUM_DIR") {
            self.render.pdfium_library_dir = PathBuf::from(dir);
        }

        if let Some(cmd) = lookup("PDFROI_TESSERACT_CMD") {
            self.ocr.tesseract_cmd = PathBuf::from(cmd);
        }

        if let Some(lang) = lookup("PDFROI_OCR_LANG") {
            self.ocr.language = lang;
        }

        if let Some(level) = lookup("PDFROI_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> RoiResult<()> {
        if !(self.render.dpi > 0.0) {
            return Err(RoiError::configuration("render.dpi must be positive"));
        }
        if self.ocr.upscale_factor == 0 {
            return Err(RoiError::configuration("ocr.upscale_factor must be at least 1"));
        }
        if !(self.upscale.scale_factor > 0.0) || !(self.upscale.dpi > 0.0) {
            return Err(RoiError::configuration(
                "upscale.scale_factor and upscale.dpi must be positive",
            ));
        }
        if self.upscale.margin < 0.0 {
            return Err(RoiError::configuration("upscale.margin must not be negative"));
        }
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RoiResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| RoiError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| RoiError::file_io(path.to_string_lossy().to_string(), e))
    }
}
