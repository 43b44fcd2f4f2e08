use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::error::{RoiError, RoiResult};
use crate::geometry::Region;
use crate::ocr::{prepare_region, TextRecognizer};
use crate::render::PageSource;

/// One CSV row: 1-based page number and the text found in the region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionRow {
    #[serde(rename = "Page Number")]
    pub page_number: usize,
    #[serde(rename = "Extracted Text")]
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractSettings {
    /// Must match the DPI the region was selected at
    pub dpi: f32,
    pub upscale_factor: u32,
}

/// OCR the same region on every page, in page order. The first failing page
/// aborts the whole run.
pub fn extract_region_text<S, R>(
    source: &S,
    region: &Region,
    recognizer: &R,
    settings: &ExtractSettings,
) -> RoiResult<Vec<ExtractionRow>>
where
    S: PageSource + ?Sized,
    R: TextRecognizer + ?Sized,
{
    let page_count = source.page_count();
    let mut rows = Vec::with_capacity(page_count);

    for index in 0..page_count {
        let page_image = source.render_page(index, settings.dpi)?;

        let text = match prepare_region(&page_image, region, settings.upscale_factor) {
            Some(prepared) => recognizer.recognize(&prepared)?.trim().to_string(),
            None => String::new(),
        };

        info!("Page {}: {}", index + 1, text);
        rows.push(ExtractionRow {
            page_number: index + 1,
            text,
        });
    }

    Ok(rows)
}

/// Write the rows, with a header, to `path`. The table is built in memory
/// and written in one go, so a failed run leaves no partial file.
pub fn write_csv(rows: &[ExtractionRow], path: &Path) -> RoiResult<()> {
    let mut writer = csv::Writer::from_writer(vec![]);
    if rows.is_empty() {
        writer.write_record(["Page Number", "Extracted Text"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| RoiError::file_io(path.to_string_lossy().to_string(), e.into_error()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RoiError::file_io(parent.to_string_lossy().to_string(), e))?;
    }
    std::fs::write(path, data).map_err(|e| RoiError::file_io(path.to_string_lossy().to_string(), e))?;

    info!("CSV export completed: {} rows -> {}", rows.len(), path.display());
    Ok(())
}
