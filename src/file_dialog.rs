use std::path::{Path, PathBuf};
#[cfg(feature = "gui")]
use tracing::info;

use crate::error::{RoiError, RoiResult};

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Check a path given on the command line
pub fn validate_pdf_path(path: &Path) -> RoiResult<PathBuf> {
    if !path.exists() {
        return Err(RoiError::file_io(
            path.to_string_lossy().to_string(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "PDF file not found"),
        ));
    }
    if !has_pdf_extension(path) {
        let format = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| "no extension".to_string());
        return Err(RoiError::InvalidFormat { format });
    }
    Ok(path.to_path_buf())
}

/// Native open dialog filtered to PDFs; `None` if cancelled
#[cfg(feature = "gui")]
pub fn pick_pdf() -> Option<PathBuf> {
    let picked = rfd::FileDialog::new()
        .set_title("Select PDF File")
        .add_filter("PDF files", &["pdf", "PDF"])
        .pick_file();

    if let Some(path) = &picked {
        info!("Selected {}", path.display());
    }
    picked
}

#[cfg(feature = "gui")]
pub fn notify_success(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Info)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
