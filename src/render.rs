use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::error::{RoiError, RoiResult};
use crate::geometry::{PageSize, POINTS_PER_INCH};

/// Anything that can hand out page bitmaps by index
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Displayed size in points
    fn page_size(&self, index: usize) -> RoiResult<PageSize>;

    fn render_page(&self, index: usize, dpi: f32) -> RoiResult<DynamicImage>;
}

/// Owns the PDFium binding; documents borrow from it
pub struct PdfRenderer {
    pdfium: Pdfium,
}

impl PdfRenderer {
    /// Bind PDFium from the configured directory, falling back to the system library
    pub fn bind(config: &RenderConfig) -> RoiResult<Self> {
        let lib_name = Pdfium::pdfium_platform_library_name_at_path(&config.pdfium_library_dir);
        debug!("Trying PDFium library at: {}", lib_name.display());

        let bindings = Pdfium::bind_to_library(&lib_name)
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| RoiError::PdfiumUnavailable {
                message: format!("{} (also tried {})", e, lib_name.display()),
            })?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    pub fn open<'a>(&'a self, path: &Path) -> RoiResult<PdfPageSource<'a>> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| RoiError::pdf_processing(format!("Failed to load {}: {}", path.display(), e)))?;

        info!("📄 Loaded PDF: {} ({} pages)", path.display(), document.pages().len());

        Ok(PdfPageSource {
            document,
            path: path.to_path_buf(),
        })
    }
}

pub struct PdfPageSource<'a> {
    document: PdfDocument<'a>,
    path: PathBuf,
}

impl<'a> PdfPageSource<'a> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page(&self, index: usize) -> RoiResult<PdfPage<'a>> {
        let count = self.page_count();
        if index >= count {
            return Err(RoiError::PageOutOfRange { index, count });
        }

        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| RoiError::pdf_processing(format!("Failed to load page {}: {}", index + 1, e)))
    }
}

impl PageSource for PdfPageSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> RoiResult<PageSize> {
        let page = self.page(index)?;
        Ok(PageSize {
            width: page.width().value,
            height: page.height().value,
        })
    }

    fn render_page(&self, index: usize, dpi: f32) -> RoiResult<DynamicImage> {
        let page = self.page(index)?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi / POINTS_PER_INCH);
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RoiError::pdf_processing(format!("Failed to render page {}: {}", index + 1, e)))?;

        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        let bytes = bitmap.as_rgba_bytes().to_vec();

        let rgba_image = RgbaImage::from_raw(width, height, bytes)
            .ok_or_else(|| RoiError::pdf_processing("Failed to create image from bitmap"))?;

        debug!("Rendered page {} at {} dpi: {}x{}", index + 1, dpi, width, height);
        Ok(DynamicImage::ImageRgba8(rgba_image))
    }
}
