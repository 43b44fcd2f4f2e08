//! The three interactive pipelines: pick a file, (select a region,) process
//! every page, save.

use image::DynamicImage;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::RoiConfig;
use crate::crop::{crop_document, cropped_output_path};
use crate::error::{RoiError, RoiResult};
use crate::extract::{extract_region_text, write_csv, ExtractSettings};
use crate::file_dialog::validate_pdf_path;
use crate::geometry::Region;
use crate::logging::PerformanceTimer;
use crate::ocr::TextRecognizer;
use crate::render::PageSource;
use crate::upscale::{upscale_document, upscaled_output_path, UpscaleSettings};

pub const ROI_WINDOW_TITLE: &str = "Select Region of Interest (ROI)";

/// Paths supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Skips the file dialog
    pub input: Option<PathBuf>,
    /// Replaces the configured CSV path (extract only)
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    NoFileSelected,
    NoRegionSelected,
}

impl fmt::Display for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cancellation::NoFileSelected => write!(f, "No PDF file selected."),
            Cancellation::NoRegionSelected => write!(f, "No ROI selected."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    Cancelled(Cancellation),
}

/// Everything a pipeline asks of the user or of the PDF renderer
pub trait Frontend {
    /// Ask for a PDF; `None` when the user cancels
    fn pick_pdf(&self) -> Option<PathBuf>;

    fn open<'a>(&'a self, path: &Path) -> RoiResult<Box<dyn PageSource + 'a>>;

    /// Let the user drag a rectangle on `page`; `None` when none was drawn
    fn select_region(&self, page: &DynamicImage) -> RoiResult<Option<Region>>;

    fn notify_success(&self, title: &str, message: &str);
}

fn resolve_input<F: Frontend + ?Sized>(frontend: &F, args: &RunArgs) -> RoiResult<Option<PathBuf>> {
    match &args.input {
        Some(path) => validate_pdf_path(path).map(Some),
        None => Ok(frontend.pick_pdf()),
    }
}

fn select_on_first_page<F: Frontend + ?Sized>(
    frontend: &F,
    source: &dyn PageSource,
    input: &Path,
    dpi: f32,
) -> RoiResult<Option<Region>> {
    if source.page_count() == 0 {
        return Err(RoiError::EmptyDocument {
            path: input.display().to_string(),
        });
    }

    let first_page = source.render_page(0, dpi)?;
    frontend.select_region(&first_page)
}

/// OCR the selected region on every page and write the CSV table
pub fn extract_with<F, R>(config: &RoiConfig, args: &RunArgs, frontend: &F, recognizer: &R) -> RoiResult<Outcome>
where
    F: Frontend + ?Sized,
    R: TextRecognizer + ?Sized,
{
    let Some(input) = resolve_input(frontend, args)? else {
        return Ok(Outcome::Cancelled(Cancellation::NoFileSelected));
    };

    let source = frontend.open(&input)?;
    let Some(region) = select_on_first_page(frontend, source.as_ref(), &input, config.render.dpi)? else {
        return Ok(Outcome::Cancelled(Cancellation::NoRegionSelected));
    };

    let timer = PerformanceTimer::start(format!("OCR of {} pages", source.page_count()));
    let settings = ExtractSettings {
        dpi: config.render.dpi,
        upscale_factor: config.ocr.upscale_factor,
    };
    let rows = extract_region_text(source.as_ref(), &region, recognizer, &settings)?;
    timer.checkpoint("recognition");

    let output = args.output.clone().unwrap_or_else(|| config.ocr.output_path.clone());
    write_csv(&rows, &output)?;
    Ok(Outcome::Written(output))
}

/// Crop every page to the selected region
pub fn crop_with<F: Frontend + ?Sized>(config: &RoiConfig, args: &RunArgs, frontend: &F) -> RoiResult<Outcome> {
    let Some(input) = resolve_input(frontend, args)? else {
        return Ok(Outcome::Cancelled(Cancellation::NoFileSelected));
    };

    let region = {
        let source = frontend.open(&input)?;
        select_on_first_page(frontend, source.as_ref(), &input, config.render.dpi)?
    };
    let Some(region) = region else {
        return Ok(Outcome::Cancelled(Cancellation::NoRegionSelected));
    };

    let _timer = PerformanceTimer::start("crop");
    let output = cropped_output_path(&input);
    let report = crop_document(&input, &output, &region, config.render.dpi)?;
    for (index, rect) in report.boxes.iter().enumerate() {
        debug!("Page {} cropped to {:?}", index + 1, rect.to_box());
    }
    info!("Cropped {} pages to {}", report.pages, region);
    Ok(Outcome::Written(report.output))
}

/// Re-render every page larger, with a margin
pub fn upscale_with<F: Frontend + ?Sized>(config: &RoiConfig, args: &RunArgs, frontend: &F) -> RoiResult<Outcome> {
    let Some(input) = resolve_input(frontend, args)? else {
        return Ok(Outcome::Cancelled(Cancellation::NoFileSelected));
    };

    let _timer = PerformanceTimer::start("upscale");
    let source = frontend.open(&input)?;

    let settings = UpscaleSettings::from(&config.upscale);
    let output = upscaled_output_path(&input, settings.scale_factor);
    let report = upscale_document(source.as_ref(), &input, &output, &settings)?;
    for (index, layout) in report.layouts.iter().enumerate() {
        debug!(
            "Page {}: {}x{}pt, image at ({}, {})",
            index + 1,
            layout.page_width,
            layout.page_height,
            layout.image_x,
            layout.image_y
        );
    }

    if config.upscale.notify {
        frontend.notify_success(
            "Success",
            &format!("Resized PDF saved as:\n{}", report.output.display()),
        );
    }
    Ok(Outcome::Written(report.output))
}

#[cfg(feature = "gui")]
pub use desktop::{run_crop, run_extract, run_upscale, DesktopFrontend};

#[cfg(feature = "gui")]
mod desktop {
    use image::DynamicImage;
    use std::cell::OnceCell;
    use std::path::{Path, PathBuf};

    use super::{crop_with, extract_with, upscale_with, Frontend, Outcome, RunArgs, ROI_WINDOW_TITLE};
    use crate::config::{RenderConfig, RoiConfig};
    use crate::error::RoiResult;
    use crate::file_dialog;
    use crate::geometry::Region;
    use crate::ocr::TesseractCli;
    use crate::render::{PageSource, PdfRenderer};
    use crate::selection;

    /// Native dialogs, the egui selection window and PDFium rendering.
    /// PDFium is bound on the first `open`.
    pub struct DesktopFrontend {
        render: RenderConfig,
        renderer: OnceCell<PdfRenderer>,
    }

    impl DesktopFrontend {
        pub fn new(render: &RenderConfig) -> Self {
            Self {
                render: render.clone(),
                renderer: OnceCell::new(),
            }
        }

        fn renderer(&self) -> RoiResult<&PdfRenderer> {
            if let Some(renderer) = self.renderer.get() {
                return Ok(renderer);
            }
            let renderer = PdfRenderer::bind(&self.render)?;
            Ok(self.renderer.get_or_init(|| renderer))
        }
    }

    impl Frontend for DesktopFrontend {
        fn pick_pdf(&self) -> Option<PathBuf> {
            file_dialog::pick_pdf()
        }

        fn open<'a>(&'a self, path: &Path) -> RoiResult<Box<dyn PageSource + 'a>> {
            let source = self.renderer()?.open(path)?;
            Ok(Box::new(source))
        }

        fn select_region(&self, page: &DynamicImage) -> RoiResult<Option<Region>> {
            selection::select_region(page, ROI_WINDOW_TITLE)
        }

        fn notify_success(&self, title: &str, message: &str) {
            file_dialog::notify_success(title, message);
        }
    }

    pub fn run_extract(config: &RoiConfig, args: &RunArgs) -> RoiResult<Outcome> {
        let recognizer = TesseractCli::from_config(&config.ocr);
        extract_with(config, args, &DesktopFrontend::new(&config.render), &recognizer)
    }

    pub fn run_crop(config: &RoiConfig, args: &RunArgs) -> RoiResult<Outcome> {
        crop_with(config, args, &DesktopFrontend::new(&config.render))
    }

    pub fn run_upscale(config: &RoiConfig, args: &RunArgs) -> RoiResult<Outcome> {
        upscale_with(config, args, &DesktopFrontend::new(&config.render))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::SolidPages;
    use lopdf::{dictionary, Document, Object};
    use std::cell::{Cell, RefCell};
    use tempfile::{tempdir, TempDir};

    /// Answers every prompt from fixed values and records what was asked
    struct ScriptedFrontend {
        picked: Option<PathBuf>,
        region: Option<Region>,
        pages: usize,
        selections: Cell<usize>,
        notices: RefCell<Vec<String>>,
    }

    impl ScriptedFrontend {
        fn new(picked: Option<PathBuf>, region: Option<Region>) -> Self {
            Self {
                picked,
                region,
                pages: 2,
                selections: Cell::new(0),
                notices: RefCell::new(Vec::new()),
            }
        }
    }

    impl Frontend for ScriptedFrontend {
        fn pick_pdf(&self) -> Option<PathBuf> {
            self.picked.clone()
        }

        fn open<'a>(&'a self, _path: &Path) -> RoiResult<Box<dyn PageSource + 'a>> {
            Ok(Box::new(SolidPages::letter(self.pages)))
        }

        fn select_region(&self, _page: &DynamicImage) -> RoiResult<Option<Region>> {
            self.selections.set(self.selections.get() + 1);
            Ok(self.region)
        }

        fn notify_success(&self, _title: &str, message: &str) {
            self.notices.borrow_mut().push(message.to_string());
        }
    }

    struct FixedText;

    impl TextRecognizer for FixedText {
        fn recognize(&self, _image: &DynamicImage) -> RoiResult<String> {
            Ok("total 12.50".to_string())
        }
    }

    /// Config writing into `dir`, with a cheap upscale resolution
    fn config_in(dir: &TempDir) -> RoiConfig {
        let mut config = RoiConfig::default();
        config.ocr.output_path = dir.path().join("ROI_result.csv");
        config.upscale.dpi = 18.0;
        config
    }

    fn write_letter_pdf(path: &Path, page_count: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..page_count)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_cancellation_messages() {
        assert_eq!(Cancellation::NoFileSelected.to_string(), "No PDF file selected.");
        assert_eq!(Cancellation::NoRegionSelected.to_string(), "No ROI selected.");
    }

    #[test]
    fn test_no_file_selected_writes_nothing() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let frontend = ScriptedFrontend::new(None, Some(Region::new(0, 0, 10, 10)));
        let cancelled = Outcome::Cancelled(Cancellation::NoFileSelected);

        let args = RunArgs::default();
        assert_eq!(extract_with(&config, &args, &frontend, &FixedText).unwrap(), cancelled);
        assert_eq!(crop_with(&config, &args, &frontend).unwrap(), cancelled);
        assert_eq!(upscale_with(&config, &args, &frontend).unwrap(), cancelled);

        assert_eq!(frontend.selections.get(), 0);
        assert!(frontend.notices.borrow().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_no_region_selected_writes_nothing() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let input = dir.path().join("scan.pdf");
        write_letter_pdf(&input, 2);
        let frontend = ScriptedFrontend::new(Some(input.clone()), None);
        let cancelled = Outcome::Cancelled(Cancellation::NoRegionSelected);

        let args = RunArgs::default();
        assert_eq!(extract_with(&config, &args, &frontend, &FixedText).unwrap(), cancelled);
        assert_eq!(crop_with(&config, &args, &frontend).unwrap(), cancelled);

        assert_eq!(frontend.selections.get(), 2);
        assert!(!config.ocr.output_path.exists());
        assert!(!cropped_output_path(&input).exists());
        assert!(!upscaled_output_path(&input, config.upscale.scale_factor).exists());
    }

    #[test]
    fn test_extract_writes_configured_csv() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let input = dir.path().join("scan.pdf");
        write_letter_pdf(&input, 2);
        let frontend = ScriptedFrontend::new(Some(input), Some(Region::new(10, 10, 40, 20)));

        let outcome = extract_with(&config, &RunArgs::default(), &frontend, &FixedText).unwrap();

        assert_eq!(outcome, Outcome::Written(config.ocr.output_path.clone()));
        assert_eq!(
            std::fs::read_to_string(&config.ocr.output_path).unwrap(),
            "Page Number,Extracted Text\n1,total 12.50\n2,total 12.50\n"
        );
    }

    #[test]
    fn test_explicit_input_skips_the_dialog() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let input = dir.path().join("statement.pdf");
        write_letter_pdf(&input, 1);
        let frontend = ScriptedFrontend::new(None, Some(Region::new(0, 0, 100, 50)));
        let args = RunArgs {
            input: Some(input.clone()),
            output: None,
        };

        let outcome = crop_with(&config, &args, &frontend).unwrap();
        assert_eq!(outcome, Outcome::Written(cropped_output_path(&input)));
        assert!(cropped_output_path(&input).exists());
    }

    #[test]
    fn test_upscale_notifies_with_output_path() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let input = dir.path().join("book.pdf");
        write_letter_pdf(&input, 2);
        let frontend = ScriptedFrontend::new(Some(input.clone()), None);

        let outcome = upscale_with(&config, &RunArgs::default(), &frontend).unwrap();

        let output = upscaled_output_path(&input, 2.0);
        assert_eq!(outcome, Outcome::Written(output.clone()));
        assert!(output.exists());
        assert_eq!(frontend.selections.get(), 0);
        assert_eq!(
            *frontend.notices.borrow(),
            vec![format!("Resized PDF saved as:\n{}", output.display())]
        );
    }

    #[test]
    fn test_empty_document_names_the_input() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let input = dir.path().join("blank.pdf");
        write_letter_pdf(&input, 1);
        let mut frontend = ScriptedFrontend::new(Some(input.clone()), None);
        frontend.pages = 0;

        match upscale_with(&config, &RunArgs::default(), &frontend) {
            Err(RoiError::EmptyDocument { path }) => assert_eq!(path, input.display().to_string()),
            other => panic!("expected an empty document error, got {other:?}"),
        }
        assert!(!upscaled_output_path(&input, 2.0).exists());
    }
}
