use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::UpscaleConfig;
use crate::error::{RoiError, RoiResult};
use crate::geometry::UpscaleLayout;
use crate::render::PageSource;

#[derive(Debug, Clone, Copy)]
pub struct UpscaleSettings {
    pub scale_factor: f32,
    pub margin: f32,
    pub dpi: f32,
}

impl From<&UpscaleConfig> for UpscaleSettings {
    fn from(config: &UpscaleConfig) -> Self {
        Self {
            scale_factor: config.scale_factor,
            margin: config.margin,
            dpi: config.dpi,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpscaleReport {
    pub output: PathBuf,
    pub pages: usize,
    pub layouts: Vec<UpscaleLayout>,
}

/// `book.pdf` at 2x -> `book_resized_2x.pdf` in the same directory
pub fn upscaled_output_path(input: &Path, scale_factor: f32) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let scale = if scale_factor.fract() == 0.0 {
        format!("{}", scale_factor as i64)
    } else {
        format!("{}", scale_factor)
    };
    input.with_file_name(format!("{}_resized_{}x.pdf", stem, scale))
}

/// Re-render every page of `input` (opened as `source`) as a bitmap and place
/// it on a new, larger page with a margin on all sides.
pub fn upscale_document<S>(source: &S, input: &Path, output: &Path, settings: &UpscaleSettings) -> RoiResult<UpscaleReport>
where
    S: PageSource + ?Sized,
{
    let page_count = source.page_count();
    if page_count == 0 {
        return Err(RoiError::EmptyDocument {
            path: input.display().to_string(),
        });
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(page_count);
    let mut layouts = Vec::with_capacity(page_count);

    for index in 0..page_count {
        let size = source.page_size(index)?;
        let layout = UpscaleLayout::compute(size, settings.scale_factor, settings.margin);
        let bitmap = source.render_page(index, settings.dpi)?.to_rgb8();

        debug!(
            "Page {}: {}x{}pt -> {}x{}pt, bitmap {}x{}",
            index + 1,
            size.width,
            size.height,
            layout.page_width,
            layout.page_height,
            bitmap.width(),
            bitmap.height()
        );

        let image_id = add_image(&mut doc, bitmap)?;
        let page_id = add_page(&mut doc, pages_id, image_id, &layout)?;
        kids.push(Object::Reference(page_id));
        layouts.push(layout);
    }

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

    doc.save(output)
        .map_err(|e| RoiError::pdf_processing_with_source(format!("Failed to save {}", output.display()), e))?;

    info!("🔎 Upscaled {} pages x{} -> {}", page_count, settings.scale_factor, output.display());
    Ok(UpscaleReport {
        output: output.to_path_buf(),
        pages: page_count,
        layouts,
    })
}

fn add_image(doc: &mut Document, bitmap: image::RgbImage) -> RoiResult<ObjectId> {
    let (width, height) = bitmap.dimensions();
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        bitmap.into_raw(),
    );
    stream.compress()?;
    Ok(doc.add_object(stream))
}

fn add_page(doc: &mut Document, pages_id: ObjectId, image_id: ObjectId, layout: &UpscaleLayout) -> RoiResult<ObjectId> {
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(layout.image_width),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(layout.image_height),
                    Object::Real(layout.image_x),
                    Object::Real(layout.image_y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(layout.page_width),
            Object::Real(layout.page_height),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    }))
}
