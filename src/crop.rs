use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{RoiError, RoiResult};
use crate::geometry::{region_to_user_space, PageRotation, PdfRect, Region};

#[derive(Debug, Clone)]
pub struct CropReport {
    pub output: PathBuf,
    pub pages: usize,
    /// Box applied to each page, in page order
    pub boxes: Vec<PdfRect>,
}

/// `report.pdf` -> `report_cropped.pdf` in the same directory
pub fn cropped_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    input.with_file_name(format!("{}_cropped.pdf", stem))
}

/// Crop every page of `input` to `region` (pixels of a render at `dpi`) and
/// write the result to `output`. Each output page is exactly the clamped
/// region in size.
pub fn crop_document(input: &Path, output: &Path, region: &Region, dpi: f32) -> RoiResult<CropReport> {
    let mut doc = Document::load(input)?;
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(RoiError::EmptyDocument {
            path: input.display().to_string(),
        });
    }

    let mut boxes = Vec::with_capacity(pages.len());
    for (page_number, page_id) in pages {
        let visible = visible_box(&doc, page_id)?;
        let rotation = inherited(&doc, page_id, b"Rotate")
            .and_then(|o| o.as_i64().ok())
            .map(PageRotation::from_degrees)
            .unwrap_or_default();

        let crop = region_to_user_space(region, &visible, rotation, dpi);
        debug!(
            "Page {}: visible {:?}, rotation {:?} -> crop {:?}",
            page_number, visible, rotation, crop
        );

        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("MediaBox", box_object(&crop));
        page.set("CropBox", box_object(&crop));
        boxes.push(crop);
    }

    doc.save(output)
        .map_err(|e| RoiError::pdf_processing_with_source(format!("Failed to save {}", output.display()), e))?;

    info!("✂️  Cropped {} pages -> {}", boxes.len(), output.display());
    Ok(CropReport {
        output: output.to_path_buf(),
        pages: boxes.len(),
        boxes,
    })
}

/// CropBox if present, otherwise MediaBox, limited to the MediaBox
fn visible_box(doc: &Document, page_id: ObjectId) -> RoiResult<PdfRect> {
    let media = inherited(doc, page_id, b"MediaBox")
        .and_then(|o| read_box(doc, o))
        .ok_or_else(|| RoiError::pdf_processing(format!("Page object {:?} has no MediaBox", page_id)))?;

    Ok(inherited(doc, page_id, b"CropBox")
        .and_then(|o| read_box(doc, o))
        .map(|crop| crop.intersect(&media))
        .unwrap_or(media))
}

/// Look `key` up on the page, then up the page tree through `/Parent`
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node: &Dictionary = doc.get_dictionary(page_id).ok()?;
    // The depth bound stops on cyclic page trees
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn read_box(doc: &Document, object: &Object) -> Option<PdfRect> {
    let object = match object {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let values = object.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }

    let mut numbers = [0.0f32; 4];
    for (slot, value) in numbers.iter_mut().zip(values) {
        *slot = number(value)?;
    }
    Some(PdfRect::from_box(numbers))
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn box_object(rect: &PdfRect) -> Object {
    Object::Array(rect.to_box().iter().map(|v| Object::Real(*v)).collect())
}
