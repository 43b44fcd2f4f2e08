//! Coordinate types shared by the selection window and the page pipelines.
//!
//! Two spaces meet here: bitmap pixels (top-left origin, rendered at some DPI)
//! and PDF user space (points, bottom-left origin).

pub const POINTS_PER_INCH: f32 = 72.0;

/// User-selected rectangle in pixels of the rendered first page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from the two drag endpoints in either order. Negative inputs are
    /// treated as 0.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        let x0 = a.0.min(b.0).max(0.0).round();
        let x1 = a.0.max(b.0).max(0.0).round();
        let y0 = a.1.min(b.1).max(0.0).round();
        let y1 = a.1.max(b.1).max(0.0).round();

        Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Page dimensions in points, as displayed (rotation applied)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Rectangle in PDF user space; always `x0 <= x1` and `y0 <= y1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PdfRect {
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    /// From a PDF box array `[llx lly urx ury]`; the corners may come in any order
    pub fn from_box(values: [f32; 4]) -> Self {
        Self::from_corners((values[0], values[1]), (values[2], values[3]))
    }

    pub fn to_box(self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Clip every edge into `bounds`. A rect entirely outside collapses onto
    /// the nearest edge instead of inverting.
    pub fn clamp_to(&self, bounds: &PdfRect) -> PdfRect {
        PdfRect {
            x0: self.x0.clamp(bounds.x0, bounds.x1),
            y0: self.y0.clamp(bounds.y0, bounds.y1),
            x1: self.x1.clamp(bounds.x0, bounds.x1),
            y1: self.y1.clamp(bounds.y0, bounds.y1),
        }
    }

    pub fn intersect(&self, other: &PdfRect) -> PdfRect {
        self.clamp_to(other)
    }
}

/// Page `/Rotate`, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl PageRotation {
    /// Any multiple of 90, including negatives; other values fall back to none
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => PageRotation::Cw90,
            180 => PageRotation::Cw180,
            270 => PageRotation::Cw270,
            _ => PageRotation::None,
        }
    }

    /// Map a displayed point (points from the top-left of the shown page) to
    /// user space inside `visible`.
    fn to_user_space(self, visible: &PdfRect, u: f32, v: f32) -> (f32, f32) {
        match self {
            PageRotation::None => (visible.x0 + u, visible.y1 - v),
            PageRotation::Cw90 => (visible.x0 + v, visible.y0 + u),
            PageRotation::Cw180 => (visible.x1 - u, visible.y0 + v),
            PageRotation::Cw270 => (visible.x1 - v, visible.y1 - u),
        }
    }
}

/// Convert a pixel region of a page rendered at `dpi` into the matching
/// user-space rectangle, clamped to `visible`.
pub fn region_to_user_space(region: &Region, visible: &PdfRect, rotation: PageRotation, dpi: f32) -> PdfRect {
    let k = POINTS_PER_INCH / dpi;
    let (u0, v0) = (region.x as f32 * k, region.y as f32 * k);
    let (u1, v1) = (region.right() as f32 * k, region.bottom() as f32 * k);

    let a = rotation.to_user_space(visible, u0, v0);
    let b = rotation.to_user_space(visible, u1, v1);
    PdfRect::from_corners(a, b).clamp_to(visible)
}

/// Placement of a re-rendered page on its enlarged output page, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpscaleLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub image_x: f32,
    pub image_y: f32,
    pub image_width: f32,
    pub image_height: f32,
}

impl UpscaleLayout {
    pub fn compute(size: PageSize, scale: f32, margin: f32) -> Self {
        let scaled_margin = margin * scale;
        let image_width = size.width * scale;
        let image_height = size.height * scale;

        Self {
            page_width: image_width + 2.0 * scaled_margin,
            page_height: image_height + 2.0 * scaled_margin,
            image_x: scaled_margin,
            image_y: scaled_margin,
            image_width,
            image_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> PdfRect {
        PdfRect::from_box([0.0, 0.0, 612.0, 792.0])
    }

    fn assert_rect_eq(actual: PdfRect, expected: [f32; 4]) {
        let got = actual.to_box();
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-3, "got {:?}, expected {:?}", got, expected);
        }
    }

    #[test]
    fn test_region_normalizes_any_drag_direction() {
        let forward = Region::from_corners((10.0, 20.0), (110.0, 70.0));
        let backward = Region::from_corners((110.0, 70.0), (10.0, 20.0));
        let mixed = Region::from_corners((110.0, 20.0), (10.0, 70.0));

        assert_eq!(forward, Region::new(10, 20, 100, 50));
        assert_eq!(forward, backward);
        assert_eq!(forward, mixed);
    }

    #[test]
    fn test_region_clips_negative_corners() {
        let region = Region::from_corners((-5.0, -5.0), (40.0, 30.0));
        assert_eq!(region, Region::new(0, 0, 40, 30));
    }

    #[test]
    fn test_region_display_and_empty() {
        assert_eq!(Region::new(1, 2, 3, 4).to_string(), "3x4+1+2");
        assert!(Region::from_corners((5.0, 5.0), (5.0, 80.0)).is_empty());
    }

    #[test]
    fn test_pixels_map_to_points_at_72_dpi() {
        let region = Region::new(100, 50, 200, 100);
        let rect = region_to_user_space(&region, &letter(), PageRotation::None, 72.0);
        assert_rect_eq(rect, [100.0, 642.0, 300.0, 742.0]);
    }

    #[test]
    fn test_higher_dpi_scales_back_to_points() {
        let region = Region::new(200, 100, 400, 200);
        let rect = region_to_user_space(&region, &letter(), PageRotation::None, 144.0);
        assert_rect_eq(rect, [100.0, 642.0, 300.0, 742.0]);
    }

    #[test]
    fn test_offset_visible_box() {
        let visible = PdfRect::from_box([50.0, 50.0, 300.0, 400.0]);
        let rect = region_to_user_space(&Region::new(0, 0, 10, 10), &visible, PageRotation::None, 72.0);
        assert_rect_eq(rect, [50.0, 390.0, 60.0, 400.0]);
    }

    #[test]
    fn test_region_partially_outside_is_clamped() {
        let region = Region::new(500, 700, 300, 300);
        let rect = region_to_user_space(&region, &letter(), PageRotation::None, 72.0);
        assert_rect_eq(rect, [500.0, 0.0, 612.0, 92.0]);
        assert!(rect.width() <= 612.0 && rect.height() <= 792.0);
    }

    #[test]
    fn test_region_fully_outside_collapses() {
        let region = Region::new(1000, 0, 50, 50);
        let rect = region_to_user_space(&region, &letter(), PageRotation::None, 72.0);
        assert_eq!(rect.width(), 0.0);
        assert!(rect.x0 <= rect.x1 && rect.y0 <= rect.y1);
    }

    #[test]
    fn test_rotated_pages() {
        // Displayed top-left 10x20 corner of each rotated letter page
        let region = Region::new(0, 0, 10, 20);

        let cw90 = region_to_user_space(&region, &letter(), PageRotation::Cw90, 72.0);
        assert_rect_eq(cw90, [0.0, 0.0, 20.0, 10.0]);

        let cw180 = region_to_user_space(&region, &letter(), PageRotation::Cw180, 72.0);
        assert_rect_eq(cw180, [602.0, 0.0, 612.0, 20.0]);

        let cw270 = region_to_user_space(&region, &letter(), PageRotation::Cw270, 72.0);
        assert_rect_eq(cw270, [592.0, 782.0, 612.0, 792.0]);
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(PageRotation::from_degrees(0), PageRotation::None);
        assert_eq!(PageRotation::from_degrees(450), PageRotation::Cw90);
        assert_eq!(PageRotation::from_degrees(-90), PageRotation::Cw270);
        assert_eq!(PageRotation::from_degrees(45), PageRotation::None);
    }

    #[test]
    fn test_upscale_layout_adds_scaled_margin() {
        let layout = UpscaleLayout::compute(PageSize { width: 612.0, height: 792.0 }, 2.0, 10.0);
        assert_eq!(layout.page_width, 612.0 * 2.0 + 2.0 * 10.0 * 2.0);
        assert_eq!(layout.page_height, 792.0 * 2.0 + 2.0 * 10.0 * 2.0);
        assert_eq!((layout.image_x, layout.image_y), (20.0, 20.0));
        assert_eq!((layout.image_width, layout.image_height), (1224.0, 1584.0));
    }
}
