use crate::normalize::{PixelPoint, PixelRect};

/// What the page renderer exposes to the capture layer.
///
/// Page numbers are 1-based. Bounds are in viewport pixels and reflect the
/// current zoom and scroll position.
pub trait PageSurface {
    fn page_count(&self) -> u32;

    fn page_bounds(&self, page_number: u32) -> Option<PixelRect>;

    /// Set when the document failed to load.
    fn load_error(&self) -> Option<&str>;

    fn page_at(&self, point: PixelPoint) -> Option<u32> {
        (1..=self.page_count()).find(|page| {
            self.page_bounds(*page).is_some_and(|bounds| bounds.contains(point))
        })
    }
}

/// Pages of identical size stacked vertically, as in a continuous view.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformPageSurface {
    pub page_count: u32,
    pub page_width_px: f64,
    pub page_height_px: f64,
    pub page_spacing_px: f64,
    pub scroll_offset_px: f64,
}

impl UniformPageSurface {
    /// US Letter at 1pt = 1px.
    pub const LETTER: (f64, f64) = (612.0, 792.0);

    pub fn new(page_count: u32, page_width_px: f64, page_height_px: f64) -> Self {
        Self {
            page_count,
            page_width_px,
            page_height_px,
            page_spacing_px: 16.0,
            scroll_offset_px: 0.0,
        }
    }

    pub fn with_zoom(mut self, zoom_percent: u16) -> Self {
        let scale = f64::from(zoom_percent) / 100.0;
        self.page_width_px *= scale;
        self.page_height_px *= scale;
        self
    }

    /// Translate a page-local point into viewport pixels.
    pub fn to_viewport(&self, page_number: u32, local: PixelPoint) -> Option<PixelPoint> {
        let bounds = self.page_bounds(page_number)?;
        Some(PixelPoint::new(bounds.left + local.x, bounds.top + local.y))
    }
}

impl PageSurface for UniformPageSurface {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_bounds(&self, page_number: u32) -> Option<PixelRect> {
        if page_number == 0 || page_number > self.page_count {
            return None;
        }

        let stride = self.page_height_px + self.page_spacing_px;
        let top = f64::from(page_number - 1) * stride - self.scroll_offset_px;
        Some(PixelRect::new(0.0, top, self.page_width_px, self.page_height_px))
    }

    fn load_error(&self) -> Option<&str> {
        None
    }
}
