use doc_model::{NormalizedPoint, NormalizedRect};

/// Rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// A page rect can anchor overlays only if it is finite with positive area.
    pub fn is_usable_page(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub fn normalize_rect(page: &PixelRect, rect: &PixelRect) -> Option<NormalizedRect> {
    if !page.is_usable_page() {
        return None;
    }

    let normalized = NormalizedRect::new(
        (rect.left - page.left) / page.width,
        (rect.top - page.top) / page.height,
        rect.width / page.width,
        rect.height / page.height,
    );
    normalized.has_area().then_some(normalized)
}

/// Normalize every rect, discarding selection artifacts without area.
pub fn normalize_rects(page: &PixelRect, rects: &[PixelRect]) -> Vec<NormalizedRect> {
    rects.iter().filter_map(|rect| normalize_rect(page, rect)).collect()
}

pub fn normalize_point(page: &PixelRect, point: PixelPoint) -> Option<NormalizedPoint> {
    if !page.is_usable_page() {
        return None;
    }

    let normalized =
        NormalizedPoint::new((point.x - page.left) / page.width, (point.y - page.top) / page.height);
    normalized.is_finite().then_some(normalized)
}

/// Map a stored rect onto the page as it is laid out now.
pub fn denormalize_rect(page: &PixelRect, rect: &NormalizedRect) -> Option<PixelRect> {
    page.is_usable_page().then(|| {
        PixelRect::new(
            page.left + rect.x * page.width,
            page.top + rect.y * page.height,
            rect.width * page.width,
            rect.height * page.height,
        )
    })
}

pub fn denormalize_point(page: &PixelRect, point: &NormalizedPoint) -> Option<PixelPoint> {
    page.is_usable_page()
        .then(|| PixelPoint::new(page.left + point.x * page.width, page.top + point.y * page.height))
}
