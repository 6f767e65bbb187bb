use image::GrayImage;
use crate::types::BoundingBox;

/// Tight bounding box of all fully set (255) mask pixels.
///
/// Scans the whole buffer; any row may move any of the four edges.
pub fn mask_bounds(mask: &GrayImage) -> BoundingBox {
    let width = mask.width() as usize;
    if width == 0 {
        return BoundingBox::Empty;
    }

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (y, row) in mask.as_raw().chunks_exact(width).enumerate() {
        for (x, &value) in row.iter().enumerate() {
            if value == u8::MAX {
                let (x, y) = (x as u32, y as u32);
                found = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    if found {
        BoundingBox::Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    } else {
        BoundingBox::Empty
    }
}
