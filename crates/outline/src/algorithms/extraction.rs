use image::{GrayImage, RgbaImage};
use crate::{
    error::{OutlineError, Result},
    types::GeometryPlan,
};

/// Allocates a zeroed buffer, reporting failure instead of aborting
pub(crate) fn try_zeroed(len: usize, what: &'static str) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| OutlineError::AllocationFailure { what, bytes: len })?;
    buffer.resize(len, 0);
    Ok(buffer)
}

/// Checks that `bytes` could be allocated right now, for buffers another
/// crate allocates without reporting failure
pub(crate) fn ensure_headroom(bytes: Option<usize>, what: &'static str) -> Result<()> {
    let bytes = bytes.ok_or(OutlineError::AllocationFailure {
        what,
        bytes: usize::MAX,
    })?;
    let mut reservation: Vec<u8> = Vec::new();
    reservation
        .try_reserve_exact(bytes)
        .map_err(|_| OutlineError::AllocationFailure { what, bytes })
}

/// Copies the source alpha channel into a zeroed working-size opacity field.
///
/// The source lands at `(plan.offset, plan.offset)`; color is discarded.
pub fn extract_alpha(source: &RgbaImage, plan: &GeometryPlan) -> Result<GrayImage> {
    let (width, height) = source.dimensions();
    let work_width = plan.work_width as usize;
    let len = work_width * plan.work_height as usize;

    let mut data = try_zeroed(len, "working buffer")?;
    let offset = plan.offset as usize;

    for (y, row) in source.rows().enumerate() {
        let start = (y + offset) * work_width + offset;
        let target = data
            .get_mut(start..start + width as usize)
            .ok_or_else(|| {
                OutlineError::PixelAccess(format!(
                    "row {y} of {width}x{height} source falls outside the working buffer"
                ))
            })?;
        for (dst, pixel) in target.iter_mut().zip(row) {
            *dst = pixel.0[3];
        }
    }

    GrayImage::from_raw(plan.work_width, plan.work_height, data).ok_or_else(|| {
        OutlineError::PixelAccess("opacity field size does not match its buffer".to_string())
    })
}
