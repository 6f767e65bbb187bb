use crate::{
    error::{OutlineError, Result},
    types::{GeometryLimits, GeometryPlan},
};

/// Base outline thickness in pixels: one percent of the longer side
pub fn base_thickness(width: u32, height: u32) -> u32 {
    let longer = width.max(height) as f64;
    ((longer / 100.0).round() as u32).max(1)
}

/// Blur radius for a thickness factor given in percent of the base thickness
pub fn blur_radius(base_thickness: u32, thickness_factor: f64) -> u32 {
    let scaled = (base_thickness as f64 * (thickness_factor / 100.0)).ceil();
    // `as` saturates, so absurd factors end up rejected by the limits check
    (scaled as u32).max(1)
}

/// Guard band beyond the radius: 5px plus roughly ten percent of the radius
pub fn safety_margin(radius: u32) -> u32 {
    (radius as f64 * 0.1).ceil() as u32 + 5
}

/// Plans the oversized working canvas for a `width` x `height` source.
///
/// Fails with [`OutlineError::GeometryTooLarge`] before anything is allocated
/// when the canvas would break `limits`.
pub fn plan_geometry(
    width: u32,
    height: u32,
    thickness_factor: f64,
    limits: &GeometryLimits,
) -> Result<GeometryPlan> {
    if width == 0 || height == 0 {
        return Err(OutlineError::InvalidSource(format!(
            "source has zero extent ({width}x{height})"
        )));
    }

    let base_thickness = base_thickness(width, height);
    let radius = blur_radius(base_thickness, thickness_factor);
    let safety_margin = safety_margin(radius);

    let offset = radius as u64 + safety_margin as u64;
    let work_width = width as u64 + 2 * offset;
    let work_height = height as u64 + 2 * offset;

    let too_large = work_width > limits.max_dimension as u64
        || work_height > limits.max_dimension as u64
        || work_width.saturating_mul(work_height) > limits.max_area;

    if too_large {
        tracing::warn!(
            work_width,
            work_height,
            max_dimension = limits.max_dimension,
            max_area = limits.max_area,
            "working canvas exceeds limits"
        );
        return Err(OutlineError::GeometryTooLarge {
            width: work_width,
            height: work_height,
            max_dimension: limits.max_dimension,
            max_area: limits.max_area,
        });
    }

    // max_dimension is a u32, so everything below fits
    Ok(GeometryPlan {
        base_thickness,
        radius,
        safety_margin,
        offset: offset as u32,
        work_width: work_width as u32,
        work_height: work_height as u32,
    })
}
