use image::GrayImage;

/// Maps the 0-100 smoothing scale onto the 0-255 alpha scale
const SMOOTHING_TO_ALPHA: f64 = 2.54;

/// Alpha cutoff for a smoothing factor in `[0, 100]`.
///
/// Higher smoothing lowers the cutoff so more of the blurred halo counts as
/// inside. The result is always within `[1, 255]`.
pub fn alpha_threshold(smoothing_factor: f64) -> u8 {
    let smoothing = if smoothing_factor.is_nan() {
        0.0
    } else {
        smoothing_factor.clamp(0.0, 100.0)
    };
    let raw = ((100.0 - smoothing) * SMOOTHING_TO_ALPHA).round();
    raw.clamp(1.0, 255.0) as u8
}

/// Turns a soft opacity field into a 0/255 mask in place
pub fn apply_threshold(field: &mut GrayImage, threshold: u8) {
    // imageproc keeps values strictly above its cutoff; threshold is >= 1
    imageproc::contrast::threshold_mut(field, threshold.saturating_sub(1));
}
