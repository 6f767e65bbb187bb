use image::GrayImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    algorithms::extraction::{ensure_headroom, try_zeroed},
    error::Result,
    traits::FieldBlur,
};

/// Gaussian blur with `sigma = radius`, the way CSS `blur(Npx)` reads N
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianBlur;

impl FieldBlur for GaussianBlur {
    fn blur(&self, field: &mut GrayImage, radius: u32) -> Result<()> {
        if radius == 0 {
            return Ok(());
        }
        // f32 intermediate plus the u8 output
        let pixels = field.width() as usize * field.height() as usize;
        let needed = pixels
            .checked_mul(std::mem::size_of::<f32>() + 1)
            .map(|bytes| bytes.max(1));
        ensure_headroom(needed, "gaussian blur buffers")?;

        *field = imageproc::filter::gaussian_blur_f32(field, radius as f32);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gaussian"
    }
}

/// Repeated separable box blur approximating a Gaussian of `sigma = radius`.
///
/// Runs in place with integer arithmetic only, so results are identical on
/// every platform. Pixels outside the field count as zero.
#[derive(Debug, Clone, Copy)]
pub struct BoxBlur {
    pub passes: usize,
}

impl Default for BoxBlur {
    fn default() -> Self {
        Self { passes: 3 }
    }
}

impl BoxBlur {
    /// Box half-widths whose successive application approximates the Gaussian
    pub fn box_radii(sigma: f64, passes: usize) -> Vec<usize> {
        if passes == 0 || sigma <= 0.0 {
            return Vec::new();
        }
        let n = passes as f64;
        let ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
        let mut lower = ideal.floor() as i64;
        if lower % 2 == 0 {
            lower -= 1;
        }
        let lower = lower.max(1);
        let upper = lower + 2;
        let lw = lower as f64;
        let m = ((12.0 * sigma * sigma - n * lw * lw - 4.0 * n * lw - 3.0 * n) / (-4.0 * lw - 4.0))
            .round() as i64;

        (0..passes as i64)
            .map(|i| if i < m { lower } else { upper })
            .map(|size| ((size - 1) / 2) as usize)
            .collect()
    }
}

impl FieldBlur for BoxBlur {
    fn blur(&self, field: &mut GrayImage, radius: u32) -> Result<()> {
        if radius == 0 {
            return Ok(());
        }
        let (width, height) = (field.width() as usize, field.height() as usize);
        let mut scratch = try_zeroed(width.max(height), "blur scratch line")?;
        let data: &mut [u8] = &mut **field;

        for r in Self::box_radii(radius as f64, self.passes) {
            if r == 0 {
                continue;
            }
            for y in 0..height {
                blur_line(data, y * width, 1, width, r, &mut scratch);
            }
            for x in 0..width {
                blur_line(data, x, width, height, r, &mut scratch);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "box"
    }
}

/// Sliding-window mean over one row or column with zero padding
fn blur_line(data: &mut [u8], start: usize, stride: usize, len: usize, r: usize, scratch: &mut [u8]) {
    for (i, slot) in scratch[..len].iter_mut().enumerate() {
        *slot = data[start + i * stride];
    }

    let diameter = (2 * r + 1) as u64;
    let mut sum: u64 = scratch[..len.min(r + 1)].iter().map(|&v| v as u64).sum();

    for i in 0..len {
        data[start + i * stride] = ((sum + diameter / 2) / diameter) as u8;
        if i + r + 1 < len {
            sum += scratch[i + r + 1] as u64;
        }
        if i >= r {
            sum -= scratch[i - r] as u64;
        }
    }
}

/// Selectable blur implementation
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlurMethod {
    /// imageproc Gaussian kernel
    #[default]
    Gaussian,
    /// Three-pass integer box blur
    Box,
}

impl BlurMethod {
    pub fn into_blur(self) -> Box<dyn FieldBlur> {
        match self {
            BlurMethod::Gaussian => Box::new(GaussianBlur),
            BlurMethod::Box => Box::new(BoxBlur::default()),
        }
    }
}
