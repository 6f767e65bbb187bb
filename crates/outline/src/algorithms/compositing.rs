use image::{imageops, GrayImage, Rgba, RgbaImage};
use crate::{
    algorithms::extraction::try_zeroed,
    error::{OutlineError, Result},
    types::{BoundingBox, GeometryPlan, RgbColor},
};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Builds the cropped output: outline fill clipped to the mask, source on top.
///
/// An empty box yields a single transparent pixel.
pub fn composite(
    source: &RgbaImage,
    mask: &GrayImage,
    plan: &GeometryPlan,
    bounds: &BoundingBox,
    color: RgbColor,
) -> Result<RgbaImage> {
    let BoundingBox::Bounds { min_x, min_y, .. } = *bounds else {
        return Ok(RgbaImage::from_pixel(1, 1, TRANSPARENT));
    };
    let (width, height) = (bounds.width(), bounds.height());

    let len = width as usize * height as usize * 4;
    let data = try_zeroed(len, "output buffer")?;
    let mut output = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        OutlineError::PixelAccess("output size does not match its buffer".to_string())
    })?;

    fill_masked(&mut output, mask, min_x, min_y, color)?;

    let draw_x = plan.offset as i64 - min_x as i64;
    let draw_y = plan.offset as i64 - min_y as i64;
    // Non-premultiplied "over"; parts of the source outside the crop are clipped
    imageops::overlay(&mut output, source, draw_x, draw_y);

    Ok(output)
}

/// Fill with the outline color, then keep it only where the mask is set
fn fill_masked(
    output: &mut RgbaImage,
    mask: &GrayImage,
    min_x: u32,
    min_y: u32,
    color: RgbColor,
) -> Result<()> {
    let fill = color.to_rgba(u8::MAX);
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let coverage = mask
            .get_pixel_checked(min_x + x, min_y + y)
            .ok_or_else(|| {
                OutlineError::PixelAccess(format!(
                    "mask pixel ({}, {}) is outside the working buffer",
                    min_x + x,
                    min_y + y
                ))
            })?
            .0[0];

        *pixel = match coverage {
            0 => TRANSPARENT,
            u8::MAX => fill,
            partial => Rgba([fill[0], fill[1], fill[2], partial]),
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn plan(offset: u32, work: u32) -> GeometryPlan {
        GeometryPlan {
            base_thickness: 1,
            radius: 1,
            safety_margin: offset - 1,
            offset,
            work_width: work,
            work_height: work,
        }
    }

    #[test]
    fn test_empty_bounds_yield_transparent_pixel() {
        let source = RgbaImage::new(3, 3);
        let mask = GrayImage::new(9, 9);
        let out = composite(&source, &mask, &plan(3, 9), &BoundingBox::Empty, RgbColor::WHITE)
            .unwrap();
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(*out.get_pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn test_fill_is_clipped_and_source_on_top() {
        // 1x1 opaque red source at offset 2 in a 5x5 working buffer
        let source = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let mut mask = GrayImage::new(5, 5);
        for (x, y) in [(2, 1), (1, 2), (2, 2), (3, 2), (2, 3)] {
            mask.put_pixel(x, y, Luma([255]));
        }
        let bounds = BoundingBox::Bounds {
            min_x: 1,
            min_y: 1,
            max_x: 3,
            max_y: 3,
        };
        let blue = RgbColor::new(0, 0, 255);

        let out = composite(&source, &mask, &plan(2, 5), &bounds, blue).unwrap();
        assert_eq!(out.dimensions(), (3, 3));
        assert_eq!(*out.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(0, 1), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(0, 0), TRANSPARENT);
        assert_eq!(*out.get_pixel(2, 2), TRANSPARENT);
    }

    #[test]
    fn test_out_of_range_mask_read_fails() {
        let source = RgbaImage::new(1, 1);
        let mask = GrayImage::new(2, 2);
        let bounds = BoundingBox::Bounds {
            min_x: 0,
            min_y: 0,
            max_x: 3,
            max_y: 3,
        };
        let err = composite(&source, &mask, &plan(1, 2), &bounds, RgbColor::BLACK).unwrap_err();
        assert!(matches!(err, OutlineError::PixelAccess(_)));
    }

    #[test]
    fn test_source_is_clipped_at_crop_edges() {
        // 3x3 opaque gradient whose outer ring falls outside a 1x1 crop
        let source = RgbaImage::from_fn(3, 3, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 0, 255]));
        let mut mask = GrayImage::new(7, 7);
        mask.put_pixel(3, 3, Luma([255]));
        let bounds = BoundingBox::Bounds {
            min_x: 3,
            min_y: 3,
            max_x: 3,
            max_y: 3,
        };

        let out = composite(&source, &mask, &plan(2, 7), &bounds, RgbColor::WHITE).unwrap();
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(*out.get_pixel(0, 0), Rgba([10, 10, 0, 255]));
    }

    #[test]
    fn test_source_alpha_blends_over_fill() {
        let source = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([9, 9, 9, 0]),
            1 => Rgba([1, 2, 3, 255]),
            _ => Rgba([255, 0, 0, 128]),
        });
        let mask = GrayImage::from_pixel(5, 3, Luma([255]));
        let bounds = BoundingBox::Bounds {
            min_x: 1,
            min_y: 1,
            max_x: 3,
            max_y: 1,
        };
        let blue = RgbColor::new(0, 0, 255);

        let out = composite(&source, &mask, &plan(1, 5), &bounds, blue).unwrap();
        // Transparent source leaves the fill, opaque source replaces it exactly
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([1, 2, 3, 255]));

        let half = out.get_pixel(2, 0);
        assert!(half[3] >= 254, "{half:?}");
        assert!((half[0] as i32 - 128).abs() <= 1, "{half:?}");
        assert!((half[2] as i32 - 127).abs() <= 1, "{half:?}");
    }
}
