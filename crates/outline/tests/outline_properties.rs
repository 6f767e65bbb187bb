use image::{Rgba, RgbaImage};
use outline::{
    BlurMethod, BoundingBox, OutlineError, OutlineParameters, OutlinePipeline, RgbColor,
};

fn single_pixel() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]))
}

/// Opaque disc with a soft rim and a transparent hole punched in the middle
fn sticker(width: u32, height: u32) -> RgbaImage {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let radius = width.min(height) as f32 * 0.35;
    RgbaImage::from_fn(width, height, |x, y| {
        let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
        if d < radius * 0.2 {
            Rgba([0, 0, 0, 0])
        } else if d < radius {
            Rgba([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 90, 255])
        } else if d < radius + 2.0 {
            Rgba([200, 40, 40, 120])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

#[test]
fn test_single_pixel_bounds_are_centered() {
    let params = OutlineParameters::default();
    for method in [BlurMethod::Gaussian, BlurMethod::Box] {
        let pipeline = OutlinePipeline::builder().with_blur_method(method).build();
        let result = pipeline.process(&single_pixel(), &params).unwrap();

        assert_eq!(result.plan.radius, 1);
        assert_eq!(result.bounds.width(), 3, "{method}");
        assert_eq!(result.bounds.height(), 3, "{method}");
        let offset = result.plan.offset as f64;
        assert_eq!(result.bounds.center(), Some((offset, offset)), "{method}");
        // The source pixel sits in the middle of the cropped frame
        assert_eq!(*result.image.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
    }
}

#[test]
fn test_single_pixel_bounds_grow_with_radius() {
    let params = OutlineParameters::default().with_smoothing(100.0);
    let pipeline = OutlinePipeline::default();
    for thickness in [100.0, 200.0, 300.0] {
        let result = pipeline
            .process(&single_pixel(), &params.with_thickness(thickness))
            .unwrap();
        let r = result.plan.radius;
        let side = result.bounds.width();

        assert_eq!(side, result.bounds.height());
        assert_eq!(side % 2, 1, "odd side keeps the pixel centered");
        assert!(side >= 2 * r + 1 && side <= 4 * r + 3, "radius {r}, side {side}");
        let offset = result.plan.offset as f64;
        assert_eq!(result.bounds.center(), Some((offset, offset)));
    }
}

#[test]
fn test_fully_transparent_source() {
    let source = RgbaImage::new(40, 25);
    let result = OutlinePipeline::default()
        .process(&source, &OutlineParameters::default())
        .unwrap();
    assert_eq!(result.bounds, BoundingBox::Empty);
    assert_eq!(result.image.dimensions(), (1, 1));
    assert_eq!(*result.image.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
}

#[test]
fn test_rendering_is_deterministic() {
    let source = sticker(90, 70);
    let params = OutlineParameters::new(340.0, 80.0, RgbColor::new(12, 240, 99));
    for method in [BlurMethod::Gaussian, BlurMethod::Box] {
        let pipeline = OutlinePipeline::builder().with_blur_method(method).build();
        let first = pipeline.process(&source, &params).unwrap();
        let second = pipeline.process(&source, &params).unwrap();
        assert_eq!(*first.image, *second.image);
        assert_eq!(first.bounds, second.bounds);
    }
}

#[test]
fn test_opaque_source_pixels_occlude_the_fill() {
    let source = sticker(120, 80);
    let color = RgbColor::new(255, 0, 255);
    let params = OutlineParameters::new(400.0, 90.0, color);
    let result = OutlinePipeline::default().process(&source, &params).unwrap();

    let BoundingBox::Bounds { min_x, min_y, .. } = result.bounds else {
        panic!("mask should not be empty");
    };
    let dx = result.plan.offset as i64 - min_x as i64;
    let dy = result.plan.offset as i64 - min_y as i64;

    let mut checked = 0;
    for (x, y, pixel) in source.enumerate_pixels() {
        if pixel[3] != 255 {
            continue;
        }
        let (ox, oy) = (x as i64 + dx, y as i64 + dy);
        if let Some(out) = result.image.get_pixel_checked(ox as u32, oy as u32) {
            assert_eq!(out, pixel, "source pixel ({x}, {y})");
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_halo_carries_outline_color() {
    let source = RgbaImage::from_fn(50, 50, |x, y| {
        if (10..40).contains(&x) && (10..40).contains(&y) {
            Rgba([1, 2, 3, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let color = RgbColor::new(250, 200, 0);
    let result = OutlinePipeline::default()
        .process(&source, &OutlineParameters::default().with_color(color))
        .unwrap();

    let image = &result.image;
    let mid = image.height() / 2;
    // Leftmost column is halo; corners of a square halo stay clear
    assert_eq!(*image.get_pixel(0, mid), Rgba([250, 200, 0, 255]));
    assert_eq!(image.get_pixel(0, 0)[3], 0);
    assert_eq!(*image.get_pixel(image.width() / 2, mid), Rgba([1, 2, 3, 255]));
}

#[test]
fn test_higher_smoothing_never_shrinks_output() {
    let source = sticker(64, 64);
    let pipeline = OutlinePipeline::default();
    let mut previous = 0;
    for smoothing in [0.0, 40.0, 80.0, 96.1, 100.0] {
        let params = OutlineParameters::default()
            .with_thickness(300.0)
            .with_smoothing(smoothing);
        let result = pipeline.process(&source, &params).unwrap();
        let area = result.bounds.width() * result.bounds.height();
        assert!(area >= previous, "smoothing {smoothing}");
        previous = area;
    }
}

#[test]
fn test_huge_canvas_rejected_before_allocation() {
    let pipeline = OutlinePipeline::default();
    let err = pipeline
        .plan(800_000, 800_000, &OutlineParameters::default())
        .unwrap_err();
    match err {
        OutlineError::GeometryTooLarge {
            width,
            height,
            max_dimension,
            max_area,
        } => {
            assert!(width > 800_000 && height > 800_000);
            assert_eq!(max_dimension, 800_000);
            assert_eq!(max_area, 800_000u64 * 800_000);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_extreme_thickness_rejected() {
    let source = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
    let params = OutlineParameters::default().with_thickness(1e6);
    let pipeline = OutlinePipeline::builder().with_max_dimension(20_000).build();
    let err = pipeline.process(&source, &params).unwrap_err();
    assert!(matches!(err, OutlineError::GeometryTooLarge { .. }));
}
