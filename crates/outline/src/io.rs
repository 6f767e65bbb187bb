use std::path::Path;

use image::{ImageFormat, ImageReader, RgbaImage};
use tracing::debug;

use crate::{
    error::{OutlineError, Result},
    types::OutlineParameters,
};

/// Decode a PNG file into an RGBA raster; other formats are rejected
pub fn load_png<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    match reader.format() {
        Some(ImageFormat::Png) => {}
        other => {
            return Err(OutlineError::UnsupportedFormat(format!(
                "{} is {:?}, expected PNG",
                path.display(),
                other
            )));
        }
    }
    let image = reader.decode()?.to_rgba8();
    debug!(path = %path.display(), width = image.width(), height = image.height(), "loaded PNG");
    Ok(image)
}

/// Decode PNG bytes into an RGBA raster; other formats are rejected
pub fn load_rgba_from_bytes(bytes: &[u8]) -> Result<RgbaImage> {
    match image::guess_format(bytes)? {
        ImageFormat::Png => {}
        other => {
            return Err(OutlineError::UnsupportedFormat(format!(
                "in-memory image is {:?}, expected PNG",
                other
            )));
        }
    }
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8())
}

/// Encode the raster as PNG at `path`
pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    image.save_with_format(path.as_ref(), ImageFormat::Png)?;
    debug!(path = %path.as_ref().display(), "saved PNG");
    Ok(())
}

/// File name encoding the parameters, e.g. `outlined_T100_S96.1_ff0000_1700000000000.png`
pub fn export_file_name(params: &OutlineParameters, timestamp_millis: i64) -> String {
    format!(
        "outlined_T{:.0}_S{:.1}_{}_{}.png",
        params.thickness_factor,
        params.smoothing_factor,
        params.outline_color.to_hex(),
        timestamp_millis
    )
}

/// [`export_file_name`] stamped with the current time
pub fn default_export_file_name(params: &OutlineParameters) -> String {
    export_file_name(params, chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RgbColor;
    use image::Rgba;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("outline-io-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_export_file_name() {
        let params = OutlineParameters::new(250.4, 96.1, RgbColor::new(255, 0, 16));
        assert_eq!(
            export_file_name(&params, 1_700_000_000_123),
            "outlined_T250_S96.1_ff0010_1700000000123.png"
        );
        assert!(default_export_file_name(&params).starts_with("outlined_T250_S96.1_ff0010_"));
    }

    #[test]
    fn test_png_round_trip_on_disk() {
        let path = temp_path("roundtrip.png");
        let image = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 7, 128]));
        save_png(&image, &path).unwrap();
        let loaded = load_png(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_non_png_rejected() {
        let path = temp_path("not-png.bmp");
        let image = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        image.save_with_format(&path, ImageFormat::Bmp).unwrap();
        let err = load_png(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, OutlineError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_bytes_must_be_png() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));

        let mut png = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        assert_eq!(load_rgba_from_bytes(&png).unwrap(), image);

        let mut bmp = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bmp), ImageFormat::Bmp)
            .unwrap();
        let err = load_rgba_from_bytes(&bmp).unwrap_err();
        assert!(matches!(err, OutlineError::UnsupportedFormat(_)));

        assert!(matches!(
            load_rgba_from_bytes(b"not an image"),
            Err(OutlineError::ImageLoad(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_png(temp_path("missing.png")).unwrap_err();
        assert!(matches!(err, OutlineError::Io(_)));
    }
}
