use std::path::Path;

use image::GenericImageView;

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes an image file, converting any supported format to RGBA8.
pub fn decode_file(path: &Path) -> Result<ImageData, image::ImageError> {
    let img = image::open(path)?;
    let (width, height) = img.dimensions();
    Ok(ImageData {
        width,
        height,
        rgba: img.into_rgba8().into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let img = image::RgbImage::from_fn(3, 2, |x, y| {
            if (x + y) % 2 == 0 { image::Rgb([255, 255, 255]) } else { image::Rgb([0, 0, 0]) }
        });
        img.save(&path).unwrap();

        let data = decode_file(&path).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.rgba.len(), 3 * 2 * 4);
        assert_eq!(&data.rgba[..4], &[255, 255, 255, 255]);
        assert_eq!(&data.rgba[4..8], &[0, 0, 0, 255]);
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(decode_file(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_file(Path::new("/nonexistent/texture.png")).is_err());
    }
}
