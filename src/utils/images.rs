use image::{ExtendedColorType, codecs::jpeg::JpegEncoder, imageops::FilterType};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// MIME types accepted by every upload route.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

const JPEG_QUALITY: u8 = 80;

/// Fixed target dimensions; resizing fits within the box, preserving aspect.
const VARIANTS: [(&str, u32, u32); 3] = [
    ("thumb", 300, 200),
    ("medium", 800, 600),
    ("large", 1600, 1200),
];

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// Relative URLs of the stored size variants of one upload.
#[derive(Debug, Clone)]
pub struct ImageVariants {
    pub thumb: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug)]
pub enum ImageError {
    Decode,
    Encode(image::ImageError),
    Io(std::io::Error),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Decode => write!(f, "File is not a valid image"),
            ImageError::Encode(e) => write!(f, "Failed to encode image: {}", e),
            ImageError::Io(e) => write!(f, "Failed to write image: {}", e),
        }
    }
}

impl std::error::Error for ImageError {}

/// Decode an upload, re-encode it as JPEG at each fixed size, and write the
/// variants under `<upload_root>/<folder>/<uuid>_<variant>.jpg`.
///
/// CPU-bound; call sites run this under `tokio::task::spawn_blocking`.
/// Variants already written when a later step fails are removed so a failed
/// upload leaves nothing behind.
pub fn process_and_store(
    data: &[u8],
    upload_root: &Path,
    folder: &str,
) -> Result<ImageVariants, ImageError> {
    let img = image::load_from_memory(data).map_err(|_| ImageError::Decode)?;

    let dir = upload_root.join(folder);
    fs::create_dir_all(&dir).map_err(ImageError::Io)?;

    let stem = Uuid::new_v4().to_string();
    let mut written: Vec<PathBuf> = Vec::with_capacity(VARIANTS.len());
    let mut urls: Vec<String> = Vec::with_capacity(VARIANTS.len());

    for (suffix, width, height) in VARIANTS {
        let resized = img.resize(width, height, FilterType::Lanczos3).to_rgb8();

        let mut encoded = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
        let result = encoder
            .encode(
                &resized,
                resized.width(),
                resized.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(ImageError::Encode)
            .and_then(|_| {
                let filename = format!("{}_{}.jpg", stem, suffix);
                let path = dir.join(&filename);
                fs::write(&path, &encoded).map_err(ImageError::Io)?;
                written.push(path);
                urls.push(format!("/uploads/{}/{}", folder, filename));
                Ok(())
            });

        if let Err(e) = result {
            for path in &written {
                let _ = fs::remove_file(path);
            }
            return Err(e);
        }
    }

    Ok(ImageVariants {
        thumb: urls[0].clone(),
        medium: urls[1].clone(),
        large: urls[2].clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn mime_allow_list() {
        assert!(is_allowed_mime("image/jpeg"));
        assert!(is_allowed_mime("image/png"));
        assert!(is_allowed_mime("image/webp"));
        assert!(!is_allowed_mime("image/gif"));
        assert!(!is_allowed_mime("application/pdf"));
    }

    #[test]
    fn stores_three_jpeg_variants() {
        let dir = tempfile::tempdir().unwrap();
        let data = sample_png(640, 480);

        let variants = process_and_store(&data, dir.path(), "tours").unwrap();

        for url in [&variants.thumb, &variants.medium, &variants.large] {
            assert!(url.starts_with("/uploads/tours/"));
            assert!(url.ends_with(".jpg"));
            let path = dir.path().join(url.trim_start_matches("/uploads/"));
            assert!(path.exists(), "missing variant file {:?}", path);
        }

        // thumb fits within 300x200 with 4:3 aspect preserved
        let thumb_path = dir
            .path()
            .join(variants.thumb.trim_start_matches("/uploads/"));
        let thumb = image::open(thumb_path).unwrap();
        assert!(thumb.width() <= 300 && thumb.height() <= 200);
        assert_eq!(thumb.height(), 200);
    }

    #[test]
    fn variants_share_one_stem() {
        let dir = tempfile::tempdir().unwrap();
        let variants = process_and_store(&sample_png(64, 48), dir.path(), "categories").unwrap();

        let stem = |url: &str| url.rsplit_once('_').unwrap().0.to_string();
        assert_eq!(stem(&variants.thumb), stem(&variants.medium));
        assert_eq!(stem(&variants.medium), stem(&variants.large));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let err = process_and_store(b"definitely not an image", dir.path(), "tours").unwrap_err();
        assert!(matches!(err, ImageError::Decode));
        // nothing left behind
        assert!(!dir.path().join("tours").exists() || fs::read_dir(dir.path().join("tours")).unwrap().next().is_none());
    }
}
