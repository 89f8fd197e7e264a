//! PNG encoding and atomic file output.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat, RgbImage};

use crate::error::{RenderError, Result};

/// Encodes `image` as PNG in memory.
///
/// The encoder writes no timestamp or other ancillary chunks, so identical
/// images always produce identical bytes.
pub fn encode_png(image: RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut buffer, ImageOutputFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Writes `data` to `path` atomically: write to a temp file next to it, then rename.
///
/// An existing file at `path` is replaced. On failure the temp file is removed
/// and `path` is left untouched.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path).ok_or_else(|| {
        RenderError::output(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;

    if let Err(e) = fs::write(&temp_path, data) {
        let _ = fs::remove_file(&temp_path);
        return Err(RenderError::output(path, e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(RenderError::output(path, e));
    }

    tracing::debug!(
        target: "benchviz::output",
        "Wrote {} bytes to {}",
        data.len(),
        path.display()
    );

    Ok(())
}

fn temp_path_for(path: &Path) -> Option<PathBuf> {
    let mut name: OsString = path.file_name()?.to_os_string();
    name.push(".tmp");
    Some(path.with_file_name(name))
}

/// Whether `path` carries a `.png` extension (case-insensitive).
pub fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_png_signature_and_determinism() {
        let image = RgbImage::from_pixel(4, 3, image::Rgb([0x62, 0x72, 0xa4]));
        let first = encode_png(image.clone()).unwrap();
        let second = encode_png(image).unwrap();

        assert_eq!(&first[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(first, second);
    }

    #[test]
    fn test_encoded_png_decodes_to_same_pixels() {
        let image = RgbImage::from_fn(5, 2, |x, y| image::Rgb([x as u8 * 40, y as u8 * 100, 7]));
        let bytes = encode_png(image.clone()).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chart.png");
        std::fs::write(&path, b"old").unwrap();

        write_atomic(&path, b"new contents").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new contents");
        assert!(!temp_dir.path().join("chart.png.tmp").exists());
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("chart.png");

        let err = write_atomic(&path, b"data").unwrap_err();
        match err {
            RenderError::OutputWriteError { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_write_atomic_onto_directory_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chart.png");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_atomic(&path, b"data").is_err());
        assert!(path.join("keep").exists());
        assert!(!temp_dir.path().join("chart.png.tmp").exists());
    }

    #[test]
    fn test_has_png_extension() {
        assert!(has_png_extension(Path::new("benchmark_viz.png")));
        assert!(has_png_extension(Path::new("out/CHART.PNG")));
        assert!(!has_png_extension(Path::new("chart.jpg")));
        assert!(!has_png_extension(Path::new("chart")));
    }
}
