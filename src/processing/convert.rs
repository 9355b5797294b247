//! PNG to WebP batch conversion.

use image::ImageReader;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::images::has_extension;
use crate::error::{QbankError, Result};
use crate::logger::Logger;

/// Outcome of one conversion walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub converted: Vec<PathBuf>,
    /// (source file, error message)
    pub failures: Vec<(String, String)>,
}

impl ConversionReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }
}

/// Where `source` lands under `output_root`: same relative path, `.webp`
pub fn mirrored_output_path(source: &Path, input_root: &Path, output_root: &Path) -> PathBuf {
    let relative = source.strip_prefix(input_root).unwrap_or(source);
    output_root.join(relative).with_extension("webp")
}

/// Decodes one image and writes it as lossy WebP at `quality` (0-100).
///
/// # Arguments
/// * `source` - Image to read; the format is detected from its content
/// * `target` - WebP file to create, parent directories included
/// * `quality` - Encoder quality, clamped to 100
pub fn convert_png_to_webp(source: &Path, target: &Path, quality: u8) -> Result<()> {
    let decode_err = |source_err: image::ImageError| QbankError::Decode {
        path: source.to_path_buf(),
        source: source_err,
    };
    let img = ImageReader::open(source)
        .map_err(|e| QbankError::io(source, e))?
        .with_guessed_format()
        .map_err(|e| QbankError::io(source, e))?
        .decode()
        .map_err(decode_err)?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
        .encode_simple(false, f32::from(quality.min(100)))
        .map_err(|e| QbankError::Encode {
            path: source.to_path_buf(),
            reason: format!("{:?}", e),
        })?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| QbankError::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(target, &*encoded).map_err(|e| QbankError::Write {
        path: target.to_path_buf(),
        source: e,
    })
}

/// Converts every `.png` under `input_dir` (any depth, any case) into a
/// mirrored `.webp` under `output_dir`.
///
/// Symlinks are followed. Decode, encode and directory-read failures are
/// logged and collected; they never stop the walk. A missing input
/// directory is reported and nothing is converted.
pub fn batch_convert(input_dir: &Path, output_dir: &Path, quality: u8) -> ConversionReport {
    let mut report = ConversionReport::default();
    if !input_dir.is_dir() {
        Logger::error(&format!("Input directory not found: {}", input_dir.display()));
        return report;
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(input_dir).follow_links(true).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && has_extension(entry.path(), "png") => {
                sources.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                let unit = e.path().unwrap_or(input_dir).display().to_string();
                Logger::error(&format!("Cannot read {}: {}", unit, e));
                report.failures.push((unit, e.to_string()));
            }
        }
    }

    for source in sources {
        let target = mirrored_output_path(&source, input_dir, output_dir);
        match convert_png_to_webp(&source, &target, quality) {
            Ok(()) => {
                Logger::conversion(&source, &target);
                report.converted.push(target);
            }
            Err(e) => {
                Logger::error(&format!("{}", e));
                report.failures.push((source.display().to_string(), e.to_string()));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageBuffer, ImageFormat, Rgb};
    use tempfile::TempDir;

    fn create_test_png(path: &Path, width: u32, height: u32) {
        let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 11) as u8, 128u8]));
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_dimensions_preserved_for_each_quality() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("diagram.png");
        create_test_png(&source, 37, 23);

        for quality in [0u8, 50, 80, 100] {
            let target = temp_dir.path().join(format!("q{}", quality)).join("diagram.webp");
            convert_png_to_webp(&source, &target, quality).unwrap();
            let decoded = image::open(&target).unwrap();
            assert_eq!(decoded.dimensions(), (37, 23), "quality {}", quality);
        }
    }

    #[test]
    fn test_mirrored_output_path() {
        let out = mirrored_output_path(Path::new("in/a/b/Q1.PNG"), Path::new("in"), Path::new("out"));
        assert_eq!(out, PathBuf::from("out/a/b/Q1.webp"));
    }

    #[test]
    fn test_batch_convert_mirrors_tree() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("images");
        let nested = input.join("chapter1");
        fs::create_dir_all(&nested).unwrap();
        create_test_png(&input.join("Q1.png"), 8, 8);
        create_test_png(&nested.join("Q2.PNG"), 4, 6);
        fs::write(input.join("readme.txt"), b"not an image").unwrap();

        let output = temp_dir.path().join("imageswebp");
        let report = batch_convert(&input, &output, 80);

        assert_eq!(report.converted.len(), 2);
        assert!(report.failures.is_empty());
        assert!(output.join("Q1.webp").exists());
        assert_eq!(image::open(output.join("chapter1").join("Q2.webp")).unwrap().dimensions(), (4, 6));
        assert!(!output.join("readme.webp").exists());
    }

    #[test]
    fn test_batch_convert_continues_after_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("images");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a_broken.png"), b"This is not an image").unwrap();
        create_test_png(&input.join("b_good.png"), 5, 5);

        let output = temp_dir.path().join("out");
        let report = batch_convert(&input, &output, 50);

        assert_eq!(report.total(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.ends_with("a_broken.png"));
        assert!(output.join("b_good.webp").exists());
        assert!(!output.join("a_broken.webp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_convert_reports_walk_errors() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("images");
        fs::create_dir_all(&input).unwrap();
        create_test_png(&input.join("a_good.png"), 4, 4);
        // A symlink pointing at its own ancestor makes the walk loop
        std::os::unix::fs::symlink(&input, input.join("b_loop")).unwrap();

        let output = temp_dir.path().join("out");
        let report = batch_convert(&input, &output, 80);

        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.contains("b_loop"));
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn test_batch_convert_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out");
        let report = batch_convert(&temp_dir.path().join("nope"), &output, 80);
        assert_eq!(report.total(), 0);
        assert!(!output.exists());
    }
}
