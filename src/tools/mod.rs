//! Helpers for the command-line tool and benchmarks: image file I/O and
//! dataset traversal.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::models::ArgbImage;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Load an image file as a packed ARGB raster
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ArgbImage, ScanError> {
    let img = image::open(path)?;
    Ok(ArgbImage::from_dynamic(&img))
}

/// Save a raster; the format follows the file extension
pub fn save_image<P: AsRef<Path>>(image: &ArgbImage, path: P) -> Result<(), ScanError> {
    image.to_rgba_image().save(path)?;
    Ok(())
}

/// Default dataset root from `CHROMA_QR_DATASET_ROOT`
pub fn dataset_root_from_env() -> PathBuf {
    env::var("CHROMA_QR_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("benches/images"))
}

/// Image limit from `CHROMA_QR_BENCH_LIMIT`
///
/// `None` (whole dataset) when unset or `0`.
pub fn bench_limit_from_env() -> Option<usize> {
    env::var("CHROMA_QR_BENCH_LIMIT")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v != 0)
}

/// Sorted image paths under `root`, optionally truncated to `limit`
pub fn dataset_iter<P: AsRef<Path>>(root: P, limit: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let mut images = collect_images(root.as_ref());
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_image(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_image(&path) {
                images.push(path);
            }
        }
    }

    images
}

/// Append `suffix` to a file stem: `dir/frame.png` + `red` -> `dir/frame_red.png`
pub fn sibling_path(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    path.with_file_name(format!("{stem}_{suffix}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("chroma_qr_tools_{nanos}_{sequence}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn save_then_load_preserves_opaque_pixels() {
        let dir = temp_dir();
        let path = dir.join("frame.png");
        let image = ArgbImage::new(2, 2, vec![0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF, 0xFF80_8080]).unwrap();
        save_image(&image, &path).unwrap();
        assert_eq!(load_image(&path).unwrap(), image);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn dataset_iter_walks_nested_dirs_sorted() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("b")).unwrap();
        fs::write(dir.join("b/2.PNG"), b"").unwrap();
        fs::write(dir.join("a.jpg"), b"").unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();

        let found: Vec<_> = dataset_iter(&dir, None).collect();
        assert_eq!(found, vec![dir.join("a.jpg"), dir.join("b/2.PNG")]);
        assert_eq!(dataset_iter(&dir, Some(1)).count(), 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_image("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, ScanError::Image(_) | ScanError::Io(_)));
    }

    #[test]
    fn sibling_path_appends_suffix() {
        let p = sibling_path(Path::new("out/frame.jpg"), "green", "png");
        assert_eq!(p, PathBuf::from("out/frame_green.png"));
    }
}
