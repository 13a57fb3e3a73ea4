// ============================================================
// Layer 4 — Image Loader
// ============================================================
// Decodes image files into planar RGB Frames with the `image`
// crate. Any format the crate was built with (png, jpeg, bmp)
// is accepted; alpha and greyscale inputs are converted to RGB8.
//
// SequenceLoader reads a whole directory as one clip. Frames are
// ordered by file name, so zero-padded numbering
// (00000001.png, 00000002.png, ...) gives temporal order.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::frame::Frame;
use crate::domain::traits::FrameSource;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

pub struct ImageLoader;

impl ImageLoader {
    /// Decode one image file into a Frame.
    pub fn load(path: impl AsRef<Path>) -> Result<Frame> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Cannot decode image '{}'", path.display()))?
            .to_rgb8();
        let (w, h) = img.dimensions();
        Frame::from_rgb8(w as usize, h as usize, img.as_raw())
            .ok_or_else(|| anyhow::anyhow!("Unexpected pixel buffer size in '{}'", path.display()))
    }
}

/// Returns true if the path has an image extension we can decode.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Loads every image in a directory as one ordered clip.
pub struct SequenceLoader {
    dir: PathBuf,
}

impl SequenceLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Image paths in the directory, sorted by file name.
    pub fn frame_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && is_image_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl FrameSource for SequenceLoader {
    fn load_all(&self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        for path in self.frame_paths()? {
            match ImageLoader::load(&path) {
                Ok(frame) => {
                    tracing::debug!("Loaded: {} ({}x{})", path.display(), frame.width, frame.height);
                    frames.push(frame);
                }
                // One bad file shouldn't sink the clip
                Err(e) => tracing::warn!("Skipping '{}': {:#}", path.display(), e),
            }
        }
        tracing::info!("Loaded {} frames from '{}'", frames.len(), self.dir.display());
        Ok(frames)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::frame_store::FrameStore;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ifnet-loader-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_extension_filter() {
        assert!(is_image_file(Path::new("a/b/0001.PNG")));
        assert!(is_image_file(Path::new("x.jpeg")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn test_sequence_is_sorted_and_skips_junk() {
        let dir = scratch_dir("seq");
        let store = FrameStore::new(&dir).unwrap();
        store.save(&dir.join("0002.png"), &Frame::filled(4, 2, [1.0, 0.0, 0.0])).unwrap();
        store.save(&dir.join("0001.png"), &Frame::filled(4, 2, [0.0, 0.0, 1.0])).unwrap();
        fs::write(dir.join("readme.txt"), "not a frame").unwrap();
        fs::write(dir.join("0003.png"), "corrupt").unwrap();

        let frames = SequenceLoader::new(&dir).load_all().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].pixel(0, 0), [0.0, 0.0, 1.0]);
        assert_eq!(frames[1].pixel(3, 1), [1.0, 0.0, 0.0]);

        fs::remove_dir_all(&dir).ok();
    }
}
