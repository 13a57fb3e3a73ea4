// ============================================================
// Layer 6 — Frame Store
// ============================================================
// Writes Frames to disk as 8-bit RGB images. The output format
// follows the file extension (png unless stated otherwise).
//
// Sequence output is numbered from 1 with eight digits so that a
// plain name sort, or ffmpeg's %08d pattern, reads it back in order:
//   out/00000001.png, out/00000002.png, ...

use anyhow::{Context, Result};
use image::RgbImage;
use std::{fs, path::{Path, PathBuf}};

use crate::domain::frame::Frame;

pub struct FrameStore {
    dir: PathBuf,
}

impl FrameStore {
    /// Creates the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Path of the `index`-th frame of a numbered sequence.
    pub fn numbered_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{:08}.png", index))
    }

    /// Write the frame at `index` of a numbered sequence.
    pub fn save_numbered(&self, index: usize, frame: &Frame) -> Result<PathBuf> {
        let path = self.numbered_path(index);
        self.save(&path, frame)?;
        Ok(path)
    }

    /// Write a frame to an explicit path.
    pub fn save(&self, path: &Path, frame: &Frame) -> Result<()> {
        let img = RgbImage::from_raw(frame.width as u32, frame.height as u32, frame.to_rgb8())
            .ok_or_else(|| anyhow::anyhow!("Frame buffer does not match its dimensions"))?;
        img.save(path)
            .with_context(|| format!("Cannot write image '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::ImageLoader;

    #[test]
    fn test_numbered_names_sort() {
        let store = FrameStore::new(std::env::temp_dir()).unwrap();
        let a = store.numbered_path(9);
        let b = store.numbered_path(10);
        assert!(a.file_name() < b.file_name());
        assert!(a.ends_with("00000009.png"));
    }

    #[test]
    fn test_written_frame_reads_back() {
        let dir = std::env::temp_dir().join(format!("ifnet-store-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let store = FrameStore::new(&dir).unwrap();

        let rgb: Vec<u8> = (0..2 * 3 * 3).map(|v| (v * 10) as u8).collect();
        let frame = Frame::from_rgb8(3, 2, &rgb).unwrap();
        let path = store.save_numbered(1, &frame).unwrap();

        let back = ImageLoader::load(&path).unwrap();
        assert_eq!(back.to_rgb8(), rgb);

        fs::remove_dir_all(&dir).ok();
    }
}
