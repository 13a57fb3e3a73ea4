// ============================================================
// Layer 4 — Triplet Dataset
// ============================================================
// Evaluation data in the Vimeo-90K triplet layout:
//
//   root/
//     00001/0001/im1.png   ← first frame
//     00001/0001/im2.png   ← ground-truth middle frame
//     00001/0001/im3.png   ← last frame
//     ...
//
// Any directory below `root` (at any depth) holding all three
// files is one sample. Items carry paths, not pixels, so a large
// test set doesn't have to fit in memory.

use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use std::{fs, path::{Path, PathBuf}};

const TRIPLET_FILES: [&str; 3] = ["im1.png", "im2.png", "im3.png"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripletSample {
    /// Path of the triplet directory relative to the dataset root
    pub name:   String,
    /// im1.png: the first input frame
    pub first:  PathBuf,
    /// im2.png: ground truth for the interpolated frame
    pub middle: PathBuf,
    /// im3.png: the second input frame
    pub last:   PathBuf,
}

/// In-memory list of triplet paths, indexable through Burn's Dataset trait.
pub struct TripletDataset {
    samples: Vec<TripletSample>,
}

impl TripletDataset {
    /// Wrap an already-built list of samples.
    pub fn new(samples: Vec<TripletSample>) -> Self { Self { samples } }

    /// Walk `root` and collect every triplet directory, sorted by name.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let mut samples = Vec::new();
        walk(root, root, &mut samples)?;
        samples.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::info!("Found {} triplets under '{}'", samples.len(), root.display());
        Ok(Self { samples })
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<TripletSample>) -> Result<()> {
    let [a, b, c] = TRIPLET_FILES.map(|f| dir.join(f));
    if a.is_file() && b.is_file() && c.is_file() {
        let name = dir
            .strip_prefix(root)
            .unwrap_or(dir)
            .to_string_lossy()
            .replace('\\', "/");
        out.push(TripletSample { name, first: a, middle: b, last: c });
    }

    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let entry = entry?;
        // file_type() doesn't follow symlinks, so link cycles can't recurse
        if entry.file_type()?.is_dir() {
            walk(root, &entry.path(), out)?;
        }
    }
    Ok(())
}

impl Dataset<TripletSample> for TripletDataset {
    fn get(&self, index: usize) -> Option<TripletSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
