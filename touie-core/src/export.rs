//! Writing pictogram images to disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use touie_api::PictogramStory;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Pictogram {index} has an unreadable image: {source}")]
    Decode {
        index: usize,
        #[source]
        source: touie_api::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Decode every pictogram of `story` into `dir` as `pictograma_01.png`,
/// `pictograma_02.png` and so on. Returns the written paths in order.
pub fn save_pictograms(story: &PictogramStory, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(story.pictograms.items.len());
    for (i, item) in story.pictograms.items.iter().enumerate() {
        let index = i + 1;
        let image = item
            .decode_image()
            .map_err(|source| ExportError::Decode { index, source })?;

        let path = dir.join(format!("pictograma_{index:02}.{}", image.extension()));
        fs::write(&path, &image.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = image.bytes.len(), "saved pictogram");
        written.push(path);
    }
    Ok(written)
}
