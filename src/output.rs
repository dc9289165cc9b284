//! Output directory handling

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::render::RenderedFile;

/// Create the output directory, removing it first when `clean` is set
pub fn prepare_output_dir(dir: &Path, clean: bool) -> Result<()> {
    if clean && dir.exists() {
        debug!(dir = %dir.display(), "removing previous output");
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Write rendered files below `dir`, returning the paths written
pub fn write_pages(dir: &Path, files: &[RenderedFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.contents)?;
        written.push(path);
    }
    Ok(written)
}
