use log::debug;
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

use crate::errors::{CorpusError, CorpusResult};
use crate::file_utils::FileManager;

// @module: EPUB container extraction

// @const: Package content root inside the container
pub const CONTENT_PREFIX: &str = "OEBPS/";

/// Relative destination for a container member, or None when the member
/// lies outside the content root or would escape the output directory
pub fn content_destination(member: &str) -> Option<PathBuf> {
    let relative = Path::new(member.strip_prefix(CONTENT_PREFIX)?);
    let safe = relative.components().next().is_some()
        && relative.components().all(|c| matches!(c, Component::Normal(_)));
    safe.then(|| relative.to_path_buf())
}

/// Extract the content members of `epub_path` into `output_dir`.
///
/// Members whose destination already exists are skipped, so repeated runs
/// only fill in what is missing. Returns the number of files written.
pub fn extract_content<P1: AsRef<Path>, P2: AsRef<Path>>(epub_path: P1, output_dir: P2) -> CorpusResult<usize> {
    let epub_path = epub_path.as_ref();
    let output_dir = output_dir.as_ref();

    let file = File::open(epub_path).map_err(|e| CorpusError::io(epub_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| CorpusError::archive(epub_path, e.to_string()))?;

    let mut extracted = 0;
    for idx in 0..archive.len() {
        let mut member = archive
            .by_index(idx)
            .map_err(|e| CorpusError::archive(epub_path, e.to_string()))?;

        if member.is_dir() || !member.name().starts_with(CONTENT_PREFIX) {
            continue;
        }

        let relative = content_destination(member.name()).ok_or_else(|| {
            CorpusError::archive(epub_path, format!("unsafe member path {:?}", member.name()))
        })?;
        let dest = output_dir.join(relative);

        if dest.exists() {
            debug!("Skipping {} ({:?} already exists)", member.name(), dest);
            continue;
        }

        debug!("Extracting {} to {:?}", member.name(), dest);
        if let Some(parent) = dest.parent() {
            FileManager::ensure_dir(parent)?;
        }
        let mut out = File::create(&dest).map_err(|e| CorpusError::io(&dest, e))?;
        io::copy(&mut member, &mut out).map_err(|e| CorpusError::io(&dest, e))?;
        extracted += 1;
    }

    Ok(extracted)
}
