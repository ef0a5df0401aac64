use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{CorpusError, CorpusResult};
use crate::file_utils::FileManager;

// @module: MaryTTS voice-import project layout over the corpus

/// Links written into the project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub texts: usize,
    pub waves: usize,
}

/// Link every transcript and clip under `align_dir` into `project_dir`
/// (`build/text/*.txt` and `wav/*.wav`), replacing stale entries.
pub fn scaffold_marytts<P1: AsRef<Path>, P2: AsRef<Path>>(align_dir: P1, project_dir: P2) -> CorpusResult<ScaffoldReport> {
    let align_dir = align_dir.as_ref();
    let project_dir = project_dir.as_ref();

    let texts = link_all(align_dir, "txt", &project_dir.join("build").join("text"))?;
    let waves = link_all(align_dir, "wav", &project_dir.join("wav"))?;

    Ok(ScaffoldReport { texts, waves })
}

fn link_all(align_dir: &Path, extension: &str, dest_dir: &Path) -> CorpusResult<usize> {
    FileManager::ensure_dir(dest_dir)?;

    let sources = FileManager::find_files_recursive(align_dir, extension)?;
    for source in &sources {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let dest = dest_dir.join(file_name);
        replace_link(source, &dest)?;
        debug!("{:?} -> {:?}", dest, source);
    }

    Ok(sources.len())
}

fn replace_link(source: &Path, dest: &Path) -> CorpusResult<()> {
    // symlink_metadata also sees dangling links
    if fs::symlink_metadata(dest).is_ok() {
        fs::remove_file(dest).map_err(|e| CorpusError::io(dest, e))?;
    }

    let target: PathBuf = fs::canonicalize(source).map_err(|e| CorpusError::io(source, e))?;
    link(&target, dest).map_err(|e| CorpusError::io(dest, e))
}

#[cfg(unix)]
fn link(target: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn link(target: &Path, dest: &Path) -> std::io::Result<()> {
    fs::copy(target, dest).map(|_| ())
}
