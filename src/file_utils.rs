use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::{CorpusError, CorpusResult};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> CorpusResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| CorpusError::io(path, e))?;
        }
        Ok(())
    }

    /// File name without its final extension, as an owned string
    pub fn stem<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Regular files directly inside `dir` with the given extension, sorted by name
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> CorpusResult<Vec<PathBuf>> {
        Self::collect_files(dir.as_ref(), extension, Some(1))
    }

    /// Regular files anywhere below `dir` with the given extension, sorted by path
    pub fn find_files_recursive<P: AsRef<Path>>(dir: P, extension: &str) -> CorpusResult<Vec<PathBuf>> {
        Self::collect_files(dir.as_ref(), extension, None)
    }

    fn collect_files(dir: &Path, extension: &str, max_depth: Option<usize>) -> CorpusResult<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
        if let Some(depth) = max_depth {
            walker = walker.max_depth(depth);
        }

        let mut result = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                CorpusError::io(path, source)
            })?;

            // Non-regular entries never take part in the pipeline
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted));
            if matches {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Write a string to a file, creating the parent directory if needed
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> CorpusResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(path, content).map_err(|e| CorpusError::io(path, e))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> CorpusResult<String> {
        let path = path.as_ref();
        fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))
    }
}
