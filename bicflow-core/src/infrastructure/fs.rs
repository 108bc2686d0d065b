// bicflow-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Uploads to process for an input path: the file itself, or every `.csv`
/// directly inside a directory, sorted by name. Each file is its own batch.
pub fn discover_uploads(input: &Path) -> Result<Vec<PathBuf>, InfrastructureError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(InfrastructureError::InputNotFound(
            input.display().to_string(),
        ));
    }

    let mut uploads = Vec::new();
    for entry in WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| InfrastructureError::Io(std::io::Error::other(e.to_string())))?;
        let is_csv = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if entry.file_type().is_file() && is_csv {
            uploads.push(entry.into_path());
        }
    }
    Ok(uploads)
}

/// Writes through a temporary file in the target directory, then renames, so
/// a reader never sees a half-written response.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}
