//! Write-to-temp-then-rename helper shared by the store files.

use std::fs::File;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::StoreError;

/// Write a CSV file so that `path` either keeps its old content or holds the
/// complete new content, never a partial write.
///
/// Creates the parent directory if needed.
pub(crate) fn write_csv_atomically<F>(path: &Path, write_rows: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut csv::Writer<&mut File>) -> Result<(), csv::Error>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        write_rows(&mut writer).map_err(|e| StoreError::csv(path, e))?;
        writer.flush().map_err(|e| StoreError::io(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
