//! Filesystem primitives shared across install and reconciliation.

use std::path::Path;

use anyhow::Context;

/// Delete a folder and its contents if it exists. Missing folders are not an error.
pub fn remove_dir_if_exists(path: &Path) -> anyhow::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(path)
        .with_context(|| format!("Failed to delete folder {}", path.display()))?;
    Ok(true)
}

/// Delete a file if it exists. Missing files are not an error.
pub fn remove_file_if_exists(path: &Path) -> anyhow::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path).with_context(|| format!("Failed to delete {}", path.display()))?;
    Ok(true)
}

/// Recreate `path` as an empty folder, deleting any previous contents.
pub fn ensure_empty_dir(path: &Path) -> anyhow::Result<()> {
    remove_dir_if_exists(path)?;
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create folder {}", path.display()))?;
    Ok(())
}

/// Recursively copy the contents of `src` into `dst`, creating `dst` as needed.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dst)
        .with_context(|| format!("Failed to create folder {}", dst.display()))?;
    for entry in std::fs::read_dir(src)
        .with_context(|| format!("Failed to read folder {}", src.display()))?
    {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!("Failed to copy {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}
