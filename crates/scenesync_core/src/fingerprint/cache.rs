//! Frame folder cleanup.

use std::fs;
use std::io;
use std::path::Path;

use super::scenes::SCENE_METADATA_FILE;

fn is_cache_file(name: &str) -> bool {
    (name.starts_with("img") && name.ends_with(".jpg")) || name == SCENE_METADATA_FILE
}

/// Delete extracted stills and scene metadata from a frames folder.
///
/// Other files are left alone. Returns how many files were removed.
pub fn clear_frame_cache(dir: &Path) -> io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_file() && is_cache_file(&name.to_string_lossy()) {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    tracing::debug!("[Frames] removed {} cached files from {}", removed, dir.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn removes_only_cache_files() {
        let dir = tempdir().unwrap();
        for name in ["img00001.jpg", "img00002.jpg", "time.txt", "notes.txt", "cover.jpg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        assert_eq!(clear_frame_cache(dir.path()).unwrap(), 3);
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("cover.jpg").exists());
        assert!(!dir.path().join("time.txt").exists());
    }

    #[test]
    fn missing_folder_is_fine() {
        let dir = tempdir().unwrap();
        assert_eq!(clear_frame_cache(&dir.path().join("gone")).unwrap(), 0);
    }
}
