//! Whole-file replacement through a temporary sibling

use crate::io::error::StoreError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Replace the contents of `path` with `content`
///
/// Writes `content` to `{path}.tmp`, fsyncs it, then renames it over `path`.
/// A crash before the rename leaves the original file untouched. Nothing
/// here guards against another process writing `path` at the same time.
///
/// A symlinked `path` is resolved first, so the link survives and its target
/// receives the new content. An existing file's permissions carry over to
/// the replacement.
///
/// # Errors
///
/// Returns `StoreError::Io` if the temp file cannot be written or renamed.
/// The temp file is removed on a failed rename.
pub fn replace_file(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let target = resolve_target(path)?;
    let permissions = match fs::metadata(&target) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(StoreError::io(&target, e)),
    };
    let tmp_path = tmp_path_for(&target);

    {
        let mut tmp_file = fs::File::create(&tmp_path).map_err(|e| StoreError::io(&tmp_path, e))?;

        if let Some(permissions) = permissions {
            tmp_file
                .set_permissions(permissions)
                .map_err(|e| StoreError::io(&tmp_path, e))?;
        }

        tmp_file
            .write_all(content)
            .map_err(|e| StoreError::io(&tmp_path, e))?;

        tmp_file
            .sync_all()
            .map_err(|e| StoreError::io(&tmp_path, e))?;
    }

    if let Err(e) = fs::rename(&tmp_path, &target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::io(&target, e));
    }

    Ok(())
}

/// The file a rename must land on: `path` itself, or the end of its symlink
/// chain when it is a link
fn resolve_target(path: &Path) -> Result<PathBuf, StoreError> {
    let is_link = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata.file_type().is_symlink(),
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(StoreError::io(path, e)),
    };
    if !is_link {
        return Ok(path.to_path_buf());
    }
    fs::canonicalize(path).map_err(|e| StoreError::io(path, e))
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_replace_file_overwrites_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("people.csv");
        fs::write(&path, b"name,age\nAlice,30\n").unwrap();

        replace_file(&path, b"name,age\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"name,age\n");
        assert!(!temp_dir.path().join("people.csv.tmp").exists());
    }

    #[test]
    fn test_replace_file_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.csv");

        replace_file(&path, b"a,b\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");
    }

    #[test]
    fn test_replace_file_missing_directory_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope").join("people.csv");

        let result = replace_file(&path, b"a,b\n");
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_file_writes_through_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("real.csv");
        let link = temp_dir.path().join("link.csv");
        fs::write(&real, b"name,age\nAlice,30\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        replace_file(&link, b"name,age\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&real).unwrap(), b"name,age\n");
        assert!(!temp_dir.path().join("real.csv.tmp").exists());
        assert!(!temp_dir.path().join("link.csv.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_file_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("private.csv");
        fs::write(&path, b"name,age\nAlice,30\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        replace_file(&path, b"name,age\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_tmp_path_keeps_extension() {
        let tmp = tmp_path_for(Path::new("/data/people.csv"));
        assert_eq!(tmp, PathBuf::from("/data/people.csv.tmp"));
    }
}
