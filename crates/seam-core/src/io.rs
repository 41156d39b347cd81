use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `data` to `path`, replacing whatever was there.
///
/// Goes through a tempfile in the same directory so a reader never sees a
/// half-written script. There is no backup of the previous content.
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote file");
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Set `path` to read/write/execute for its owner only (`0o700`).
#[cfg(unix)]
pub fn make_owner_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

/// Non-unix targets have no owner execute bit; the file is left as written.
#[cfg(not(unix))]
pub fn make_owner_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_file_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub.recon.sh");
        write_file(&path, b"#!/bin/bash\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "#!/bin/bash\n");
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/sub.tkmedit.tcl");
        write_file(&path, b"exit\n").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_file_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub.recon.sh");
        write_file(&path, b"first and longer\n").unwrap();
        write_file(&path, b"second\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub_screenshots");
        ensure_dir(&path).unwrap();
        ensure_dir(&path).unwrap();
        assert!(path.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn make_owner_executable_sets_0700() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.sh");
        write_file(&path, b"#!/bin/bash\n").unwrap();
        make_owner_executable(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
