//! Classify an owned path by what is on disk right now.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// What an owned path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Directory, or a link resolving to one.
    Directory,
    /// Regular file, or a link resolving to one.
    File,
    /// A symbolic link that does not resolve to a file or directory.
    DeadLink,
    /// Nothing there, or no permission to look.
    Missing,
    /// Exists but is none of the above (fifo, socket, device...).
    Inaccessible,
}

/// Classify `path`. Never fails; problems become a variant.
pub fn classify(path: impl AsRef<Path>) -> PathKind {
    let path = path.as_ref();

    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => PathKind::Directory,
        Ok(meta) if meta.is_file() => PathKind::File,
        Ok(_) => {
            if is_symlink(path) {
                PathKind::DeadLink
            } else {
                PathKind::Inaccessible
            }
        }
        Err(_) if is_symlink(path) => PathKind::DeadLink,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            PathKind::Missing
        }
        Err(_) => PathKind::Inaccessible,
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::fs::{symlink, PermissionsExt};
    use tempfile::TempDir;

    fn mkfifo(path: &Path) {
        let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) }, 0);
    }

    #[test]
    fn test_classify_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.conf");
        fs::write(&file, "x").unwrap();

        assert_eq!(classify(tmp.path()), PathKind::Directory);
        assert_eq!(
            classify(format!("{}/", tmp.path().display())),
            PathKind::Directory
        );
        assert_eq!(classify(&file), PathKind::File);
    }

    #[test]
    fn test_classify_links_follow_target() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("real");
        fs::write(&file, "x").unwrap();
        let good = tmp.path().join("good");
        symlink(&file, &good).unwrap();
        let dead = tmp.path().join("dead");
        symlink(tmp.path().join("gone"), &dead).unwrap();

        assert_eq!(classify(&good), PathKind::File);
        assert_eq!(classify(&dead), PathKind::DeadLink);
    }

    #[test]
    fn test_classify_missing() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(classify(tmp.path().join("nope")), PathKind::Missing);
    }

    #[test]
    fn test_classify_fifo_is_inaccessible() {
        let tmp = TempDir::new().unwrap();
        let fifo = tmp.path().join("pipe");
        mkfifo(&fifo);

        assert_eq!(classify(&fifo), PathKind::Inaccessible);

        // a link to a fifo resolves to something that is neither file nor directory
        let link = tmp.path().join("pipe-link");
        symlink(&fifo, &link).unwrap();
        assert_eq!(classify(&link), PathKind::DeadLink);
    }

    #[test]
    fn test_classify_permission_denied_is_missing() {
        if unsafe { libc::geteuid() } == 0 {
            eprintln!("skipping: root ignores directory permissions");
            return;
        }
        let tmp = TempDir::new().unwrap();
        let locked = tmp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let inner = locked.join("secret.conf");
        fs::write(&inner, "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let kind = classify(&inner);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(kind, PathKind::Missing);
    }
}
