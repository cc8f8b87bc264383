use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Walks `path` depth-first, invoking `callback` for every regular file
/// that is not excluded. Symlinks are skipped entirely and permission
/// failures on directories are logged and stepped over; visitation
/// order is not guaranteed.
pub fn visit<F, C>(path: &Path, excludes: &F, callback: &mut C) -> anyhow::Result<()>
where
    F: Fn(&Path) -> bool,
    C: FnMut(&Path) -> anyhow::Result<()>,
{
    let mut pending: Vec<PathBuf> = vec![path.to_path_buf()];
    let mut visited: HashSet<PathBuf> = HashSet::new();

    while let Some(current) = pending.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }
        if excludes(&current) {
            debug!(path = %current.display(), "Path excluded");
            continue;
        }
        let metadata = match fs::symlink_metadata(&current) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                debug!(path = %current.display(), "Permission denied");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            debug!(path = %current.display(), "Symlink skipped");
            continue;
        }
        if file_type.is_file() {
            callback(&current)?;
        } else if file_type.is_dir() {
            let entries = match fs::read_dir(&current) {
                Ok(e) => e,
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    debug!(path = %current.display(), "Permission denied");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            for entry in entries {
                pending.push(entry?.path());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::visit;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[test]
    fn visits_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path();
        fs::create_dir_all(base.join("a/b")).unwrap();
        fs::write(base.join("Root.as"), b"").unwrap();
        fs::write(base.join("a/File.as"), b"").unwrap();
        fs::write(base.join("a/b/Leaf.as"), b"").unwrap();

        let mut seen = BTreeSet::new();
        let mut cb = |p: &Path| {
            seen.insert(p.strip_prefix(base).unwrap().to_path_buf());
            Ok(())
        };
        visit(base, &|_| false, &mut cb).unwrap();

        let expected: BTreeSet<PathBuf> = [
            PathBuf::from("Root.as"),
            PathBuf::from("a/File.as"),
            PathBuf::from("a/b/Leaf.as"),
        ]
        .into_iter()
        .collect();

        assert_eq!(seen, expected);
    }

    #[test]
    fn excluded_directories_are_not_entered() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path();
        fs::create_dir_all(base.join("skip")).unwrap();
        fs::write(base.join("Keep.as"), b"").unwrap();
        fs::write(base.join("skip/Drop.as"), b"").unwrap();

        let mut seen = Vec::new();
        let mut cb = |p: &Path| {
            seen.push(p.to_path_buf());
            Ok(())
        };
        visit(base, &|p: &Path| p.ends_with("skip"), &mut cb).unwrap();

        assert_eq!(seen, vec![base.join("Keep.as")]);
    }

    #[cfg(unix)]
    #[test]
    fn terminates_on_symlink_loop() {
        use std::os::unix::fs as unix_fs;

        let tmp = TempDir::new().unwrap();
        let base = tmp.path();
        fs::create_dir_all(base.join("a")).unwrap();
        fs::write(base.join("Root.as"), b"").unwrap();
        unix_fs::symlink(base, base.join("a/loop")).unwrap();

        let mut seen = Vec::new();
        let mut cb = |p: &Path| {
            seen.push(p.to_path_buf());
            Ok(())
        };
        visit(base, &|_| false, &mut cb).unwrap();

        assert_eq!(seen, vec![base.join("Root.as")]);
    }
}
