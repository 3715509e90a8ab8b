//! Directory traversal helpers shared by the validators.
//!
//! Listings are sorted by file name so repeated validation of an untouched
//! tree yields identical results.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ValidationError, ValidationResult};

/// Lists the immediate children of `dir` (files and directories).
pub fn list_children(dir: &Path) -> ValidationResult<Vec<PathBuf>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.map(|e| e.into_path()).map_err(ValidationError::from))
        .collect()
}

/// Recursively finds every entry below `root` whose file name satisfies `matches`.
pub fn find_recursive<F>(root: &Path, matches: F) -> ValidationResult<Vec<PathBuf>>
where
    F: Fn(&str) -> bool,
{
    let mut found = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if matches(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Recursively lists every file below `dir`.
///
/// Symlinks count as files when their target is one.
pub fn files_under(dir: &Path) -> ValidationResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// The final path component as a string, or an empty string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The last extension of `name` including its dot (`a.lf.bin` -> `.bin`).
///
/// Dotfiles such as `.hidden` have no extension.
pub fn suffix(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Fails with `UnexpectedFile` for the first path not inside one of `roots`.
pub fn ensure_inside(paths: &[PathBuf], roots: &[PathBuf], reason: &str) -> ValidationResult<()> {
    match paths
        .iter()
        .find(|path| !roots.iter().any(|root| path.starts_with(root)))
    {
        Some(stray) => Err(ValidationError::unexpected_file(stray, reason)),
        None => Ok(()),
    }
}

/// Directory entries split into the ones exempt from a rule and the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub exempt: Vec<PathBuf>,
    pub remaining: Vec<PathBuf>,
}

impl Partition {
    /// Splits `entries` with `is_exempt`, keeping order.
    pub fn of<I, F>(entries: I, mut is_exempt: F) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
        F: FnMut(&Path) -> bool,
    {
        let (exempt, remaining): (Vec<PathBuf>, Vec<PathBuf>) =
            entries.into_iter().partition(|p| is_exempt(p));
        Self { exempt, remaining }
    }

    /// Runs `check` on every non-exempt entry, stopping at the first failure.
    pub fn require_each<F>(&self, mut check: F) -> ValidationResult<()>
    where
        F: FnMut(&Path) -> ValidationResult<()>,
    {
        self.remaining.iter().try_for_each(|p| check(p))
    }

    pub fn remaining_names(&self) -> Vec<String> {
        self.remaining.iter().map(|p| file_name(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, b"").expect("Failed to write file");
    }

    #[test]
    fn test_list_children_is_sorted_and_shallow() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        touch(&root.join("b.txt"));
        touch(&root.join("a.txt"));
        touch(&root.join("sub/deep.txt"));

        let names: Vec<String> = list_children(root)
            .expect("listing should succeed")
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
    }

    #[test]
    fn test_list_children_missing_dir_fails() {
        let result = list_children(Path::new("/nonexistent/sessioncheck"));
        assert!(matches!(result, Err(ValidationError::Walk(_))));
    }

    #[test]
    fn test_find_recursive_and_files_under() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        touch(&root.join("x.avi"));
        touch(&root.join("nested/deeper/y.avi"));
        touch(&root.join("nested/z.csv"));

        let avis = find_recursive(root, |name| name.ends_with(".avi")).expect("search");
        assert_eq!(avis.len(), 2);

        let files = files_under(&root.join("nested")).expect("listing");
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[cfg(unix)]
    #[test]
    fn test_files_under_includes_symlinked_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("elsewhere/raw.bin");
        touch(&target);
        let dir = temp_dir.path().join("data");
        touch(&dir.join("a.meta"));
        std::os::unix::fs::symlink(&target, dir.join("b.bin")).expect("Failed to symlink");
        std::os::unix::fs::symlink(temp_dir.path().join("missing"), dir.join("c.bin"))
            .expect("Failed to symlink");

        let names: Vec<String> = files_under(&dir)
            .expect("listing")
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a.meta", "b.bin"]);
    }

    #[test]
    fn test_suffix() {
        assert_eq!(suffix("notes.txt").as_deref(), Some(".txt"));
        assert_eq!(suffix("rec_t0.imec0.ap.bin").as_deref(), Some(".bin"));
        assert_eq!(suffix(".hidden"), None);
        assert_eq!(suffix("README"), None);
    }

    #[test]
    fn test_partition_and_require_each() {
        let entries = vec![
            PathBuf::from("/s/comment.txt"),
            PathBuf::from("/s/a.pca"),
            PathBuf::from("/s/b.pca"),
        ];
        let partition = Partition::of(entries, |p| file_name(p) == "comment.txt");
        assert_eq!(partition.exempt, vec![PathBuf::from("/s/comment.txt")]);
        assert_eq!(partition.remaining_names(), vec!["a.pca", "b.pca"]);

        let mut seen = 0;
        let result = partition.require_each(|p| {
            seen += 1;
            if file_name(p) == "a.pca" {
                Err(ValidationError::format_mismatch("a.pca", "bad"))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(seen, 1, "should stop at the first failure");
    }

    #[test]
    fn test_ensure_inside() {
        let roots = vec![PathBuf::from("/s/rec_g0")];
        let inside = vec![PathBuf::from("/s/rec_g0/probe/x.ap.bin")];
        assert!(ensure_inside(&inside, &roots, "outside").is_ok());

        let stray = vec![PathBuf::from("/s/x.ap.bin")];
        let err = ensure_inside(&stray, &roots, "outside").expect_err("should fail");
        assert!(matches!(err, ValidationError::UnexpectedFile { .. }));

        assert!(ensure_inside(&stray, &[], "outside").is_err());
    }
}
