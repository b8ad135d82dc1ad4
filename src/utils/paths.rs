//! Path helpers shared by the preference resolver and result formatting

use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to the current user's home directory.
///
/// `~user` forms and paths without a leading tilde are returned unchanged.
/// If the home directory cannot be determined the input is kept as-is,
/// which later fails the existence checks with the user's original text.
pub fn expand_home(raw: &str) -> PathBuf {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return PathBuf::from(raw),
    };
    expand_home_with(raw, &home)
}

fn expand_home_with(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }

    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

/// Expand home shorthand, then anchor relative paths at the working directory
pub fn resolve_user_path(raw: &str) -> PathBuf {
    let expanded = expand_home(raw);
    if expanded.is_absolute() {
        return expanded;
    }
    std::path::absolute(&expanded).unwrap_or(expanded)
}

/// Directory to open for the "open containing directory" action.
///
/// A directory is its own container; anything else resolves to its parent.
pub fn containing_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }

    match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_bare_tilde() {
        let home = Path::new("/home/alice");
        assert_eq!(expand_home_with("~", home), PathBuf::from("/home/alice"));
    }

    #[test]
    fn test_expand_home_subpath() {
        let home = Path::new("/home/alice");
        assert_eq!(
            expand_home_with("~/projects/demo", home),
            PathBuf::from("/home/alice/projects/demo")
        );
    }

    #[test]
    fn test_expand_home_leaves_other_forms() {
        let home = Path::new("/home/alice");
        assert_eq!(expand_home_with("~bob/x", home), PathBuf::from("~bob/x"));
        assert_eq!(expand_home_with("/etc/hosts", home), PathBuf::from("/etc/hosts"));
        assert_eq!(expand_home_with("", home), PathBuf::from(""));
    }

    #[test]
    fn test_resolve_user_path_is_absolute() {
        assert!(resolve_user_path("some/relative/dir").is_absolute());
        assert!(resolve_user_path("~").is_absolute() || dirs::home_dir().is_none());
    }

    #[test]
    fn test_containing_dir_of_directory_is_itself() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(containing_dir(dir.path()), dir.path());
    }

    #[test]
    fn test_containing_dir_of_file_is_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hi").unwrap();
        assert_eq!(containing_dir(&file), dir.path());
    }

    #[test]
    fn test_containing_dir_of_missing_path_is_parent() {
        let path = Path::new("/definitely/not/here.txt");
        assert_eq!(containing_dir(path), PathBuf::from("/definitely/not"));
    }
}
