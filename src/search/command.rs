//! Walker argument construction

use crate::prefs::{ResolvedConfig, SearchMode};
use std::ffi::OsString;

/// Pattern handed to the walker: match every entry
const MATCH_ALL: &str = ".";

/// Build the full walker invocation, program name first.
///
/// The query never reaches the walker; narrowing is the filter's job.
pub fn build_walker_command(binary: &str, config: &ResolvedConfig) -> Vec<OsString> {
    let mut cmd: Vec<OsString> = vec![
        binary.into(),
        MATCH_ALL.into(),
        config.base_dir.clone().into_os_string(),
    ];

    match config.mode {
        SearchMode::FilesOnly => cmd.extend([OsString::from("--type"), OsString::from("f")]),
        SearchMode::DirsOnly => cmd.extend([OsString::from("--type"), OsString::from("d")]),
        SearchMode::Both => {}
    }

    if config.allow_hidden {
        cmd.push("--hidden".into());
    }

    if let Some(ignore_file) = &config.ignore_file {
        cmd.push("--ignore-file".into());
        cmd.push(ignore_file.clone().into_os_string());
    }

    cmd
}

/// Filter invocation for a query, program name first
pub fn build_filter_command(binary: &str, query: &str) -> Vec<OsString> {
    vec![binary.into(), "--filter".into(), query.into()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;
    use std::path::PathBuf;

    fn config(mode: SearchMode, allow_hidden: bool, ignore_file: Option<&str>) -> ResolvedConfig {
        ResolvedConfig {
            mode,
            allow_hidden,
            result_limit: NonZeroUsize::new(10).unwrap(),
            base_dir: PathBuf::from("/home/user"),
            ignore_file: ignore_file.map(PathBuf::from),
        }
    }

    fn strings(cmd: Vec<OsString>) -> Vec<String> {
        cmd.into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_walker_command_minimal() {
        let cmd = build_walker_command("fd", &config(SearchMode::Both, false, None));
        assert_eq!(strings(cmd), ["fd", ".", "/home/user"]);
    }

    #[test]
    fn test_walker_command_type_flags() {
        let files = build_walker_command("fd", &config(SearchMode::FilesOnly, false, None));
        assert_eq!(strings(files), ["fd", ".", "/home/user", "--type", "f"]);

        let dirs = build_walker_command("fdfind", &config(SearchMode::DirsOnly, false, None));
        assert_eq!(strings(dirs), ["fdfind", ".", "/home/user", "--type", "d"]);
    }

    #[test]
    fn test_walker_command_flag_order() {
        let cfg = config(SearchMode::DirsOnly, true, Some("/home/user/.ignore"));
        let cmd = build_walker_command("fd", &cfg);
        assert_eq!(
            strings(cmd),
            [
                "fd",
                ".",
                "/home/user",
                "--type",
                "d",
                "--hidden",
                "--ignore-file",
                "/home/user/.ignore",
            ]
        );
    }

    #[test]
    fn test_walker_command_hidden_without_type() {
        let cmd = build_walker_command("fd", &config(SearchMode::Both, true, None));
        assert_eq!(strings(cmd), ["fd", ".", "/home/user", "--hidden"]);
    }

    #[test]
    fn test_walker_command_is_deterministic() {
        let cfg = config(SearchMode::FilesOnly, true, Some("/tmp/ignore"));
        assert_eq!(build_walker_command("fd", &cfg), build_walker_command("fd", &cfg));
    }

    #[test]
    fn test_filter_command() {
        let cmd = build_filter_command("fzf", "src main");
        assert_eq!(strings(cmd), ["fzf", "--filter", "src main"]);
    }
}
