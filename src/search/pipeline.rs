//! Two-stage process pipeline: walker stdout streams straight into filter stdin.
//!
//! Both children are reaped on every exit path. The walker is held by a
//! guard that kills and waits it if we bail out before it finished.

use crate::deps::{ToolBinding, ToolRole};
use crate::prefs::ResolvedConfig;
use crate::search::command::{build_filter_command, build_walker_command};
use std::ffi::OsString;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Exit status the filter uses to say "nothing matched"
const FILTER_NO_MATCH: i32 = 1;

/// Matched paths in filter order, already truncated to the result limit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub paths: Vec<String>,
}

impl SearchResult {
    /// Split filter output into lines and keep the first `limit`.
    ///
    /// Lines that are not UTF-8 are skipped: hosts receive paths as JSON
    /// strings, and a lossy copy would name a file that does not exist.
    pub fn from_output(stdout: &[u8], limit: usize) -> Self {
        let mut skipped = 0usize;
        let paths = stdout
            .split(|&b| b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .filter(|line| !line.is_empty())
            .filter_map(|line| match std::str::from_utf8(line) {
                Ok(path) => Some(path.to_owned()),
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .take(limit)
            .collect();

        if skipped > 0 {
            debug!(skipped, "Skipped matches with non-UTF-8 paths");
        }
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Why a pipeline stage failed
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no executable bound for the {role}")]
    Unbound { role: ToolRole },

    #[error("failed to launch {role} {program:?}: {source}")]
    Spawn {
        role: ToolRole,
        program: OsString,
        #[source]
        source: io::Error,
    },

    #[error("{role} command {command:?} failed with {status}")]
    Exit {
        role: ToolRole,
        command: Vec<OsString>,
        status: ExitStatus,
    },

    #[error("failed to collect {role} output: {source}")]
    Io {
        role: ToolRole,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Stage the failure belongs to
    pub fn role(&self) -> ToolRole {
        match self {
            PipelineError::Unbound { role }
            | PipelineError::Spawn { role, .. }
            | PipelineError::Exit { role, .. }
            | PipelineError::Io { role, .. } => *role,
        }
    }

    /// Exit code of the failed stage; `None` when it never ran or was signalled
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PipelineError::Exit { status, .. } => status.code(),
            _ => None,
        }
    }

    /// The filter's own "no match" signal. Only the filter stage qualifies;
    /// a walker exiting 1 is a real failure.
    pub fn is_no_match(&self) -> bool {
        self.role() == ToolRole::Filter && self.exit_code() == Some(FILTER_NO_MATCH)
    }
}

/// Outcome of one pipeline run, decided once at the pipeline boundary
#[derive(Debug)]
pub enum PipelineOutcome {
    Matches(SearchResult),
    NoMatches,
    Failed(PipelineError),
}

impl PipelineOutcome {
    fn from_result(result: Result<SearchResult, PipelineError>) -> Self {
        match result {
            Ok(found) => PipelineOutcome::Matches(found),
            Err(e) if e.is_no_match() => PipelineOutcome::NoMatches,
            Err(e) => PipelineOutcome::Failed(e),
        }
    }
}

/// Runs a query against a resolved configuration
pub trait SearchPipeline {
    fn run(&self, query: &str, config: &ResolvedConfig, binding: &ToolBinding)
    -> PipelineOutcome;
}

/// Pipeline backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessPipeline;

impl SearchPipeline for ProcessPipeline {
    fn run(
        &self,
        query: &str,
        config: &ResolvedConfig,
        binding: &ToolBinding,
    ) -> PipelineOutcome {
        debug!(query, "Finding results");
        let outcome = PipelineOutcome::from_result(run_processes(query, config, binding));

        match &outcome {
            PipelineOutcome::Matches(found) => info!(count = found.len(), "Found results"),
            PipelineOutcome::NoMatches => info!("Filter reported no matches"),
            PipelineOutcome::Failed(e) => warn!(
                role = %e.role(),
                code = ?e.exit_code(),
                error = %e,
                "Search pipeline failed"
            ),
        }

        outcome
    }
}

fn run_processes(
    query: &str,
    config: &ResolvedConfig,
    binding: &ToolBinding,
) -> Result<SearchResult, PipelineError> {
    let walker_bin = bound(binding, ToolRole::Walker)?;
    let filter_bin = bound(binding, ToolRole::Filter)?;

    let walker_cmd = build_walker_command(walker_bin, config);
    let filter_cmd = build_filter_command(filter_bin, query);
    debug!(?walker_cmd, ?filter_cmd, "Spawning search pipeline");

    let mut walker = ReapOnDrop::spawn(
        ToolRole::Walker,
        command(&walker_cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null()),
    )?;

    let walker_stdout = walker.child.stdout.take().ok_or_else(|| PipelineError::Io {
        role: ToolRole::Walker,
        source: io::Error::other("walker stdout was not captured"),
    })?;

    let filter = command(&filter_cmd)
        .stdin(Stdio::from(walker_stdout))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| PipelineError::Spawn {
            role: ToolRole::Filter,
            program: filter_cmd[0].clone(),
            source,
        })?;

    let output = filter.wait_with_output().map_err(|source| PipelineError::Io {
        role: ToolRole::Filter,
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "Filter stderr");
        }
        return Err(PipelineError::Exit {
            role: ToolRole::Filter,
            command: filter_cmd,
            status: output.status,
        });
    }

    let walker_status = walker.wait()?;
    if !walker_status.success() {
        return Err(PipelineError::Exit {
            role: ToolRole::Walker,
            command: walker_cmd,
            status: walker_status,
        });
    }

    Ok(SearchResult::from_output(
        &output.stdout,
        config.result_limit.get(),
    ))
}

fn bound(binding: &ToolBinding, role: ToolRole) -> Result<&str, PipelineError> {
    binding.get(role).ok_or(PipelineError::Unbound { role })
}

fn command(argv: &[OsString]) -> Command {
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);
    cmd
}

/// Child process that is always reaped, killing it first if still unwaited
struct ReapOnDrop {
    role: ToolRole,
    child: Child,
    reaped: bool,
}

impl ReapOnDrop {
    fn spawn(role: ToolRole, cmd: &mut Command) -> Result<Self, PipelineError> {
        let child = cmd.spawn().map_err(|source| PipelineError::Spawn {
            role,
            program: cmd.get_program().to_os_string(),
            source,
        })?;

        Ok(Self {
            role,
            child,
            reaped: false,
        })
    }

    fn wait(&mut self) -> Result<ExitStatus, PipelineError> {
        let status = self.child.wait().map_err(|source| PipelineError::Io {
            role: self.role,
            source,
        })?;
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for ReapOnDrop {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        // Already-exited children make kill a no-op; wait still reaps them
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::prefs::SearchMode;
    use std::num::NonZeroUsize;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::OnceLock;
    use std::time::{Duration, Instant};

    static SCRIPTS: OnceLock<tempfile::TempDir> = OnceLock::new();

    /// Fake fd/fzf stand-ins, written once and shared by every test
    fn scripts_dir() -> &'static Path {
        SCRIPTS
            .get_or_init(|| {
                let dir = tempfile::tempdir().unwrap();
                let scripts = [
                    (
                        "walker-ok",
                        "printf '%s\\n' /data/alpha /data/beta /data/alphabet /data/gamma\n",
                    ),
                    ("walker-args", "printf '%s\\n' \"$@\"\n"),
                    ("walker-fail", "printf '%s\\n' /data/alpha\nexit 3\n"),
                    // Behaves like `fzf --filter`: exit 1 when nothing matched
                    ("filter-grep", "[ \"$1\" = \"--filter\" ] || exit 2\ngrep -F -- \"$2\"\n"),
                    ("filter-cat", "cat\n"),
                    ("filter-error", "cat > /dev/null\necho boom >&2\nexit 2\n"),
                    (
                        "walker-hang",
                        "echo $$ > \"$(dirname \"$0\")/walker-hang.pid\"\nexec sleep 30\n",
                    ),
                    // Fails without reading stdin, once the hanging walker is up
                    (
                        "filter-bail",
                        "pid=\"$(dirname \"$0\")/walker-hang.pid\"\n\
                         until [ -s \"$pid\" ]; do sleep 0.05; done\nexit 2\n",
                    ),
                ];
                for (name, body) in scripts {
                    let path = dir.path().join(name);
                    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
                    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                        .unwrap();
                }
                dir
            })
            .path()
    }

    fn script(name: &str) -> String {
        scripts_dir().join(name).to_string_lossy().into_owned()
    }

    fn binding(walker: &str, filter: &str) -> ToolBinding {
        ToolBinding::new(script(walker), script(filter))
    }

    fn config(limit: usize) -> ResolvedConfig {
        ResolvedConfig {
            mode: SearchMode::FilesOnly,
            allow_hidden: true,
            result_limit: NonZeroUsize::new(limit).unwrap(),
            base_dir: PathBuf::from("/data"),
            ignore_file: None,
        }
    }

    fn search(query: &str, limit: usize, walker: &str, filter: &str) -> PipelineOutcome {
        ProcessPipeline.run(query, &config(limit), &binding(walker, filter))
    }

    fn matches(outcome: PipelineOutcome) -> Vec<String> {
        match outcome {
            PipelineOutcome::Matches(found) => found.paths,
            other => panic!("expected matches, got {other:?}"),
        }
    }

    #[test]
    fn test_search_result_truncates_in_order() {
        let found = SearchResult::from_output(b"c\na\nb\n", 2);
        assert_eq!(found.paths, ["c", "a"]);

        let all = SearchResult::from_output(b"c\na\nb\n", 10);
        assert_eq!(all.len(), 3);

        assert!(SearchResult::from_output(b"", 5).is_empty());
    }

    #[test]
    fn test_search_result_skips_non_utf8_paths() {
        let stdout = b"/data/caf\xe9.txt\n/data/cafe.txt\n/data/menu\n";
        let found = SearchResult::from_output(stdout, 1);
        assert_eq!(found.paths, ["/data/cafe.txt"]);
    }

    #[test]
    fn test_pipeline_filters_walker_output() {
        let outcome = search("alpha", 10, "walker-ok", "filter-grep");
        assert_eq!(matches(outcome), ["/data/alpha", "/data/alphabet"]);
    }

    #[test]
    fn test_pipeline_truncates_to_limit() {
        let outcome = search("data", 3, "walker-ok", "filter-grep");
        assert_eq!(
            matches(outcome),
            ["/data/alpha", "/data/beta", "/data/alphabet"]
        );
    }

    #[test]
    fn test_walker_receives_built_command() {
        let outcome = search("ignored", 50, "walker-args", "filter-cat");
        assert_eq!(matches(outcome), [".", "/data", "--type", "f", "--hidden"]);
    }

    #[test]
    fn test_filter_exit_one_is_no_matches() {
        let outcome = search("zzz", 10, "walker-ok", "filter-grep");
        assert!(matches!(outcome, PipelineOutcome::NoMatches));
    }

    #[test]
    fn test_filter_other_exit_is_failure() {
        let outcome = search("alpha", 10, "walker-ok", "filter-error");
        match outcome {
            PipelineOutcome::Failed(e) => {
                assert_eq!(e.role(), ToolRole::Filter);
                assert_eq!(e.exit_code(), Some(2));
                assert!(!e.is_no_match());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_walker_failure_is_tagged() {
        let outcome = search("alpha", 10, "walker-fail", "filter-cat");
        match outcome {
            PipelineOutcome::Failed(e) => {
                assert_eq!(e.role(), ToolRole::Walker);
                assert_eq!(e.exit_code(), Some(3));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_binary_is_spawn_failure() {
        let binding = ToolBinding::new("/nonexistent/fd", script("filter-cat"));
        let outcome = ProcessPipeline.run("alpha", &config(10), &binding);
        match outcome {
            PipelineOutcome::Failed(PipelineError::Spawn { role, .. }) => {
                assert_eq!(role, ToolRole::Walker)
            }
            other => panic!("expected spawn failure, got {other:?}"),
        }

        let binding = ToolBinding::new(script("walker-ok"), "/nonexistent/fzf");
        let outcome = ProcessPipeline.run("alpha", &config(10), &binding);
        match outcome {
            PipelineOutcome::Failed(PipelineError::Spawn { role, .. }) => {
                assert_eq!(role, ToolRole::Filter)
            }
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }

    #[test]
    fn test_unbound_role_is_failure() {
        let binding = ToolBinding {
            walker: None,
            filter: Some(script("filter-cat")),
        };
        let outcome = ProcessPipeline.run("alpha", &config(10), &binding);
        assert!(matches!(
            outcome,
            PipelineOutcome::Failed(PipelineError::Unbound { role: ToolRole::Walker })
        ));
    }

    #[test]
    fn test_failed_filter_kills_and_reaps_walker() {
        let started = Instant::now();
        let outcome = search("alpha", 10, "walker-hang", "filter-bail");
        assert!(started.elapsed() < Duration::from_secs(10));

        match outcome {
            PipelineOutcome::Failed(e) => {
                assert_eq!(e.role(), ToolRole::Filter);
                assert_eq!(e.exit_code(), Some(2));
            }
            other => panic!("expected failure, got {other:?}"),
        }

        let pid = std::fs::read_to_string(scripts_dir().join("walker-hang.pid")).unwrap();
        let alive = Command::new("kill")
            .args(["-0", pid.trim()])
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(!alive.success(), "walker {} still running", pid.trim());
    }
}
