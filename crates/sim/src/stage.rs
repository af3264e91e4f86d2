//! Blocking, timeout-bounded external invocations.

use pimforge_design::SimFailure;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Lines of stderr kept in a non-zero-exit failure.
const TAIL_LINES: usize = 20;

/// One external tool call: command line, limits and the artifacts it must leave.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub timeout: Duration,
    pub expected_outputs: Vec<PathBuf>,
    /// Combined stdout/stderr is saved here when set.
    pub log_file: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: workdir.into(),
            timeout,
            expected_outputs: Vec::new(),
            log_file: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn expect_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.expected_outputs.push(path.into());
        self
    }

    pub fn log_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A successful run: every expected output exists.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRun {
    pub elapsed: Duration,
    pub outputs: Vec<PathBuf>,
}

/// Executes invocations. Implemented by [`ProcessRunner`] and by test fakes.
pub trait StageRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<StageRun, SimFailure>;
}

/// Check that every expected artifact was produced.
pub fn verify_outputs(invocation: &Invocation, elapsed: Duration) -> Result<StageRun, SimFailure> {
    if let Some(missing) = invocation.expected_outputs.iter().find(|p| !p.is_file()) {
        return Err(SimFailure::MissingOutput(missing.clone()));
    }
    Ok(StageRun {
        elapsed,
        outputs: invocation.expected_outputs.clone(),
    })
}

/// Runs the real program as a child process.
///
/// Each call drives its own current-thread runtime, so invocations from
/// several threads never contend for one executor. A timed-out child is
/// killed when its handle is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl StageRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<StageRun, SimFailure> {
        let start = Instant::now();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SimFailure::Spawn {
                program: invocation.program.clone(),
                detail: format!("runtime: {}", e),
            })?;

        debug!(command = %invocation.command_line(), "launching external stage");
        let output = runtime.block_on(run_with_timeout(invocation))?;
        let elapsed = start.elapsed();

        if let Some(log) = &invocation.log_file {
            let mut blob = output.stdout.clone();
            blob.extend_from_slice(&output.stderr);
            if let Err(e) = std::fs::write(log, blob) {
                debug!(error = %e, path = %log.display(), "failed to save stage log");
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let text = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).into_owned()
            } else {
                stderr.into_owned()
            };
            return Err(SimFailure::NonZeroExit {
                code: output.status.code(),
                tail: tail(&text, TAIL_LINES),
            });
        }

        verify_outputs(invocation, elapsed)
    }
}

async fn run_with_timeout(invocation: &Invocation) -> Result<Output, SimFailure> {
    let child = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SimFailure::Spawn {
            program: invocation.program.clone(),
            detail: e.to_string(),
        })?;

    match tokio::time::timeout(invocation.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(SimFailure::Spawn {
            program: invocation.program.clone(),
            detail: e.to_string(),
        }),
        Err(_) => Err(SimFailure::Timeout(invocation.timeout)),
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(dir: &Path, script: &str, timeout: Duration) -> Invocation {
        Invocation::new("/bin/sh", dir, timeout).arg("-c").arg(script)
    }

    #[test]
    fn test_success_with_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("stats.txt");
        let inv = sh(dir.path(), "echo 'Cycles: 10' > stats.txt", Duration::from_secs(10))
            .expect_output(&out)
            .log_to(dir.path().join("run.log"));
        let run = ProcessRunner.run(&inv).unwrap();
        assert_eq!(run.outputs, vec![out]);
        assert!(dir.path().join("run.log").exists());
    }

    #[test]
    fn test_zero_exit_with_missing_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let inv = sh(dir.path(), "true", Duration::from_secs(10))
            .expect_output(dir.path().join("never.txt"));
        match ProcessRunner.run(&inv) {
            Err(SimFailure::MissingOutput(path)) => assert!(path.ends_with("never.txt")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_zero_exit_keeps_stderr_tail() {
        let dir = tempfile::tempdir().unwrap();
        let inv = sh(dir.path(), "echo mapper exploded >&2; exit 3", Duration::from_secs(10));
        match ProcessRunner.run(&inv) {
            Err(SimFailure::NonZeroExit { code, tail }) => {
                assert_eq!(code, Some(3));
                assert!(tail.contains("mapper exploded"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_timeout_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let inv = sh(dir.path(), "sleep 5", Duration::from_millis(200));
        let start = Instant::now();
        assert!(matches!(ProcessRunner.run(&inv), Err(SimFailure::Timeout(_))));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("/definitely/not/a/simulator", dir.path(), Duration::from_secs(1));
        assert!(matches!(ProcessRunner.run(&inv), Err(SimFailure::Spawn { .. })));
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
    }
}
