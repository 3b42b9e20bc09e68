// Thin client around the rclone executable. Every call spawns exactly one
// process, waits for it and hands back the captured output.

use crate::command::{AssembledCommand, RunMode};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// Short description of a failed exit, `None` on success.
    pub fn failure(&self) -> Option<String> {
        if self.success {
            return None;
        }
        Some(match self.code {
            Some(code) => format!("process exited with status {code}"),
            None => "process terminated by signal".to_string(),
        })
    }
}

/// Spawns external programs. Swapped out in tests.
pub trait Runner {
    /// Run `program` with `args` to completion. `Err` means the process
    /// could not be started at all.
    fn run(&mut self, program: &str, args: &[String]) -> Result<RunOutput>;
}

/// Runs programs with `std::process::Command`, showing a spinner while the
/// process is alive.
#[derive(Debug, Default)]
pub struct ProcessRunner {
    pub spinner: bool,
}

impl Runner for ProcessRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<RunOutput> {
        let spinner = self.spinner.then(|| {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
                pb.set_style(style);
            }
            pb.set_message(format!("Running {program}..."));
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        });

        let output = Command::new(program).args(args).output();
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let output = output.with_context(|| format!("Failed to start {program}"))?;

        let result = RunOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        info!("{program} finished: {}", output.status);
        Ok(result)
    }
}

/// Client for the configured rclone executable.
#[derive(Debug)]
pub struct Rclone<R> {
    runner: R,
    executable: String,
}

impl<R: Runner> Rclone<R> {
    pub fn new(runner: R, executable: impl Into<String>) -> Self {
        Rclone {
            runner,
            executable: executable.into(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Names of the configured remotes, one per line of `listremotes`.
    pub fn list_remotes(&mut self) -> Result<Vec<String>> {
        let args = ["listremotes".to_string()];
        let output = self
            .runner
            .run(&self.executable, &args)
            .with_context(|| format!("Failed to run {} listremotes", self.executable))?;
        if let Some(failure) = output.failure() {
            anyhow::bail!(
                "{} listremotes failed: {} {}",
                self.executable,
                failure,
                output.stderr.trim()
            );
        }
        let remotes: Vec<String> = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if remotes.is_empty() {
            anyhow::bail!(
                "No remotes configured - run `{} config` to add one",
                self.executable
            );
        }
        debug!("remotes: {remotes:?}");
        Ok(remotes)
    }

    /// Run an assembled transfer in the given mode.
    pub fn execute(&mut self, command: &AssembledCommand, mode: &RunMode) -> Result<RunOutput> {
        let args = command.args(mode);
        debug!("spawning {} {:?}", command.executable, args);
        self.runner.run(&command.executable, &args)
    }
}

/// Last `count` lines of the file at `path`, like `tail -n`. Invalid UTF-8
/// is replaced rather than failing the read.
pub fn tail_lines(path: &Path, count: usize) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut last = VecDeque::with_capacity(count);
    for line in BufReader::new(file).split(b'\n') {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if count == 0 {
            continue;
        }
        if last.len() == count {
            last.pop_front();
        }
        let line = String::from_utf8_lossy(&line);
        last.push_back(line.strip_suffix('\r').unwrap_or(&*line).to_string());
    }
    Ok(last.into())
}
