// Command assembly: turns an `UploadRequest` plus configuration into the
// argument vector handed to the process spawner. Nothing here touches a
// shell; `display_line` only exists for the operator to read.

use crate::config::UploaderConfig;
use crate::request::UploadRequest;
use std::path::PathBuf;

/// Which flavour of invocation to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    DryRun,
    Logged(PathBuf),
}

impl RunMode {
    pub fn flag(&self) -> String {
        match self {
            RunMode::DryRun => "--dry-run".to_string(),
            RunMode::Logged(path) => log_file_flag(path),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, RunMode::DryRun)
    }
}

pub fn log_file_flag(path: &std::path::Path) -> String {
    format!("--log-file={}", path.display())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledCommand {
    pub executable: String,
    pub method: String,
    pub source: String,
    pub destination: String,
    pub flags: Vec<String>,
}

impl AssembledCommand {
    /// Build the command for `request`. Cannot fail: the request fields were
    /// validated when they were collected.
    pub fn assemble(request: &UploadRequest, config: &UploaderConfig) -> Self {
        let mut flags = config.default_flags.clone();
        flags.push(request.method.empty_dirs_flag().to_string());
        flags.push(format!("--bwlimit={}", request.bandwidth_limit));

        AssembledCommand {
            executable: config.executable.clone(),
            method: request.method.as_str().to_string(),
            source: request.source.clone(),
            destination: request.remote_destination(),
            flags,
        }
    }

    /// Arguments after the executable, ending with the run-mode flag.
    pub fn args(&self, mode: &RunMode) -> Vec<String> {
        let mut args = vec![
            self.method.clone(),
            self.source.clone(),
            self.destination.clone(),
        ];
        args.extend(self.flags.iter().cloned());
        args.push(mode.flag());
        args
    }

    /// `rclone copy "<src>" "<dest>"`
    pub fn display_command(&self) -> String {
        format!(
            "{} {} \"{}\" \"{}\"",
            self.executable, self.method, self.source, self.destination
        )
    }

    /// The whole invocation as one line, paths in double quotes.
    pub fn display_line(&self, mode: &RunMode) -> String {
        let mut line = self.display_command();
        for flag in &self.flags {
            line.push(' ');
            line.push_str(flag);
        }
        line.push(' ');
        line.push_str(&mode.flag());
        line
    }
}
