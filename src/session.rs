// Session driver: prompt, review, dry run, real run, tail log, repeat.
//
// Each step blocks on either the operator or one rclone process, so the
// whole thing is a plain loop over `Step`.

use crate::command::{AssembledCommand, RunMode};
use crate::config::UploaderConfig;
use crate::rclone::{tail_lines, Rclone, RunOutput, Runner};
use crate::status;
use crate::ui::{collect_request, Prompter};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use log::{debug, warn};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Prompting,
    AwaitingDryRunConfirmation(AssembledCommand),
    DryRun(AssembledCommand),
    AwaitingContinueConfirmation(AssembledCommand),
    RealRun(AssembledCommand),
    AwaitingRestartConfirmation,
    Done,
}

/// What the operator wants after a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    Retry,
    StartOver,
    Quit,
}

const RECOVERY_CHOICES: [(&str, Recovery); 3] = [
    ("Retry", Recovery::Retry),
    ("Start over", Recovery::StartOver),
    ("Quit", Recovery::Quit),
];

pub struct Session<'a, P: ?Sized, R> {
    config: &'a UploaderConfig,
    prompter: &'a mut P,
    rclone: Rclone<R>,
    log_file: PathBuf,
}

impl<'a, P, R> Session<'a, P, R>
where
    P: Prompter + ?Sized,
    R: Runner,
{
    pub fn new(
        config: &'a UploaderConfig,
        prompter: &'a mut P,
        rclone: Rclone<R>,
        log_file: PathBuf,
    ) -> Self {
        Session {
            config,
            prompter,
            rclone,
            log_file,
        }
    }

    pub fn rclone(&self) -> &Rclone<R> {
        &self.rclone
    }

    /// Run until the operator declines another upload or quits.
    /// `source` pre-fills only the first request.
    pub fn run(&mut self, mut source: Option<String>) -> Result<()> {
        let mut step = Step::Prompting;
        loop {
            debug!("session step: {}", step_name(&step));
            step = match step {
                Step::Prompting => {
                    self.prompter.clear()?;
                    let request =
                        collect_request(&mut *self.prompter, &mut self.rclone, source.take())?;
                    debug!(
                        "request: {}",
                        serde_json::to_string(&request).unwrap_or_default()
                    );
                    let command = AssembledCommand::assemble(&request, self.config);
                    println!("{}", status::render(&command, &RunMode::DryRun, &self.log_file));
                    Step::AwaitingDryRunConfirmation(command)
                }
                Step::AwaitingDryRunConfirmation(command) => {
                    if self.prompter.confirm("Start dry run?", true)? {
                        Step::DryRun(command)
                    } else {
                        Step::Prompting
                    }
                }
                Step::DryRun(command) => {
                    if self.execute(&command, &RunMode::DryRun) {
                        Step::AwaitingContinueConfirmation(command)
                    } else {
                        match self.recover()? {
                            Recovery::Retry => Step::DryRun(command),
                            Recovery::StartOver => Step::Prompting,
                            Recovery::Quit => Step::Done,
                        }
                    }
                }
                Step::AwaitingContinueConfirmation(command) => {
                    if self.prompter.confirm("Continue?", false)? {
                        Step::RealRun(command)
                    } else {
                        Step::DryRun(command)
                    }
                }
                Step::RealRun(command) => {
                    let succeeded = self.real_run(&command)?;
                    self.print_log_tail();
                    if succeeded {
                        Step::AwaitingRestartConfirmation
                    } else {
                        match self.recover()? {
                            Recovery::Retry => Step::RealRun(command),
                            Recovery::StartOver => Step::Prompting,
                            Recovery::Quit => Step::Done,
                        }
                    }
                }
                Step::AwaitingRestartConfirmation => {
                    if self
                        .prompter
                        .confirm("Upload finished - upload another file?", true)?
                    {
                        Step::Prompting
                    } else {
                        Step::Done
                    }
                }
                Step::Done => return Ok(()),
            };
        }
    }

    fn real_run(&mut self, command: &AssembledCommand) -> Result<bool> {
        std::fs::create_dir_all(&self.config.log_folder).with_context(|| {
            format!(
                "Failed to create log folder {}",
                self.config.log_folder.display()
            )
        })?;
        let mode = RunMode::Logged(self.log_file.clone());
        Ok(self.execute(command, &mode))
    }

    /// Render, spawn and print. Returns whether the run succeeded.
    fn execute(&mut self, command: &AssembledCommand, mode: &RunMode) -> bool {
        if let Err(e) = self.prompter.clear() {
            debug!("clear failed: {e}");
        }
        println!("{}", status::render(command, mode, &self.log_file));
        match self.rclone.execute(command, mode) {
            Ok(output) => {
                print_output(&output);
                match output.failure() {
                    None => true,
                    Some(failure) => {
                        warn!("{} run failed: {failure}", mode_name(mode));
                        println!("{} {}", "cmd err:".red().bold(), failure);
                        false
                    }
                }
            }
            Err(e) => {
                warn!("{} run could not start: {e:#}", mode_name(mode));
                println!("{} {e:#}", "cmd err:".red().bold());
                false
            }
        }
    }

    fn print_log_tail(&self) {
        println!("{}", self.log_tail());
    }

    /// The tail of this session's log file, or a `tail err:` line when it
    /// cannot be read.
    fn log_tail(&self) -> String {
        match tail_lines(&self.log_file, self.config.tail_lines) {
            Ok(lines) => format!("\n{}", lines.join("\n")),
            Err(e) => format!("{} {e:#}", "tail err:".red().bold()),
        }
    }

    fn recover(&mut self) -> Result<Recovery> {
        let items: Vec<String> = RECOVERY_CHOICES
            .iter()
            .map(|(label, _)| label.to_string())
            .collect();
        let index = self.prompter.select("The command failed. What now?", &items, 0)?;
        Ok(RECOVERY_CHOICES[index].1)
    }
}

fn print_output(output: &RunOutput) {
    println!();
    if !output.stdout.is_empty() {
        println!("{}", output.stdout);
    }
    if !output.stderr.is_empty() {
        println!("{}", output.stderr);
    }
}

fn mode_name(mode: &RunMode) -> &'static str {
    if mode.is_dry_run() {
        "dry"
    } else {
        "real"
    }
}

fn step_name(step: &Step) -> &'static str {
    match step {
        Step::Prompting => "prompting",
        Step::AwaitingDryRunConfirmation(_) => "awaiting dry run confirmation",
        Step::DryRun(_) => "dry run",
        Step::AwaitingContinueConfirmation(_) => "awaiting continue confirmation",
        Step::RealRun(_) => "real run",
        Step::AwaitingRestartConfirmation => "awaiting restart confirmation",
        Step::Done => "done",
    }
}
