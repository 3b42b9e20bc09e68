// Status panel printed before every run so the operator can review what is
// about to happen. Purely cosmetic.

use crate::command::{log_file_flag, AssembledCommand, RunMode};
use crate::config::TOOL_NAME;
use crossterm::style::Stylize;
use std::path::Path;

const LABEL_WIDTH: usize = 9;

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let label = format!("{label:>LABEL_WIDTH$}");
    out.push_str(&format!("      {} {}\n", label.dark_grey(), value));
}

/// Render the review panel for `command` in `mode`. The flag row always
/// shows the log file flag so the operator can see where the real run will
/// log.
pub fn render(command: &AssembledCommand, mode: &RunMode, log_file: &Path) -> String {
    let mut out = String::from("\n");
    let dest = &command.destination;
    out.push_str(&format!(
        "      {} {}\n",
        TOOL_NAME.bold().cyan(),
        format!("[{dest}]").yellow()
    ));
    out.push_str(&format!(
        "    {}\n",
        "-".repeat(TOOL_NAME.len() + 7 + dest.chars().count())
    ));

    let mut flags = command.flags.clone();
    flags.push(log_file_flag(log_file));

    let dry_run = if mode.is_dry_run() {
        "true".green()
    } else {
        "false".red()
    };

    row(&mut out, "command:", command.display_command().white());
    row(&mut out, "dryRun:", dry_run);
    row(&mut out, "flags:", flags.join(" ").magenta());
    row(&mut out, "src:", command.source.as_str().blue());
    row(&mut out, "dest:", command.destination.as_str().blue());

    out.push_str(&format!("\n > {}\n", command.display_line(mode).bold()));
    out
}
