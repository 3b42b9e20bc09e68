// Entrypoint for the uploader.
// - Keeps `main` small: parse args, set up logging and config, then hand a
//   prompter and an rclone client to the session loop.
// - Returns `anyhow::Result` so startup failures exit non-zero.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use rclone_uploader::config::UploaderConfig;
use rclone_uploader::rclone::{ProcessRunner, Rclone};
use rclone_uploader::session::Session;
use rclone_uploader::ui::TerminalPrompter;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Parser, Debug)]
#[clap(
    name = "rclone-uploader",
    version,
    about = "Interactive front-end for rclone copy/move"
)]
struct Cli {
    /// File or folder to upload; skips the picker for the first upload
    source: Option<String>,

    /// JSON config file (default: ~/.rclone-uploader/config.json)
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long)]
    debug: bool,

    /// Do not clear the terminal between steps
    #[clap(long)]
    no_clear: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = UploaderConfig::load(cli.config.as_deref())?;
    // One log file per process, named after the start time.
    let log_file = config.log_file(SystemTime::now());

    let runner = ProcessRunner { spinner: true };
    let rclone = Rclone::new(runner, config.executable.clone());
    let mut prompter = TerminalPrompter::new(!cli.no_clear);

    // Blocks until the operator is done uploading.
    Session::new(&config, &mut prompter, rclone, log_file).run(cli.source)?;
    Ok(())
}
