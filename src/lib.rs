// Library root
// -----------
// The binary (`main.rs`) parses arguments, loads configuration and hands
// control to `session::Session`.
//
// Module responsibilities:
// - `config`: immutable settings from defaults, config file and env.
// - `request`: the upload request and its field validators.
// - `command`: builds the rclone argument vector from a request.
// - `rclone`: spawns rclone and reads back its log file.
// - `status`: the review panel shown before each run.
// - `ui`: dialoguer prompts and the prompt flow.
// - `session`: the dry-run / real-run loop.
pub mod command;
pub mod config;
pub mod rclone;
pub mod request;
pub mod session;
pub mod status;
pub mod ui;
