// Configuration: built once at startup from defaults, an optional JSON
// file and environment variables (a `.env` file is honoured), then passed
// by reference to the assembler and the session.

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const TOOL_NAME: &str = "rclone-uploader";

pub const DEFAULT_EXECUTABLE: &str = "rclone";

pub const DEFAULT_FLAGS: [&str; 4] = [
    "--drive-chunk-size=128M",
    "--buffer-size=64M",
    "--verbose",
    "--fast-list",
];

pub const DEFAULT_TAIL_LINES: usize = 10;

pub const ENV_FLAGS: &str = "RCLONE_UPLOADER_FLAGS";
pub const ENV_LOG_FOLDER: &str = "RCLONE_UPLOADER_LOG_FOLDER";
pub const ENV_EXECUTABLE: &str = "RCLONE_UPLOADER_EXE";
pub const ENV_TAIL_LINES: &str = "RCLONE_UPLOADER_TAIL_LINES";

/// Shape of the optional `config.json`. Every key may be omitted.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub executable: Option<String>,
    pub flags: Option<Vec<String>>,
    pub log_folder: Option<PathBuf>,
    pub tail_lines: Option<usize>,
}

impl FileConfig {
    /// Read a config file. A missing file yields the empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config file at {}", path.display());
            return Ok(FileConfig::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploaderConfig {
    pub executable: String,
    pub default_flags: Vec<String>,
    pub log_folder: PathBuf,
    pub tail_lines: usize,
}

/// `<home>/.rclone-uploader`, or `./.rclone-uploader` without a home dir.
pub fn app_dir() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(format!(".{TOOL_NAME}"))
}

pub fn default_config_path() -> PathBuf {
    app_dir().join("config.json")
}

impl UploaderConfig {
    /// Load `.env`, the config file (explicit path or the default one) and
    /// the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        let file = match config_path {
            // An explicitly requested file must exist.
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file {} does not exist", path.display());
                }
                FileConfig::load(path)?
            }
            None => FileConfig::load(&default_config_path())?,
        };
        let config = Self::from_sources(file, |key| std::env::var(key).ok(), app_dir())?;
        debug!("resolved config: {config:?}");
        Ok(config)
    }

    /// Merge defaults < file < environment. `env` looks up a variable;
    /// blank values count as unset.
    pub fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
        app_dir: PathBuf,
    ) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let executable = env(ENV_EXECUTABLE)
            .map(|v| v.trim().to_string())
            .or(file.executable)
            .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string());

        let default_flags = match env(ENV_FLAGS) {
            Some(flags) => flags.split_whitespace().map(str::to_string).collect(),
            None => file
                .flags
                .unwrap_or_else(|| DEFAULT_FLAGS.iter().map(|f| f.to_string()).collect()),
        };

        let log_folder = env(ENV_LOG_FOLDER)
            .map(PathBuf::from)
            .or(file.log_folder)
            .unwrap_or_else(|| app_dir.join("logs"));

        let tail_lines = match env(ENV_TAIL_LINES) {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TAIL_LINES} must be a number, got {v:?}"))?,
            None => file.tail_lines.unwrap_or(DEFAULT_TAIL_LINES),
        };

        Ok(UploaderConfig {
            executable,
            default_flags,
            log_folder,
            tail_lines,
        })
    }

    /// Log file for a session started at `started` (milliseconds since the
    /// epoch in the file name).
    pub fn log_file(&self, started: SystemTime) -> PathBuf {
        let millis = started
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        self.log_folder.join(format!("{TOOL_NAME}-{millis}.log"))
    }
}
