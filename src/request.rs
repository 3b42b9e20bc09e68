// Request model: the five fields collected by the prompt flow, plus the
// validators the prompts use to re-ask on bad input.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Message shown when the destination folder is blank.
pub const BLANK_DESTINATION: &str = "Cannot be blank - use '/' to upload to root directory";

pub const BLANK_SOURCE: &str = "Path cannot be blank";

/// Syntax hint shown when the bandwidth limit does not parse.
pub const BANDWIDTH_SYNTAX: &str = "syntax: [num](b|k|M|G)";

/// How rclone should transfer the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMethod {
    Copy,
    Move,
}

impl TransferMethod {
    pub const ALL: [TransferMethod; 2] = [TransferMethod::Copy, TransferMethod::Move];

    /// The rclone sub-verb.
    pub fn as_str(self) -> &'static str {
        match self {
            TransferMethod::Copy => "copy",
            TransferMethod::Move => "move",
        }
    }

    /// Flag controlling what happens to empty source directories.
    pub fn empty_dirs_flag(self) -> &'static str {
        match self {
            TransferMethod::Copy => "--create-empty-src-dirs",
            TransferMethod::Move => "--delete-empty-src-dirs",
        }
    }
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn bandwidth_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+(b|k|M|G)?$").expect("bandwidth pattern is valid"))
}

/// A bandwidth cap such as `0` (unlimited), `512k` or `10M`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandwidthLimit(String);

impl BandwidthLimit {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BandwidthLimit {
    fn default() -> Self {
        BandwidthLimit("0".into())
    }
}

impl FromStr for BandwidthLimit {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if bandwidth_pattern().is_match(s) {
            Ok(BandwidthLimit(s.to_string()))
        } else {
            Err(BANDWIDTH_SYNTAX)
        }
    }
}

impl fmt::Display for BandwidthLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim a destination folder, rejecting blank input. `/` is the remote root.
pub fn parse_destination(input: &str) -> Result<String, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(BLANK_DESTINATION)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trim a typed source path, rejecting blank input.
pub fn parse_source(input: &str) -> Result<String, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(BLANK_SOURCE)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Everything needed to build one rclone invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRequest {
    pub source: String,
    pub remote: String,
    pub destination: String,
    pub method: TransferMethod,
    pub bandwidth_limit: BandwidthLimit,
}

impl UploadRequest {
    /// `remote` joined with `destination`, e.g. `gdrive:` + `backup` gives
    /// `gdrive:backup`. Remotes without a trailing colon (paths or
    /// `remote:dir`) are joined with a slash.
    pub fn remote_destination(&self) -> String {
        let destination = self.destination.as_str();
        if self.remote.ends_with(':') {
            format!("{}{}", self.remote, destination)
        } else {
            format!(
                "{}/{}",
                self.remote.trim_end_matches('/'),
                destination.trim_start_matches('/')
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(remote: &str, destination: &str) -> UploadRequest {
        UploadRequest {
            source: "/a/b".into(),
            remote: remote.into(),
            destination: destination.into(),
            method: TransferMethod::Copy,
            bandwidth_limit: BandwidthLimit::default(),
        }
    }

    #[test]
    fn accepts_bandwidth_limits_with_optional_unit() {
        for ok in ["0", "10M", "512k", "100b", "2G", "0010"] {
            assert_eq!(ok.parse::<BandwidthLimit>().unwrap().as_str(), ok);
        }
    }

    #[test]
    fn rejects_malformed_bandwidth_limits() {
        for bad in ["M10", "", "10m", "10MB", "1.5M", " 10M", "-1", "k", "١٠M", "１０k", "৫"] {
            assert_eq!(bad.parse::<BandwidthLimit>(), Err(BANDWIDTH_SYNTAX), "{bad:?}");
        }
    }

    #[test]
    fn destination_is_trimmed_and_must_not_be_blank() {
        assert_eq!(parse_destination("   "), Err(BLANK_DESTINATION));
        assert_eq!(parse_destination(""), Err(BLANK_DESTINATION));
        assert_eq!(parse_destination("/").as_deref(), Ok("/"));
        assert_eq!(parse_destination(" upload ").as_deref(), Ok("upload"));
    }

    #[test]
    fn typed_source_is_trimmed_and_must_not_be_blank() {
        assert_eq!(parse_source(" /tmp/x ").as_deref(), Ok("/tmp/x"));
        assert_eq!(parse_source("/tmp/my file.mp4").as_deref(), Ok("/tmp/my file.mp4"));
        assert_eq!(parse_source("\t "), Err(BLANK_SOURCE));
    }

    #[test]
    fn remote_destination_joins_on_colon_or_slash() {
        assert_eq!(request("gdrive:", "backup").remote_destination(), "gdrive:backup");
        assert_eq!(request("gdrive:", "/").remote_destination(), "gdrive:/");
        assert_eq!(request("gdrive:media", "backup").remote_destination(), "gdrive:media/backup");
        assert_eq!(request("/mnt/nas/", "/backup").remote_destination(), "/mnt/nas/backup");
    }

    #[test]
    fn method_picks_the_empty_dir_flag() {
        assert_eq!(TransferMethod::Copy.empty_dirs_flag(), "--create-empty-src-dirs");
        assert_eq!(TransferMethod::Move.empty_dirs_flag(), "--delete-empty-src-dirs");
        assert_eq!(TransferMethod::Move.to_string(), "move");
    }
}
