// UI layer: interactive prompts built on `dialoguer`, plus the prompt flow
// that turns operator answers into an `UploadRequest`.
//
// The prompts sit behind the `Prompter` trait so the flow and the session
// can be driven by a scripted operator in tests.

use crate::rclone::{Rclone, Runner};
use crate::request::{
    parse_destination, parse_source, BandwidthLimit, TransferMethod, UploadRequest,
};
use anyhow::{anyhow, Result};
use crossterm::{cursor, execute, terminal};
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

/// Operator interaction used by the prompt flow and the session.
pub trait Prompter {
    /// Ask for a file or folder to upload.
    fn pick_source(&mut self) -> Result<String>;

    /// Pick one of `items`; returns its index.
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Free text with a default. `validate` returns the message to show
    /// before asking again.
    fn input(
        &mut self,
        prompt: &str,
        default: &str,
        validate: &dyn Fn(&str) -> Result<(), String>,
    ) -> Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Clear the screen between steps.
    fn clear(&mut self) -> Result<()>;
}

/// Terminal implementation backed by `dialoguer`, `rfd` and `crossterm`.
#[derive(Debug)]
pub struct TerminalPrompter {
    clear_screen: bool,
}

impl TerminalPrompter {
    pub fn new(clear_screen: bool) -> Self {
        TerminalPrompter { clear_screen }
    }
}

impl Prompter for TerminalPrompter {
    fn pick_source(&mut self) -> Result<String> {
        let kinds = vec![
            "Pick a file".to_string(),
            "Pick a folder".to_string(),
            "Type a path".to_string(),
        ];
        let kind = self.select("Pick a file or folder to upload", &kinds, 0)?;
        // The native dialog returns None when cancelled or when no
        // desktop session is available; fall back to typing the path.
        let picked: Option<PathBuf> = match kind {
            0 => rfd::FileDialog::new().pick_file(),
            1 => rfd::FileDialog::new().pick_folder(),
            _ => None,
        };
        match picked {
            Some(path) => {
                let path = path.display().to_string();
                println!("source: {path}");
                Ok(path)
            }
            None => {
                let typed = self.input("Path to upload", "", &|s: &str| {
                    parse_source(s).map(drop).map_err(str::to_string)
                })?;
                parse_source(&typed).map_err(|e| anyhow!(e))
            }
        }
    }

    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        // `Select` shows a keyboard-navigable list in the terminal.
        let index = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?;
        Ok(index)
    }

    fn input(
        &mut self,
        prompt: &str,
        default: &str,
        validate: &dyn Fn(&str) -> Result<(), String>,
    ) -> Result<String> {
        let mut input = Input::<String>::new();
        input
            .with_prompt(prompt)
            .validate_with(|s: &String| validate(s.as_str()));
        if !default.is_empty() {
            input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(answer)
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            execute!(
                std::io::stdout(),
                terminal::Clear(terminal::ClearType::All),
                cursor::MoveTo(0, 0)
            )?;
        }
        Ok(())
    }
}

/// Run the prompt flow once. `source` skips the picker when provided;
/// remotes come from `rclone listremotes` and a failure there is fatal.
pub fn collect_request<P, R>(
    prompter: &mut P,
    rclone: &mut Rclone<R>,
    source: Option<String>,
) -> Result<UploadRequest>
where
    P: Prompter + ?Sized,
    R: Runner,
{
    let source = match source {
        Some(source) => {
            println!("source: {source}");
            source
        }
        None => prompter.pick_source()?,
    };

    let remotes = rclone.list_remotes()?;
    let remote = remotes[prompter.select("Pick a remote:", &remotes, 0)?].clone();

    let destination = prompter.input("Destination folder:", "upload", &|s: &str| {
        parse_destination(s).map(drop).map_err(str::to_string)
    })?;
    let destination = parse_destination(&destination).map_err(|e| anyhow!(e))?;

    let methods: Vec<String> = TransferMethod::ALL
        .iter()
        .map(|m| m.as_str().to_string())
        .collect();
    let method = TransferMethod::ALL[prompter.select("Upload method:", &methods, 0)?];

    let limit = prompter.input("Upload speed limit (0 for unlimited)", "0", &|s: &str| {
        s.parse::<BandwidthLimit>().map(drop).map_err(str::to_string)
    })?;
    let bandwidth_limit = limit.parse::<BandwidthLimit>().map_err(|e| anyhow!(e))?;

    Ok(UploadRequest {
        source,
        remote,
        destination,
        method,
        bandwidth_limit,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rclone::tests::{ok, FakeRunner};
    use std::collections::VecDeque;

    /// One scripted operator answer.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Answer {
        Source(&'static str),
        /// Select by item text.
        Pick(&'static str),
        /// Text input; an empty string accepts the default.
        Text(&'static str),
        Yes,
        No,
    }

    /// Replays answers in order and records the prompts it was shown.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedPrompter {
        pub answers: VecDeque<Answer>,
        pub prompts: Vec<String>,
        pub rejections: Vec<String>,
        pub clears: usize,
    }

    impl ScriptedPrompter {
        pub(crate) fn new(answers: Vec<Answer>) -> Self {
            ScriptedPrompter {
                answers: answers.into(),
                ..Default::default()
            }
        }

        fn next(&mut self, prompt: &str) -> Answer {
            self.prompts.push(prompt.to_string());
            self.answers
                .pop_front()
                .unwrap_or_else(|| panic!("no scripted answer for {prompt:?}"))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn pick_source(&mut self) -> Result<String> {
            match self.next("source") {
                Answer::Source(path) => Ok(path.to_string()),
                other => panic!("expected a source answer, got {other:?}"),
            }
        }

        fn select(&mut self, prompt: &str, items: &[String], _default: usize) -> Result<usize> {
            match self.next(prompt) {
                Answer::Pick(item) => items
                    .iter()
                    .position(|i| i == item)
                    .ok_or_else(|| anyhow!("{item:?} not offered for {prompt:?}: {items:?}")),
                other => panic!("expected a pick for {prompt:?}, got {other:?}"),
            }
        }

        fn input(
            &mut self,
            prompt: &str,
            default: &str,
            validate: &dyn Fn(&str) -> Result<(), String>,
        ) -> Result<String> {
            loop {
                let text = match self.next(prompt) {
                    Answer::Text("") => default.to_string(),
                    Answer::Text(text) => text.to_string(),
                    other => panic!("expected text for {prompt:?}, got {other:?}"),
                };
                match validate(&text) {
                    Ok(()) => return Ok(text),
                    Err(message) => self.rejections.push(message),
                }
            }
        }

        fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
            match self.next(prompt) {
                Answer::Yes => Ok(true),
                Answer::No => Ok(false),
                Answer::Text("") => Ok(default),
                other => panic!("expected yes/no for {prompt:?}, got {other:?}"),
            }
        }

        fn clear(&mut self) -> Result<()> {
            self.clears += 1;
            Ok(())
        }
    }

    fn rclone() -> Rclone<FakeRunner> {
        Rclone::new(FakeRunner::with(vec![ok("gdrive:\ns3:\n")]), "rclone")
    }

    #[test]
    fn collects_all_fields_with_defaults() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Source("/tmp/video.mp4"),
            Answer::Pick("s3:"),
            Answer::Text(""),
            Answer::Pick("move"),
            Answer::Text(""),
        ]);
        let request = collect_request(&mut prompter, &mut rclone(), None).unwrap();
        assert_eq!(request.source, "/tmp/video.mp4");
        assert_eq!(request.remote, "s3:");
        assert_eq!(request.destination, "upload");
        assert_eq!(request.method, TransferMethod::Move);
        assert_eq!(request.bandwidth_limit.as_str(), "0");
    }

    #[test]
    fn provided_source_skips_the_picker() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Pick("gdrive:"),
            Answer::Text("backup"),
            Answer::Pick("copy"),
            Answer::Text("10M"),
        ]);
        let request =
            collect_request(&mut prompter, &mut rclone(), Some("/srv/data".into())).unwrap();
        assert_eq!(request.source, "/srv/data");
        assert!(!prompter.prompts.iter().any(|p| p == "source"));
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Source("/a"),
            Answer::Pick("gdrive:"),
            Answer::Text("   "),
            Answer::Text(" photos "),
            Answer::Pick("copy"),
            Answer::Text("M10"),
            Answer::Text("512k"),
        ]);
        let request = collect_request(&mut prompter, &mut rclone(), None).unwrap();
        assert_eq!(request.destination, "photos");
        assert_eq!(request.bandwidth_limit.as_str(), "512k");
        assert_eq!(
            prompter.rejections,
            vec![
                crate::request::BLANK_DESTINATION.to_string(),
                crate::request::BANDWIDTH_SYNTAX.to_string(),
            ]
        );
    }

    #[test]
    fn remote_listing_failure_aborts_the_flow() {
        let mut prompter = ScriptedPrompter::new(vec![Answer::Source("/a")]);
        let mut rclone = Rclone::new(FakeRunner::with(vec![Err("no rclone".into())]), "rclone");
        assert!(collect_request(&mut prompter, &mut rclone, None).is_err());
        assert!(prompter.answers.is_empty());
    }
}
