use armflow_core::{ConfirmPrompt, PromptReply};
use std::io::{BufRead, Write};

/// Terminal confirmation prompt: shows the question on `output` and reads a
/// one-line answer from `input`.
///
/// Enter or `y` answers Ok, `n` answers No (the action still runs), `c` or
/// `q` cancels the rest of the run. End of input cancels.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Ask on stderr so stdout stays clean for `--json`.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_reply(&mut self) -> std::io::Result<Option<PromptReply>> {
        loop {
            write!(self.output, "[Y]es / [n]o / [c]ancel: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match parse_reply(&line) {
                Some(reply) => return Ok(Some(reply)),
                None => writeln!(self.output, "unrecognized answer '{}'", line.trim())?,
            }
        }
    }
}

impl<R: BufRead, W: Write> ConfirmPrompt for LinePrompt<R, W> {
    fn ask(&mut self, title: &str, text: &str) -> PromptReply {
        if let Err(e) = writeln!(self.output, "\n{title}\n{text}") {
            tracing::warn!(error = %e, "could not show confirmation prompt");
        }
        match self.read_reply() {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                tracing::info!("no more input; cancelling run");
                PromptReply::Cancel
            }
            Err(e) => {
                tracing::warn!(error = %e, "confirmation prompt failed; cancelling run");
                PromptReply::Cancel
            }
        }
    }
}

fn parse_reply(line: &str) -> Option<PromptReply> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "y" | "yes" | "ok" => Some(PromptReply::Ok),
        "n" | "no" => Some(PromptReply::No),
        "c" | "cancel" | "q" | "quit" => Some(PromptReply::Cancel),
        _ => None,
    }
}
