//! Keyword suggestions from an external program.
//!
//! The program gets the instruction, a blank line, and the body excerpt on
//! stdin, and prints comma-delimited keywords on stdout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use postsmith_core::keywords::{KeywordError, KeywordSource};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CommandKeywords {
    program: PathBuf,
}

impl CommandKeywords {
    pub fn new(program: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
        }
    }

    fn failure(&self, what: &str, err: impl std::fmt::Display) -> KeywordError {
        KeywordError::Source(format!("{} {what}: {err}", self.program.display()))
    }
}

impl KeywordSource for CommandKeywords {
    fn extract(&self, instruction: &str, excerpt: &str) -> Result<String, KeywordError> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| self.failure("could not be started", err))?;

        if let Some(mut stdin) = child.stdin.take() {
            let sent = write!(stdin, "{instruction}\n\n{excerpt}");
            // A program may answer without reading its input.
            if let Err(err) = sent.and_then(|()| stdin.flush())
                && err.kind() != io::ErrorKind::BrokenPipe
            {
                return Err(self.failure("rejected input", err));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|err| self.failure("failed", err))?;
        if !output.status.success() {
            return Err(self.failure("exited unsuccessfully", output.status));
        }
        let keywords = String::from_utf8(output.stdout)
            .map_err(|err| self.failure("printed non-UTF-8 output", err))?;
        debug!(program = %self.program.display(), keywords = %keywords.trim(), "keywords suggested");
        Ok(keywords.trim().to_string())
    }
}
