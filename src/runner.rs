//! Running external commands such as `reg`.

use std::process::Command;

use crate::EditorFontError;

/// What a finished command reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the command exited successfully
    pub success: bool,
    /// The exit code, if the process was not killed by a signal
    pub code: Option<i32>,
    /// Standard output followed by standard error
    pub output: String,
}

impl CommandOutput {
    /// Turn an unsuccessful exit into [`EditorFontError::CommandFailed`]
    pub fn check(self, program: &str, args: &[String]) -> Result<Self, EditorFontError> {
        if self.success {
            Ok(self)
        } else {
            Err(EditorFontError::CommandFailed {
                command: command_line(program, args),
                code: self.code,
            })
        }
    }
}

/// Something that can run an external program and wait for it
pub trait CommandRunner {
    /// Run `program` with `args`, waiting for it to finish
    ///
    /// A program that cannot be started is an error; a non-zero exit is
    /// reported through [`CommandOutput`] and left for the caller to judge.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, EditorFontError>;
}

/// Runs commands with [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, EditorFontError> {
        log::debug!("Running {}", command_line(program, args));
        let output = Command::new(program).args(args).output()?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        if !text.trim().is_empty() {
            log::trace!("{}: {}", program, text.trim());
        }
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            output: text,
        })
    }
}

pub(crate) fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
