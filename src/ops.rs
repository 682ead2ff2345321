use crate::error::ToolError;
use crate::interrupt::INTERRUPT;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// Locate `program` on PATH before shelling out to it.
pub fn require_program(program: &str, hint: &str) -> Result<PathBuf, ToolError> {
    which::which(program).map_err(|_| ToolError::MissingProgram {
        program: program.to_string(),
        hint: hint.to_string(),
    })
}

pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run with inherited stdio and return the exit code (-1 when killed by a signal).
/// Ctrl-C belongs to the child while it runs.
pub fn run_status(cmd: &mut Command) -> Result<i32> {
    log::debug!("running {}", describe(cmd));
    let _busy = INTERRUPT.busy();
    let status = cmd.status().with_context(|| format!("spawning `{}`", describe(cmd)))?;
    Ok(status.code().unwrap_or(-1))
}

/// Run with inherited stdio; a nonzero exit is an error.
pub fn run_checked(cmd: &mut Command) -> Result<()> {
    match run_status(cmd)? {
        0 => Ok(()),
        code => Err(ToolError::ExternalCommand {
            command: describe(cmd),
            code,
        }
        .into()),
    }
}

/// Run and collect stdout; a nonzero exit is an error.
pub fn capture(cmd: &mut Command) -> Result<String> {
    log::debug!("capturing {}", describe(cmd));
    let _busy = INTERRUPT.busy();
    let output = cmd.output().with_context(|| format!("spawning `{}`", describe(cmd)))?;
    if !output.status.success() {
        return Err(ToolError::ExternalCommand {
            command: describe(cmd),
            code: output.status.code().unwrap_or(-1),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
