use crate::args::unquote;
use crate::error::{ToolError, ToolInitError};
use crate::ops;
use crate::platform::platform;
use crate::session::Session;
use crate::tool::{require, ArgSpec, Descriptor, Handler, Invocation, ToolImpl};
use crate::workspace::{sanitize_name, Workspace};
use anyhow::{Context, Result};
use fs_err as fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const SCHEDULE_EXT: &str = "schedule";

/// Runs command lines, directly or from named schedules.
pub struct Shell {
    descriptor: Descriptor<Shell>,
    dir: PathBuf,
}

impl Shell {
    pub const NAME: &'static str = "Shell";

    pub fn new(workspace: &Workspace) -> Result<Self, ToolInitError> {
        let descriptor = Descriptor::new(
            Self::NAME,
            "0.2",
            Invocation::new("shell", "sh", "(sh)ell"),
            vec![
                ArgSpec::new("-c", "--command", "<cmd>", "Run a command line"),
                ArgSpec::new("-a", "--add", "<schedule> <cmd>", "Append a command to a schedule"),
                ArgSpec::detailed(
                    "-r",
                    "--run",
                    "<schedule>",
                    "Run every command of a schedule",
                    &["stops at the first command that fails"],
                ),
                ArgSpec::new("-l", "--list", "", "List saved schedules"),
                ArgSpec::new("-d", "--delete", "<schedule>", "Delete a schedule"),
            ],
            vec![
                Shell::command as Handler<Shell>,
                Shell::add as Handler<Shell>,
                Shell::run_schedule as Handler<Shell>,
                Shell::list as Handler<Shell>,
                Shell::delete as Handler<Shell>,
            ],
        )?
        .with_fallback(Shell::run_line);
        Ok(Self {
            descriptor,
            dir: workspace.tool_dir(Self::NAME),
        })
    }

    fn schedule_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{SCHEDULE_EXT}", sanitize_name(unquote(name))))
    }

    fn command(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        require(args, 1, "-c <cmd>")?;
        self.run_line(session, args)
    }

    /// Anything that isn't a flag is run as-is: `sh echo hi`.
    fn run_line(&self, _session: &mut Session<'_>, args: &[String]) -> Result<()> {
        require(args, 1, "sh <cmd>")?;
        ops::run_checked(&mut platform().shell_command(&args.join(" ")))
    }

    fn add(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 2, "-a <schedule> <cmd>")?;
        fs::create_dir_all(&self.dir)?;
        let path = self.schedule_path(&args[0]);
        let mut file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", args[1..].join(" ")).with_context(|| format!("writing {}", path.display()))?;
        session
            .console
            .info(format!("Command added to schedule \"{}\"", unquote(&args[0])));
        Ok(())
    }

    fn run_schedule(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-r <schedule>")?;
        let commands = load_schedule(&self.schedule_path(&args[0]), &args[0], &self.dir)?;
        let total = commands.len();
        for (i, line) in commands.iter().enumerate() {
            let step = session.console.paint(crate::console::color::PURPLE, &format!("[{}/{total}]", i + 1));
            session.console.notify(crate::console::Icon::Play, format!("{step} {line}"));
            ops::run_checked(&mut platform().shell_command(line))?;
        }
        session.console.info(format!("Schedule \"{}\" finished", unquote(&args[0])));
        Ok(())
    }

    fn list(&self, session: &mut Session<'_>, _args: &[String]) -> Result<()> {
        let mut schedules = Vec::new();
        if self.dir.is_dir() {
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|e| e == SCHEDULE_EXT) {
                    let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
                    let count = parse_schedule(&fs::read_to_string(&path)?).len();
                    schedules.push((name, count));
                }
            }
        }
        if schedules.is_empty() {
            session.console.info("No schedule saved yet");
            return Ok(());
        }
        schedules.sort();
        session.console.line(format!("   *  {:<20}Commands", "Name"));
        for (i, (name, count)) in schedules.iter().enumerate() {
            session.console.line(format!("  {:>2}. {name:<20}{count}", i + 1));
        }
        Ok(())
    }

    fn delete(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-d <schedule>")?;
        let path = self.schedule_path(&args[0]);
        if !path.is_file() {
            return Err(not_found(&args[0], &self.dir).into());
        }
        if session.console.confirm(&format!("Confirm the deletion of {} ?", unquote(&args[0]))) {
            fs::remove_file(&path)?;
            session.console.info(format!("Schedule \"{}\" deleted", unquote(&args[0])));
        }
        Ok(())
    }
}

impl ToolImpl for Shell {
    fn descriptor(&self) -> &Descriptor<Self> {
        &self.descriptor
    }

    fn workspace(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}

fn not_found(name: &str, dir: &Path) -> ToolError {
    ToolError::NotFound {
        what: "schedule",
        name: unquote(name).to_string(),
        location: dir.to_path_buf(),
    }
}

fn load_schedule(path: &Path, name: &str, dir: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(not_found(name, dir).into());
    }
    Ok(parse_schedule(&fs::read_to_string(path)?))
}

/// One command per line; blank lines and `#` comments are skipped.
pub fn parse_schedule(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::tool::{Outcome, Tool};

    #[test]
    fn schedule_parsing_skips_comments_and_blanks() {
        assert_eq!(
            parse_schedule("echo one\n\n# note\n  echo two  \n"),
            vec!["echo one", "echo two"]
        );
    }

    #[test]
    fn schedule_names_are_sanitized() {
        let h = Harness::new();
        let shell = Shell::new(&h.workspace()).unwrap();
        let path = shell.schedule_path("\"nightly backup\"");
        assert_eq!(path, h.dir.path().join("Shell").join("nightly-backup.schedule"));
    }

    #[test]
    fn dotted_schedule_names_stay_distinct() {
        let mut h = Harness::new();
        let shell = Shell::new(&h.workspace()).unwrap();
        let v2 = shell.schedule_path("backup.v2");
        let v3 = shell.schedule_path("backup.v3");
        assert_eq!(v2, h.dir.path().join("Shell").join("backup.v2.schedule"));
        assert_ne!(v2, v3);

        h.dispatch(&shell, &["sh", "-a", "backup.v2", "echo two"], "");
        h.dispatch(&shell, &["sh", "-a", "backup.v3", "echo three"], "");
        assert_eq!(std::fs::read_to_string(&v2).unwrap(), "echo two\n");
        assert_eq!(std::fs::read_to_string(&v3).unwrap(), "echo three\n");

        let (_, listing) = h.dispatch(&shell, &["sh", "-l"], "");
        assert!(listing.contains("backup.v2"));
        assert!(listing.contains("backup.v3"));

        h.dispatch(&shell, &["sh", "-d", "backup.v2"], "y\n");
        assert!(!v2.exists());
        assert!(v3.exists());
    }

    #[test]
    fn missing_command_is_a_hint() {
        let mut h = Harness::new();
        let shell = Shell::new(&h.workspace()).unwrap();
        let (outcome, out) = h.dispatch(&shell, &["sh", "-c"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("usage: -c <cmd>"));
    }

    #[test]
    fn deleting_unknown_schedule_fails() {
        let mut h = Harness::new();
        let shell = Shell::new(&h.workspace()).unwrap();
        let (outcome, out) = h.dispatch(&shell, &["sh", "-d", "ghost"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("schedule \"ghost\" doesn't exist"));
    }

    #[test]
    fn help_lists_schedule_flags() {
        let shell = Shell::new(&Harness::new().workspace()).unwrap();
        let help = shell.render_help();
        assert!(help.contains("-a, --add <schedule> <cmd>"));
        assert!(help.contains("- stops at the first command that fails"));
    }

    #[cfg(unix)]
    #[test]
    fn bare_words_run_as_a_command() {
        let mut h = Harness::new();
        let marker = h.dir.path().join("marker");
        let shell = Shell::new(&h.workspace()).unwrap();
        let (outcome, out) = h.dispatch(&shell, &["sh", "touch", marker.to_str().unwrap()], "");
        assert_eq!(outcome, Outcome::Handled, "{out}");
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_reported() {
        let mut h = Harness::new();
        let shell = Shell::new(&h.workspace()).unwrap();
        let (outcome, out) = h.dispatch(&shell, &["sh", "-c", "exit", "4"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("exited with status 4"));
    }

    #[cfg(unix)]
    #[test]
    fn schedules_are_added_listed_run_and_deleted() {
        let mut h = Harness::new();
        let log = h.dir.path().join("log.txt");
        let log = log.to_str().unwrap();
        let shell = Shell::new(&h.workspace()).unwrap();

        let first = format!("echo one >> {log}");
        let second = format!("echo two >> {log}");
        assert!(h.dispatch(&shell, &["sh", "-a", "daily", &first], "").0.is_success());
        assert!(h.dispatch(&shell, &["sh", "--add", "daily", &second], "").0.is_success());

        let (_, listing) = h.dispatch(&shell, &["sh", "-l"], "");
        assert!(listing.contains("daily"));
        assert!(listing.lines().any(|l| l.trim_end().ends_with('2')));

        let (outcome, out) = h.dispatch(&shell, &["sh", "-r", "daily"], "");
        assert_eq!(outcome, Outcome::Handled, "{out}");
        assert_eq!(std::fs::read_to_string(log).unwrap(), "one\ntwo\n");

        let (outcome, _) = h.dispatch(&shell, &["sh", "-d", "daily"], "n\n");
        assert_eq!(outcome, Outcome::Handled);
        assert!(shell.schedule_path("daily").exists());
        h.dispatch(&shell, &["sh", "-d", "daily"], "y\n");
        assert!(!shell.schedule_path("daily").exists());
    }

    #[cfg(unix)]
    #[test]
    fn schedule_stops_at_first_failure() {
        let mut h = Harness::new();
        let log = h.dir.path().join("log.txt");
        let log = log.to_str().unwrap();
        let shell = Shell::new(&h.workspace()).unwrap();
        h.dispatch(&shell, &["sh", "-a", "broken", "false"], "");
        h.dispatch(&shell, &["sh", "-a", "broken", &format!("echo late >> {log}")], "");
        let (outcome, _) = h.dispatch(&shell, &["sh", "-r", "broken"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(!std::path::Path::new(log).exists());
    }
}
