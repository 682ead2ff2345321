use crate::cli::Cli;
use crate::command_handlers::Status;
use crate::console::Icon;
use crate::ops;
use crate::platform::platform;
use crate::session::Session;
use std::process::Command;

/// Child invocation of this binary in interactive mode, keeping the paths
/// the parent was started with.
pub fn child_command(exe: &std::path::Path, cli: &Cli) -> Command {
    let mut cmd = Command::new(exe);
    if let Some(config) = &cli.config {
        cmd.arg("--config").arg(config);
    }
    if let Some(workspace) = &cli.workspace {
        cmd.arg("--workspace").arg(workspace);
    }
    cmd.env("TM_DEBUG", "1");
    cmd
}

/// Relaunch the interactive prompt until stdin closes or Ctrl-C.
pub fn relaunch_loop(cli: &Cli, session: &mut Session<'_>) -> Status {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            session.console.error(format!("Can't locate the running executable: {e}"));
            return Status::Failure;
        }
    };
    loop {
        platform().clear_screen();
        session.console.info("Launched in debug mode");
        match ops::run_status(&mut child_command(&exe, cli)) {
            Ok(0) => {}
            Ok(code) => session.console.warn(format!("Exited with status {code}")),
            Err(e) => session.console.warn(format!("{e:#}")),
        }
        let prompt = format!("{}Press enter to relaunch ...", session.console.icon(Icon::Info));
        match session.console.prompt(&prompt) {
            Ok(Some(_)) => continue,
            _ => {
                session.console.blank();
                return Status::Success;
            }
        }
    }
}
