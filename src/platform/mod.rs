pub fn platform() -> &'static dyn PlatformOps {
    &ConcretePlatform
}

use std::process::Command;

pub trait PlatformOps: Sync + Send {
    /// Program and flag that run one command line, e.g. `sh -c`.
    fn shell(&self) -> (&'static str, &'static str);
    fn clear_program(&self) -> &'static str;

    fn shell_command(&self, line: &str) -> Command {
        let (program, flag) = self.shell();
        let mut cmd = Command::new(program);
        cmd.arg(flag).arg(line);
        cmd
    }

    fn clear_screen(&self) {
        // Cosmetic; a missing `clear` must not stop a tool.
        if let Err(e) = Command::new(self.clear_program()).status() {
            log::debug!("clearing the screen failed: {e}");
        }
    }
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UNIX_PLATFORM as ConcretePlatform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WINDOWS_PLATFORM as ConcretePlatform;
