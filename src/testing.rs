//! Test harness: a temporary workspace, a config inside it and a scripted console.

use crate::config::{Config, CONFIG_FILE};
use crate::console::Console;
use crate::session::Session;
use crate::tool::{Outcome, Tool};
use crate::workspace::Workspace;
use std::io::Cursor;
use tempfile::TempDir;

pub(crate) struct Harness {
    pub dir: TempDir,
    pub config: Config,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::defaults(dir.path().join(CONFIG_FILE));
        Self { dir, config }
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.dir.path())
    }

    /// Dispatch `args` with `input` as the scripted stdin; returns the console text.
    pub fn dispatch(&mut self, tool: &dyn Tool, args: &[&str], input: &str) -> (Outcome, String) {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let outcome = {
            let console = Console::new(Cursor::new(input.to_string()), &mut out, false);
            let mut session = Session::new(console, &mut self.config);
            tool.dispatch(&mut session, &args)
        };
        (outcome, String::from_utf8(out).unwrap())
    }
}
