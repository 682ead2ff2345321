//! Built-in tools, in registration order.

mod matrix;
mod shell;
mod translator;
mod wifi;
mod wsl_builder;

pub use matrix::{Grid, Matrix};
pub use shell::Shell;
pub use translator::{Project, Translator};
pub use wifi::Wifi;
pub use wsl_builder::WslBuilder;

use crate::error::ToolInitError;
use crate::tool::Tool;
use crate::workspace::Workspace;

fn boxed<T: Tool + 'static>(tool: Result<T, ToolInitError>) -> Result<Box<dyn Tool>, ToolInitError> {
    tool.map(|t| Box::new(t) as Box<dyn Tool>)
}

pub fn builtin(workspace: &Workspace) -> Vec<Result<Box<dyn Tool>, ToolInitError>> {
    vec![
        boxed(Shell::new(workspace)),
        boxed(Matrix::new()),
        boxed(WslBuilder::new(workspace)),
        boxed(Translator::new(workspace)),
        boxed(Wifi::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Console;
    use crate::registry::Registry;
    use std::io::Cursor;

    #[test]
    fn every_builtin_registers() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let registry = {
            let mut console = Console::new(Cursor::new(""), &mut out, false);
            Registry::from_builders(builtin(&Workspace::new(dir.path())), &mut console)
        };
        assert!(out.is_empty());
        let names: Vec<_> = registry.iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["Shell", "Matrix", "WSLBuilder", "Translator", "Wifi"]);
        for token in ["sh", "mat", "wb", "tr", "wi", "translator", "wslbuilder"] {
            assert!(registry.find(token).is_some(), "{token}");
        }
    }
}
