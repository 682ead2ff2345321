use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Launch a tool directly, change a setting, or start the interactive prompt
/// when no action is given.
#[derive(Parser, Debug)]
#[command(
    name = "tm",
    about = "toolsManager: a shelf of small tools behind one prompt",
    disable_version_flag = true,
    group(ArgGroup::new("action").args(["list", "tool", "set", "get", "debug", "version"]))
)]
pub struct Cli {
    /// List the available tools
    #[arg(short, long)]
    pub list: bool,

    /// Run a tool: -t <TOOL> [ARGS...]
    #[arg(
        short,
        long,
        value_name = "TOOL",
        num_args = 1..,
        allow_hyphen_values = true
    )]
    pub tool: Option<Vec<String>>,

    /// Set a config property: -s <PROPERTY> <VALUE>
    #[arg(short, long, num_args = 2, value_names = ["PROPERTY", "VALUE"])]
    pub set: Option<Vec<String>>,

    /// Print a config property
    #[arg(short, long, value_name = "PROPERTY")]
    pub get: Option<String>,

    /// Relaunch the interactive prompt after each exit
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Print the version
    #[arg(short, long)]
    pub version: bool,

    /// Path to config (defaults to ./config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory tools keep their files in (defaults to the working directory)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
}

/// Which front end to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Interactive,
    List,
    Tool(Vec<String>),
    Set { property: String, value: String },
    Get(String),
    Debug,
    Version,
}

impl Cli {
    pub fn action(&self) -> Action {
        if self.list {
            Action::List
        } else if let Some(args) = &self.tool {
            Action::Tool(args.clone())
        } else if let Some([property, value]) = self.set.as_deref() {
            Action::Set {
                property: property.clone(),
                value: value.clone(),
            }
        } else if let Some(property) = &self.get {
            Action::Get(property.clone())
        } else if self.debug {
            Action::Debug
        } else if self.version {
            Action::Version
        } else {
            Action::Interactive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tm").chain(args.iter().copied()))
    }

    #[test]
    fn no_arguments_is_interactive() {
        assert_eq!(parse(&[]).unwrap().action(), Action::Interactive);
    }

    #[test]
    fn tool_keeps_its_own_flags() {
        let cli = parse(&["-t", "sh", "-c", "echo", "hi"]).unwrap();
        assert_eq!(cli.action(), Action::Tool(vec!["sh".into(), "-c".into(), "echo".into(), "hi".into()]));
    }

    #[test]
    fn set_takes_property_and_value() {
        let cli = parse(&["--set", "encoding", "utf-16"]).unwrap();
        assert_eq!(
            cli.action(),
            Action::Set {
                property: "encoding".into(),
                value: "utf-16".into()
            }
        );
        assert!(parse(&["-s", "encoding"]).is_err());
    }

    #[test]
    fn actions_are_exclusive() {
        assert!(parse(&["-l", "-v"]).is_err());
        assert!(parse(&["-g", "splash", "-D"]).is_err());
    }

    #[test]
    fn paths_combine_with_any_action() {
        let cli = parse(&["--config", "alt.json", "--workspace", "ws", "-g", "colors"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("alt.json")));
        assert_eq!(cli.action(), Action::Get("colors".into()));
    }

    #[test]
    fn debug_and_version_flags() {
        assert_eq!(parse(&["-D"]).unwrap().action(), Action::Debug);
        assert_eq!(parse(&["--version"]).unwrap().action(), Action::Version);
    }
}
