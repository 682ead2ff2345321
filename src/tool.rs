//! The contract every tool implements: metadata, an argument table with
//! aligned handlers, and the dispatch/help/version behavior shared by all.

use crate::error::{ToolError, ToolInitError};
use crate::session::Session;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Width of the flag column in help output.
const FLAG_COLUMN: usize = 30;

pub type Handler<T> = fn(&T, &mut Session<'_>, &[String]) -> anyhow::Result<()>;

/// Tokens typed at the prompt to reach a tool, plus its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub primary: &'static str,
    pub alias: &'static str,
    pub label: &'static str,
}

impl Invocation {
    pub const fn new(primary: &'static str, alias: &'static str, label: &'static str) -> Self {
        Self {
            primary,
            alias,
            label,
        }
    }

    pub fn matches(&self, token: &str) -> bool {
        token == self.primary || (!self.alias.is_empty() && token == self.alias)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Plain(&'static str),
    /// Main line plus usage notes rendered as bullets.
    Detailed(&'static str, &'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub short: &'static str,
    pub long: &'static str,
    pub placeholder: &'static str,
    pub description: Description,
}

impl ArgSpec {
    pub const fn new(
        short: &'static str,
        long: &'static str,
        placeholder: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            short,
            long,
            placeholder,
            description: Description::Plain(description),
        }
    }

    pub const fn detailed(
        short: &'static str,
        long: &'static str,
        placeholder: &'static str,
        description: &'static str,
        notes: &'static [&'static str],
    ) -> Self {
        Self {
            short,
            long,
            placeholder,
            description: Description::Detailed(description, notes),
        }
    }

    pub fn accepts(&self, token: &str) -> bool {
        (!self.short.is_empty() && token == self.short) || (!self.long.is_empty() && token == self.long)
    }

    fn flags(&self) -> String {
        let flags = [self.short, self.long]
            .into_iter()
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if self.placeholder.is_empty() {
            flags
        } else {
            format!("{flags} {}", self.placeholder)
        }
    }
}

const HELP: ArgSpec = ArgSpec::new("-h", "--help", "", "Show the helper commands menu");
const VERSION: ArgSpec = ArgSpec::new("-v", "--version", "", "Show version of tool");

/// Result of one dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    /// No selector and no fallback; guidance was printed.
    NoArgument,
    UnknownArgument(String),
    /// The handler returned an error or panicked; it was reported.
    Failed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Handled)
    }
}

/// Static shape of a tool with the shared default behavior.
pub struct Descriptor<T> {
    name: &'static str,
    version: &'static str,
    invocation: Invocation,
    entries: Vec<ArgSpec>,
    handlers: Vec<Handler<T>>,
    fallback: Option<Handler<T>>,
}

impl<T: ToolImpl> Descriptor<T> {
    /// Validate the metadata and append the built-in help/version entries.
    pub fn new(
        name: &'static str,
        version: &'static str,
        invocation: Invocation,
        entries: Vec<ArgSpec>,
        handlers: Vec<Handler<T>>,
    ) -> Result<Self, ToolInitError> {
        let fail = |details: String| ToolInitError::new(if name.is_empty() { "<unnamed>" } else { name }, details);
        if name.is_empty() {
            return Err(fail("name must not be empty".into()));
        }
        if version.is_empty() {
            return Err(fail("version must not be empty".into()));
        }
        if invocation.primary.is_empty() {
            return Err(fail("command must not be empty".into()));
        }
        if entries.len() != handlers.len() {
            return Err(fail(format!(
                "{} argument(s) declared for {} handler(s)",
                entries.len(),
                handlers.len()
            )));
        }
        if let Some(pos) = entries.iter().position(|e| e.short.is_empty() && e.long.is_empty()) {
            return Err(fail(format!("argument #{} has no flag", pos + 1)));
        }

        let mut entries = entries;
        let mut handlers = handlers;
        entries.extend([HELP, VERSION]);
        handlers.extend([show_help::<T> as Handler<T>, show_version::<T> as Handler<T>]);
        Ok(Self {
            name,
            version,
            invocation,
            entries,
            handlers,
            fallback: None,
        })
    }

    /// Handler for selectors that match no entry; receives `args[1..]`.
    pub fn with_fallback(mut self, fallback: Handler<T>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn entries(&self) -> &[ArgSpec] {
        &self.entries
    }

    pub fn dispatch(&self, tool: &T, session: &mut Session<'_>, args: &[String]) -> Outcome {
        let Some(selector) = args.get(1) else {
            return match self.fallback {
                Some(fallback) => self.invoke(fallback, tool, session, &[]),
                None => {
                    session
                        .console
                        .line(" To see more of command type \"-h\" or \"--help\" on arguments");
                    Outcome::NoArgument
                }
            };
        };

        if let Some(pos) = self.entries.iter().position(|e| e.accepts(selector)) {
            log::debug!("{}: {selector} -> entry #{pos}", self.name);
            return self.invoke(self.handlers[pos], tool, session, &args[2..]);
        }
        match self.fallback {
            Some(fallback) => {
                log::debug!("{}: {selector} -> fallback", self.name);
                self.invoke(fallback, tool, session, &args[1..])
            }
            None => {
                session.console.warn(format!("Unknown argument \"{selector}\""));
                Outcome::UnknownArgument(selector.clone())
            }
        }
    }

    fn invoke(&self, handler: Handler<T>, tool: &T, session: &mut Session<'_>, args: &[String]) -> Outcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| handler(tool, session, args)));
        match result {
            Ok(Ok(())) => Outcome::Handled,
            Ok(Err(err)) => {
                match err.downcast_ref::<ToolError>() {
                    Some(ToolError::MissingArgument { usage }) => {
                        session.console.warn(format!("Missing argument, usage: {usage}"));
                        session.console.tips("Type \"-h\" or \"--help\" to see the arguments");
                    }
                    Some(known) => session.console.warn(known.to_string()),
                    None => session.console.warn(format!("{err:?}")),
                }
                log::warn!("{} handler failed: {err:#}", self.name);
                Outcome::Failed
            }
            Err(payload) => {
                session
                    .console
                    .error(format!("{} crashed: {}", self.name, panic_message(payload.as_ref())));
                Outcome::Failed
            }
        }
    }

    pub fn render_help(&self) -> String {
        let mut out = vec![
            format!(" {}", self.name),
            format!(" Launching: {} <arg>", self.invocation.primary),
            String::new(),
            " Arguments:".to_string(),
        ];
        let builtin_start = self.entries.len() - 2;
        for (i, entry) in self.entries.iter().enumerate() {
            if i == builtin_start && i > 0 {
                out.push(String::new());
            }
            let flags = entry.flags();
            let pad = " ".repeat(FLAG_COLUMN.saturating_sub(flags.len()).max(1));
            match &entry.description {
                Description::Plain(text) => out.push(format!(" {flags}{pad}{text}")),
                Description::Detailed(text, notes) => {
                    out.push(format!(" {flags}{pad}{text}"));
                    let indent = " ".repeat(FLAG_COLUMN + 1);
                    out.extend(notes.iter().map(|n| format!("{indent}  - {n}")));
                }
            }
        }
        out.join("\n")
    }

    pub fn render_version(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

fn show_help<T: ToolImpl>(tool: &T, session: &mut Session<'_>, _args: &[String]) -> anyhow::Result<()> {
    session.console.line(tool.descriptor().render_help());
    Ok(())
}

fn show_version<T: ToolImpl>(tool: &T, session: &mut Session<'_>, _args: &[String]) -> anyhow::Result<()> {
    session.console.line(format!(" {}", tool.descriptor().render_version()));
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Replace the default panic hook: a handler panic is reported by dispatch on
/// the console, so the raw trace only goes to the debug log.
pub fn quiet_panics() {
    panic::set_hook(Box::new(|info| log::debug!("{info}")));
}

/// Check a handler received at least `count` arguments.
pub fn require<'a>(args: &'a [String], count: usize, usage: &str) -> Result<&'a [String], ToolError> {
    if args.len() < count {
        return Err(ToolError::MissingArgument {
            usage: usage.to_string(),
        });
    }
    Ok(args)
}

/// Implemented by concrete tools; gives them the [`Tool`] behavior.
pub trait ToolImpl: Sized + 'static {
    fn descriptor(&self) -> &Descriptor<Self>;

    /// Directory the tool keeps its state in, if any.
    fn workspace(&self) -> Option<&Path> {
        None
    }
}

/// What the registry and front end see.
pub trait Tool {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn invocation(&self) -> &Invocation;
    fn workspace(&self) -> Option<&Path>;
    fn render_help(&self) -> String;
    fn render_version(&self) -> String;
    /// `args[0]` is the token that reached the tool.
    fn dispatch(&self, session: &mut Session<'_>, args: &[String]) -> Outcome;
}

impl<T: ToolImpl> Tool for T {
    fn name(&self) -> &str {
        self.descriptor().name()
    }

    fn version(&self) -> &str {
        self.descriptor().version()
    }

    fn invocation(&self) -> &Invocation {
        self.descriptor().invocation()
    }

    fn workspace(&self) -> Option<&Path> {
        ToolImpl::workspace(self)
    }

    fn render_help(&self) -> String {
        self.descriptor().render_help()
    }

    fn render_version(&self) -> String {
        self.descriptor().render_version()
    }

    fn dispatch(&self, session: &mut Session<'_>, args: &[String]) -> Outcome {
        self.descriptor().dispatch(self, session, args)
    }
}
