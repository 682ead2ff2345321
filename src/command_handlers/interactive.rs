use crate::args::split_line;
use crate::command_handlers::settings;
use crate::console::{color, Console, Icon};
use crate::registry::Registry;
use crate::session::Session;
use crate::tool::{Outcome, Tool};
use crate::{APP_NAME, APP_VERSION};
use std::io;

const SPLASH: [&str; 6] = [
    r" _              _    __  __",
    r"| |            | |  |  \/  |",
    r"| |_ ___   ___ | | _|_\  / | __ _ _ __   __ _  __ _  ___ _ __",
    r"| __/ _ \ / _ \| |/ _/|\/| |/ _` | '_ \ / _` |/ _` |/ _ \ '__|",
    r"| || (_) | (_) | _\ \ |  | | (_| | | | | (_| | (_| |  __/ |",
    r" \__\___/ \___/|/___/_|  |_|\__,_|_| |_|\__,_|\__, |\___|_|",
];

/// Labels of the prompt commands that aren't tools, listing order.
const SETTINGS: &str = "(set)tings";
const VERSION: &str = "(ver)sion";
const HELP: &str = "(h)elp";
const QUIT: &str = "(q)uit";

pub fn render_splash(console: &Console<'_>) -> String {
    let logo = format!("{}{}", color::YELLOW, color::BOLD);
    let mut lines: Vec<String> = SPLASH
        .iter()
        .map(|row| format!("  {}", console.paint(&logo, row)))
        .collect();
    lines.push(format!(
        "     {}{}{}",
        console.paint(color::PURPLE, &format!("version: {APP_VERSION}")),
        " ".repeat(31usize.saturating_sub(APP_VERSION.len())),
        console.paint(&logo, "|___/"),
    ));
    lines.push(String::new());
    lines.join("\n")
}

/// Command labels: tools first, then the built-in commands.
pub fn render_commands(registry: &Registry, console: &Console<'_>) -> String {
    let mut screen = vec![" List of commands:".to_string(), String::new()];
    screen.extend(
        registry
            .iter()
            .map(|t| format!(" {}", console.paint(color::CYAN, t.invocation().label))),
    );
    screen.push(String::new());
    screen.extend(
        [SETTINGS, VERSION, HELP]
            .iter()
            .map(|l| format!(" {}", console.paint(color::YELLOW, l))),
    );
    screen.push(String::new());
    screen.push(format!(" {}", console.paint(color::RED, QUIT)));
    screen.push(String::new());
    screen.join("\n")
}

/// Announce and run a tool, then leave a blank line behind it.
pub fn launch(tool: &dyn Tool, session: &mut Session<'_>, args: &[String]) -> Outcome {
    session
        .console
        .notify(Icon::Play, format!("Starting \"{}\" ...", tool.name()));
    let outcome = tool.dispatch(session, args);
    log::debug!("{} finished: {outcome:?}", tool.name());
    session.console.blank();
    outcome
}

/// Prompt loop; returns when the user quits or the input closes.
pub fn run(registry: &Registry, session: &mut Session<'_>) -> io::Result<()> {
    if session.config.splash() {
        let splash = render_splash(&session.console);
        session.console.line(splash);
    }
    let commands = render_commands(registry, &session.console);
    session.console.line(&commands);

    loop {
        let prompt = format!("({})> ", session.console.paint(color::GREEN, APP_NAME));
        let Some(line) = session.console.prompt(&prompt)? else {
            session.console.blank();
            return Ok(());
        };
        let args = split_line(&line);
        let Some(first) = args.first() else {
            continue;
        };

        if let Some(tool) = registry.find(first) {
            launch(tool, session, &args);
            continue;
        }
        match first.as_str() {
            "settings" | "set" => settings::run(session)?,
            "version" | "ver" => session.console.line(format!(" {APP_NAME} {APP_VERSION}\n")),
            "help" | "h" => {
                let commands = render_commands(registry, &session.console);
                session.console.line(commands);
            }
            "quit" | "q" => return Ok(()),
            _ => session.console.warn("Unknown command !"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Property};
    use crate::tool::tests::Recorder;
    use std::io::Cursor;

    fn recorders() -> Registry {
        Registry::new(vec![Box::new(Recorder::new(true)) as Box<dyn Tool>])
    }

    fn session_run(input: &str, splash: bool) -> String {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::defaults(dir.path().join("config.json"));
        config.set(Property::Splash, if splash { "true" } else { "false" }).unwrap();
        let registry = recorders();
        let mut out = Vec::new();
        {
            let console = Console::new(Cursor::new(input.to_string()), &mut out, false);
            let mut session = Session::new(console, &mut config);
            run(&registry, &mut session).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn commands_list_tools_then_builtins() {
        let registry = recorders();
        let console = Console::new(Cursor::new(""), std::io::sink(), false);
        let text = render_commands(&registry, &console);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [" List of commands:", "", " (rec)order", "", " (set)tings", " (ver)sion", " (h)elp", "", " (q)uit"]
        );
    }

    #[test]
    fn splash_only_when_enabled() {
        let with = session_run("q\n", true);
        let without = session_run("q\n", false);
        assert!(with.contains("version: "));
        assert!(!without.contains("version: "));
    }

    #[test]
    fn tool_launch_is_framed() {
        let out = session_run("rec -v\nq\n", false);
        assert!(out.contains(" (>) - Starting \"Recorder\" ..."));
        assert!(out.contains(" Recorder 1.0\n\n"));
    }

    #[test]
    fn unknown_and_empty_lines() {
        let out = session_run("\n   \nbogus\nq\n", false);
        assert_eq!(out.matches("Unknown command !").count(), 1);
    }

    #[test]
    fn closed_input_ends_the_loop() {
        let out = session_run("ver\n", false);
        assert!(out.contains(&format!(" {APP_NAME} {APP_VERSION}")));
        assert!(out.ends_with("> \n"));
    }
}
