use crate::args::{split_line, unquote};
use crate::config::{Encoding, Property};
use crate::console::color;
use crate::session::Session;
use crate::APP_NAME;
use std::io;

fn render_help() -> String {
    let encodings: Vec<_> = Encoding::ACCEPTED.iter().map(|e| e.as_str()).collect();
    [
        " Settings commands:".to_string(),
        String::new(),
        " (s)et <property> <value>      Change and save a property".to_string(),
        " (g)et <property>              Show a property".to_string(),
        " (h)elp                        Show this menu".to_string(),
        " (b)ack                        Return to the main prompt".to_string(),
        String::new(),
        " Properties:".to_string(),
        format!(" encoding                      {}", encodings.join(", ")),
        " splash                        true, false".to_string(),
        " colors                        true, false".to_string(),
        String::new(),
    ]
    .join("\n")
}

/// Set one property and report it. Shared by the settings prompt and `--set`.
pub fn apply_set(session: &mut Session<'_>, property: Option<&str>, value: Option<&str>) -> bool {
    let (Some(property), Some(value)) = (property, value) else {
        session.console.warn("No value was entered !");
        return false;
    };
    let value = unquote(value);
    let result = property
        .parse::<Property>()
        .and_then(|p| session.config.set(p, value).map(|()| p));
    match result {
        Ok(property) => {
            if property == Property::Colors {
                let enabled = session.config.colors();
                session.console.set_colors(enabled);
            }
            log::info!("{} set to {value}", property.key());
            session.console.info(format!("{value} is applied"));
            true
        }
        Err(e) => {
            session.console.warn(e.to_string());
            session.console.warn(format!("{value} is not applied"));
            false
        }
    }
}

/// Print one property. Shared by the settings prompt and `--get`.
pub fn show_get(session: &mut Session<'_>, property: Option<&str>) -> bool {
    let Some(property) = property else {
        session.console.warn("No property was entered !");
        return false;
    };
    match property.parse::<Property>() {
        Ok(p) => {
            let value = session.config.get(p);
            session.console.line(format!(" {value}"));
            true
        }
        Err(e) => {
            session.console.warn(e.to_string());
            false
        }
    }
}

/// Settings prompt; returns on `back` or closed input.
pub fn run(session: &mut Session<'_>) -> io::Result<()> {
    loop {
        let prompt = format!(
            "({})[{}]> ",
            session.console.paint(color::GREEN, APP_NAME),
            session.console.paint(color::PURPLE, "settings")
        );
        let Some(line) = session.console.prompt(&prompt)? else {
            return Ok(());
        };
        let args = split_line(&line);
        let Some(first) = args.first() else {
            continue;
        };
        let property = args.get(1).map(String::as_str);
        match first.as_str() {
            "set" | "s" => {
                apply_set(session, property, args.get(2).map(String::as_str));
            }
            "get" | "g" => {
                show_get(session, property);
            }
            "help" | "h" => session.console.line(render_help()),
            "back" | "b" => return Ok(()),
            _ => session.console.warn("Unknown command !"),
        }
    }
}
