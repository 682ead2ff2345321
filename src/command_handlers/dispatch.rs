use crate::cli::{Action, Cli};
use crate::command_handlers::{debug, interactive, settings, Status};
use crate::registry::Registry;
use crate::session::Session;
use crate::{APP_NAME, APP_VERSION};

/// Run the single action selected on the command line.
pub fn dispatch(cli: &Cli, registry: &Registry, session: &mut Session<'_>) -> Status {
    match cli.action() {
        Action::Interactive => match interactive::run(registry, session) {
            Ok(()) => Status::Success,
            Err(e) => {
                log::warn!("interactive loop stopped: {e}");
                Status::Failure
            }
        },
        Action::List => {
            let listing = registry.render_listing(&session.console);
            session.console.line(listing);
            Status::Success
        }
        Action::Tool(args) => run_tool(registry, session, &args),
        Action::Set { property, value } => {
            Status::from_bool(settings::apply_set(session, Some(&property), Some(&value)))
        }
        Action::Get(property) => Status::from_bool(settings::show_get(session, Some(&property))),
        Action::Debug => debug::relaunch_loop(cli, session),
        Action::Version => {
            session.console.line(format!(" {APP_NAME} {APP_VERSION}"));
            Status::Success
        }
    }
}

fn run_tool(registry: &Registry, session: &mut Session<'_>, args: &[String]) -> Status {
    let Some(token) = args.first() else {
        session.console.warn("No tool was entered !");
        return Status::Failure;
    };
    match registry.find(token) {
        Some(tool) => Status::from_bool(interactive::launch(tool, session, args).is_success()),
        None => {
            session.console.warn(format!("Unknown tool \"{token}\""));
            session.console.tips("Type \"-l\" or \"--list\" to see the available tools");
            Status::Failure
        }
    }
}
