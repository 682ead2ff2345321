use clap::Parser;
use env_logger::Env;
use std::process::ExitCode;
use toolsmanager::cli::Cli;
use toolsmanager::command_handlers::dispatch;
use toolsmanager::config::{Config, CONFIG_FILE};
use toolsmanager::console::Console;
use toolsmanager::interrupt;
use toolsmanager::registry::Registry;
use toolsmanager::session::Session;
use toolsmanager::tool;
use toolsmanager::tools;
use toolsmanager::workspace::Workspace;

fn init_logging() {
    let default = match std::env::var("TM_DEBUG") {
        Ok(v) if v == "1" => "debug",
        _ => "warn",
    };
    env_logger::Builder::from_env(Env::new().filter_or("TM_LOG", default)).init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = interrupt::install() {
        log::warn!("Ctrl-C handler not installed: {e}");
    }
    tool::quiet_panics();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("tm: working directory unavailable: {e}");
            return ExitCode::from(2);
        }
    };
    let config_path = cli.config.clone().unwrap_or_else(|| cwd.join(CONFIG_FILE));
    let workspace = Workspace::new(cli.workspace.clone().unwrap_or(cwd));

    let (mut config, load_error) = match Config::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::defaults(config_path.clone()), Some(e)),
    };
    let mut console = Console::stdio(config.colors());
    if let Some(e) = load_error {
        log::warn!("{e}");
        console.warn(format!("{e}, default settings are used"));
    }

    let registry = Registry::from_builders(tools::builtin(&workspace), &mut console);
    log::debug!("{} tool(s) registered", registry.len());
    let mut session = Session::new(console, &mut config);
    dispatch::dispatch(&cli, &registry, &mut session).into()
}
