// ABOUTME: Command-line front end standing in for the launcher UI
// ABOUTME: Wires logging, configuration and preference overrides into the query and connect events

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use ssh_launcher::app::{AppState, Message};
use ssh_launcher::config::Config;
use ssh_launcher::ssh::SystemProcessStarter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("ssh-launcher")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Pick an SSH host from ssh config and known_hosts and open a terminal on it")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file (defaults to the user config directory)")
                .global(true),
        )
        .arg(
            Arg::new("set")
                .short('s')
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override a launcher preference, e.g. ssh_launcher_use_known_hosts=False")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("query")
                .about("List hosts matching QUERY")
                .arg(Arg::new("query").help("Substring to filter host names by")),
        )
        .subcommand(
            Command::new("connect")
                .about("Open a terminal connected to HOST")
                .arg(Arg::new("host").required(true)),
        )
        .subcommand(Command::new("init-config").about("Write the default configuration file"))
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn config_path(matches: &ArgMatches) -> Result<PathBuf> {
    match matches.get_one::<String>("config") {
        Some(path) => Ok(PathBuf::from(path)),
        None => Config::default_config_path(),
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let path = config_path(matches)?;
    let mut config = Config::load_or_default(&path)?;

    for pair in matches.get_many::<String>("set").unwrap_or_default() {
        let (id, value) = pair
            .split_once('=')
            .with_context(|| format!("Preference override must look like KEY=VALUE: {pair}"))?;
        config = config.with_preference(id, value);
    }

    config.expand_paths()?;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("debug"));

    match matches.subcommand() {
        Some(("init-config", _)) => {
            let path = config_path(&matches)?;
            if path.exists() {
                anyhow::bail!("Configuration already exists: {}", path.display());
            }
            Config::save_default_config(&path)?;
            println!("Wrote {}", path.display());
        }

        Some(("query", sub)) => {
            let mut app = AppState::new(load_config(&matches)?, Box::new(SystemProcessStarter));
            app.update(Message::Query(sub.get_one::<String>("query").cloned()));
            for item in &app.results {
                println!("{}\t{}", item.name, item.description);
            }
        }

        Some(("connect", sub)) => {
            let host = sub
                .get_one::<String>("host")
                .context("Missing host to connect to")?;
            let mut app = AppState::new(load_config(&matches)?, Box::new(SystemProcessStarter));
            app.update(Message::Launch(host.clone()));
            if let Some(notification) = app.notification {
                anyhow::bail!(notification);
            }
        }

        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}
