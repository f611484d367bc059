//! `wfs` - inspect workflow status catalogs from the command line

mod commands;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    let manifest = Arg::new("manifest")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Catalog manifest (YAML or TOML)");
    let category = Arg::new("category")
        .long("category")
        .short('c')
        .default_value("issue")
        .help("Work item category");
    let entity_type = Arg::new("type")
        .long("type")
        .short('t')
        .help("Entity type name (defaults to the first type of the category)");
    let role = Arg::new("role")
        .long("role")
        .short('r')
        .help("Role of the acting user");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("wfs")
        .version(wfs_engine::VERSION)
        .about("Workflow status catalog inspector")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("check")
                .about("Load a manifest and report configuration problems")
                .arg(manifest.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("init")
                .about("Show the type and status a new work item would start with")
                .arg(manifest.clone())
                .arg(category.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("next")
                .about("List the statuses a work item may move to")
                .arg(manifest.clone())
                .arg(category.clone())
                .arg(entity_type.clone())
                .arg(
                    Arg::new("status")
                        .long("status")
                        .short('s')
                        .help("Current status (omit for a new item)"),
                )
                .arg(role.clone())
                .arg(
                    Arg::new("picker")
                        .long("picker")
                        .action(ArgAction::SetTrue)
                        .help("Include the current status, in picker order"),
                )
                .arg(json),
        )
        .subcommand(
            Command::new("transition")
                .about("Check whether a status change is allowed")
                .arg(manifest)
                .arg(category)
                .arg(entity_type)
                .arg(Arg::new("from").long("from").help("Current status (omit for a new item)"))
                .arg(Arg::new("to").long("to").required(true).help("Requested status"))
                .arg(role),
        )
}

fn init_tracing(matches: &ArgMatches) {
    let default = match matches.get_count("verbose") {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if matches.get_flag("log-json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    init_tracing(&matches);

    match matches.subcommand() {
        Some(("check", args)) => commands::check(args),
        Some(("init", args)) => commands::init(args),
        Some(("next", args)) => commands::next(args),
        Some(("transition", args)) => commands::transition(args),
        _ => unreachable!("subcommand_required"),
    }
}
