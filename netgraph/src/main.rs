use colored::Colorize;
use commands::command_argument_builder;
use netgraph::handlers::{handle_load, handle_search};
use tracing_subscriber::EnvFilter;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();

    init_tracing(chosen_command.get_count("verbose"));

    if !chosen_command.get_flag("quiet") {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("load", primary_command)) => handle_load(primary_command).await,
        Some(("search", primary_command)) => handle_search(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

/// `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_banner() {
    println!(
        "{} {}",
        "netgraph".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
