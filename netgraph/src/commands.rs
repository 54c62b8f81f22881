use crate::CLAP_STYLING;
use clap::{ArgAction, arg, command};
use netgraph_core::processors;
use url::Url;

/// Options shared by every subcommand that builds a graph.
fn graph_arguments(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-c --"config" <PATH>)
            .required(false)
            .help("JSON config file, e.g. {\"metadata\": true, \"worker\": \"prune\"}")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
    .arg(
        arg!(-m --"metadata")
            .required(false)
            .help("Show node and link counters after each update")
            .action(ArgAction::SetTrue),
    )
    .arg(
        arg!(-w --"worker" <NAME>)
            .required(false)
            .help("Process new data in a background worker before publishing")
            .value_parser(processors::BUILTIN_NAMES.to_vec()),
    )
    .arg(
        arg!(--"max-nodes" <NUM>)
            .required(false)
            .help("Maximum number of nodes to list per render")
            .value_parser(clap::value_parser!(usize))
            .default_value("20"),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("netgraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("netgraph")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v debug, -vv trace)")
                .required(false)
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(graph_arguments(
            command!("load")
                .about("Load a topology from a URL, file or file:// URL and render it")
                .arg(
                    arg!(<SOURCE>)
                        .required(true)
                        .help("http(s) URL, file:// URL or path of a NetJSON document"),
                ),
        ))
        .subcommand(graph_arguments(
            command!("search")
                .about(
                    "Interactive search session. Each term fetches <BASE_URL><term>; \
                :back and :forward walk the search history.",
                )
                .arg(
                    arg!(-u --"base-url" <URL>)
                        .required(true)
                        .help("Prefix the search term is appended to")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-i --"initial" <SOURCE>)
                        .required(false)
                        .help("Topology to load before the first search"),
                ),
        ))
}
