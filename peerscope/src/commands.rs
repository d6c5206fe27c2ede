use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("peerscope")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("peerscope")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ...)
                .required(false)
                .help("Log discovery activity to stderr (-v info, -vv debug)")
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("explore")
                .about(
                    "Discover one or more instances and expand their peers level by level. \
                Prints a report of the resulting federation graph.",
                )
                .arg(
                    arg!([HOST] ...)
                        .required(false)
                        .help("Seed instances, as bare hosts or http(s) URLs"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed instances")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-d --"depth" <LEVELS>)
                        .required(false)
                        .help("Discovery levels; 1 only discovers the seeds")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM>)
                        .required(false)
                        .help("Instances queried at the same time")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("8"),
                )
                .arg(
                    arg!(--"max-expansions" <NUM>)
                        .required(false)
                        .help("Upper bound on instances queried during the whole run")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(
                    arg!(-x --"exclude" <PATTERN>)
                        .required(false)
                        .help("Regular expression; matching peers are never linked (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"no-default-exclusions")
                        .required(false)
                        .help("Do not apply the built-in exclusion list")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"timeout" <SECS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"plain-http")
                        .required(false)
                        .help("Query instances over plain HTTP (local test instances)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"seed" <SEED>)
                        .required(false)
                        .help("Fixed seed for colors and positions")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("inspect")
                .about("Show an instance's profile without adding it to any graph")
                .arg(
                    arg!(<HOST>)
                        .required(true)
                        .help("The instance to inspect"),
                )
                .arg(
                    arg!(--"timeout" <SECS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"plain-http")
                        .required(false)
                        .help("Query the instance over plain HTTP")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
