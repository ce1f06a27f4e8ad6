use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("rabbithole")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("rabbithole")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("ui").about("Launch the interactive search explorer"),
        )
        .subcommand(
            command!("serve")
                .about("Run the proxy API server (search and find-similar endpoints)")
                .arg(
                    arg!(--"host" <HOST>)
                        .required(false)
                        .help("Address to bind the server to")
                        .default_value("127.0.0.1"),
                )
                .arg(
                    arg!(-p --"port" <PORT>)
                        .required(false)
                        .help("Port to listen on (0 picks a free port)")
                        .value_parser(clap::value_parser!(u16))
                        .default_value("3030"),
                ),
        )
        .subcommand(
            command!("search")
                .about("Run a one-shot search and print the results")
                .arg(
                    arg!(<QUERY>)
                        .required(true)
                        .help("The search query"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print raw JSON instead of formatted results")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("similar")
                .about("Find content similar to a URL and print the results")
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("The URL to find similar content for"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print raw JSON instead of formatted results")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
