use clap::{command, Parser};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = r###"
Sluice is a server-side relay for the DeepSeek chat completions API. It sits between a browser or app frontend and DeepSeek so the API key stays on the server and never ships to the client.

- Inject: the configured API key is added to every forwarded request.
- History Optimization: older conversation turns are dropped before forwarding, keeping all system instructions and only the most recent exchanges.
- Retry: a 502 from DeepSeek triggers exactly one retry with a smaller token budget and a shorter timeout.
- Pass-through: everything else DeepSeek returns is relayed to the caller unchanged, status code included.
"###
)]
pub struct Args {
    #[command(subcommand)]
    pub subcmd: Option<SubCommands>
}

#[derive(Parser, Debug)]
pub enum SubCommands {
    Start(StartSubCommand),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Start the Sluice relay", long_about = None)]
pub struct StartSubCommand {
}
