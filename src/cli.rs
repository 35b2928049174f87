use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "shard-firsts",
    version,
    about = "Search and render RIFT shard firsts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Serve(ServeArgs),
    Search(SearchArgs),
    Status(StatusArgs),
    InitDb(InitDbArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "FIRSTS_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Overrides `listen` from the configuration file.
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long, env = "FIRSTS_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    #[arg(long, default_value = "")]
    pub player: String,

    #[arg(long, default_value = "")]
    pub guild: String,

    #[arg(long, default_value = "All")]
    pub shard: String,

    #[arg(long, default_value = "All")]
    pub kind: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, env = "FIRSTS_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct InitDbArgs {
    #[arg(long, env = "FIRSTS_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,
}
