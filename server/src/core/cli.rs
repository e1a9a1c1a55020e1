use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DEBUG, ENV_DEFAULT_PER_PAGE, ENV_HOST, ENV_MAX_PER_PAGE, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "pqviewer")]
#[command(version, about = "Parquet viewer query service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (verbose logging)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Rows per page when the request does not specify perPage
    #[arg(long, global = true, env = ENV_DEFAULT_PER_PAGE)]
    pub default_per_page: Option<u64>,

    /// Largest perPage a request may ask for
    #[arg(long, global = true, env = ENV_MAX_PER_PAGE)]
    pub max_per_page: Option<u64>,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Compile filters into a query and print it as JSON
    Compile {
        /// Table (dataset) name
        #[arg(long, short = 't')]
        table: String,

        /// Filter list as JSON, `-` to read from stdin, `@path` to read a file
        #[arg(long, short = 'f')]
        filters: Option<String>,

        /// 1-based page number; pagination is only applied when given
        #[arg(long)]
        page: Option<u64>,

        /// Rows per page (defaults to the configured preview size)
        #[arg(long)]
        per_page: Option<u64>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub default_per_page: Option<u64>,
    pub max_per_page: Option<u64>,
}

impl From<Cli> for (CliConfig, Option<Commands>) {
    fn from(cli: Cli) -> Self {
        let config = CliConfig {
            host: cli.host,
            port: cli.port,
            debug: cli.debug,
            config: cli.config,
            default_per_page: cli.default_per_page,
            max_per_page: cli.max_per_page,
        };
        (config, cli.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    Cli::parse().into()
}
