//! Command-line definitions

use clap::{Args, Parser, Subcommand};

/// Default server URL for remote commands
pub const DEFAULT_URL: &str = "http://localhost:3000";

/// simbin CLI
#[derive(Debug, Parser)]
#[command(name = "simbin-cli")]
#[command(author, version, about = "Resilience simulation CLI", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Scenario selection shared by local and remote runs
#[derive(Debug, Clone, Args)]
pub struct ScenarioArgs {
    /// Scenario kind (latency, failure, rate_limit, circuit, cascade, stress)
    pub kind: String,

    /// Scenario parameter as name=value (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// How many times to run the scenario
    #[arg(short = 'n', long, default_value_t = 1)]
    pub repeat: u32,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a scenario in-process and print each outcome as JSON
    ///
    /// Example: simbin-cli run rate_limit -p limit=2 -p window_ms=1000 -n 3 --seed 7
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Engine key for per-key state
        #[arg(short, long, default_value = "anonymous")]
        key: String,

        /// Seed for reproducible runs
        #[arg(long, env = "SIMBIN_SEED")]
        seed: Option<u64>,
    },

    /// Post a scenario to a running server
    Remote {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Engine key; the server defaults to its anonymous key
        #[arg(short, long)]
        key: Option<String>,

        /// Server URL
        #[arg(short, long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Check server health
    Status {
        /// Server URL
        #[arg(short, long, default_value = DEFAULT_URL)]
        url: String,
    },
}

/// Parse a `name=value` pair
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Determine log filter level from verbosity count
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Format endpoint URL
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}
