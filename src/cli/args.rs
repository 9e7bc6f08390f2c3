// Command line arguments

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// ATLES - truth-seeking guard for a locally hosted LLM
#[derive(Parser, Debug, Clone)]
#[command(name = "atles")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Truth-seeking guard for a locally hosted LLM")]
pub struct Cli {
    /// Config file (defaults to $ATLES_CONFIG or ~/.atles/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the truth guard on some text
    Check {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Guard a prompt, then forward it to the backend if it is clean
    Ask {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// Show the synonym expansion of words or phrases
    Expand {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Show normalized text
    Normalize {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flexible match: every --require concept must appear
    Flex {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Required concept (repeatable)
        #[arg(long = "require", required = true)]
        require: Vec<String>,

        /// Context concept; at least one must appear (repeatable)
        #[arg(long = "context")]
        context: Vec<String>,
    },

    /// Match a regex against normalized text
    Exact {
        /// Regular expression
        #[arg(long)]
        pattern: String,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List built-in scenarios and custom rules
    Scenarios,
}

/// Default tracing filter for a `-v` count
pub fn verbosity_filter(verbose: u8, debug_logging: bool) -> &'static str {
    if debug_logging {
        return "atles=debug";
    }
    match verbose {
        0 => "atles=warn",
        1 => "atles=info",
        2 => "atles=debug",
        _ => "atles=trace",
    }
}
