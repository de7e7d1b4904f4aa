//! Command line interface.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "execution-provider")]
#[command(about = "Off-chain execution provider: ingest tasks, run them, report results")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "./config.json")]
    pub config_path: PathBuf,

    #[command(subcommand)]
    pub role: Role,
}

/// The process role. Each role runs in its own process.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Tail the chain, track finality and create execution tasks
    Ingestor,
    /// Execute Created tasks in the sandbox
    Runner,
    /// Submit Executed task results on-chain
    Reporter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Ingestor => "ingestor",
            Role::Runner => "runner",
            Role::Reporter => "reporter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
