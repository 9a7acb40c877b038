//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// linktrace - short links with client/server visit correlation
#[derive(Parser)]
#[command(name = "linktrace")]
#[command(version)]
#[command(about = "A URL shortener that correlates visits with a client fingerprint", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Add a short link
    ///
    /// Usage: add [SHORT_CODE] <TARGET_URL>
    /// - If only URL provided, generates random short code
    /// - If both provided, uses specified short code
    Add {
        /// Positional args: [short_code] <target_url>
        #[arg(required = true, num_args = 1..=2)]
        args: Vec<String>,
    },

    /// Visit a short link as a native client and report the correlation
    Visit {
        /// Full short link URL, e.g. http://127.0.0.1:8080/abc123
        url: String,

        /// How long to wait for the payload delivery after navigating
        #[arg(long, default_value_t = 3000)]
        wait_ms: u64,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a sample configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,
    },
}

impl Commands {
    /// Server-side commands log at the configured level; the rest stay quiet
    pub fn is_server(&self) -> bool {
        matches!(self, Commands::Serve)
    }
}
