use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pgdb")]
#[command(author, version, about = "Inspect PostgreSQL databases using named connection profiles")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the connections file (default: ~/.pgdb.yaml)
    #[arg(short, long, global = true, env = "PGDB_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Connection profile to use instead of the default
    #[arg(short, long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List non-system schemas in the database
    Schemas,

    /// Show active connections grouped by user
    Connections,

    /// List database users
    Users,

    /// Report schema sizes, or table sizes within one schema
    Size {
        /// Restrict the report to tables in this schema
        schema: Option<String>,
    },

    /// Manage named connection profiles
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// List all configured connections
    List,

    /// Add a new connection
    Add,

    /// Edit an existing connection
    Edit {
        /// Connection name to edit
        name: String,
    },

    /// Remove a connection
    Remove {
        /// Connection name to remove
        name: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Set the default connection
    Use {
        /// Connection name to make the default
        name: String,
    },
}
