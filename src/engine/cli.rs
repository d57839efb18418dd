//! StudyGate CLI Module
//! Command-line interface for inspecting policies and checking decisions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatter;

#[derive(Parser, Debug)]
#[command(name = "studygate")]
#[command(author = "SIU Team")]
#[command(version)]
#[command(about = "Role and ownership based authorization for the English study platform", long_about = None)]
pub struct Cli {
    /// Directory holding studygate.config.json (defaults to current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (json for scripting)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// List every registered policy name
    Policies,

    /// Show the permissions granted to a role
    Permissions {
        /// Role name or numeric code
        role: String,
    },

    /// Evaluate a policy for a caller
    Check {
        /// Policy name, e.g. Permission.ReadCourse or AdminOnly
        #[arg(short, long)]
        policy: String,

        /// Role claim as issued (name or numeric code)
        #[arg(short, long)]
        role: Option<String>,

        /// Identity claim
        #[arg(short, long)]
        user_id: Option<String>,

        /// Owning user of the target resource
        #[arg(long)]
        owner_id: Option<String>,

        /// Creator of the target resource
        #[arg(long)]
        created_by: Option<String>,

        /// Treat the target as a resource even without ownership fields
        #[arg(long)]
        resource: bool,
    },

    /// Start the decision API server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Show recorded decisions
    Audit {
        /// Only decisions for this policy
        #[arg(short, long)]
        policy: Option<String>,

        /// Only denied decisions
        #[arg(long)]
        denied: bool,
    },
}

impl Cli {
    pub fn get_config_dir(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
