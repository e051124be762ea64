use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use super::styles;

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// Aeris CLI - Derives VM parameters from an aeriscloud project
#[derive(Debug, Parser)]
#[command(name = "aeris", author, about, version, styles=styles::styles())]
pub struct AerisArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: Option<AerisSubcommand>,

    /// Project directory, discovered from the current directory when omitted
    #[arg(short, long, global = true, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Debug, Parser)]
pub enum AerisSubcommand {
    /// Print the parameters derived for each box
    #[command(name = "show")]
    Show {
        /// Only print this box
        #[arg(short, long = "box", value_name = "NAME")]
        box_name: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Print the resolved host mounts
    #[command(name = "mounts")]
    Mounts,

    /// Sync the project directory into a box
    #[command(name = "sync")]
    Sync {
        /// The box to sync, the primary box when omitted
        #[arg(short, long = "box", value_name = "NAME")]
        box_name: Option<String>,
    },

    /// Print the environment snapshot
    #[command(name = "env")]
    Env,
}

/// How structured output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML
    Yaml,

    /// JSON
    Json,
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
