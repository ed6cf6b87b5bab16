//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Transform actor - text transformation pipeline with batch and standby modes
#[derive(Parser, Debug)]
#[command(name = "transform-actor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "ACTOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Port to listen on in standby mode
    #[arg(short, long, env = "ACTOR_PORT")]
    pub port: Option<u16>,

    /// Host to bind to in standby mode
    #[arg(long, env = "ACTOR_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ACTOR_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "ACTOR_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand (optional - defaults to actor run mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the actor (default). Mode is picked from the environment:
    /// standby serves HTTP, standard runs the pipeline once and exits.
    Run {
        /// Path to the batch input JSON (standard mode only).
        /// Falls back to the local key-value store's INPUT.json.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Upload a source directory to the platform and build it
    Publish {
        /// Directory containing the actor source tree
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Actor name on the platform
        #[arg(short, long)]
        name: String,

        /// Version number to create or update
        #[arg(short, long, default_value = "0.1")]
        version: String,
    },

    /// Scaffold a new actor project with an external code-generation
    /// agent, then publish it
    Agent {
        /// Natural-language description of the actor to build
        #[arg(required = true)]
        prompt: String,

        /// Name for the generated actor
        #[arg(short, long)]
        name: String,

        /// Scratch directory for the generated project
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}
