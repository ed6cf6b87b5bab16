//! Transform actor - batch and standby text transformation over an
//! actor-hosting platform, with publish and agent-scaffold companions.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use transform_actor::{
    actor,
    agent_builder::{self, ScaffoldOptions},
    ai::HttpAi,
    cli::{Cli, Command},
    config::Config,
    mode,
    platform::PlatformClient,
    publish::{self, PublishOptions},
    setup_tracing,
    transform::Engine,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Local .env files carry the platform token in development
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Command::Publish { dir, name, version }) => {
            run_publish(&config, dir, name, version).await
        }
        Some(Command::Agent { prompt, name, dir }) => run_agent(&config, prompt, name, dir).await,
        Some(Command::Run { input }) => run_actor(config, input).await,
        None => run_actor(config, None).await,
    }
}

/// Load configuration and apply CLI overrides
fn load_config(cli: &Cli) -> transform_actor::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    Ok(config)
}

/// Run the actor in the environment-selected mode
async fn run_actor(config: Config, input: Option<PathBuf>) -> ExitCode {
    let engine = match HttpAi::from_config(&config.ai) {
        Ok(Some(ai)) => Engine::with_ai(std::sync::Arc::new(ai)),
        Ok(None) => Engine::new(),
        Err(e) => {
            error!("Failed to build AI client: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?mode::Mode::detect(),
        "Starting transform actor"
    );

    if let Err(e) = actor::run(config, engine, input).await {
        error!("Actor run failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Upload a source directory and wait for its build
async fn run_publish(config: &Config, dir: PathBuf, name: String, version: String) -> ExitCode {
    let platform = match PlatformClient::init(&config.platform) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to open platform session: {e}");
            return ExitCode::FAILURE;
        }
    };

    let opts = PublishOptions { name, version };
    match publish::publish_directory(&platform, &dir, &opts, &config.publish).await {
        Ok(build_id) => {
            platform.exit("succeeded");
            println!("Build {build_id} succeeded");
            ExitCode::SUCCESS
        }
        Err(e) => {
            platform.exit("failed");
            error!("Publish failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Scaffold a new actor project with the external agent, then publish it
async fn run_agent(
    config: &Config,
    prompt: String,
    name: String,
    dir: Option<PathBuf>,
) -> ExitCode {
    let dir = dir.unwrap_or_else(|| std::env::temp_dir().join(&name));
    let opts = ScaffoldOptions { prompt, name, dir };

    match agent_builder::build_actor(config, &opts).await {
        Ok(()) => {
            println!("Actor {} published from {}", opts.name, opts.dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Agent build failed: {e}");
            ExitCode::FAILURE
        }
    }
}
