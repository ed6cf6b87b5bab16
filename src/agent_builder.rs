//! Agent-builder companion
//!
//! Drives an external code-generation agent CLI to scaffold a complete
//! actor project from a natural-language prompt, verifies the fixed file
//! checklist, installs dependencies, and hands the directory to the
//! publish flow. Every step is one attempt; the first failure ends the
//! run with the triggering context.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use crate::config::Config;
use crate::platform::PlatformClient;
use crate::publish::{self, PublishOptions};
use crate::{Error, Result};

/// Files the generated project must contain, checked in this order
pub const REQUIRED_FILES: [&str; 6] = [
    ".actor/actor.json",
    ".actor/input_schema.json",
    "package.json",
    "main.js",
    "Dockerfile",
    "README.md",
];

/// What to scaffold
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    /// Natural-language description of the actor
    pub prompt: String,
    /// Name for the generated actor
    pub name: String,
    /// Scratch directory for the generated project
    pub dir: PathBuf,
}

/// Scaffold, verify, install, and publish a new actor project
pub async fn build_actor(config: &Config, opts: &ScaffoldOptions) -> Result<()> {
    // Publishing needs the platform; fail before spending agent time.
    let platform = PlatformClient::init(&config.platform)?;

    tokio::fs::create_dir_all(&opts.dir).await?;
    run_agent(config, opts).await?;
    verify_required_files(&opts.dir)?;
    install_dependencies(config, &opts.dir).await?;

    let publish_opts = PublishOptions {
        name: opts.name.clone(),
        version: "0.1".to_string(),
    };
    let outcome =
        publish::publish_directory(&platform, &opts.dir, &publish_opts, &config.publish).await;
    match &outcome {
        Ok(build_id) => {
            info!(actor = %opts.name, build = %build_id, "Actor scaffolded and published");
            platform.exit("succeeded");
        }
        Err(_) => platform.exit("failed"),
    }
    outcome.map(|_| ())
}

/// Run the configured code-generation agent in the scratch directory
async fn run_agent(config: &Config, opts: &ScaffoldOptions) -> Result<()> {
    let prompt = compose_prompt(opts);
    info!(
        command = %config.agent.command,
        dir = %opts.dir.display(),
        "Running code-generation agent"
    );

    let output = Command::new(&config.agent.command)
        .args(&config.agent.args)
        .arg(&prompt)
        .current_dir(&opts.dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::Scaffold(format!("cannot run {}: {e}", config.agent.command)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Scaffold(format!(
            "{} exited with {}: {}",
            config.agent.command,
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// The scaffold prompt handed to the agent: the user's description plus
/// the non-negotiable file checklist.
fn compose_prompt(opts: &ScaffoldOptions) -> String {
    format!(
        "Create a complete actor project named \"{}\" in the current directory.\n\
         \n\
         What the actor should do:\n{}\n\
         \n\
         The project must contain every one of these files:\n{}\n\
         Use plain Node.js without a build step. Do not create any other\n\
         top-level directories.",
        opts.name,
        opts.prompt,
        REQUIRED_FILES
            .iter()
            .map(|f| format!("  - {f}"))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Hard check of the fixed checklist; the first missing file fails the run
pub fn verify_required_files(dir: &Path) -> Result<()> {
    for required in REQUIRED_FILES {
        let path = dir.join(required);
        if !path.is_file() {
            return Err(Error::MissingFile(required.to_string()));
        }
    }
    info!(dir = %dir.display(), "Scaffold checklist verified");
    Ok(())
}

/// Install dependencies inside the generated project
async fn install_dependencies(config: &Config, dir: &Path) -> Result<()> {
    info!(command = %config.agent.install_command, "Installing dependencies");

    let output = Command::new(&config.agent.install_command)
        .args(&config.agent.install_args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            Error::Scaffold(format!("cannot run {}: {e}", config.agent.install_command))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(status = %output.status, "Dependency install failed");
        return Err(Error::Scaffold(format!(
            "{} exited with {}: {}",
            config.agent.install_command,
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn checklist_names_the_first_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_required_files(dir.path()).unwrap_err();
        assert!(matches!(err, Error::MissingFile(ref f) if f == ".actor/actor.json"));
    }

    #[test]
    fn complete_scaffold_passes_the_checklist() {
        let dir = tempfile::tempdir().unwrap();
        for required in REQUIRED_FILES {
            let path = dir.path().join(required);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"x").unwrap();
        }
        assert!(verify_required_files(dir.path()).is_ok());
    }

    #[test]
    fn prompt_lists_every_required_file() {
        let opts = ScaffoldOptions {
            prompt: "Scrape the weekly cheese price index".to_string(),
            name: "cheese-index".to_string(),
            dir: PathBuf::from("/tmp/cheese-index"),
        };
        let prompt = compose_prompt(&opts);
        assert!(prompt.contains("cheese-index"));
        for required in REQUIRED_FILES {
            assert!(prompt.contains(required), "missing {required}");
        }
    }
}
