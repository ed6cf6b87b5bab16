//! Publish companion
//!
//! Uploads a local source directory to the platform's actor-build API:
//! collect the tree (text vs base64 by extension and dotfile heuristics,
//! fixed ignore list), find or create the actor, update the version's
//! source files, trigger a build, and poll until it finishes or the
//! deadline passes. One attempt per API call, no retry.

use std::path::Path;
use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::PublishConfig;
use crate::platform::PlatformClient;
use crate::{Error, Result};

/// Directories never uploaded
const SKIP_DIRS: [&str; 9] = [
    ".git",
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "storage",
    "apify_storage",
];

/// Lockfiles never uploaded
const SKIP_FILES: [&str; 5] = [
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "poetry.lock",
];

/// Extensions uploaded as text
const TEXT_EXTENSIONS: [&str; 20] = [
    "js", "mjs", "cjs", "ts", "json", "jsonc", "md", "txt", "html", "css", "yml", "yaml", "toml",
    "xml", "py", "rs", "sh", "sql", "env", "svg",
];

/// How a source file is encoded for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// UTF-8 text, uploaded verbatim
    Text,
    /// Binary, uploaded base64-encoded
    Base64,
}

/// One file of the uploaded source tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the project root, forward slashes
    pub name: String,
    /// Encoding of `content`
    pub format: SourceFormat,
    /// File content, text or base64
    pub content: String,
}

/// What to publish and as which version
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Actor name on the platform
    pub name: String,
    /// Version number to create or update
    pub version: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ActorData {
    id: String,
}

#[derive(Deserialize)]
struct BuildData {
    id: String,
    status: String,
}

/// Recursively collect the uploadable source tree under `root`
pub fn collect_source_files(root: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_dir() && SKIP_DIRS.contains(&name.as_ref()))
        });

    for entry in walker {
        let entry = entry.map_err(|e| Error::Build(format!("walking {}: {e}", root.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if SKIP_FILES.contains(&name.as_ref()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::Build(format!("path outside root: {e}")))?
            .to_string_lossy()
            .replace('\\', "/");

        let bytes = std::fs::read(entry.path())?;
        let file = match classify(&name, &bytes) {
            SourceFormat::Text => SourceFile {
                name: relative,
                format: SourceFormat::Text,
                // classify only says Text when the bytes are valid UTF-8
                content: String::from_utf8_lossy(&bytes).into_owned(),
            },
            SourceFormat::Base64 => SourceFile {
                name: relative,
                format: SourceFormat::Base64,
                content: BASE64.encode(&bytes),
            },
        };
        debug!(file = %file.name, format = ?file.format, "Collected source file");
        files.push(file);
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Text when the extension is known, or when a dotfile / extensionless
/// file decodes as UTF-8; base64 otherwise.
fn classify(file_name: &str, bytes: &[u8]) -> SourceFormat {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match extension {
        Some(ext) if TEXT_EXTENSIONS.contains(&ext.as_str()) => SourceFormat::Text,
        Some(_) => SourceFormat::Base64,
        // Dotfiles and extensionless files (Dockerfile, .gitignore)
        None if std::str::from_utf8(bytes).is_ok() => SourceFormat::Text,
        None => SourceFormat::Base64,
    }
}

/// Upload `dir` as actor `opts.name`, build it, and wait for the build to
/// finish. Returns the build id.
pub async fn publish_directory(
    platform: &PlatformClient,
    dir: &Path,
    opts: &PublishOptions,
    config: &PublishConfig,
) -> Result<String> {
    let files = collect_source_files(dir)?;
    if files.is_empty() {
        return Err(Error::Build(format!(
            "no uploadable files under {}",
            dir.display()
        )));
    }
    info!(actor = %opts.name, files = files.len(), "Uploading source tree");

    let actor_id = find_or_create_actor(platform, &opts.name).await?;
    update_version(platform, &actor_id, &opts.version, &files).await?;
    let build_id = trigger_build(platform, &actor_id, &opts.version).await?;
    wait_for_build(platform, &build_id, config).await?;

    info!(actor = %opts.name, build = %build_id, "Build succeeded");
    Ok(build_id)
}

async fn find_or_create_actor(platform: &PlatformClient, name: &str) -> Result<String> {
    let url = platform.api_url(&format!("v2/acts/{name}"));
    let response = platform
        .http()
        .get(&url)
        .bearer_auth(platform.token())
        .send()
        .await?;

    if response.status().is_success() {
        let actor: Envelope<ActorData> = response.json().await?;
        debug!(actor = %name, id = %actor.data.id, "Actor exists");
        return Ok(actor.data.id);
    }
    if response.status() != reqwest::StatusCode::NOT_FOUND {
        return Err(Error::Api {
            status: response.status().as_u16(),
            context: format!("fetching actor {name}"),
        });
    }

    let response = platform
        .http()
        .post(platform.api_url("v2/acts"))
        .bearer_auth(platform.token())
        .json(&serde_json::json!({ "name": name }))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(Error::Api {
            status: response.status().as_u16(),
            context: format!("creating actor {name}"),
        });
    }

    let actor: Envelope<ActorData> = response.json().await?;
    info!(actor = %name, id = %actor.data.id, "Actor created");
    Ok(actor.data.id)
}

async fn update_version(
    platform: &PlatformClient,
    actor_id: &str,
    version: &str,
    files: &[SourceFile],
) -> Result<()> {
    let body = serde_json::json!({
        "versionNumber": version,
        "sourceType": "SOURCE_FILES",
        "sourceFiles": files,
    });

    let url = platform.api_url(&format!("v2/acts/{actor_id}/versions/{version}"));
    let response = platform
        .http()
        .put(&url)
        .bearer_auth(platform.token())
        .json(&body)
        .send()
        .await?;

    if response.status().is_success() {
        return Ok(());
    }
    if response.status() != reqwest::StatusCode::NOT_FOUND {
        return Err(Error::Api {
            status: response.status().as_u16(),
            context: format!("updating version {version}"),
        });
    }

    // Version does not exist yet
    let url = platform.api_url(&format!("v2/acts/{actor_id}/versions"));
    let response = platform
        .http()
        .post(&url)
        .bearer_auth(platform.token())
        .json(&body)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(Error::Api {
            status: response.status().as_u16(),
            context: format!("creating version {version}"),
        });
    }
    Ok(())
}

async fn trigger_build(platform: &PlatformClient, actor_id: &str, version: &str) -> Result<String> {
    let url = platform.api_url(&format!("v2/acts/{actor_id}/builds?version={version}"));
    let response = platform
        .http()
        .post(&url)
        .bearer_auth(platform.token())
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(Error::Api {
            status: response.status().as_u16(),
            context: format!("triggering build of version {version}"),
        });
    }

    let build: Envelope<BuildData> = response.json().await?;
    info!(build = %build.data.id, "Build started");
    Ok(build.data.id)
}

/// Poll the build until a terminal status or the configured deadline
async fn wait_for_build(
    platform: &PlatformClient,
    build_id: &str,
    config: &PublishConfig,
) -> Result<()> {
    let deadline = Instant::now() + config.build_timeout();
    let url = platform.api_url(&format!("v2/actor-builds/{build_id}"));

    loop {
        let response = platform
            .http()
            .get(&url)
            .bearer_auth(platform.token())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Api {
                status: response.status().as_u16(),
                context: format!("polling build {build_id}"),
            });
        }

        let build: Envelope<BuildData> = response.json().await?;
        match build.data.status.as_str() {
            "SUCCEEDED" => return Ok(()),
            "FAILED" | "ABORTED" | "TIMED-OUT" => {
                return Err(Error::Build(format!(
                    "build {build_id} ended with status {}",
                    build.data.status
                )));
            }
            status => {
                debug!(build = %build_id, status = %status, "Build in progress");
            }
        }

        if Instant::now() >= deadline {
            return Err(Error::Build(format!(
                "build {build_id} still running after {}s",
                config.build_timeout_secs
            )));
        }
        tokio::time::sleep(config.poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, rel: &str, bytes: &[u8]) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn collects_and_classifies_a_project_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "main.js", b"console.log('hi');\n");
        write(root, "README.md", b"# actor\n");
        write(root, "Dockerfile", b"FROM node:20\n");
        write(root, ".gitignore", b"node_modules\n");
        write(root, "logo.png", &[0x89, 0x50, 0x4E, 0x47, 0x00]);
        write(root, ".actor/actor.json", b"{}\n");

        let files = collect_source_files(root).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                ".actor/actor.json",
                ".gitignore",
                "Dockerfile",
                "README.md",
                "logo.png",
                "main.js",
            ]
        );

        let by_name = |n: &str| files.iter().find(|f| f.name == n).unwrap();
        assert_eq!(by_name("main.js").format, SourceFormat::Text);
        assert_eq!(by_name("Dockerfile").format, SourceFormat::Text);
        assert_eq!(by_name(".gitignore").format, SourceFormat::Text);
        assert_eq!(by_name("logo.png").format, SourceFormat::Base64);
        assert_eq!(
            by_name("logo.png").content,
            BASE64.encode([0x89, 0x50, 0x4E, 0x47, 0x00])
        );
    }

    #[test]
    fn skips_build_artifacts_and_lockfiles() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "main.js", b"x");
        write(root, "package-lock.json", b"{}");
        write(root, "node_modules/dep/index.js", b"x");
        write(root, ".git/HEAD", b"ref: refs/heads/main");
        write(root, "storage/datasets/default.jsonl", b"{}");

        let files = collect_source_files(root).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main.js"]);
    }

    #[test]
    fn unknown_extensions_are_binary() {
        assert_eq!(classify("data.bin", b"plain ascii"), SourceFormat::Base64);
        assert_eq!(classify("notes.txt", b"plain ascii"), SourceFormat::Text);
        assert_eq!(classify(".env", b"KEY=value"), SourceFormat::Text);
        assert_eq!(classify("blob", &[0xFF, 0xFE, 0x00]), SourceFormat::Base64);
    }
}
