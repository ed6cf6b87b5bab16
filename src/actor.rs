//! Actor run modes
//!
//! The dispatcher: detect the mode, then either run the pipeline once
//! (standard) or hand off to the standby HTTP server. The pipeline itself
//! is shared - normalize happened upstream, so it is apply → assemble →
//! persist.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::assemble::{TransformResult, assemble};
use crate::config::Config;
use crate::dataset::{self, DatasetSink};
use crate::mode::Mode;
use crate::normalize::{self, TransformRequest};
use crate::server;
use crate::transform::Engine;
use crate::{Error, Result};

/// Relative path of the local batch input, mirroring the platform's local
/// storage layout
const LOCAL_INPUT_PATH: &str = "key_value_stores/default/INPUT.json";

/// Apply, assemble, and persist one normalized request
pub async fn run_pipeline(
    engine: &Engine,
    sink: &Arc<dyn DatasetSink>,
    request: &TransformRequest,
) -> Result<TransformResult> {
    let transformed = engine.apply(&request.message, &request.transform).await?;
    let result = assemble(request, transformed);
    sink.append(&serde_json::to_value(&result)?).await?;
    Ok(result)
}

/// Run the actor in the mode the environment selected
pub async fn run(config: Config, engine: Engine, input: Option<PathBuf>) -> Result<()> {
    let sink = dataset::from_config(&config.platform)?;

    match Mode::detect() {
        Mode::Standby => {
            info!("Standby mode selected");
            server::run(&config, engine, sink).await
        }
        Mode::Standard => {
            info!("Standard mode selected");
            run_standard(&config, &engine, &sink, input.as_deref()).await
        }
    }
}

/// One-shot batch run: read input, run the pipeline once, exit
async fn run_standard(
    config: &Config,
    engine: &Engine,
    sink: &Arc<dyn DatasetSink>,
    input: Option<&Path>,
) -> Result<()> {
    let value = read_batch_input(config, input).await?;
    let request = normalize::from_batch_input(&value);

    info!(transform = %request.transform, "Processing batch input");
    let result = run_pipeline(engine, sink, &request).await?;
    info!(
        transformation = %result.transformation,
        "Batch run complete"
    );
    Ok(())
}

/// Read the batch input object: an explicit `--input` path wins, then the
/// local key-value store, then an empty object (defaults apply).
async fn read_batch_input(config: &Config, input: Option<&Path>) -> Result<serde_json::Value> {
    let path = match input {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(&config.platform.storage_dir).join(LOCAL_INPUT_PATH),
    };

    if input.is_none() && !path.exists() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| Error::Config(format!("cannot read input {}: {e}", path.display())))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::PlatformConfig;
    use crate::dataset::LocalDataset;

    #[tokio::test]
    async fn pipeline_persists_exactly_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalDataset::new(dir.path().to_str().unwrap(), "default");
        let path = local.path().clone();
        let sink: Arc<dyn DatasetSink> = Arc::new(local);

        let request = TransformRequest {
            message: "This is a cool and happy message!".to_string(),
            transform: "emojify".to_string(),
        };
        let result = run_pipeline(&Engine::new(), &sink, &request).await.unwrap();

        assert!(result.transformed.contains("cool 😎"));
        assert!(result.transformed.contains("happy 😊"));
        assert_eq!(result.transformation, "emojify");
        assert_eq!(result.available_transforms.len(), 9);

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test]
    async fn missing_local_input_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            platform: PlatformConfig {
                storage_dir: dir.path().to_str().unwrap().to_string(),
                ..PlatformConfig::default()
            },
            ..Config::default()
        };
        let value = read_batch_input(&config, None).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn explicit_missing_input_is_an_error() {
        let config = Config::default();
        let missing = Path::new("/nonexistent/INPUT.json");
        assert!(read_batch_input(&config, Some(missing)).await.is_err());
    }
}
