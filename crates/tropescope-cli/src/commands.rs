//! Command implementations.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};
use tropescope_pipeline::{ItemResult, Pipeline, PipelineConfig};

/// Load the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Classify one text and return its result JSON.
pub async fn execute_classify(pipeline: &Pipeline, text: &str) -> Result<Value> {
    let result = pipeline.classify(text).await?;
    Ok(serde_json::to_value(&*result)?)
}

/// Classify every non-blank line of `file` and return one JSON entry per line.
pub async fn execute_batch(pipeline: &Pipeline, file: &Path) -> Result<Value> {
    let texts = read_lines(file)?;
    info!(inputs = texts.len(), "Classifying batch from {}", file.display());

    let results = pipeline.classify_batch(&texts).await;
    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!(failed, total = results.len(), "Some inputs could not be classified");
    }
    info!("{}", pipeline.metrics().summary());

    let entries = texts
        .iter()
        .zip(&results)
        .map(|(text, result)| batch_entry(text, result))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(entries))
}

/// Render the configuration as TOML.
pub fn execute_config(config: &PipelineConfig) -> Result<String> {
    config.to_toml().map_err(anyhow::Error::msg)
}

fn batch_entry(text: &str, result: &ItemResult) -> Result<Value> {
    Ok(match result {
        Ok(risk) => json!({ "text": text, "result": serde_json::to_value(&**risk)? }),
        Err(e) => json!({ "text": text, "error": e.to_string() }),
    })
}

fn read_lines(file: &Path) -> Result<Vec<String>> {
    let contents = if file.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?
    };

    Ok(contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}
