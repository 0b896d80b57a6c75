use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;

/// Wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Bundled asset root shipped beside the workspace.
pub fn default_assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("assets")
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse comma-separated seeds. Negative values fold to their magnitude.
pub fn resolve_seeds(raw: &str) -> Result<Vec<u64>> {
    split_csv(raw)
        .iter()
        .map(|token| {
            if let Ok(value) = token.parse::<i64>() {
                return Ok(value.unsigned_abs());
            }
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed: {token}"))
        })
        .collect()
}
