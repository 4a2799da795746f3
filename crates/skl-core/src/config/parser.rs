//! Parsing of `config.toml` / `skl.toml` layers.

use std::path::Path;

use anyhow::{Context, Result};

use super::SklConfigOverride;

/// Parse one configuration layer from disk.
pub fn parse_config_override(path: &Path) -> Result<SklConfigOverride> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_override_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse one configuration layer from a string.
pub fn parse_config_override_str(content: &str) -> Result<SklConfigOverride> {
    toml::from_str(content).map_err(|e| enhance_toml_error(e, content))
}

fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().trim_end().to_string();
    let Some(span) = error.span() else {
        return anyhow::anyhow!("Invalid configuration: {}", message);
    };

    let offset = span.start.min(content.len());
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_no = content[..line_start].lines().count() + 1;
    let line = content[line_start..].lines().next().unwrap_or_default();
    let column = content[line_start..offset].chars().count();

    anyhow::anyhow!(
        "Invalid configuration (line {line_no}, column {}): {message}\n  | {line}\n  | {}^",
        column + 1,
        " ".repeat(column)
    )
}
