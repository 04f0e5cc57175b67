//! Optional file configuration and its merge with command-line arguments.
//!
//! The file is a flat list of `key = value` lines:
//!
//! ```text
//! workers = 16
//! wait = 0.5
//! output_dir = "/data/whoi"
//! collection = "full-cuts"
//! ```
//!
//! Precedence: explicit command-line flag > config file > built-in default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use whalesounds_core::config::wait_from_secs;
use whalesounds_core::{Collection, RunConfig};

use crate::cli::{Args, CliValueSources};

/// Values read from the config file. `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FileConfig {
    pub(crate) workers: Option<u16>,
    pub(crate) wait: Option<f64>,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) collection: Option<Collection>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/whalesounds/config.toml`
/// 2. `$HOME/.config/whalesounds/config.toml`
#[must_use]
pub(crate) fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("whalesounds")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("whalesounds")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub(crate) fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "workers" => {
                let parsed = parse_workers(value)
                    .with_context(|| format!("Invalid `workers` value on line {line_no}"))?;
                cfg.workers = Some(parsed);
            }
            "wait" => {
                let parsed = value
                    .parse::<f64>()
                    .with_context(|| format!("Invalid `wait` value on line {line_no}"))?;
                wait_from_secs(parsed)
                    .with_context(|| format!("Invalid `wait` value on line {line_no}"))?;
                cfg.wait = Some(parsed);
            }
            "output_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `output_dir` value on line {line_no}"))?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            "collection" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `collection` value on line {line_no}"))?;
                cfg.collection = Some(
                    parsed
                        .parse()
                        .with_context(|| format!("Invalid `collection` value on line {line_no}"))?,
                );
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_workers(raw_value: &str) -> Result<u16> {
    let value = raw_value.parse::<u16>()?;
    if !(1..=256).contains(&value) {
        bail!("Expected an integer between 1 and 256");
    }
    Ok(value)
}

/// Builds the run configuration from arguments, their sources, and the file config.
pub(crate) fn resolve_run_config(
    args: &Args,
    sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<RunConfig> {
    let file = file_config.cloned().unwrap_or_default();

    let collection = match file.collection {
        Some(collection) if !sources.collection => collection,
        _ => args.collection,
    };
    let workers = match file.workers {
        Some(workers) if !sources.workers => workers,
        _ => args.workers,
    };
    let wait_secs = match file.wait {
        Some(wait) if !sources.wait => wait,
        _ => args.wait,
    };

    let mut config = RunConfig::for_collection(collection);
    config.workers = usize::from(workers);
    config.wait = wait_from_secs(wait_secs)?;
    if let Some(output_dir) = args.output_dir.clone().or(file.output_dir) {
        config.output_dir = output_dir;
    }
    if let Some(root_url) = &args.root_url {
        config.root_url.clone_from(root_url);
    }
    Ok(config)
}
