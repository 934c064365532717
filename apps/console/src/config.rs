use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_filter: String,
    pub seed_file: Option<PathBuf>,
    pub service_latency_ms: u64,
    pub fail_deletes: bool,
    pub json_output: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            seed_file: None,
            service_latency_ms: 0,
            fail_deletes: false,
            json_output: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    log_filter: Option<String>,
    seed_file: Option<PathBuf>,
    service_latency_ms: Option<u64>,
    fail_deletes: Option<bool>,
    json_output: Option<bool>,
}

/// Defaults, then the TOML file at `path` if present, then `APP__*` variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.seed_file {
        settings.seed_file = Some(v);
    }
    if let Some(v) = file_cfg.service_latency_ms {
        settings.service_latency_ms = v;
    }
    if let Some(v) = file_cfg.fail_deletes {
        settings.fail_deletes = v;
    }
    if let Some(v) = file_cfg.json_output {
        settings.json_output = v;
    }
    Ok(())
}

fn apply_env<F>(settings: &mut Settings, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__SEED_FILE") {
        settings.seed_file = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup("APP__SERVICE_LATENCY_MS") {
        settings.service_latency_ms = v
            .trim()
            .parse()
            .with_context(|| format!("APP__SERVICE_LATENCY_MS is not a number: '{v}'"))?;
    }
    if let Some(v) = lookup("APP__FAIL_DELETES") {
        settings.fail_deletes = parse_flag(&v)
            .with_context(|| format!("APP__FAIL_DELETES is not a boolean: '{v}'"))?;
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
