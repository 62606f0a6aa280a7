use std::path::{Path, PathBuf};

use shadowlight_lib::{Config, ContrastThresholds, JsonFileStore, ShadowError};

/// Tracks which CLI flags were explicitly provided vs. defaulted.
#[derive(Debug, Default)]
pub struct ContrastFlagSources {
    pub normal_text: bool,
    pub large_text: bool,
}

impl ContrastFlagSources {
    pub fn from_args(args: &[String]) -> Self {
        Self {
            normal_text: flag_present(args, "--normal-text"),
            large_text: flag_present(args, "--large-text"),
        }
    }
}

/// Checks if a flag was present in the command-line arguments.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// Merge CLI thresholds with config file, preferring CLI when flags are present.
pub fn resolve_thresholds(
    cli_normal_text: f64,
    cli_large_text: f64,
    config: &Config,
    flags: &ContrastFlagSources,
) -> ContrastThresholds {
    ContrastThresholds {
        normal_text: if flags.normal_text {
            cli_normal_text
        } else {
            config.contrast.normal_text
        },
        large_text: if flags.large_text {
            cli_large_text
        } else {
            config.contrast.large_text
        },
        ui_component: config.contrast.ui_component,
    }
}

/// Store path priority: `--store` > `store.path` in config > platform data dir.
pub fn resolve_store_path(cli_store: Option<PathBuf>, config: &Config) -> Result<PathBuf, ShadowError> {
    cli_store
        .or_else(|| config.store.path.clone())
        .or_else(JsonFileStore::default_path)
        .ok_or_else(|| {
            ShadowError::store("No data directory available; set store.path in config or pass --store")
        })
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/shadowlight/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, ShadowError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        ShadowError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        ShadowError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Format effective config as a single-line string.
pub fn format_effective_config(
    thresholds: &ContrastThresholds,
    config: &Config,
    config_source: Option<&Path>,
) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: contrast: normal={:.2}, large={:.2}, ui={:.2}, guide: settle={}ms, poll={}ms, completion: model={}, endpoint={}",
        thresholds.normal_text,
        thresholds.large_text,
        thresholds.ui_component,
        config.guide.scroll_settle.as_millis(),
        config.guide.poll_interval.as_millis(),
        config.completion.model,
        config.completion.endpoint,
    )
}
