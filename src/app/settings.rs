use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    cli::Cli,
    domain::bins::{BinOfInterest, default_bins_of_interest},
};

pub const CONFIG_DIR_ENV: &str = "WIDGET_FEEDS_CONFIG_DIR";
const SETTINGS_FILE: &str = "settings.json";

/// Values a user sets once and keeps between runs. The CLI overrides any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub device_id: Option<String>,
    pub from_station: String,
    pub to_station: String,
    pub bin_id: Option<String>,
    pub bins_of_interest: Vec<BinOfInterest>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            device_id: None,
            from_station: "KTH".to_string(),
            to_station: "VIC".to_string(),
            bin_id: None,
            bins_of_interest: default_bins_of_interest(),
        }
    }
}

impl RuntimeSettings {
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(device) = &cli.device_id {
            self.device_id = Some(device.clone());
        }
        if let Some(from) = &cli.from_station {
            self.from_station = from.to_ascii_uppercase();
        }
        if let Some(to) = &cli.to_station {
            self.to_station = to.to_ascii_uppercase();
        }
        if let Some(bin_id) = &cli.bin_id {
            self.bin_id = Some(bin_id.clone());
        }
    }
}

/// Directory holding `settings.json` and the location cache: `--config-dir`,
/// then `WIDGET_FEEDS_CONFIG_DIR`, then `$HOME/.config/widget-feeds`.
pub fn config_dir(cli: &Cli) -> Option<PathBuf> {
    if let Some(dir) = &cli.config_dir {
        return Some(dir.clone());
    }
    if let Some(base) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(base));
    }
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join("widget-feeds"))
}

#[must_use]
pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE)
}

/// Defaults, overlaid by the saved file when `dir` is given, overlaid by the CLI.
/// A missing or unreadable file is not an error.
pub fn load_runtime_settings(cli: &Cli, dir: Option<&Path>) -> RuntimeSettings {
    let mut settings = dir
        .map(settings_path)
        .and_then(|path| read_settings(&path))
        .unwrap_or_default();
    settings.apply_cli(cli);
    settings
}

fn read_settings(path: &Path) -> Option<RuntimeSettings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "settings_not_loaded");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(saved) => Some(saved),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "settings_malformed");
            None
        }
    }
}

pub fn save_runtime_settings(path: &Path, settings: &RuntimeSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("creating settings directory failed")?;
    }
    let payload =
        serde_json::to_string_pretty(settings).context("serializing settings payload failed")?;
    fs::write(path, payload).context("writing settings file failed")
}
