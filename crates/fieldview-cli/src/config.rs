// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use fieldview_app::DatasetKind;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "fieldview";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub initial_dataset: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            path: None,
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("FIELDVIEW_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set FIELDVIEW_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [data], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(data_path) = &self.data.path
            && data_path.trim().is_empty()
        {
            bail!(
                "data.path in {} is empty; remove it or point it at a JSON data file",
                path.display()
            );
        }

        if let Some(label) = &self.ui.initial_dataset
            && DatasetKind::parse(label).is_none()
        {
            bail!(
                "ui.initial_dataset in {} is {label:?}; expected one of: {}",
                path.display(),
                dataset_labels()
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} is {level:?}; expected one of: {}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    /// Data file from the config, else `FIELDVIEW_DATA_PATH`. `None` means
    /// there is nothing to load and the caller decides what to show.
    pub fn data_path(&self) -> Option<PathBuf> {
        match &self.data.path {
            Some(path) => Some(PathBuf::from(path)),
            None => env::var_os("FIELDVIEW_DATA_PATH").map(PathBuf::from),
        }
    }

    pub fn initial_dataset(&self) -> Option<DatasetKind> {
        self.ui.initial_dataset.as_deref().and_then(DatasetKind::parse)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log.path.as_ref().map(PathBuf::from)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# fieldview config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# JSON object keyed by dataset label ({}).\n# path = \"/absolute/path/to/datasets.json\"\n\n[ui]\ninitial_dataset = \"{}\"\n\n[log]\n# Logging is off unless a path is set. FIELDVIEW_LOG overrides the level.\n# path = \"/tmp/fieldview.log\"\nlevel = \"{}\"\n",
            path.display(),
            dataset_labels(),
            DatasetKind::ALL[0].label(),
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn dataset_labels() -> String {
    DatasetKind::ALL
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>()
        .join(", ")
}
