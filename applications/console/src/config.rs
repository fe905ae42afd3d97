/// Console configuration
use crate::error::{ConsoleError, Result};
use chorus_playback::{PlaybackConfig, MAX_VOLUME, MIN_VOLUME};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "chorus.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_simulation")]
    pub simulation: SimulationSettings,

    #[serde(default = "default_catalog")]
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Multiplier applied to track durations before a stream "ends"
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// Chats with no voice call; joining them fails
    #[serde(default)]
    pub offline_chats: Vec<i64>,

    /// User id attributed to requests typed at the console
    #[serde(default = "default_user_id")]
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub title: String,

    pub duration_secs: u64,

    /// Page link, what a search result points at
    pub url: String,

    /// Playable audio location
    pub audio_url: String,

    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl ConsoleConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `chorus.toml` is read if
    /// present. `CHORUS_*` variables override both, with `__` between
    /// levels (`CHORUS_PLAYBACK__QUEUE_CAPACITY=10`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CHORUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;

        if playback.queue_capacity == 0 {
            return Err(ConsoleError::Config(
                "playback.queue_capacity must be at least 1".to_string(),
            ));
        }

        if !(MIN_VOLUME..=MAX_VOLUME).contains(&playback.default_volume) {
            return Err(ConsoleError::Config(format!(
                "playback.default_volume must be between {} and {}",
                MIN_VOLUME, MAX_VOLUME
            )));
        }

        if playback.transport_timeout_ms == 0 {
            return Err(ConsoleError::Config(
                "playback.transport_timeout_ms must be positive".to_string(),
            ));
        }

        if playback.search_limit == 0 {
            return Err(ConsoleError::Config(
                "playback.search_limit must be at least 1".to_string(),
            ));
        }

        let scale = self.simulation.time_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConsoleError::Config(format!(
                "simulation.time_scale must be a positive number, got {}",
                scale
            )));
        }

        let mut urls = HashSet::new();
        for entry in &self.catalog {
            if entry.title.trim().is_empty() {
                return Err(ConsoleError::Config(format!(
                    "catalog entry {} has an empty title",
                    entry.url
                )));
            }
            if !urls.insert(entry.url.as_str()) {
                return Err(ConsoleError::Config(format!(
                    "catalog url {} appears twice",
                    entry.url
                )));
            }
        }

        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            simulation: default_simulation(),
            catalog: default_catalog(),
        }
    }
}

// Default values
fn default_simulation() -> SimulationSettings {
    SimulationSettings {
        time_scale: default_time_scale(),
        offline_chats: Vec::new(),
        user_id: default_user_id(),
    }
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_user_id() -> i64 {
    1
}

fn default_catalog() -> Vec<CatalogEntry> {
    [
        ("Morning Coffee", 185),
        ("Night Drive", 242),
        ("Rainy Window", 208),
        ("City Lights", 311),
        ("Long Road Home", 4 * 3600),
    ]
    .into_iter()
    .map(|(title, duration_secs)| {
        let slug = title.to_lowercase().replace(' ', "-");
        CatalogEntry {
            title: title.to_string(),
            duration_secs,
            url: format!("https://media.example.com/watch/{}", slug),
            audio_url: format!("https://media.example.com/audio/{}.m4a", slug),
            thumbnail_url: None,
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.playback.queue_capacity, 50);
        assert_eq!(config.catalog.len(), 5);
    }

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[playback]
queue_capacity = 3

[simulation]
time_scale = 0.01

[[catalog]]
title = "Only Song"
duration_secs = 60
url = "https://media.example.com/watch/only"
audio_url = "https://media.example.com/audio/only.m4a"
"#
        )
        .unwrap();

        let config = ConsoleConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.playback.queue_capacity, 3);
        assert_eq!(config.playback.default_volume, 100);
        assert_eq!(config.simulation.time_scale, 0.01);
        assert_eq!(config.simulation.user_id, 1);
        assert_eq!(config.catalog.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = ConsoleConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConsoleError::Config(_))));
    }

    #[test]
    fn rejects_zero_capacity() {
        let mut config = ConsoleConfig::default();
        config.playback.queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_time_scale() {
        let mut config = ConsoleConfig::default();
        config.simulation.time_scale = 0.0;
        assert!(config.validate().is_err());

        config.simulation.time_scale = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_urls() {
        let mut config = ConsoleConfig::default();
        let first = config.catalog[0].clone();
        config.catalog.push(first);
        assert!(config.validate().is_err());
    }
}
