//! This module controls configuration parsing from the end user, providing a
//! convenience mechanism for the rest of the program.

use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::target;

/// Default counter compared when the user names none.
pub const DEFAULT_COUNTER: &str = "renderTime";

/// Default number of valid frames required from every scene.
pub const DEFAULT_FRAME_COUNT: u32 = 100;

/// Errors produced by [`Config`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error for a serde [`serde_yaml`].
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    /// Error reading config file
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// The config listed no scenes to compare
    #[error("No scenes listed in configuration")]
    NoScenes,
}

fn default_counter() -> String {
    DEFAULT_COUNTER.to_string()
}

fn default_frame_count() -> NonZeroU32 {
    NonZeroU32::new(DEFAULT_FRAME_COUNT).expect("default frame count is positive")
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
/// Main configuration struct for scenebench
pub struct Config {
    /// The renderer to launch, one run per scene.
    pub renderer: target::Config,
    /// Name of the per-frame counter to compare, matched case-sensitively
    /// against the standard counter table.
    #[serde(default = "default_counter")]
    pub counter: String,
    /// Number of valid frames required from every scene. A scene that yields
    /// fewer contributes nothing to the report.
    #[serde(default = "default_frame_count")]
    pub frame_count: NonZeroU32,
    /// Scene files to compare.
    pub scenes: Vec<PathBuf>,
    /// Location on disk the JSON-lines report is written to.
    pub report_path: PathBuf,
}

impl Config {
    /// Parse a [`Config`] from yaml contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the yaml is malformed or no scenes are listed.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        let config: Config = serde_yaml::from_str(contents)?;
        if config.scenes.is_empty() {
            return Err(Error::NoScenes);
        }
        Ok(config)
    }

    /// Read and parse a [`Config`] from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a valid
    /// config.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let contents = r"
renderer:
  command: /usr/bin/scene-renderer
  arguments: [--fullscreen]
counter: gpuRenderTime
frame_count: 60
scenes:
  - scenes/list_view.qml
  - scenes/spinner.qml
report_path: /tmp/report.jsonl
";
        let config = Config::parse(contents).expect("config is valid");
        assert_eq!(config.counter, "gpuRenderTime");
        assert_eq!(config.frame_count.get(), 60);
        assert_eq!(config.scenes.len(), 2);
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let contents = r"
renderer:
  command: /usr/bin/scene-renderer
scenes:
  - scenes/list_view.qml
report_path: /tmp/report.jsonl
";
        let config = Config::parse(contents).expect("config is valid");
        assert_eq!(config.counter, DEFAULT_COUNTER);
        assert_eq!(config.frame_count.get(), DEFAULT_FRAME_COUNT);
    }

    #[test]
    fn empty_scene_list_is_rejected() {
        let contents = r"
renderer:
  command: /usr/bin/scene-renderer
scenes: []
report_path: /tmp/report.jsonl
";
        assert!(matches!(Config::parse(contents), Err(Error::NoScenes)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let contents = r"
renderer:
  command: /usr/bin/scene-renderer
scenes: [a.qml]
report_path: /tmp/report.jsonl
plot_font: Ubuntu
";
        assert!(matches!(
            Config::parse(contents),
            Err(Error::SerdeYaml(_))
        ));
    }
}
