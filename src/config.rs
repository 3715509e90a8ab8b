//! Configuration for session validation.
//!
//! Holds the per-run switches (which data streams to check) and the
//! exemption lists. Loaded from YAML; every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Files that experimenters routinely leave in the session root.
pub const DEFAULT_WHITELISTED_FILES: &[&str] = &["comment.txt", "traj_plan.txt", "trajectory.txt"];

/// Extensions allowed loose inside recording folders.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".txt"];

/// Validator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Validate PyControl behavioral files.
    pub include_behavior: bool,
    /// Validate SpikeGLX recordings.
    pub include_ephys: bool,
    /// Validate camera recordings.
    pub include_videos: bool,
    /// Root-level filenames exempt from pattern matching.
    pub whitelisted_files_in_root: Vec<String>,
    /// Extensions (with leading dot) allowed loose in recording folders.
    pub allowed_extensions_not_in_root: Vec<String>,
    /// Emit an advisory when `run_task-task_files` is missing.
    pub warn_if_no_task_folder: bool,
    /// Emit an advisory when the camera folder is missing.
    pub warn_if_no_video_folder: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            include_behavior: true,
            include_ephys: true,
            include_videos: true,
            whitelisted_files_in_root: DEFAULT_WHITELISTED_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_extensions_not_in_root: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            warn_if_no_task_folder: true,
            warn_if_no_video_folder: true,
        }
    }
}

impl ValidatorConfig {
    /// Loads a configuration from a YAML file and validates it.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses a configuration from YAML text and validates it.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: ValidatorConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the exemption lists are well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = self
            .whitelisted_files_in_root
            .iter()
            .find(|name| name.trim().is_empty() || name.contains('/') || name.contains('\\'))
        {
            return Err(ConfigError::Invalid(format!(
                "whitelisted file '{}' must be a plain, non-empty filename",
                name
            )));
        }

        if let Some(ext) = self
            .allowed_extensions_not_in_root
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2)
        {
            return Err(ConfigError::Invalid(format!(
                "allowed extension '{}' must start with '.' (e.g. '.txt')",
                ext
            )));
        }

        Ok(())
    }

    /// Sets whether behavioral data is validated.
    pub fn with_behavior(mut self, include: bool) -> Self {
        self.include_behavior = include;
        self
    }

    /// Sets whether ephys data is validated.
    pub fn with_ephys(mut self, include: bool) -> Self {
        self.include_ephys = include;
        self
    }

    /// Sets whether videos are validated.
    pub fn with_videos(mut self, include: bool) -> Self {
        self.include_videos = include;
        self
    }

    /// Replaces the root whitelist.
    pub fn with_whitelisted_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelisted_files_in_root = files.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the extensions allowed loose in recording folders.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions_not_in_root = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether a missing task folder produces an advisory.
    pub fn with_warn_if_no_task_folder(mut self, warn: bool) -> Self {
        self.warn_if_no_task_folder = warn;
        self
    }

    /// Sets whether a missing camera folder produces an advisory.
    pub fn with_warn_if_no_video_folder(mut self, warn: bool) -> Self {
        self.warn_if_no_video_folder = warn;
        self
    }
}
