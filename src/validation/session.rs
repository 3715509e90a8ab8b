//! Whole-session validation.
//!
//! Runs the behavioral, ephys and video validators selected by the
//! configuration and gathers their files and advisories. Nothing is cached:
//! every call walks the session tree again.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::ValidatorConfig;
use crate::error::{ValidationErrorKind, ValidationResult};

use super::advisory::{Advisory, ValidatedFiles};
use super::behavior::BehaviorValidator;
use super::entries::{file_name, is_hidden, list_children};
use super::ephys::EphysValidator;
use super::video::VideoValidator;

/// Files found in a validated session, per data stream.
///
/// A stream that was not requested yields an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionFiles {
    pub behavior: Vec<PathBuf>,
    pub ephys: Vec<PathBuf>,
    pub video: Vec<PathBuf>,
    pub advisories: Vec<Advisory>,
}

impl SessionFiles {
    fn absorb(&mut self, validated: ValidatedFiles) -> Vec<PathBuf> {
        self.advisories.extend(validated.advisories);
        validated.files
    }

    /// Total number of files across all streams.
    pub fn file_count(&self) -> usize {
        self.behavior.len() + self.ephys.len() + self.video.len()
    }
}

/// Validator composing the per-stream validators.
#[derive(Debug, Clone)]
pub struct SessionValidator {
    config: ValidatorConfig,
    behavior: BehaviorValidator,
    ephys: EphysValidator,
    video: VideoValidator,
}

impl Default for SessionValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl SessionValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        let behavior = BehaviorValidator::new(config.whitelisted_files_in_root.clone())
            .with_warn_if_no_task_folder(config.warn_if_no_task_folder);
        let ephys = EphysValidator::new(config.allowed_extensions_not_in_root.clone());
        let video =
            VideoValidator::new().with_warn_if_no_video_folder(config.warn_if_no_video_folder);
        Self {
            config,
            behavior,
            ephys,
            video,
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate the files of a raw session.
    ///
    /// The first violation aborts validation; advisories from every stream
    /// that ran are returned with the files. The session name is checked by
    /// each enabled stream, so with every stream disabled nothing is checked.
    #[instrument(skip(self), fields(session = %session_path.display()))]
    pub fn validate(&self, session_path: &Path, subject: &str) -> ValidationResult<SessionFiles> {
        let mut files = SessionFiles::default();

        if self.config.include_behavior {
            let validated = self.behavior.validate(session_path, subject)?;
            files.behavior = files.absorb(validated);
        }
        if self.config.include_ephys {
            let validated = self.ephys.validate(session_path, subject)?;
            files.ephys = files.absorb(validated);
        }
        if self.config.include_videos {
            let validated = self.video.validate(session_path, subject)?;
            files.video = files.absorb(validated);
        }

        info!(
            "Session valid: {} behavior, {} ephys, {} video files, {} advisories",
            files.behavior.len(),
            files.ephys.len(),
            files.video.len(),
            files.advisories.len()
        );
        Ok(files)
    }
}

/// Validates a raw session with the given configuration.
pub fn validate_raw_session(
    session_path: &Path,
    subject: &str,
    config: &ValidatorConfig,
) -> ValidationResult<SessionFiles> {
    SessionValidator::new(config.clone()).validate(session_path, subject)
}

/// Outcome of validating one session in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    Passed {
        files: SessionFiles,
    },
    Failed {
        kind: ValidationErrorKind,
        message: String,
    },
}

/// Validation result for one session directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub session: PathBuf,
    pub outcome: SessionOutcome,
}

impl SessionReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, SessionOutcome::Passed { .. })
    }
}

/// Validates every session folder directly inside `subject_dir`.
///
/// Hidden entries and plain files are skipped. A failing session does not
/// stop the batch.
#[instrument(skip(validator, subject_dir), fields(dir = %subject_dir.display()))]
pub fn validate_subject_dir(
    subject_dir: &Path,
    subject: &str,
    validator: &SessionValidator,
) -> ValidationResult<Vec<SessionReport>> {
    let sessions: Vec<PathBuf> = list_children(subject_dir)?
        .into_iter()
        .filter(|p| p.is_dir() && !is_hidden(&file_name(p)))
        .collect();

    info!("Validating {} sessions", sessions.len());

    let reports: Vec<SessionReport> = sessions
        .into_iter()
        .map(|session| {
            let outcome = match validator.validate(&session, subject) {
                Ok(files) => SessionOutcome::Passed { files },
                Err(e) => {
                    warn!("Session {} failed: {}", session.display(), e);
                    SessionOutcome::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    }
                }
            };
            SessionReport { session, outcome }
        })
        .collect();

    let failed = reports.iter().filter(|r| !r.passed()).count();
    info!(
        "{} of {} sessions passed",
        reports.len() - failed,
        reports.len()
    );
    Ok(reports)
}
